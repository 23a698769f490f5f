//! Global initialization utilities for the application

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize the application environment
///
/// Loads variables from a `.env` file (current directory or any parent) so
/// `CODESCOPE_*` settings can live next to the binary during development.
///
/// Safe to call multiple times - will only run once
pub fn initialize_environment() {
    INIT.call_once(|| {
        dotenvy::dotenv().ok();
    });
}

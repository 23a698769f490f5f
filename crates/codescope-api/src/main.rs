//! Codescope API Server
//!
//! HTTP API for code search and APM transaction distribution over
//! Elasticsearch.

use codescope_api::{bootstrap, routes};
use codescope_config::{
    ApplicationConfig, ConfigError,
    source::{ConfigurationLoader, EnvironmentSource, TomlFileSource},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

type MainResult = Result<(), Box<dyn std::error::Error>>;

/// TOML file layered under the environment. Once named it must exist and parse.
const CONFIG_FILE_ENV: &str = "CODESCOPE_CONFIG_FILE";

/// Tracing is not up yet, so configuration failures return through `main`
/// and reach stderr there.

fn load_config() -> Result<ApplicationConfig, ConfigError> {
    let mut loader = ConfigurationLoader::new().add_source(Box::new(EnvironmentSource));
    if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
        loader = loader.add_source(Box::new(TomlFileSource::new(path)));
    }
    loader.load()
}

fn init_tracing(config: &ApplicationConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.telemetry.tracing_level));

    if config.telemetry.json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> MainResult {
    // Initialize environment (load .env, etc.)
    codescope_common::initialize_environment();

    let config = load_config()?;
    init_tracing(&config);

    info!(
        service = %config.telemetry.service_name,
        elasticsearch = %config.elasticsearch.safe_connection_string(),
        "Starting Codescope API server..."
    );

    let state = bootstrap::initialize_app_state(&config)?;
    let app = routes::create_router(state);

    let addr = config.api.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

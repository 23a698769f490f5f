//! Configuration source loading and composition
//!
//! Every source produces a TOML table of overrides. The loader deep-merges
//! them over the defaults in priority order and validates the result.

use crate::validation::Validate;
use crate::{ApplicationConfig, ConfigError, ConfigResult, env_key};
use std::path::{Path, PathBuf};
use toml::{Table, Value};

/// Trait for loading configuration from different sources
pub trait ConfigurationSource {
    /// Load the overrides this source contributes
    ///
    /// # Errors
    /// Returns configuration loading errors
    fn load(&self) -> ConfigResult<Table>;

    /// Get the name of this configuration source
    fn name(&self) -> &str;

    /// Get the priority of this source (higher number = higher priority)
    fn priority(&self) -> u8;

    /// Whether a load failure aborts the whole configuration
    fn is_required(&self) -> bool {
        false
    }
}

/// Load configuration from `CODESCOPE_*` environment variables
///
/// Every variable that is set and parses counts as an override, even when its
/// value matches the built-in default. Unset or unparsable variables
/// contribute nothing.
pub struct EnvironmentSource;

impl ConfigurationSource for EnvironmentSource {
    fn load(&self) -> ConfigResult<Table> {
        let from_env = to_table(&ApplicationConfig::from_env())?;
        Ok(set_variables_only(from_env))
    }

    fn name(&self) -> &'static str {
        "environment"
    }

    fn priority(&self) -> u8 {
        100
    }
}

/// Keep the `section.field` entries whose environment variable actually
/// produced the value
fn set_variables_only(from_env: Table) -> Table {
    let mut out = Table::new();
    for (section, value) in from_env {
        let Value::Table(fields) = value else {
            continue;
        };
        let mut kept = Table::new();
        for (field, value) in fields {
            let key = env_key(&section, &field);
            let Ok(raw) = std::env::var(&key) else {
                continue;
            };
            if parsed_from(&raw, &value) {
                kept.insert(field, value);
            } else {
                tracing::warn!(variable = %key, value = %raw, "Ignoring unparsable environment override");
            }
        }
        if !kept.is_empty() {
            out.insert(section, Value::Table(kept));
        }
    }
    out
}

/// Whether `value` is what `raw` parses to, rather than a fallback default
fn parsed_from(raw: &str, value: &Value) -> bool {
    match value {
        Value::Integer(n) => raw.parse::<i64>().is_ok_and(|parsed| parsed == *n),
        Value::Boolean(b) => raw.parse::<bool>().is_ok_and(|parsed| parsed == *b),
        _ => true,
    }
}

/// Load configuration from a TOML file
///
/// A file named explicitly by the operator is required: failing to read or
/// parse it aborts loading. Optional files are logged and skipped.
pub struct TomlFileSource {
    path: PathBuf,
    required: bool,
}

impl TomlFileSource {
    /// A file that must exist and parse
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required: true,
        }
    }

    /// A file that is skipped when missing or malformed
    pub fn optional<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required: false,
        }
    }
}

impl ConfigurationSource for TomlFileSource {
    fn load(&self) -> ConfigResult<Table> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|source| ConfigError::ReadFile {
                path: self.path.display().to_string(),
                source,
            })?;
        let table: Table = toml::from_str(&content)?;
        Ok(table)
    }

    fn name(&self) -> &'static str {
        "toml_file"
    }

    fn priority(&self) -> u8 {
        50
    }

    fn is_required(&self) -> bool {
        self.required
    }
}

/// Type alias for configuration sources
type ConfigSources = Vec<Box<dyn ConfigurationSource>>;

/// Configuration loader that combines multiple sources
pub struct ConfigurationLoader {
    sources: ConfigSources,
}

impl ConfigurationLoader {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    #[must_use]
    pub fn add_source(mut self, source: Box<dyn ConfigurationSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Load configuration from all sources with priority ordering
    ///
    /// An optional source that fails to load is logged and skipped.
    ///
    /// # Errors
    /// Returns the load error of a required source, or deserialization and
    /// validation errors for the merged result
    pub fn load(&self) -> ConfigResult<ApplicationConfig> {
        let mut merged = to_table(&ApplicationConfig::default())?;

        // Lowest priority first, so higher priorities overwrite
        let mut sorted_sources = self.sources.iter().collect::<Vec<_>>();
        sorted_sources.sort_by_key(|source| source.priority());

        for source in sorted_sources {
            match source.load() {
                Ok(overrides) => {
                    tracing::debug!(
                        source = source.name(),
                        keys = overrides.len(),
                        "Loaded configuration source"
                    );
                    merge_tables(&mut merged, overrides);
                }
                Err(e) if source.is_required() => {
                    tracing::error!("Failed to load required source {}: {e}", source.name());
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!("Failed to load from source {}: {e}", source.name());
                }
            }
        }

        let config: ApplicationConfig = Value::Table(merged).try_into()?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigurationLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn to_table(config: &ApplicationConfig) -> ConfigResult<Table> {
    match Value::try_from(config) {
        Ok(Value::Table(table)) => Ok(table),
        Ok(_) => Err(ConfigError::Generic {
            message: "configuration did not serialize to a table".to_string(),
        }),
        Err(e) => Err(ConfigError::Generic {
            message: format!("configuration serialization failed: {e}"),
        }),
    }
}

/// Deep merge `overrides` into `base`; nested tables merge, everything else replaces
fn merge_tables(base: &mut Table, overrides: Table) {
    for (key, value) in overrides {
        match (base.get_mut(&key), value) {
            (Some(Value::Table(existing)), Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

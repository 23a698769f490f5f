//! Centralized configuration management for codescope
//!
//! Configuration follows a simple hierarchy:
//! 1. Safe defaults (defined as constants)
//! 2. Environment variable overrides (`CODESCOPE_*`)
//! 3. Optional TOML file, layered through [`source::ConfigurationLoader`]
//! 4. Runtime validation

pub mod error;
pub mod source;
pub mod validation;

pub use error::{ConfigError, ConfigResult};

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// =============================================================================
// SAFE DEFAULTS - Work for any environment (dev, staging, prod, test)
// =============================================================================

// Elasticsearch Configuration
const DEFAULT_ES_URL: &str = "http://localhost:9200";
const DEFAULT_ES_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_REPOSITORY_INDEX: &str = ".code-repository";
const DEFAULT_DOCUMENT_INDEX: &str = ".code-document-*";
const DEFAULT_SYMBOL_INDEX: &str = ".code-symbol-*";
const DEFAULT_COMMIT_INDEX: &str = ".code-commit-*";
const DEFAULT_REFERENCE_INDEX: &str = ".code-references";
const DEFAULT_MAX_REFERENCES: usize = 10_000; // Elasticsearch default max_result_window

// Search Configuration
const DEFAULT_PAGE_SIZE: usize = 20;
const DEFAULT_SUGGESTION_PAGE_SIZE: usize = 10;

// APM Configuration
const DEFAULT_TRANSACTION_INDICES: &str = "apm-*-transaction-*";
const DEFAULT_BUCKET_TARGET_COUNT: u64 = 15;
const DEFAULT_MIN_BUCKET_SIZE: u64 = 15;

// API Server Configuration
const DEFAULT_API_HOST: &str = "127.0.0.1"; // Localhost only for security
const DEFAULT_API_PORT: u16 = 3000;
const DEFAULT_API_TIMEOUT_SECONDS: u64 = 60;

// Telemetry Configuration
const DEFAULT_TRACING_LEVEL: &str = "info";
const DEFAULT_JSON_LOGS: bool = false;
const DEFAULT_SERVICE_NAME: &str = "codescope";

/// Name of the environment variable that overrides `section.field`
pub(crate) fn env_key(section: &str, field: &str) -> String {
    let prefix = match section {
        "elasticsearch" => "ES",
        other => other,
    };
    format!("CODESCOPE_{}_{}", prefix.to_uppercase(), field.to_uppercase())
}

/// Read and parse an environment variable, falling back to `default` when it
/// is unset or does not parse.
fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Split a comma separated environment value, dropping empty entries
fn env_list(key: &str) -> Option<Vec<String>> {
    std::env::var(key).ok().map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect()
    })
}

/// Core configuration for the entire codescope service
///
/// All settings have safe defaults and can be overridden via environment variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Elasticsearch connection and index names
    pub elasticsearch: ElasticsearchConfig,

    /// Code search paging and scope settings
    pub search: SearchConfig,

    /// APM transaction distribution settings
    pub apm: ApmConfig,

    /// API server configuration
    pub api: ApiConfig,

    /// Logging configuration
    pub telemetry: TelemetryConfig,
}

/// Elasticsearch connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElasticsearchConfig {
    /// Base URL of the cluster (e.g., `http://localhost:9200`)
    pub url: String,

    /// Basic auth user name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Basic auth password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// Index (or pattern) holding repository documents
    pub repository_index: String,

    /// Index pattern holding source file documents
    pub document_index: String,

    /// Index pattern holding symbol documents
    pub symbol_index: String,

    /// Index pattern holding commit documents
    pub commit_index: String,

    /// Index holding the repository references visible to callers
    pub reference_index: String,

    /// Upper bound on references read per request
    pub max_references: usize,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ES_URL.to_string(),
            username: None,
            password: None,
            timeout_seconds: DEFAULT_ES_TIMEOUT_SECONDS,
            repository_index: DEFAULT_REPOSITORY_INDEX.to_string(),
            document_index: DEFAULT_DOCUMENT_INDEX.to_string(),
            symbol_index: DEFAULT_SYMBOL_INDEX.to_string(),
            commit_index: DEFAULT_COMMIT_INDEX.to_string(),
            reference_index: DEFAULT_REFERENCE_INDEX.to_string(),
            max_references: DEFAULT_MAX_REFERENCES,
        }
    }
}

impl ElasticsearchConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        Self {
            url: env_string("CODESCOPE_ES_URL", DEFAULT_ES_URL),
            username: std::env::var("CODESCOPE_ES_USERNAME").ok(),
            password: std::env::var("CODESCOPE_ES_PASSWORD").ok(),
            timeout_seconds: env_parse("CODESCOPE_ES_TIMEOUT_SECONDS", DEFAULT_ES_TIMEOUT_SECONDS),
            repository_index: env_string("CODESCOPE_ES_REPOSITORY_INDEX", DEFAULT_REPOSITORY_INDEX),
            document_index: env_string("CODESCOPE_ES_DOCUMENT_INDEX", DEFAULT_DOCUMENT_INDEX),
            symbol_index: env_string("CODESCOPE_ES_SYMBOL_INDEX", DEFAULT_SYMBOL_INDEX),
            commit_index: env_string("CODESCOPE_ES_COMMIT_INDEX", DEFAULT_COMMIT_INDEX),
            reference_index: env_string("CODESCOPE_ES_REFERENCE_INDEX", DEFAULT_REFERENCE_INDEX),
            max_references: env_parse("CODESCOPE_ES_MAX_REFERENCES", DEFAULT_MAX_REFERENCES),
        }
    }

    /// Connection string safe for logging (no credentials)
    pub fn safe_connection_string(&self) -> String {
        let auth = if self.username.is_some() {
            "basic"
        } else {
            "none"
        };
        format!("{} (auth: {auth})", self.url)
    }
}

impl validation::Validate for ElasticsearchConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_url(&self.url, "elasticsearch.url")?;
        validation::validate_range(self.timeout_seconds, 1, 600, "elasticsearch.timeout_seconds")?;
        validation::validate_index_pattern(
            &self.repository_index,
            "elasticsearch.repository_index",
        )?;
        validation::validate_index_pattern(&self.document_index, "elasticsearch.document_index")?;
        validation::validate_index_pattern(&self.symbol_index, "elasticsearch.symbol_index")?;
        validation::validate_index_pattern(&self.commit_index, "elasticsearch.commit_index")?;
        validation::validate_index_pattern(
            &self.reference_index,
            "elasticsearch.reference_index",
        )?;
        validation::validate_range(
            self.max_references as u64,
            1,
            100_000,
            "elasticsearch.max_references",
        )?;

        if self.password.is_some() && self.username.is_none() {
            return Err(ConfigError::MissingField {
                field: "elasticsearch.username".to_string(),
            });
        }
        Ok(())
    }
}

/// Code search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Results per page for full searches
    pub page_size: usize,

    /// Results per page for suggestion lookups
    pub suggestion_page_size: usize,

    /// Fixed list of repositories every caller may see.
    ///
    /// When set, scope resolution uses this list instead of reading the
    /// reference index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permitted_repositories: Option<Vec<String>>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            suggestion_page_size: DEFAULT_SUGGESTION_PAGE_SIZE,
            permitted_repositories: None,
        }
    }
}

impl SearchConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        Self {
            page_size: env_parse("CODESCOPE_SEARCH_PAGE_SIZE", DEFAULT_PAGE_SIZE),
            suggestion_page_size: env_parse(
                "CODESCOPE_SEARCH_SUGGESTION_PAGE_SIZE",
                DEFAULT_SUGGESTION_PAGE_SIZE,
            ),
            permitted_repositories: env_list("CODESCOPE_SEARCH_PERMITTED_REPOSITORIES"),
        }
    }
}

impl validation::Validate for SearchConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_range(self.page_size as u64, 1, 1000, "search.page_size")?;
        validation::validate_range(
            self.suggestion_page_size as u64,
            1,
            1000,
            "search.suggestion_page_size",
        )?;
        Ok(())
    }
}

/// APM transaction distribution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApmConfig {
    /// Index pattern holding transaction events
    pub transaction_indices: String,

    /// Number of histogram buckets the distribution aims for
    pub bucket_target_count: u64,

    /// Smallest allowed bucket width in microseconds
    pub min_bucket_size: u64,
}

impl Default for ApmConfig {
    fn default() -> Self {
        Self {
            transaction_indices: DEFAULT_TRANSACTION_INDICES.to_string(),
            bucket_target_count: DEFAULT_BUCKET_TARGET_COUNT,
            min_bucket_size: DEFAULT_MIN_BUCKET_SIZE,
        }
    }
}

impl ApmConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        Self {
            transaction_indices: env_string(
                "CODESCOPE_APM_TRANSACTION_INDICES",
                DEFAULT_TRANSACTION_INDICES,
            ),
            bucket_target_count: env_parse(
                "CODESCOPE_APM_BUCKET_TARGET_COUNT",
                DEFAULT_BUCKET_TARGET_COUNT,
            ),
            min_bucket_size: env_parse("CODESCOPE_APM_MIN_BUCKET_SIZE", DEFAULT_MIN_BUCKET_SIZE),
        }
    }
}

impl validation::Validate for ApmConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_index_pattern(&self.transaction_indices, "apm.transaction_indices")?;
        validation::validate_range(self.bucket_target_count, 1, 1000, "apm.bucket_target_count")?;
        validation::validate_range(self.min_bucket_size, 1, u64::MAX, "apm.min_bucket_size")?;
        Ok(())
    }
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_API_HOST.to_string(),
            port: DEFAULT_API_PORT,
            timeout_seconds: DEFAULT_API_TIMEOUT_SECONDS,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        Self {
            host: env_string("CODESCOPE_API_HOST", DEFAULT_API_HOST),
            port: env_parse("CODESCOPE_API_PORT", DEFAULT_API_PORT),
            timeout_seconds: env_parse("CODESCOPE_API_TIMEOUT_SECONDS", DEFAULT_API_TIMEOUT_SECONDS),
        }
    }

    /// `host:port` string for binding the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl validation::Validate for ApiConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_non_empty(&self.host, "api.host")?;
        validation::validate_port(self.port, "api.port")?;
        validation::validate_range(self.timeout_seconds, 1, 3600, "api.timeout_seconds")?;
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Tracing level (trace, debug, info, warn, error)
    pub tracing_level: String,

    /// Emit JSON formatted log lines
    pub json_logs: bool,

    /// Service name attached to startup logs
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            tracing_level: DEFAULT_TRACING_LEVEL.to_string(),
            json_logs: DEFAULT_JSON_LOGS,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        Self {
            tracing_level: env_string("CODESCOPE_TELEMETRY_TRACING_LEVEL", DEFAULT_TRACING_LEVEL),
            json_logs: env_parse("CODESCOPE_TELEMETRY_JSON_LOGS", DEFAULT_JSON_LOGS),
            service_name: env_string("CODESCOPE_TELEMETRY_SERVICE_NAME", DEFAULT_SERVICE_NAME),
        }
    }
}

impl validation::Validate for TelemetryConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_non_empty(&self.service_name, "telemetry.service_name")?;

        match self.tracing_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(ConfigError::Generic {
                message: format!("Invalid tracing level: {}", self.tracing_level),
            }),
        }
    }
}

impl ApplicationConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        Self {
            elasticsearch: ElasticsearchConfig::from_env(),
            search: SearchConfig::from_env(),
            apm: ApmConfig::from_env(),
            api: ApiConfig::from_env(),
            telemetry: TelemetryConfig::from_env(),
        }
    }
}

impl validation::Validate for ApplicationConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.elasticsearch.validate()?;
        self.search.validate()?;
        self.apm.validate()?;
        self.api.validate()?;
        self.telemetry.validate()?;

        if self.search.suggestion_page_size > self.search.page_size {
            return Err(ConfigError::Generic {
                message: format!(
                    "Suggestion page size ({}) must not exceed search page size ({})",
                    self.search.suggestion_page_size, self.search.page_size
                ),
            });
        }

        Ok(())
    }
}

//! Configuration management for Profanity Sieve services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default, config/{APP_ENV}, config/local)
//! - `PROFANITY_THRESHOLD` and `WHITELIST` overrides
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Classification thresholds and whitelist
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Request message limits
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Similarity index configuration
    #[serde(default)]
    pub index: IndexConfig,

    /// Embedding configuration (in-memory index only)
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassifierConfig {
    /// Threshold for single-word chunks
    #[serde(default = "default_word_threshold")]
    pub word_threshold: f64,

    /// Threshold for semantic window chunks (PROFANITY_THRESHOLD)
    #[serde(default = "default_semantic_threshold")]
    pub semantic_threshold: f64,

    /// Tokens that are never compared against the index
    #[serde(default)]
    pub whitelist: Vec<String>,

    /// Semantic window capacity in characters
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Overlap between consecutive semantic windows in characters
    #[serde(default = "default_window_overlap")]
    pub window_overlap: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidationConfig {
    /// Minimum number of whitespace-delimited words
    #[serde(default = "default_min_words")]
    pub min_words: usize,

    /// Maximum number of whitespace-delimited words
    #[serde(default = "default_max_words")]
    pub max_words: usize,

    /// Maximum message length in characters
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexConfig {
    /// Index provider: rest, memory
    #[serde(default = "default_index_provider")]
    pub provider: String,

    /// REST endpoint of the vector index
    pub url: Option<String>,

    /// Bearer token for the vector index
    pub token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_index_timeout")]
    pub timeout_secs: u64,

    /// Upper bound on time spent retrying transient failures, in milliseconds
    #[serde(default = "default_retry_max_elapsed")]
    pub retry_max_elapsed_ms: u64,

    /// Reference terms for the in-memory index
    #[serde(default)]
    pub seed_terms: Vec<String>,

    /// Newline-delimited file of reference terms for the in-memory index
    pub seed_file: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    /// Embedding provider: openai, hash
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// API key for embedding service
    pub api_key: Option<String>,

    /// API base URL (for custom endpoints)
    pub api_base: Option<String>,

    /// Model to use
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Embedding dimension
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,

    /// Request timeout in seconds
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Expose Prometheus metrics at /metrics
    #[serde(default = "default_enabled")]
    pub metrics_enabled: bool,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Requests per second (global)
    #[serde(default = "default_rate_limit")]
    pub requests_per_second: u32,

    /// Burst capacity
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_request_timeout() -> u64 { 10 }
fn default_max_body_bytes() -> usize { 16 * 1024 }
fn default_word_threshold() -> f64 { crate::DEFAULT_WORD_THRESHOLD }
fn default_semantic_threshold() -> f64 { crate::DEFAULT_SEMANTIC_THRESHOLD }
fn default_window_size() -> usize { 25 }
fn default_window_overlap() -> usize { 9 }
fn default_min_words() -> usize { 2 }
fn default_max_words() -> usize { 35 }
fn default_max_chars() -> usize { 1000 }
fn default_index_provider() -> String { "rest".to_string() }
fn default_index_timeout() -> u64 { 5 }
fn default_retry_max_elapsed() -> u64 { 2000 }
fn default_embedding_provider() -> String { "hash".to_string() }
fn default_embedding_model() -> String { "text-embedding-3-small".to_string() }
fn default_embedding_dimension() -> usize { 256 }
fn default_embedding_timeout() -> u64 { 30 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_service_name() -> String { "profanity-sieve".to_string() }
fn default_rate_limit() -> u32 { 50 }
fn default_burst() -> u32 { 100 }
fn default_enabled() -> bool { true }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            word_threshold: default_word_threshold(),
            semantic_threshold: default_semantic_threshold(),
            whitelist: Vec::new(),
            window_size: default_window_size(),
            window_overlap: default_window_overlap(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_words: default_min_words(),
            max_words: default_max_words(),
            max_chars: default_max_chars(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            provider: default_index_provider(),
            url: None,
            token: None,
            timeout_secs: default_index_timeout(),
            retry_max_elapsed_ms: default_retry_max_elapsed(),
            seed_terms: Vec::new(),
            seed_file: None,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            api_key: None,
            api_base: None,
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            timeout_secs: default_embedding_timeout(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_enabled: default_enabled(),
            service_name: default_service_name(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_rate_limit(),
            burst: default_burst(),
            enabled: default_enabled(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__SERVER__PORT=8081
            .add_source(app_environment())

            // Flat variable names used by existing deployments
            .set_override_option(
                "classifier.semantic_threshold",
                std::env::var("PROFANITY_THRESHOLD").ok(),
            )?
            .set_override_option(
                "classifier.whitelist",
                std::env::var("WHITELIST").ok().map(|raw| parse_list(&raw)),
            )?

            .build()?;

        config.try_deserialize()
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }
}

fn app_environment() -> Environment {
    Environment::with_prefix("APP")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("classifier.whitelist")
        .with_list_parse_key("index.seed_terms")
        .try_parsing(true)
}

/// Split a comma-separated list, dropping blank entries
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.classifier.word_threshold, 0.95);
        assert!(config.classifier.semantic_threshold < config.classifier.word_threshold);
        assert_eq!(config.validation.max_words, 35);
        assert_eq!(config.validation.max_chars, 1000);
    }

    #[test]
    fn test_window_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.classifier.window_size, 25);
        assert_eq!(config.classifier.window_overlap, 9);
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("Scunthorpe, Cockburn ,,"), vec!["Scunthorpe", "Cockburn"]);
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_request_timeout() {
        let config = AppConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }
}

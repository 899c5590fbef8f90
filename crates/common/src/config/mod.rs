//! Configuration management for FollowRank services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__, plus the conventional DATABASE_URL)
//! - Configuration files (config/default, config/{APP_ENV}, config/local)
//! - Default values

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{AppError, Result};

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Ranking engine configuration
    #[serde(default)]
    pub ranking: RankingConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
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
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Primary database URL (for writes)
    pub url: String,

    /// Read replica URL (optional, falls back to primary)
    pub read_url: Option<String>,

    /// Maximum number of connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Idle timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

/// Parameters of the follower-graph PageRank computation
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RankingConfig {
    /// Damping factor, strictly between 0 and 1
    #[serde(default = "default_damping")]
    pub damping: f64,

    /// Hard cap on power iterations
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Convergence threshold on the L1 delta of one iteration
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Accounts per score write-back statement
    #[serde(default = "default_persist_batch_size")]
    pub persist_batch_size: usize,

    /// Number of leaders reported after each run
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error), overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Service name reported by `/health` and attached to exported metrics
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 3000 }
fn default_request_timeout() -> u64 { 60 }
fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 1 }
fn default_connect_timeout() -> u64 { 10 }
fn default_idle_timeout() -> u64 { 30 }
fn default_damping() -> f64 { 0.85 }
fn default_max_iterations() -> usize { 50 }
fn default_tolerance() -> f64 { 1e-6 }
fn default_persist_batch_size() -> usize { 1000 }
fn default_top_n() -> usize { 10 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_port() -> u16 { 0 }
fn default_service_name() -> String { "followrank".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            damping: default_damping(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            persist_batch_size: default_persist_batch_size(),
            top_n: default_top_n(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_port: default_metrics_port(),
            service_name: default_service_name(),
        }
    }
}

impl RankingConfig {
    /// Reject parameter sets the solver cannot run with
    pub fn validate(&self) -> Result<()> {
        let problem = if !(self.damping > 0.0 && self.damping < 1.0) {
            Some(format!("ranking.damping must be in (0, 1), got {}", self.damping))
        } else if self.max_iterations == 0 {
            Some("ranking.max_iterations must be at least 1".to_string())
        } else if !(self.tolerance > 0.0) {
            Some(format!("ranking.tolerance must be positive, got {}", self.tolerance))
        } else if self.persist_batch_size == 0 {
            Some("ranking.persist_batch_size must be at least 1".to_string())
        } else {
            None
        };

        match problem {
            Some(message) => Err(AppError::Configuration { message }),
            None => Ok(()),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?

            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__RANKING__DAMPING=0.9
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            // The conventional DATABASE_URL wins when present
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?

            .build()?;

        Self::finish(config)
    }

    fn finish(config: Config) -> Result<Self> {
        let app: AppConfig = config.try_deserialize()?;
        app.ranking.validate()?;
        Ok(app)
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: "postgres://localhost/followrank".to_string(),
                read_url: None,
                max_connections: default_max_connections(),
                min_connections: default_min_connections(),
                connect_timeout_secs: default_connect_timeout(),
                idle_timeout_secs: default_idle_timeout(),
            },
            ranking: RankingConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

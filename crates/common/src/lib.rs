//! FollowRank Common Library
//!
//! Shared code for all FollowRank crates including:
//! - Error types and handling
//! - Configuration management
//! - Database pool and account repository
//! - Metrics and observability

pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;

// Re-export commonly used types
pub use errors::{AppError, Result};
pub use config::AppConfig;
pub use db::{AccountRepository, DbPool, RelationshipRow, ScoreUpdate};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Shared domain types and configuration for socialdash.
//!
//! Entities here are immutable value snapshots of upstream platform data.
//! They are produced by the normalizer in `socialdash-metrics` and consumed
//! read-only by every aggregation pass.

pub mod app_config;
pub mod config;
pub mod entities;
pub mod snapshot;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use entities::{
    Ad, ComparisonMode, Content, ContentStatus, ContentType, EntitySet, ModerationStats,
    RoiRecord, SatisfactionLevel, SatisfactionRecord, TimeSeriesPoint, User, UserStatus,
};
pub use snapshot::{load_raw_snapshot, SnapshotFormat};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read snapshot file {path}: {source}")]
    SnapshotFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse snapshot file {path}: {reason}")]
    SnapshotFileParse { path: String, reason: String },
}

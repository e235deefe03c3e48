use std::net::SocketAddr;

use crate::entities::ComparisonMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Comparison mode used for every trend in one aggregation run unless a
    /// request overrides it.
    pub trend_mode: ComparisonMode,
    pub rate_limit_max_requests: usize,
    pub rate_limit_window_secs: u64,
    /// Upper bound on accepted snapshot request bodies.
    pub max_body_bytes: usize,
}

use crate::app_config::{AppConfig, Environment};
use crate::entities::ComparisonMode;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but holds an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but holds an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a usable
/// development config.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("SOCIALDASH_ENV", "development"));

    let bind_addr = or_default("SOCIALDASH_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("SOCIALDASH_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("SOCIALDASH_LOG_LEVEL", "info");
    let trend_mode = or_default("SOCIALDASH_TREND_MODE", "endpoints")
        .parse::<ComparisonMode>()
        .map_err(|reason| invalid("SOCIALDASH_TREND_MODE", reason))?;

    let rate_limit_max_requests = parse_usize("SOCIALDASH_RATE_LIMIT_MAX_REQUESTS", "120")?;
    if rate_limit_max_requests == 0 {
        return Err(invalid(
            "SOCIALDASH_RATE_LIMIT_MAX_REQUESTS",
            "must be greater than zero".to_string(),
        ));
    }
    let rate_limit_window_secs = parse_u64("SOCIALDASH_RATE_LIMIT_WINDOW_SECS", "60")?;
    let max_body_bytes = parse_usize("SOCIALDASH_MAX_BODY_BYTES", "2097152")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        trend_mode,
        rate_limit_max_requests,
        rate_limit_window_secs,
        max_body_bytes,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path::PathBuf;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every setting has a default, so an empty environment yields
/// [`AppConfig::default`].
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let defaults = AppConfig::default();

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_f64 = |var: &str, default: f64| -> Result<f64, ConfigError> {
        match lookup(var) {
            Ok(raw) => {
                let value = raw
                    .trim()
                    .parse::<f64>()
                    .map_err(|e| invalid(var, e.to_string()))?;
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(invalid(var, "must be a finite number".to_string()))
                }
            }
            Err(_) => Ok(default),
        }
    };

    let parse_usize = |var: &str, default: usize| -> Result<usize, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|e| invalid(var, e.to_string())),
            Err(_) => Ok(default),
        }
    };

    let parse_bool = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                other => Err(invalid(var, format!("expected a boolean, got '{other}'"))),
            },
            Err(_) => Ok(default),
        }
    };

    let unit_interval = |var: &str, value: f64| -> Result<f64, ConfigError> {
        if (0.0..=1.0).contains(&value) {
            Ok(value)
        } else {
            Err(invalid(var, format!("{value} is outside [0, 1]")))
        }
    };

    let env = parse_environment(&or_default("BASAR_ENV", "development"))?;
    let log_level = or_default("BASAR_LOG_LEVEL", &defaults.log_level);
    let knowledge_path = lookup("BASAR_KNOWLEDGE_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let cluster_threshold = unit_interval(
        "BASAR_CLUSTER_THRESHOLD",
        parse_f64("BASAR_CLUSTER_THRESHOLD", defaults.cluster_threshold)?,
    )?;
    let duplicate_threshold = unit_interval(
        "BASAR_DUPLICATE_THRESHOLD",
        parse_f64("BASAR_DUPLICATE_THRESHOLD", defaults.duplicate_threshold)?,
    )?;
    let suppress_duplicates = parse_bool("BASAR_SUPPRESS_DUPLICATES", defaults.suppress_duplicates)?;
    let min_key_length = parse_usize("BASAR_MIN_KEY_LENGTH", defaults.min_key_length)?;

    let min_price = parse_f64("BASAR_MIN_PRICE", defaults.min_price)?;
    let max_price = parse_f64("BASAR_MAX_PRICE", defaults.max_price)?;
    if min_price >= max_price {
        return Err(invalid(
            "BASAR_MAX_PRICE",
            format!("max price {max_price} must exceed min price {min_price}"),
        ));
    }

    let significant_savings_percent = parse_f64(
        "BASAR_SIGNIFICANT_SAVINGS_PERCENT",
        defaults.significant_savings_percent,
    )?;
    let max_concurrent_sources =
        parse_usize("BASAR_MAX_CONCURRENT_SOURCES", defaults.max_concurrent_sources)?;

    Ok(AppConfig {
        env,
        log_level,
        knowledge_path,
        cluster_threshold,
        duplicate_threshold,
        suppress_duplicates,
        min_key_length,
        min_price,
        max_price,
        significant_savings_percent,
        max_concurrent_sources,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BASAR_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use crate::app_config::{AppConfig, Environment, PROPERTY_SEARCH_API_KEY_VAR};
use crate::ConfigError;

const DEFAULT_RETAIL_ANCHOR_CATEGORIES: &str =
    "supermarket,department_store,shopping_mall,home_improvement_store";

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
/// Decoupled from the process environment so it can be tested with a pure
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;
    use std::str::FromStr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        if raw.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "value must not be empty".to_string(),
            });
        }
        Ok(raw)
    };

    fn parse_as<T>(var: &str, raw: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    }

    let parse_miles = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let miles: f64 = parse_as(var, &or_default(var, default))?;
        if !miles.is_finite() || miles < 0.0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected a non-negative distance, got {miles}"),
            });
        }
        Ok(miles)
    };

    let env = parse_environment(&or_default("SITESCOUT_ENV", "development"))?;
    let log_level = parse("SITESCOUT_LOG_LEVEL", "info")?;
    let brands_path = PathBuf::from(or_default("SITESCOUT_BRANDS_PATH", "./config/brands.yaml"));
    let property_search_api_key = lookup(PROPERTY_SEARCH_API_KEY_VAR)
        .ok()
        .filter(|key| !key.trim().is_empty());

    let property_search_limit: usize = parse_as(
        "SITESCOUT_PROPERTY_SEARCH_LIMIT",
        &or_default("SITESCOUT_PROPERTY_SEARCH_LIMIT", "200"),
    )?;
    if property_search_limit == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SITESCOUT_PROPERTY_SEARCH_LIMIT".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let cache_precision: u32 = parse_as(
        "SITESCOUT_CACHE_PRECISION",
        &or_default("SITESCOUT_CACHE_PRECISION", "1"),
    )?;
    if cache_precision > 6 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SITESCOUT_CACHE_PRECISION".to_string(),
            reason: format!("expected 0..=6 decimal places, got {cache_precision}"),
        });
    }

    let population_ttl_secs: u64 = parse_as(
        "SITESCOUT_POPULATION_TTL_SECS",
        &or_default("SITESCOUT_POPULATION_TTL_SECS", "86400"),
    )?;
    let retail_anchor_ttl_secs: u64 = parse_as(
        "SITESCOUT_RETAIL_ANCHOR_TTL_SECS",
        &or_default("SITESCOUT_RETAIL_ANCHOR_TTL_SECS", "3600"),
    )?;

    let competitor_buffer_miles = parse_miles("SITESCOUT_COMPETITOR_BUFFER_MILES", "10")?;
    let family_buffer_miles = parse_miles("SITESCOUT_FAMILY_BUFFER_MILES", "5")?;

    let retail_anchor_radius_meters: u32 = parse_as(
        "SITESCOUT_RETAIL_ANCHOR_RADIUS_METERS",
        &or_default("SITESCOUT_RETAIL_ANCHOR_RADIUS_METERS", "2414"),
    )?;

    let retail_anchor_categories = parse_list(&or_default(
        "SITESCOUT_RETAIL_ANCHOR_CATEGORIES",
        DEFAULT_RETAIL_ANCHOR_CATEGORIES,
    ));
    if retail_anchor_categories.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "SITESCOUT_RETAIL_ANCHOR_CATEGORIES".to_string(),
            reason: "at least one category is required".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        log_level,
        brands_path,
        property_search_api_key,
        property_search_limit,
        cache_precision,
        population_ttl_secs,
        retail_anchor_ttl_secs,
        competitor_buffer_miles,
        family_buffer_miles,
        retail_anchor_radius_meters,
        retail_anchor_categories,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SITESCOUT_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

/// Split a comma-separated list, trimming entries and dropping blanks.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

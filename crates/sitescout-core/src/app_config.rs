use std::path::PathBuf;

use crate::ConfigError;

pub const PROPERTY_SEARCH_API_KEY_VAR: &str = "SITESCOUT_PROPERTY_SEARCH_API_KEY";

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

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub brands_path: PathBuf,
    pub property_search_api_key: Option<String>,
    pub property_search_limit: usize,
    /// Decimal places kept when rounding viewport centers into cache keys.
    pub cache_precision: u32,
    pub population_ttl_secs: u64,
    pub retail_anchor_ttl_secs: u64,
    pub competitor_buffer_miles: f64,
    pub family_buffer_miles: f64,
    pub retail_anchor_radius_meters: u32,
    pub retail_anchor_categories: Vec<String>,
}

impl AppConfig {
    /// Return the government-records search credential.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when the key was not configured.
    pub fn require_property_search_key(&self) -> Result<&str, ConfigError> {
        self.property_search_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar(PROPERTY_SEARCH_API_KEY_VAR.to_string()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("brands_path", &self.brands_path)
            .field(
                "property_search_api_key",
                &self.property_search_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("property_search_limit", &self.property_search_limit)
            .field("cache_precision", &self.cache_precision)
            .field("population_ttl_secs", &self.population_ttl_secs)
            .field("retail_anchor_ttl_secs", &self.retail_anchor_ttl_secs)
            .field("competitor_buffer_miles", &self.competitor_buffer_miles)
            .field("family_buffer_miles", &self.family_buffer_miles)
            .field(
                "retail_anchor_radius_meters",
                &self.retail_anchor_radius_meters,
            )
            .field("retail_anchor_categories", &self.retail_anchor_categories)
            .finish()
    }
}

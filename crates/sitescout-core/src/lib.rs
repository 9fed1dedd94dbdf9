//! Shared domain types and configuration for SiteScout.
//!
//! Holds the candidate/listing model consumed by the ranking pipeline, the
//! env-driven [`AppConfig`], the brand roster YAML loader, and the tracing
//! bootstrap used by embedding binaries.

pub mod app_config;
pub mod brands;
pub mod config;
pub mod property;
pub mod telemetry;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use brands::{load_brands, parse_brands, BrandConfig, BrandRoster, BrandsFile, Relationship};
pub use config::{load_app_config, load_app_config_from_env};
pub use property::{
    CandidateProperty, Coordinates, GeoBounds, ListingSite, OpportunitySignal, PropertySource,
    PropertyType, ScrapedListing, SignalStrength, SignalType,
};
pub use telemetry::init_tracing;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read brands file {path}: {source}")]
    BrandsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse brands file: {0}")]
    BrandsFileParse(#[from] serde_yaml::Error),

    #[error("brand roster validation failed: {0}")]
    Validation(String),

    #[error("failed to initialise tracing: {0}")]
    Tracing(String),
}

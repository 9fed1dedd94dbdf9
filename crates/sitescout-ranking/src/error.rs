use sitescout_core::property::BoundsError;
use thiserror::Error;

/// Failure reported by an external collaborator.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("missing credential: {0}")]
    MissingCredential(String),

    #[error("{service} request failed: {reason}")]
    Request { service: String, reason: String },

    #[error("malformed {service} response: {reason}")]
    Malformed { service: String, reason: String },
}

/// Top-level failure of an opportunity search. No partial result accompanies it.
#[derive(Debug, Error)]
pub enum RankingError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("property search failed: {0}")]
    Collector(#[source] SourceError),

    #[error(transparent)]
    InvalidBounds(#[from] BoundsError),

    #[error("invalid eligibility filters: {0}")]
    InvalidFilters(String),
}

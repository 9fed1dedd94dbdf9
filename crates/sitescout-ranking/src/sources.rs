//! Seams to the external collaborators the pipeline consumes.
//!
//! Implementations live in the embedding application (HTTP providers, the
//! listings database). Tests use in-memory fakes.

use async_trait::async_trait;
use sitescout_core::{CandidateProperty, Coordinates, GeoBounds, PropertyType, ScrapedListing};

use crate::error::SourceError;
use crate::types::{PopulationEstimate, RetailAnchor, StorePoint};

/// Government-records property search. Results already carry opportunity signals.
#[async_trait]
pub trait PropertySearch: Send + Sync {
    async fn search(
        &self,
        bounds: &GeoBounds,
        property_types: &[PropertyType],
        limit: usize,
    ) -> Result<Vec<CandidateProperty>, SourceError>;
}

/// Locally persisted listings scraped from commercial listing sites.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Return active listings inside `bounds` whose normalized type is in `property_types`.
    async fn query_active(
        &self,
        bounds: &GeoBounds,
        property_types: &[PropertyType],
    ) -> Result<Vec<ScrapedListing>, SourceError>;
}

/// Known store locations of tracked brands.
#[async_trait]
pub trait CompetitorStore: Send + Sync {
    async fn query(
        &self,
        brands: &[String],
        bounds: &GeoBounds,
    ) -> Result<Vec<StorePoint>, SourceError>;
}

#[async_trait]
pub trait DemographicsService: Send + Sync {
    /// Population within each of `radii_miles` of `center`; called with `[1.0, 3.0]`.
    async fn fetch(
        &self,
        center: Coordinates,
        radii_miles: &[f64],
    ) -> Result<PopulationEstimate, SourceError>;
}

#[async_trait]
pub trait PoiService: Send + Sync {
    async fn fetch(
        &self,
        center: Coordinates,
        radius_meters: u32,
        categories: &[String],
    ) -> Result<Vec<RetailAnchor>, SourceError>;
}

//! Candidate collection from government records and the listings store.

use std::sync::Arc;

use sitescout_core::{
    CandidateProperty, Coordinates, GeoBounds, OpportunitySignal, PropertySource, PropertyType,
    ScrapedListing, SignalStrength, SignalType,
};

use crate::error::{RankingError, SourceError};
use crate::sources::{ListingStore, PropertySearch};

/// Only these types can pass eligibility, so neither source is asked for others.
pub const ELIGIBLE_PROPERTY_TYPES: [PropertyType; 3] =
    [PropertyType::Land, PropertyType::Retail, PropertyType::Office];

/// Raw collector output, kept per source so the deduplicator can tell them apart.
#[derive(Debug, Default)]
pub struct CollectedCandidates {
    pub government: Vec<CandidateProperty>,
    pub listings: Vec<CandidateProperty>,
}

pub struct CandidateCollector {
    property_search: Arc<dyn PropertySearch>,
    listings: Arc<dyn ListingStore>,
    search_limit: usize,
}

impl CandidateCollector {
    #[must_use]
    pub fn new(
        property_search: Arc<dyn PropertySearch>,
        listings: Arc<dyn ListingStore>,
        search_limit: usize,
    ) -> Self {
        Self {
            property_search,
            listings,
            search_limit,
        }
    }

    /// Gather candidates inside `bounds` from both sources.
    ///
    /// # Errors
    ///
    /// - [`RankingError::Configuration`] if the government source reports a
    ///   missing credential.
    /// - [`RankingError::Collector`] on any other government search failure.
    ///
    /// A listings-store failure is logged and yields no listing candidates.
    /// Listings whose site label maps outside [`ELIGIBLE_PROPERTY_TYPES`] are dropped.
    pub async fn collect(&self, bounds: &GeoBounds) -> Result<CollectedCandidates, RankingError> {
        let (government, listings) = tokio::join!(
            self.property_search
                .search(bounds, &ELIGIBLE_PROPERTY_TYPES, self.search_limit),
            self.listings.query_active(bounds, &ELIGIBLE_PROPERTY_TYPES),
        );

        let government = government.map_err(|e| match e {
            SourceError::MissingCredential(var) => RankingError::Configuration(format!(
                "property search credential {var} is not configured"
            )),
            other => RankingError::Collector(other),
        })?;

        let listings = match listings {
            Ok(rows) => rows
                .into_iter()
                .map(normalize_listing)
                .filter(|candidate| {
                    let eligible = ELIGIBLE_PROPERTY_TYPES.contains(&candidate.property_type);
                    if !eligible {
                        tracing::debug!(
                            id = %candidate.id,
                            property_type = %candidate.property_type,
                            "dropping listing with ineligible property type"
                        );
                    }
                    eligible
                })
                .collect(),
            Err(e) => {
                tracing::warn!(
                    source = "listing_store",
                    error = %e,
                    "listing store query failed; continuing with government records only"
                );
                Vec::new()
            }
        };

        tracing::debug!(
            government = government.len(),
            listings = listings.len(),
            "collected candidates"
        );

        Ok(CollectedCandidates {
            government,
            listings,
        })
    }
}

/// Convert a scraped listing into a candidate.
///
/// The listing copy becomes the land-use text and an `ActiveListing` signal
/// records where it was found. Ids are namespaced by site.
#[must_use]
pub fn normalize_listing(listing: ScrapedListing) -> CandidateProperty {
    let coordinates = match (listing.latitude, listing.longitude) {
        (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
        _ => None,
    };
    let description = match listing.asking_price {
        Some(price) => format!("Listed on {} at ${price:.0}", listing.site),
        None => format!("Listed on {}", listing.site),
    };

    CandidateProperty {
        id: format!("{}:{}", listing.site.slug(), listing.id),
        address: listing.address,
        coordinates,
        property_type: PropertyType::from_listing_label(&listing.property_type),
        source: PropertySource::ListingSite(listing.site),
        building_sqft: listing.building_sqft,
        lot_acres: listing.lot_acres,
        land_use: listing.description,
        signals: vec![OpportunitySignal::new(
            SignalType::ActiveListing,
            description,
            SignalStrength::High,
        )],
    }
}

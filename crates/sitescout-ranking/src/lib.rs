//! Opportunity ranking pipeline for SiteScout.
//!
//! Collects candidate sites from government records and the active-listings
//! store, drops government duplicates of nearby listings, filters to the
//! eligible categories, enriches with viewport-level market context (cached),
//! scores each candidate, and returns a ranked shortlist.

pub mod cache;
pub mod collector;
pub mod dedup;
pub mod eligibility;
pub mod enrich;
pub mod error;
pub mod geo;
pub mod pipeline;
pub mod rank;
pub mod scorer;
pub mod sources;
pub mod types;

pub use cache::{Clock, ManualClock, MarketCaches, SystemClock, ViewportCache};
pub use enrich::{CandidateContext, EnrichmentSettings, Lookup, MarketContext, MarketEnricher};
pub use error::{RankingError, SourceError};
pub use pipeline::{Collaborators, OpportunitySearch, RankingSettings};
pub use scorer::{score_candidate, ScoreCard, ScoringContext};
pub use sources::{CompetitorStore, DemographicsService, ListingStore, PoiService, PropertySearch};
pub use types::{
    EligibilityFilters, NearestPoint, PopulationEstimate, RetailAnchor, ScoredOpportunity,
    ScoringToggles, SearchResults, SizeRange, StorePoint,
};

//! Market context enrichment for a filtered candidate set.
//!
//! Four viewport-level lookups run concurrently: flagship competitor stores,
//! family-brand stores, population around the viewport center, and retail
//! anchors around the viewport center. Each one is independently switchable
//! and independently fallible; a failure is logged and leaves that lookup
//! [`Lookup::Failed`] for the whole request. Per-candidate distances are then
//! computed locally, one context per input candidate in input order.

use std::sync::Arc;

use sitescout_core::{AppConfig, BrandRoster, CandidateProperty, Coordinates, GeoBounds};

use crate::cache::{viewport_key, MarketCaches};
use crate::error::SourceError;
use crate::geo::{expand_bounds, nearest};
use crate::scorer::ScoringContext;
use crate::sources::{CompetitorStore, DemographicsService, PoiService};
use crate::types::{NearestPoint, PopulationEstimate, RetailAnchor, ScoringToggles, StorePoint};

/// Distance reported when no flagship store is in range.
///
/// Means "no nearby competitor", which scores as the widest gap.
pub const NO_COMPETITOR_MILES: f64 = 999.0;

const POPULATION_RADII_MILES: [f64; 2] = [1.0, 3.0];

/// Outcome of one viewport-level lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// Switched off for this request.
    Skipped,
    /// The collaborator failed; the failure was logged.
    Failed,
    Found(T),
}

impl<T> Lookup<T> {
    #[must_use]
    pub fn found(&self) -> Option<&T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::Skipped | Lookup::Failed => None,
        }
    }

    fn from_result(result: Result<T, SourceError>, lookup: &'static str) -> Self {
        match result {
            Ok(value) => Lookup::Found(value),
            Err(e) => {
                tracing::warn!(lookup, error = %e, "enrichment lookup failed; field left absent");
                Lookup::Failed
            }
        }
    }
}

/// Distances computed for one candidate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateContext {
    /// [`NO_COMPETITOR_MILES`] when the lookup succeeded but found no store.
    pub competitor_distance_miles: Option<f64>,
    pub nearest_family_brand: Option<NearestPoint>,
    pub nearest_retail_anchor: Option<NearestPoint>,
}

/// Everything the enricher learned for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketContext {
    pub competitor_stores: Lookup<Vec<StorePoint>>,
    pub family_stores: Lookup<Vec<StorePoint>>,
    pub population: Lookup<PopulationEstimate>,
    pub retail_anchors: Lookup<Vec<RetailAnchor>>,
    /// Parallel to the enriched candidate slice. Positional, so candidates
    /// sharing an id still get their own distances.
    pub candidates: Vec<CandidateContext>,
}

impl MarketContext {
    #[must_use]
    pub fn candidate(&self, index: usize) -> Option<&CandidateContext> {
        self.candidates.get(index)
    }

    /// Assemble the scoring inputs for the candidate at `index`.
    ///
    /// The 3-mile population is passed through even when population scoring
    /// is off, because the competitor-gap rule reads it.
    #[must_use]
    pub fn scoring_context(&self, index: usize, toggles: &ScoringToggles) -> ScoringContext {
        let population = self.population.found().copied();
        let candidate = self.candidate(index).cloned().unwrap_or_default();
        ScoringContext {
            population: population.filter(|_| toggles.population),
            market_population_3mi: population.map(|p| p.pop_3mi),
            nearest_retail_anchor_miles: candidate
                .nearest_retail_anchor
                .map(|a| a.distance_miles)
                .filter(|_| toggles.retail_anchors),
            competitor_distance_miles: candidate
                .competitor_distance_miles
                .filter(|_| toggles.competitor_gap),
            family_brand_distance_miles: candidate
                .nearest_family_brand
                .map(|f| f.distance_miles)
                .filter(|_| toggles.family_brands),
        }
    }
}

/// Enricher tuning drawn from [`AppConfig`] and the brand roster.
#[derive(Debug, Clone)]
pub struct EnrichmentSettings {
    pub brands: BrandRoster,
    pub cache_precision: u32,
    pub competitor_buffer_miles: f64,
    pub family_buffer_miles: f64,
    pub retail_anchor_radius_meters: u32,
    pub retail_anchor_categories: Vec<String>,
}

impl EnrichmentSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig, brands: BrandRoster) -> Self {
        Self {
            brands,
            cache_precision: config.cache_precision,
            competitor_buffer_miles: config.competitor_buffer_miles,
            family_buffer_miles: config.family_buffer_miles,
            retail_anchor_radius_meters: config.retail_anchor_radius_meters,
            retail_anchor_categories: config.retail_anchor_categories.clone(),
        }
    }
}

pub struct MarketEnricher {
    competitors: Arc<dyn CompetitorStore>,
    demographics: Arc<dyn DemographicsService>,
    poi: Arc<dyn PoiService>,
    caches: Arc<MarketCaches>,
    settings: EnrichmentSettings,
}

impl MarketEnricher {
    #[must_use]
    pub fn new(
        competitors: Arc<dyn CompetitorStore>,
        demographics: Arc<dyn DemographicsService>,
        poi: Arc<dyn PoiService>,
        caches: Arc<MarketCaches>,
        settings: EnrichmentSettings,
    ) -> Self {
        Self {
            competitors,
            demographics,
            poi,
            caches,
            settings,
        }
    }

    /// Build the market context for `candidates` inside `bounds`.
    ///
    /// Never fails: every lookup error degrades to [`Lookup::Failed`].
    /// Candidates without coordinates get an empty [`CandidateContext`].
    pub async fn enrich(
        &self,
        candidates: &[CandidateProperty],
        bounds: &GeoBounds,
        toggles: &ScoringToggles,
    ) -> MarketContext {
        let center = bounds.center();

        let (competitor_stores, family_stores, population, retail_anchors) = tokio::join!(
            self.competitor_stores(bounds, toggles),
            self.family_stores(bounds, toggles),
            self.population(center, toggles),
            self.retail_anchors(center, toggles),
        );

        let candidates = candidates
            .iter()
            .map(|candidate| {
                candidate.coordinates.map_or_else(CandidateContext::default, |at| {
                    candidate_context(at, &competitor_stores, &family_stores, &retail_anchors)
                })
            })
            .collect();

        MarketContext {
            competitor_stores,
            family_stores,
            population,
            retail_anchors,
            candidates,
        }
    }

    async fn competitor_stores(
        &self,
        bounds: &GeoBounds,
        toggles: &ScoringToggles,
    ) -> Lookup<Vec<StorePoint>> {
        if !toggles.competitor_gap {
            return Lookup::Skipped;
        }
        let search_area = expand_bounds(bounds, self.settings.competitor_buffer_miles);
        let brands = [self.settings.brands.flagship.clone()];
        Lookup::from_result(
            self.competitors.query(&brands, &search_area).await,
            "competitor_stores",
        )
    }

    async fn family_stores(
        &self,
        bounds: &GeoBounds,
        toggles: &ScoringToggles,
    ) -> Lookup<Vec<StorePoint>> {
        if !toggles.family_brands {
            return Lookup::Skipped;
        }
        if self.settings.brands.family.is_empty() {
            return Lookup::Found(Vec::new());
        }
        let search_area = expand_bounds(bounds, self.settings.family_buffer_miles);
        Lookup::from_result(
            self.competitors
                .query(&self.settings.brands.family, &search_area)
                .await,
            "family_stores",
        )
    }

    async fn population(
        &self,
        center: Coordinates,
        toggles: &ScoringToggles,
    ) -> Lookup<PopulationEstimate> {
        if !toggles.needs_population() {
            return Lookup::Skipped;
        }
        let key = viewport_key("population", center, self.settings.cache_precision);
        let result = self
            .caches
            .population
            .get_or_try_fetch(&key, || {
                self.demographics.fetch(center, &POPULATION_RADII_MILES)
            })
            .await;
        Lookup::from_result(result, "population")
    }

    async fn retail_anchors(
        &self,
        center: Coordinates,
        toggles: &ScoringToggles,
    ) -> Lookup<Vec<RetailAnchor>> {
        if !toggles.retail_anchors {
            return Lookup::Skipped;
        }
        let key = viewport_key("retail_anchors", center, self.settings.cache_precision);
        let result = self
            .caches
            .retail_anchors
            .get_or_try_fetch(&key, || {
                self.poi.fetch(
                    center,
                    self.settings.retail_anchor_radius_meters,
                    &self.settings.retail_anchor_categories,
                )
            })
            .await;
        Lookup::from_result(result, "retail_anchors")
    }
}

fn candidate_context(
    at: Coordinates,
    competitor_stores: &Lookup<Vec<StorePoint>>,
    family_stores: &Lookup<Vec<StorePoint>>,
    retail_anchors: &Lookup<Vec<RetailAnchor>>,
) -> CandidateContext {
    let store_position = |s: &StorePoint| Coordinates::new(s.lat, s.lng);

    let competitor_distance_miles = competitor_stores.found().map(|stores| {
        nearest(at, stores, store_position).map_or(NO_COMPETITOR_MILES, |(_, miles)| miles)
    });

    let nearest_family_brand = family_stores.found().and_then(|stores| {
        nearest(at, stores, store_position).map(|(store, miles)| NearestPoint {
            name: store.brand.clone(),
            distance_miles: miles,
        })
    });

    let nearest_retail_anchor = retail_anchors.found().and_then(|anchors| {
        nearest(at, anchors, |a: &RetailAnchor| Coordinates::new(a.lat, a.lng)).map(
            |(anchor, miles)| NearestPoint {
                name: anchor.name.clone(),
                distance_miles: miles,
            },
        )
    });

    CandidateContext {
        competitor_distance_miles,
        nearest_family_brand,
        nearest_retail_anchor,
    }
}

#[cfg(test)]
#[path = "enrich_test.rs"]
mod tests;

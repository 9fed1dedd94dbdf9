//! Opportunity search orchestration.
//!
//! One linear pass per request: collect, deduplicate, filter, enrich, score,
//! rank. Only collection can fail the request; enrichment degrades per lookup.

use std::sync::Arc;

use sitescout_core::{AppConfig, BrandRoster, CandidateProperty, GeoBounds};

use crate::cache::MarketCaches;
use crate::collector::CandidateCollector;
use crate::dedup;
use crate::eligibility::filter_eligible;
use crate::enrich::{EnrichmentSettings, MarketContext, MarketEnricher};
use crate::error::RankingError;
use crate::rank::rank_opportunities;
use crate::scorer::score_candidate;
use crate::sources::{CompetitorStore, DemographicsService, ListingStore, PoiService, PropertySearch};
use crate::types::{EligibilityFilters, ScoredOpportunity, ScoringToggles, SearchResults};

/// The external services a search talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub property_search: Arc<dyn PropertySearch>,
    pub listings: Arc<dyn ListingStore>,
    pub competitors: Arc<dyn CompetitorStore>,
    pub demographics: Arc<dyn DemographicsService>,
    pub poi: Arc<dyn PoiService>,
}

#[derive(Debug, Clone)]
pub struct RankingSettings {
    /// Maximum government records requested per search.
    pub property_search_limit: usize,
    pub enrichment: EnrichmentSettings,
}

impl RankingSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig, brands: BrandRoster) -> Self {
        Self {
            property_search_limit: config.property_search_limit,
            enrichment: EnrichmentSettings::from_app_config(config, brands),
        }
    }
}

/// Ranks candidate sites inside a map viewport.
///
/// Cheap to share behind an `Arc`; the caches are the only state that
/// outlives a request.
pub struct OpportunitySearch {
    collector: CandidateCollector,
    enricher: MarketEnricher,
}

impl OpportunitySearch {
    #[must_use]
    pub fn new(
        collaborators: Collaborators,
        caches: Arc<MarketCaches>,
        settings: RankingSettings,
    ) -> Self {
        let Collaborators {
            property_search,
            listings,
            competitors,
            demographics,
            poi,
        } = collaborators;
        Self {
            collector: CandidateCollector::new(
                property_search,
                listings,
                settings.property_search_limit,
            ),
            enricher: MarketEnricher::new(
                competitors,
                demographics,
                poi,
                caches,
                settings.enrichment,
            ),
        }
    }

    /// Run a full search and return at most `limit` ranked opportunities.
    ///
    /// # Errors
    ///
    /// - [`RankingError::InvalidBounds`] / [`RankingError::InvalidFilters`]
    ///   before any collaborator is called.
    /// - [`RankingError::Configuration`] when the property search credential
    ///   is missing.
    /// - [`RankingError::Collector`] when the government search fails.
    pub async fn search_opportunities(
        &self,
        bounds: &GeoBounds,
        filters: &EligibilityFilters,
        toggles: &ScoringToggles,
        limit: usize,
    ) -> Result<SearchResults, RankingError> {
        bounds.validate()?;
        filters.validate()?;

        let collected = self.collector.collect(bounds).await?;
        let collected_count = collected.government.len() + collected.listings.len();

        let merged = dedup::merge(collected.government, collected.listings);
        let merged_count = merged.len();

        let eligible = filter_eligible(merged, filters);
        let eligible_count = eligible.len();

        let located: Vec<CandidateProperty> = eligible
            .into_iter()
            .filter(|candidate| {
                let has_point = candidate.coordinates.is_some();
                if !has_point {
                    tracing::debug!(id = %candidate.id, "dropping candidate without coordinates");
                }
                has_point
            })
            .collect();

        let market = self.enricher.enrich(&located, bounds, toggles).await;

        let scored: Vec<ScoredOpportunity> = located
            .into_iter()
            .enumerate()
            .map(|(index, candidate)| score_opportunity(index, candidate, &market, toggles))
            .collect();
        let ranked = rank_opportunities(scored, limit);

        tracing::info!(
            collected = collected_count,
            after_dedup = merged_count,
            eligible = eligible_count,
            ranked = ranked.len(),
            "opportunity search complete"
        );

        Ok(SearchResults {
            ranked_opportunities: ranked,
            competitor_store_count: market.competitor_stores.found().map_or(0, Vec::len),
            family_brand_store_count: market.family_stores.found().map_or(0, Vec::len),
            retail_anchor_count: market.retail_anchors.found().map_or(0, Vec::len),
            viewport_population: market.population.found().copied(),
        })
    }
}

fn score_opportunity(
    index: usize,
    property: CandidateProperty,
    market: &MarketContext,
    toggles: &ScoringToggles,
) -> ScoredOpportunity {
    let card = score_candidate(&property, &market.scoring_context(index, toggles));
    let context = market.candidate(index).cloned().unwrap_or_default();
    let population = market.population.found().copied();
    let (family_miles, family_name) = context
        .nearest_family_brand
        .map_or((None, None), |f| (Some(f.distance_miles), Some(f.name)));
    let (anchor_miles, anchor_name) = context
        .nearest_retail_anchor
        .map_or((None, None), |a| (Some(a.distance_miles), Some(a.name)));

    ScoredOpportunity {
        property,
        score: card.score(),
        rank: 0,
        priority_signals: card.signals(),
        nearest_competitor_miles: context.competitor_distance_miles,
        nearest_family_brand_miles: family_miles,
        nearest_family_brand: family_name,
        nearest_retail_anchor_miles: anchor_miles,
        nearest_retail_anchor: anchor_name,
        population_1mi: population.map(|p| p.pop_1mi),
        population_3mi: population.map(|p| p.pop_3mi),
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;

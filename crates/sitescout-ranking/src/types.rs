use serde::{Deserialize, Serialize};
use sitescout_core::CandidateProperty;

use crate::error::RankingError;

/// Inclusive numeric range used by the eligibility size gates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeRange {
    pub min: f64,
    pub max: f64,
}

impl SizeRange {
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    fn validate(&self, name: &str) -> Result<(), RankingError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(RankingError::InvalidFilters(format!(
                "{name} range must be finite"
            )));
        }
        if self.min < 0.0 {
            return Err(RankingError::InvalidFilters(format!(
                "{name} minimum must be non-negative, got {}",
                self.min
            )));
        }
        if self.min > self.max {
            return Err(RankingError::InvalidFilters(format!(
                "{name} minimum {} exceeds maximum {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Caller-supplied size gates for the eligibility filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EligibilityFilters {
    /// Acceptable lot size for vacant land, in acres.
    pub land_acres: SizeRange,
    /// Acceptable building size for vacant retail/office, in square feet.
    pub building_sqft: SizeRange,
}

impl Default for EligibilityFilters {
    fn default() -> Self {
        Self {
            land_acres: SizeRange::new(0.8, 2.0),
            building_sqft: SizeRange::new(2_500.0, 6_000.0),
        }
    }
}

impl EligibilityFilters {
    /// # Errors
    ///
    /// Returns [`RankingError::InvalidFilters`] for non-finite, negative, or inverted ranges.
    pub fn validate(&self) -> Result<(), RankingError> {
        self.land_acres.validate("land_acres")?;
        self.building_sqft.validate("building_sqft")
    }
}

/// Per-request switches for the enrichment-backed scoring factors.
///
/// Availability, size fit, and distress scoring are always on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct ScoringToggles {
    pub population: bool,
    pub retail_anchors: bool,
    pub competitor_gap: bool,
    pub family_brands: bool,
}

impl Default for ScoringToggles {
    fn default() -> Self {
        Self {
            population: true,
            retail_anchors: true,
            competitor_gap: true,
            family_brands: true,
        }
    }
}

impl ScoringToggles {
    /// Population is also needed by the competitor-gap rule's high-population mode.
    #[must_use]
    pub fn needs_population(&self) -> bool {
        self.population || self.competitor_gap
    }
}

/// A store location returned by the competitor store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorePoint {
    pub lat: f64,
    pub lng: f64,
    pub brand: String,
}

/// Residents around the viewport center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationEstimate {
    pub pop_1mi: u32,
    pub pop_3mi: u32,
}

/// A traffic-generating point of interest near the viewport center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetailAnchor {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Closest named point to a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestPoint {
    pub name: String,
    pub distance_miles: f64,
}

/// A candidate with its score, rank, and market context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredOpportunity {
    #[serde(flatten)]
    pub property: CandidateProperty,
    pub score: u32,
    /// 1-based position in the ranked result.
    pub rank: usize,
    pub priority_signals: Vec<String>,
    pub nearest_competitor_miles: Option<f64>,
    pub nearest_family_brand_miles: Option<f64>,
    pub nearest_family_brand: Option<String>,
    pub nearest_retail_anchor_miles: Option<f64>,
    pub nearest_retail_anchor: Option<String>,
    pub population_1mi: Option<u32>,
    pub population_3mi: Option<u32>,
}

/// Output of one opportunity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub ranked_opportunities: Vec<ScoredOpportunity>,
    /// Flagship stores found in the buffered viewport; 0 when skipped or failed.
    pub competitor_store_count: usize,
    pub family_brand_store_count: usize,
    pub retail_anchor_count: usize,
    pub viewport_population: Option<PopulationEstimate>,
}

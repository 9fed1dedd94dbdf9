//! Additive opportunity scorer.
//!
//! Every rule that fires contributes a point award and exactly one
//! human-readable label. The score is the unclamped sum of the awards, so the
//! label list always explains the total.

use sitescout_core::{CandidateProperty, PropertyType, SignalType};

use crate::eligibility::has_vacancy_keyword;
use crate::enrich::NO_COMPETITOR_MILES;
use crate::types::PopulationEstimate;

/// Residents needed within a ring for the population award.
const POPULATION_THRESHOLD: u32 = 12_000;
/// 3-mile population that earns the density bonus.
const POPULATION_BONUS_THRESHOLD: u32 = 25_000;

const COMPETITOR_GAP_MILES: f64 = 5.0;
const HIGH_POP_COMPETITOR_GAP_MILES: f64 = 3.0;

/// Enrichment inputs for one candidate, already filtered by the request's
/// scoring toggles. `None` means the factor does not score.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoringContext {
    pub population: Option<PopulationEstimate>,
    /// Viewport 3-mile population, present whenever it was fetched. Drives
    /// the competitor-gap threshold independently of population scoring.
    pub market_population_3mi: Option<u32>,
    pub nearest_retail_anchor_miles: Option<f64>,
    pub competitor_distance_miles: Option<f64>,
    pub family_brand_distance_miles: Option<f64>,
}

/// A single fired rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    pub points: u32,
    pub label: String,
}

/// Score and the rule-by-rule breakdown behind it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreCard {
    pub contributions: Vec<Contribution>,
}

impl ScoreCard {
    fn award(&mut self, points: u32, label: impl Into<String>) {
        self.contributions.push(Contribution {
            points,
            label: label.into(),
        });
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.contributions.iter().map(|c| c.points).sum()
    }

    /// Labels of the fired rules, in firing order.
    #[must_use]
    pub fn signals(&self) -> Vec<String> {
        self.contributions.iter().map(|c| c.label.clone()).collect()
    }
}

/// Score one candidate against its market context.
#[must_use]
pub fn score_candidate(candidate: &CandidateProperty, context: &ScoringContext) -> ScoreCard {
    let mut card = ScoreCard::default();

    if let Some(population) = context.population {
        score_population(&mut card, population);
    }
    if let Some(miles) = context.nearest_retail_anchor_miles {
        score_retail_anchor(&mut card, miles);
    }
    if let Some(miles) = context.competitor_distance_miles {
        score_competitor_gap(&mut card, miles, context.market_population_3mi);
    }
    score_availability(&mut card, candidate);
    score_size_fit(&mut card, candidate);
    if let Some(miles) = context.family_brand_distance_miles {
        score_family_brand(&mut card, miles);
    }
    score_distress(&mut card, candidate);

    card
}

fn score_population(card: &mut ScoreCard, population: PopulationEstimate) {
    if population.pop_1mi >= POPULATION_THRESHOLD {
        card.award(30, format!("{} residents within 1 mile", population.pop_1mi));
    } else if population.pop_3mi >= POPULATION_THRESHOLD {
        card.award(15, format!("{} residents within 3 miles", population.pop_3mi));
    } else {
        return;
    }
    if population.pop_3mi >= POPULATION_BONUS_THRESHOLD {
        card.award(
            10,
            format!("Dense trade area: {} residents within 3 miles", population.pop_3mi),
        );
    }
}

fn score_retail_anchor(card: &mut ScoreCard, miles: f64) {
    let points = if miles <= 0.25 {
        35
    } else if miles <= 0.5 {
        25
    } else if miles <= 1.0 {
        10
    } else {
        return;
    };
    card.award(points, format!("Retail anchor {miles:.2} mi away"));
}

fn score_competitor_gap(card: &mut ScoreCard, miles: f64, market_pop_3mi: Option<u32>) {
    let threshold = if market_pop_3mi.is_some_and(|p| p >= POPULATION_THRESHOLD) {
        HIGH_POP_COMPETITOR_GAP_MILES
    } else {
        COMPETITOR_GAP_MILES
    };
    let points = if miles >= 7.0 {
        25
    } else if miles >= 5.0 {
        20
    } else if miles >= threshold {
        10
    } else {
        return;
    };
    #[allow(clippy::float_cmp)]
    let label = if miles == NO_COMPETITOR_MILES {
        "No flagship competitor nearby".to_string()
    } else {
        format!("Nearest flagship competitor {miles:.1} mi away")
    };
    card.award(points, label);
}

fn score_availability(card: &mut ScoreCard, candidate: &CandidateProperty) {
    if let Some(site) = candidate.source.listing_site() {
        card.award(35, format!("Actively listed on {site}"));
        return;
    }
    match candidate.property_type {
        PropertyType::Land => card.award(25, "Vacant land"),
        PropertyType::Retail | PropertyType::Office => {
            let signal = candidate.has_vacancy_signal();
            let keyword = has_vacancy_keyword(candidate);
            match (signal, keyword) {
                (true, true) => card.award(20, "Vacant building confirmed by records and land use"),
                (true, false) => card.award(15, "Vacant building per property records"),
                (false, true) => card.award(15, "Vacant building per land use"),
                (false, false) => {}
            }
        }
        PropertyType::Industrial | PropertyType::MixedUse | PropertyType::Unknown => {}
    }
}

fn score_size_fit(card: &mut ScoreCard, candidate: &CandidateProperty) {
    match candidate.property_type {
        PropertyType::Land => {
            let Some(acres) = candidate.lot_acres else {
                return;
            };
            if (0.8..=1.2).contains(&acres) {
                card.award(15, format!("Ideal lot size ({acres:.2} ac)"));
            } else if acres > 1.2 && acres <= 2.0 {
                card.award(10, format!("Workable lot size ({acres:.2} ac)"));
            }
        }
        PropertyType::Retail | PropertyType::Office => {
            let Some(sqft) = candidate.building_sqft else {
                return;
            };
            if (2_500.0..=3_500.0).contains(&sqft) {
                card.award(15, format!("Ideal building size ({sqft:.0} sqft)"));
            } else if sqft > 3_500.0 && sqft <= 6_000.0 {
                card.award(10, format!("Workable building size ({sqft:.0} sqft)"));
            }
        }
        PropertyType::Industrial | PropertyType::MixedUse | PropertyType::Unknown => {}
    }
}

fn score_family_brand(card: &mut ScoreCard, miles: f64) {
    let points = if miles <= 0.5 {
        10
    } else if miles <= 1.0 {
        5
    } else {
        return;
    };
    card.award(points, format!("Family brand {miles:.2} mi away"));
}

fn score_distress(card: &mut ScoreCard, candidate: &CandidateProperty) {
    if candidate.has_signal(SignalType::TaxDelinquent) {
        card.award(10, "Tax delinquent");
    } else if candidate.has_signal(SignalType::Foreclosure) {
        card.award(10, "In foreclosure");
    } else if candidate.has_signal(SignalType::AbsenteeOwner) {
        card.award(5, "Absentee owner");
    }
}

//! Eligibility classification of merged candidates.
//!
//! Every candidate either lands in exactly one [`EligibilityCategory`] or is
//! dropped. Government records are screened against incompatible land uses
//! first; listing candidates skip that screen.

use std::sync::LazyLock;

use regex::Regex;
use sitescout_core::{CandidateProperty, PropertyType};

use crate::types::EligibilityFilters;

/// Land uses that rule a parcel out regardless of vacancy.
pub(crate) const INCOMPATIBLE_USES: &[&str] = &[
    // fuel and auto service
    "gas station",
    "service station",
    "filling station",
    "fuel",
    "truck stop",
    "convenience store",
    "auto repair",
    "auto service",
    "auto sales",
    "automotive",
    "car wash",
    "tire",
    "oil change",
    "body shop",
    "dealership",
    // food service
    "restaurant",
    "fast food",
    "drive-in",
    "diner",
    "cafe",
    "bakery",
    "pizza",
    "tavern",
    "brewery",
    "nightclub",
    // medical
    "medical",
    "clinic",
    "hospital",
    "dental",
    "pharmacy",
    "veterinary",
    "urgent care",
    "nursing home",
    "assisted living",
    // finance
    "bank",
    "credit union",
    "savings and loan",
    "pawn",
    // lodging
    "hotel",
    "motel",
    "lodging",
    "rv park",
    "campground",
    // religious and civic
    "church",
    "religious",
    "temple",
    "mosque",
    "synagogue",
    "cemetery",
    "funeral",
    "mortuary",
    "fraternal",
    // industrial and utility
    "utility",
    "utilities",
    "substation",
    "water treatment",
    "sewage",
    "landfill",
    "railroad",
    "cell tower",
    "manufacturing",
    "warehouse",
    "storage",
    "salvage",
    // government
    "government",
    "municipal",
    "federal",
    "post office",
    "fire station",
    "police",
    "courthouse",
    "library",
    // education
    "school",
    "university",
    "college",
    "daycare",
    "child care",
    // personal care and entertainment
    "salon",
    "barber",
    "spa",
    "fitness",
    "gym",
    "laundromat",
    "dry cleaner",
    "theater",
    "cinema",
    "bowling",
    "casino",
    // grocery
    "grocery",
    "supermarket",
];

/// Land-use words that count as vacancy evidence for buildings.
const VACANCY_KEYWORDS: &[&str] =
    &["vacant", "former", "closed", "abandoned", "demolished", "unused"];

/// Words suggesting a large building is a shared multi-tenant center.
const MULTI_TENANT_KEYWORDS: &[&str] = &["multi", "center", "plaza", "strip"];

/// Buildings above this size get the multi-tenant screen.
const MULTI_TENANT_MIN_SQFT: f64 = 10_000.0;

static INCOMPATIBLE_USE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = INCOMPATIBLE_USES
        .iter()
        .map(|term| regex::escape(term))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})(?:s|es)?\b"))
        .expect("valid incompatible-use regex")
});

/// Whole-word vacancy keywords; "formerly" counts, "enclosed" and "performance" do not.
static VACANCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = VACANCY_KEYWORDS.join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})(?:ly)?\b")).expect("valid vacancy regex")
});

/// Why a candidate was admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EligibilityCategory {
    /// Category A: vacant land inside the acreage range.
    VacantLand,
    /// Category B: availability already confirmed by a listing site.
    Listed,
    /// Category C: vacant retail or office with vacancy evidence.
    VacantBuilding,
}

/// First incompatible-use term found in `land_use`, if any.
#[must_use]
pub fn incompatible_use(land_use: &str) -> Option<&str> {
    INCOMPATIBLE_USE_RE.find(land_use).map(|m| m.as_str())
}

pub(crate) fn has_vacancy_keyword(candidate: &CandidateProperty) -> bool {
    candidate
        .land_use
        .as_deref()
        .is_some_and(|land_use| VACANCY_RE.is_match(land_use))
}

fn looks_multi_tenant(candidate: &CandidateProperty) -> bool {
    let land_use = candidate.land_use_lower();
    let signal_text = candidate
        .signals
        .iter()
        .map(|s| s.description.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    MULTI_TENANT_KEYWORDS
        .iter()
        .any(|k| land_use.contains(k) || signal_text.contains(k))
}

/// Place `candidate` in its category, or `None` to drop it.
#[must_use]
pub fn classify(
    candidate: &CandidateProperty,
    filters: &EligibilityFilters,
) -> Option<EligibilityCategory> {
    if candidate.is_listing() {
        return Some(EligibilityCategory::Listed);
    }

    if let Some(land_use) = candidate.land_use.as_deref() {
        if let Some(term) = incompatible_use(land_use) {
            tracing::trace!(id = %candidate.id, term, "rejected incompatible land use");
            return None;
        }
    }

    match candidate.property_type {
        PropertyType::Land => {
            let fits = candidate
                .lot_acres
                .map_or(true, |acres| filters.land_acres.contains(acres));
            fits.then_some(EligibilityCategory::VacantLand)
        }
        PropertyType::Retail | PropertyType::Office => {
            classify_building(candidate, filters).then_some(EligibilityCategory::VacantBuilding)
        }
        PropertyType::Industrial | PropertyType::MixedUse | PropertyType::Unknown => None,
    }
}

fn classify_building(candidate: &CandidateProperty, filters: &EligibilityFilters) -> bool {
    if let Some(sqft) = candidate.building_sqft {
        if !filters.building_sqft.contains(sqft) {
            return false;
        }
    }

    if !candidate.has_vacancy_signal() && !has_vacancy_keyword(candidate) {
        return false;
    }

    let large = candidate
        .building_sqft
        .is_some_and(|sqft| sqft > MULTI_TENANT_MIN_SQFT);
    !(large && looks_multi_tenant(candidate))
}

/// Keep only eligible candidates, preserving order.
#[must_use]
pub fn filter_eligible(
    candidates: Vec<CandidateProperty>,
    filters: &EligibilityFilters,
) -> Vec<CandidateProperty> {
    let total = candidates.len();
    let (mut land, mut listed, mut buildings) = (0usize, 0usize, 0usize);

    let eligible: Vec<CandidateProperty> = candidates
        .into_iter()
        .filter(|candidate| match classify(candidate, filters) {
            Some(EligibilityCategory::VacantLand) => {
                land += 1;
                true
            }
            Some(EligibilityCategory::Listed) => {
                listed += 1;
                true
            }
            Some(EligibilityCategory::VacantBuilding) => {
                buildings += 1;
                true
            }
            None => false,
        })
        .collect();

    tracing::debug!(
        total,
        vacant_land = land,
        listed,
        vacant_building = buildings,
        rejected = total - eligible.len(),
        "eligibility filter complete"
    );

    eligible
}

#[cfg(test)]
#[path = "eligibility_test.rs"]
mod tests;

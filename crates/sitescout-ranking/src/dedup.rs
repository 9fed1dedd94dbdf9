//! Drop government records that duplicate a nearby listing.

use sitescout_core::{CandidateProperty, Coordinates};

/// ~50 m in both latitude and longitude.
pub const DUPLICATE_DEGREES: f64 = 0.000_5;

fn is_near(a: Coordinates, b: Coordinates) -> bool {
    (a.lat - b.lat).abs() < DUPLICATE_DEGREES && (a.lng - b.lng).abs() < DUPLICATE_DEGREES
}

/// Merge government records with listings.
///
/// A government record within [`DUPLICATE_DEGREES`] of any listing is dropped
/// in favor of the listing, which carries fresher availability. Candidates
/// without coordinates never match. Survivors keep their relative order:
/// government records first, then listings.
#[must_use]
pub fn merge(
    government: Vec<CandidateProperty>,
    listings: Vec<CandidateProperty>,
) -> Vec<CandidateProperty> {
    let listing_points: Vec<Coordinates> = listings.iter().filter_map(|l| l.coordinates).collect();

    let before = government.len();
    let mut merged: Vec<CandidateProperty> = government
        .into_iter()
        .filter(|record| match record.coordinates {
            Some(point) => !listing_points.iter().any(|&l| is_near(point, l)),
            None => true,
        })
        .collect();
    let dropped = before - merged.len();
    if dropped > 0 {
        tracing::debug!(dropped, "dropped government records duplicated by listings");
    }

    merged.extend(listings);
    merged
}

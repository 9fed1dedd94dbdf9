//! Final ordering of scored opportunities.

use crate::types::ScoredOpportunity;

/// Sort by score descending, keep the first `limit`, and number them from 1.
///
/// The sort is stable, so equal scores keep their collection order.
#[must_use]
pub fn rank_opportunities(
    mut opportunities: Vec<ScoredOpportunity>,
    limit: usize,
) -> Vec<ScoredOpportunity> {
    opportunities.sort_by(|a, b| b.score.cmp(&a.score));
    opportunities.truncate(limit);
    for (index, opportunity) in opportunities.iter_mut().enumerate() {
        opportunity.rank = index + 1;
    }
    opportunities
}

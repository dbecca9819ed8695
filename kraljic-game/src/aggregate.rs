//! Quadrant aggregation: turning ordered step scores into a quadrant
//! total, theoretical optimum, and percent-of-optimal.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::numbers::{round1, round2};
use crate::quadrant::{Quadrant, STEPS_PER_QUADRANT};
use crate::scoring::{RAW_SCORE_MAX, WeightedScore};

/// One scored step feeding quadrant aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredStep {
    /// 0-based step index within the quadrant.
    pub step: usize,
    pub choice_id: String,
    pub score: WeightedScore,
}

/// Aggregated outcome for one quadrant. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuadrantResult {
    pub quadrant: Quadrant,
    /// Weighted scores ordered by step index.
    pub step_scores: SmallVec<[WeightedScore; STEPS_PER_QUADRANT]>,
    pub choice_ids: Vec<String>,
    /// Sum of weighted step values, rounded to 2 decimals.
    pub total_weighted: f64,
    /// Total achievable if every step scored the raw maximum on every
    /// dimension. Computed from the weights, never hard-coded.
    pub optimal_score: f64,
    /// `100 * total / optimal`, rounded to 1 decimal; 0 when the
    /// optimal denominator is not positive.
    pub percent_of_optimal: f64,
}

/// Theoretical optimal total for a quadrant: every step at the maximum
/// raw value on every dimension.
#[must_use]
pub fn optimal_score(quadrant: Quadrant) -> f64 {
    let weights = quadrant.weights();
    let steps = u32::try_from(STEPS_PER_QUADRANT).unwrap_or(u32::MAX);
    let max = f64::from(RAW_SCORE_MAX);
    f64::from(steps) * (max * weights.ce + max * weights.ss + max * weights.sv)
}

/// Aggregate a quadrant's step scores. Fewer than the full set of steps
/// is a partial-completion state, not an error; zero steps yields zero
/// totals.
#[must_use]
pub fn aggregate_quadrant(quadrant: Quadrant, steps: &[ScoredStep]) -> QuadrantResult {
    let mut ordered: Vec<&ScoredStep> = steps.iter().collect();
    ordered.sort_by_key(|s| s.step);

    let step_scores: SmallVec<[WeightedScore; STEPS_PER_QUADRANT]> =
        ordered.iter().map(|s| s.score).collect();
    let choice_ids: Vec<String> = ordered.iter().map(|s| s.choice_id.clone()).collect();

    let total_weighted = round2(step_scores.iter().map(|s| s.weighted).sum());
    let optimal = optimal_score(quadrant);
    let percent_of_optimal = if optimal > 0.0 {
        round1(100.0 * total_weighted / optimal)
    } else {
        0.0
    };

    QuadrantResult {
        quadrant,
        step_scores,
        choice_ids,
        total_weighted,
        optimal_score: optimal,
        percent_of_optimal,
    }
}

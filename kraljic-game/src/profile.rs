//! Dimension profile: raw per-axis totals across the whole session and
//! the strongest/weakest classification.

use serde::{Deserialize, Serialize};

use crate::aggregate::QuadrantResult;
use crate::numbers::{round2, usize_to_f64};
use crate::quadrant::Dimension;

/// Total and average raw value for one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct DimensionStat {
    pub total: u32,
    /// Total divided by contributing step count, rounded to 2 decimals;
    /// 0 when no steps exist.
    pub average: f64,
}

/// Session-wide raw-score profile across the three dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionProfile {
    pub ce: DimensionStat,
    pub ss: DimensionStat,
    pub sv: DimensionStat,
    pub strongest: Dimension,
    pub weakest: Dimension,
}

impl DimensionProfile {
    /// Stat for a single dimension.
    #[must_use]
    pub const fn stat(&self, dimension: Dimension) -> DimensionStat {
        match dimension {
            Dimension::Ce => self.ce,
            Dimension::Ss => self.ss,
            Dimension::Sv => self.sv,
        }
    }
}

/// Aggregate raw values across every step of every quadrant result and
/// classify the strongest and weakest dimension by total.
///
/// Ties resolve to the first dimension in declaration order
/// (CE, then SS, then SV), so classification is deterministic.
#[must_use]
pub fn build_profile(quadrant_results: &[QuadrantResult]) -> DimensionProfile {
    let mut totals = [0u32; 3];
    let mut step_count = 0usize;

    for result in quadrant_results {
        for score in &result.step_scores {
            for (slot, dimension) in totals.iter_mut().zip(Dimension::ORDER) {
                *slot += u32::from(score.raw.get(dimension));
            }
            step_count += 1;
        }
    }

    let average = |total: u32| {
        if step_count == 0 {
            0.0
        } else {
            round2(f64::from(total) / usize_to_f64(step_count))
        }
    };

    let mut strongest = Dimension::Ce;
    let mut weakest = Dimension::Ce;
    for (index, dimension) in Dimension::ORDER.into_iter().enumerate() {
        if totals[index] > totals[dimension_index(strongest)] {
            strongest = dimension;
        }
        if totals[index] < totals[dimension_index(weakest)] {
            weakest = dimension;
        }
    }

    DimensionProfile {
        ce: DimensionStat {
            total: totals[0],
            average: average(totals[0]),
        },
        ss: DimensionStat {
            total: totals[1],
            average: average(totals[1]),
        },
        sv: DimensionStat {
            total: totals[2],
            average: average(totals[2]),
        },
        strongest,
        weakest,
    }
}

const fn dimension_index(dimension: Dimension) -> usize {
    match dimension {
        Dimension::Ce => 0,
        Dimension::Ss => 1,
        Dimension::Sv => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{ScoredStep, aggregate_quadrant};
    use crate::quadrant::Quadrant;
    use crate::scoring::{RawScore, compute_weighted};

    fn result_with_raws(quadrant: Quadrant, raws: &[(u8, u8, u8)]) -> QuadrantResult {
        let steps: Vec<ScoredStep> = raws
            .iter()
            .enumerate()
            .map(|(index, &(ce, ss, sv))| ScoredStep {
                step: index,
                choice_id: format!("{quadrant}_step{}_A", index + 1),
                score: compute_weighted(RawScore::new(ce, ss, sv).unwrap(), quadrant),
            })
            .collect();
        aggregate_quadrant(quadrant, &steps)
    }

    #[test]
    fn profile_sums_raw_values_across_quadrants() {
        let results = vec![
            result_with_raws(Quadrant::Bottleneck, &[(2, 4, 3), (3, 5, 2)]),
            result_with_raws(Quadrant::Leverage, &[(4, 2, 3)]),
        ];
        let profile = build_profile(&results);
        assert_eq!(profile.ce.total, 9);
        assert_eq!(profile.ss.total, 11);
        assert_eq!(profile.sv.total, 8);
        assert!((profile.ce.average - 3.0).abs() < f64::EPSILON);
        assert_eq!(profile.strongest, Dimension::Ss);
        assert_eq!(profile.weakest, Dimension::Sv);
    }

    #[test]
    fn empty_profile_defaults_to_zero_and_first_dimension() {
        let profile = build_profile(&[]);
        assert_eq!(profile.ce.total, 0);
        assert!((profile.ss.average - 0.0).abs() < f64::EPSILON);
        assert_eq!(profile.strongest, Dimension::Ce);
        assert_eq!(profile.weakest, Dimension::Ce);
    }

    #[test]
    fn ties_resolve_in_declaration_order() {
        // All dimensions equal: CE wins both classifications.
        let results = vec![result_with_raws(Quadrant::Strategic, &[(3, 3, 3), (4, 4, 4)])];
        let profile = build_profile(&results);
        assert_eq!(profile.strongest, Dimension::Ce);
        assert_eq!(profile.weakest, Dimension::Ce);

        // SS and SV tie for strongest: SS is first in declaration order.
        let results = vec![result_with_raws(Quadrant::Strategic, &[(2, 4, 4)])];
        let profile = build_profile(&results);
        assert_eq!(profile.strongest, Dimension::Ss);
        assert_eq!(profile.weakest, Dimension::Ce);
    }

    #[test]
    fn averages_round_to_two_decimals() {
        let results = vec![result_with_raws(Quadrant::Noncritical, &[
            (2, 3, 4),
            (3, 3, 3),
            (5, 2, 1),
        ])];
        let profile = build_profile(&results);
        assert!((profile.ce.average - 3.33).abs() < f64::EPSILON);
        assert!((profile.sv.average - 2.67).abs() < f64::EPSILON);
    }
}

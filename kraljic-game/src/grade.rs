//! Session scoring: layer totals, the final score, and grade banding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregate::QuadrantResult;
use crate::numbers::round2;
use crate::scoring::WeightedScore;

/// Discrete performance grade. Ordering follows declaration order:
/// `Poor < Fair < Good < Excellent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Poor => write!(f, "Poor"),
            Self::Fair => write!(f, "Fair"),
            Self::Good => write!(f, "Good"),
            Self::Excellent => write!(f, "Excellent"),
        }
    }
}

/// Grade banding thresholds over the final score.
///
/// This is the single grading policy for the whole system; every grade
/// shown anywhere comes from one instance of this table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeBands {
    pub excellent_min: f64,
    pub good_min: f64,
    pub fair_min: f64,
}

impl Default for GradeBands {
    fn default() -> Self {
        // Canonical thresholds: >=70 Excellent, >=55 Good, >=40 Fair.
        Self {
            excellent_min: 70.0,
            good_min: 55.0,
            fair_min: 40.0,
        }
    }
}

impl GradeBands {
    /// Map a final score to its grade band.
    #[must_use]
    pub fn grade_for(&self, final_score: f64) -> Grade {
        if final_score >= self.excellent_min {
            Grade::Excellent
        } else if final_score >= self.good_min {
            Grade::Good
        } else if final_score >= self.fair_min {
            Grade::Fair
        } else {
            Grade::Poor
        }
    }

    /// Check that thresholds descend strictly.
    ///
    /// # Errors
    ///
    /// Returns `GradeBandsError` when the thresholds are not strictly
    /// decreasing from excellent to fair.
    pub fn validate(&self) -> Result<(), GradeBandsError> {
        if self.excellent_min <= self.good_min || self.good_min <= self.fair_min {
            return Err(GradeBandsError::NotDescending {
                excellent_min: self.excellent_min,
                good_min: self.good_min,
                fair_min: self.fair_min,
            });
        }
        Ok(())
    }
}

/// Errors raised when a grade band table is malformed.
#[derive(Debug, Error, PartialEq)]
pub enum GradeBandsError {
    #[error(
        "grade thresholds must descend (excellent {excellent_min:.1}, good {good_min:.1}, fair {fair_min:.1})"
    )]
    NotDescending {
        excellent_min: f64,
        good_min: f64,
        fair_min: f64,
    },
}

/// Combined session score across both layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionScore {
    /// Sum of the four quadrant totals (step-by-step choices).
    pub layer1: f64,
    /// Sum of the event-response weighted values.
    pub layer2: f64,
    /// `layer1 + layer2`, rounded to 2 decimals.
    pub final_score: f64,
    pub grade: Grade,
}

/// Combine quadrant totals and event scores into the session score.
/// Missing event responses simply contribute nothing to layer 2.
#[must_use]
pub fn score_session(
    quadrant_results: &[QuadrantResult],
    event_scores: &[WeightedScore],
    bands: &GradeBands,
) -> SessionScore {
    let layer1 = round2(quadrant_results.iter().map(|r| r.total_weighted).sum());
    let layer2 = round2(event_scores.iter().map(|s| s.weighted).sum());
    let final_score = round2(layer1 + layer2);
    SessionScore {
        layer1,
        layer2,
        final_score,
        grade: bands.grade_for(final_score),
    }
}

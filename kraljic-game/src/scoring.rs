//! Weighted score calculation: collapsing a raw three-dimension choice
//! score into a single scalar using quadrant weights.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::quadrant::{Dimension, Quadrant};

/// Lowest admissible raw dimension value.
pub const RAW_SCORE_MIN: u8 = 1;
/// Highest admissible raw dimension value.
pub const RAW_SCORE_MAX: u8 = 5;

/// A raw choice score: one bounded integer per dimension.
/// Invariant: every value lies in `[RAW_SCORE_MIN, RAW_SCORE_MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawScore {
    pub ce: u8,
    pub ss: u8,
    pub sv: u8,
}

impl RawScore {
    /// Construct a raw score, rejecting out-of-range values.
    ///
    /// Out-of-range input is an authoring error in the content catalog;
    /// it is rejected rather than clamped or passed through.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError::OutOfRange` naming the offending dimension.
    pub fn new(ce: u8, ss: u8, sv: u8) -> Result<Self, ScoreError> {
        let score = Self { ce, ss, sv };
        score.validate()?;
        Ok(score)
    }

    /// Raw value for a single dimension.
    #[must_use]
    pub const fn get(&self, dimension: Dimension) -> u8 {
        match dimension {
            Dimension::Ce => self.ce,
            Dimension::Ss => self.ss,
            Dimension::Sv => self.sv,
        }
    }

    /// Smallest of the three dimension values.
    #[must_use]
    pub fn min_value(&self) -> u8 {
        self.ce.min(self.ss).min(self.sv)
    }

    /// Largest of the three dimension values.
    #[must_use]
    pub fn max_value(&self) -> u8 {
        self.ce.max(self.ss).max(self.sv)
    }

    /// Check the bounded-range invariant, for scores that arrived via
    /// deserialization instead of [`RawScore::new`].
    ///
    /// # Errors
    ///
    /// Returns `ScoreError::OutOfRange` naming the offending dimension.
    pub fn validate(&self) -> Result<(), ScoreError> {
        for dimension in Dimension::ORDER {
            let value = self.get(dimension);
            if !(RAW_SCORE_MIN..=RAW_SCORE_MAX).contains(&value) {
                return Err(ScoreError::OutOfRange { dimension, value });
            }
        }
        Ok(())
    }
}

/// Errors raised when a raw score violates its bounds.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoreError {
    #[error(
        "raw {dimension} score must be between {RAW_SCORE_MIN} and {RAW_SCORE_MAX} (got {value})"
    )]
    OutOfRange { dimension: Dimension, value: u8 },
}

/// A raw score plus its quadrant-weighted scalar.
/// Created when a choice is confirmed and never mutated afterward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedScore {
    pub raw: RawScore,
    /// `ce*w_ce + ss*w_ss + sv*w_sv`; bounded by [1, 5] since weights sum to 1.
    pub weighted: f64,
}

/// Collapse a raw score into a weighted scalar using the quadrant's
/// dimension weights. Pure and deterministic.
#[must_use]
pub fn compute_weighted(raw: RawScore, quadrant: Quadrant) -> WeightedScore {
    let weights = quadrant.weights();
    let weighted = f64::from(raw.ce) * weights.ce
        + f64::from(raw.ss) * weights.ss
        + f64::from(raw.sv) * weights.sv;
    WeightedScore { raw, weighted }
}

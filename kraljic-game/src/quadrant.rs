//! Quadrant registry: the four fixed procurement categories and their
//! dimension weighting schemes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance for the weights-sum-to-one invariant.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Number of scenario steps played per quadrant.
pub const STEPS_PER_QUADRANT: usize = 4;

/// One of the three scoring axes every choice is rated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// Cost efficiency (CE)
    Ce,
    /// Supply stability (SS)
    Ss,
    /// Strategic value (SV)
    Sv,
}

impl Dimension {
    /// Fixed declaration order; ties in profile classification resolve
    /// to the first occurrence in this order.
    pub const ORDER: [Self; 3] = [Self::Ce, Self::Ss, Self::Sv];

    /// Human-readable axis name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ce => "Cost Efficiency",
            Self::Ss => "Supply Stability",
            Self::Sv => "Strategic Value",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ce => write!(f, "ce"),
            Self::Ss => write!(f, "ss"),
            Self::Sv => write!(f, "sv"),
        }
    }
}

/// One of the four fixed Kraljic quadrants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quadrant {
    Bottleneck,
    Leverage,
    Strategic,
    Noncritical,
}

impl Quadrant {
    /// Canonical play and display order.
    pub const ORDER: [Self; 4] = [
        Self::Bottleneck,
        Self::Leverage,
        Self::Strategic,
        Self::Noncritical,
    ];

    /// Stable string identifier, matching the persisted representation.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Bottleneck => "bottleneck",
            Self::Leverage => "leverage",
            Self::Strategic => "strategic",
            Self::Noncritical => "noncritical",
        }
    }

    /// Parse a persisted identifier back into a quadrant.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ORDER.into_iter().find(|q| q.id() == id)
    }

    /// Static metadata for this quadrant.
    #[must_use]
    pub const fn meta(self) -> &'static QuadrantMeta {
        match self {
            Self::Bottleneck => &BOTTLENECK_META,
            Self::Leverage => &LEVERAGE_META,
            Self::Strategic => &STRATEGIC_META,
            Self::Noncritical => &NONCRITICAL_META,
        }
    }

    /// Dimension weights applied when collapsing a raw score.
    #[must_use]
    pub const fn weights(self) -> DimensionWeights {
        self.meta().weights
    }
}

impl std::fmt::Display for Quadrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Risk / impact level used in quadrant metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImpactLevel {
    High,
    Low,
}

/// Per-quadrant weighting of the three scoring dimensions.
/// Invariant: all weights non-negative and summing to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionWeights {
    pub ce: f64,
    pub ss: f64,
    pub sv: f64,
}

impl DimensionWeights {
    /// Weight assigned to a single dimension.
    #[must_use]
    pub const fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Ce => self.ce,
            Dimension::Ss => self.ss,
            Dimension::Sv => self.sv,
        }
    }

    /// Sum of all three weights.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.ce + self.ss + self.sv
    }

    /// Check the registry invariants.
    ///
    /// # Errors
    ///
    /// Returns `WeightsError` when a weight is negative or the sum drifts
    /// from 1.0 beyond [`WEIGHT_SUM_TOLERANCE`].
    pub fn validate(&self) -> Result<(), WeightsError> {
        for dimension in Dimension::ORDER {
            let value = self.get(dimension);
            if value < 0.0 {
                return Err(WeightsError::NegativeWeight { dimension, value });
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightsError::SumViolation { sum });
        }
        Ok(())
    }
}

/// Errors raised when quadrant weight invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum WeightsError {
    #[error("weight for {dimension} must be non-negative (got {value:.4})")]
    NegativeWeight { dimension: Dimension, value: f64 },
    #[error("weights must sum to 1.0 (got {sum:.6})")]
    SumViolation { sum: f64 },
}

/// Descriptive metadata attached to each quadrant. Pure data, defined at
/// startup and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuadrantMeta {
    pub name: &'static str,
    pub supply_risk: ImpactLevel,
    pub profit_impact: ImpactLevel,
    pub core_dilemma: &'static str,
    pub weights: DimensionWeights,
}

const BOTTLENECK_META: QuadrantMeta = QuadrantMeta {
    name: "Bottleneck",
    supply_risk: ImpactLevel::High,
    profit_impact: ImpactLevel::Low,
    core_dilemma: "How much to invest in low-value items that can stop the line",
    weights: DimensionWeights {
        ce: 0.20,
        ss: 0.50,
        sv: 0.30,
    },
};

const LEVERAGE_META: QuadrantMeta = QuadrantMeta {
    name: "Leverage",
    supply_risk: ImpactLevel::Low,
    profit_impact: ImpactLevel::High,
    core_dilemma: "Aggressive cost reduction versus supplier relationships",
    weights: DimensionWeights {
        ce: 0.50,
        ss: 0.20,
        sv: 0.30,
    },
};

const STRATEGIC_META: QuadrantMeta = QuadrantMeta {
    name: "Strategic",
    supply_risk: ImpactLevel::High,
    profit_impact: ImpactLevel::High,
    core_dilemma: "Deepening partnership versus avoiding lock-in",
    weights: DimensionWeights {
        ce: 0.20,
        ss: 0.30,
        sv: 0.50,
    },
};

const NONCRITICAL_META: QuadrantMeta = QuadrantMeta {
    name: "Non-critical",
    supply_risk: ImpactLevel::Low,
    profit_impact: ImpactLevel::Low,
    core_dilemma: "Streamlined handling versus the risk of neglect",
    weights: DimensionWeights {
        ce: 0.50,
        ss: 0.15,
        sv: 0.35,
    },
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_registered_quadrant_has_valid_weights() {
        for quadrant in Quadrant::ORDER {
            quadrant.weights().validate().unwrap();
        }
    }

    #[test]
    fn quadrant_ids_round_trip() {
        for quadrant in Quadrant::ORDER {
            assert_eq!(Quadrant::from_id(quadrant.id()), Some(quadrant));
        }
        assert!(Quadrant::from_id("routine").is_none());
    }

    #[test]
    fn quadrant_serde_uses_lowercase_ids() {
        let json = serde_json::to_string(&Quadrant::Noncritical).unwrap();
        assert_eq!(json, "\"noncritical\"");
        let parsed: Quadrant = serde_json::from_str("\"bottleneck\"").unwrap();
        assert_eq!(parsed, Quadrant::Bottleneck);
    }

    #[test]
    fn weight_validation_rejects_bad_tables() {
        let negative = DimensionWeights {
            ce: -0.1,
            ss: 0.6,
            sv: 0.5,
        };
        assert!(matches!(
            negative.validate(),
            Err(WeightsError::NegativeWeight {
                dimension: Dimension::Ce,
                ..
            })
        ));

        let drifted = DimensionWeights {
            ce: 0.3,
            ss: 0.3,
            sv: 0.3,
        };
        assert!(matches!(
            drifted.validate(),
            Err(WeightsError::SumViolation { .. })
        ));
    }

    #[test]
    fn dimension_order_is_fixed() {
        assert_eq!(
            Dimension::ORDER,
            [Dimension::Ce, Dimension::Ss, Dimension::Sv]
        );
        assert_eq!(Dimension::Ss.label(), "Supply Stability");
        assert_eq!(Dimension::Sv.to_string(), "sv");
    }

    #[test]
    fn metadata_matches_kraljic_axes() {
        let meta = Quadrant::Strategic.meta();
        assert_eq!(meta.supply_risk, ImpactLevel::High);
        assert_eq!(meta.profit_impact, ImpactLevel::High);
        assert!((meta.weights.sv - 0.50).abs() < f64::EPSILON);
    }
}

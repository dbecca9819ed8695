//! Participant bot strategies: how a simulated participant picks a
//! choice from the options a step offers.

use kraljic_game::{ChoiceSpec, Quadrant, compute_weighted};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Decision policy for a simulated participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Always the highest weighted choice for the quadrant.
    Optimal,
    /// Always the highest cost-efficiency raw score.
    Frugal,
    /// Always the highest supply-stability raw score.
    Cautious,
    /// Always the highest strategic-value raw score.
    Visionary,
    /// Uniformly random among the offered choices.
    Erratic,
}

impl Strategy {
    pub const ALL: [Self; 5] = [
        Self::Optimal,
        Self::Frugal,
        Self::Cautious,
        Self::Visionary,
        Self::Erratic,
    ];

    /// Short name used in CLI arguments and reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Optimal => "optimal",
            Self::Frugal => "frugal",
            Self::Cautious => "cautious",
            Self::Visionary => "visionary",
            Self::Erratic => "erratic",
        }
    }

    /// One-line description for `--list-strategies`.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Optimal => "picks the best weighted choice every step",
            Self::Frugal => "maximizes cost efficiency regardless of quadrant",
            Self::Cautious => "maximizes supply stability regardless of quadrant",
            Self::Visionary => "maximizes strategic value regardless of quadrant",
            Self::Erratic => "picks uniformly at random (seeded)",
        }
    }

    /// Parse a CLI token.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == name)
    }

    /// Pick one choice from a step's options. Ties resolve to the first
    /// offered choice, so every strategy is deterministic for a fixed
    /// RNG state.
    #[must_use]
    pub fn pick<'a>(
        self,
        quadrant: Quadrant,
        choices: &'a [ChoiceSpec],
        rng: &mut impl Rng,
    ) -> &'a ChoiceSpec {
        assert!(!choices.is_empty(), "a step must offer choices");
        match self {
            Self::Optimal => Self::argmax(choices, |c| {
                compute_weighted(c.scores, quadrant).weighted
            }),
            Self::Frugal => Self::argmax(choices, |c| f64::from(c.scores.ce)),
            Self::Cautious => Self::argmax(choices, |c| f64::from(c.scores.ss)),
            Self::Visionary => Self::argmax(choices, |c| f64::from(c.scores.sv)),
            Self::Erratic => &choices[rng.gen_range(0..choices.len())],
        }
    }

    fn argmax(choices: &[ChoiceSpec], key: impl Fn(&ChoiceSpec) -> f64) -> &ChoiceSpec {
        let mut best = &choices[0];
        let mut best_key = key(best);
        for choice in &choices[1..] {
            let candidate = key(choice);
            if candidate > best_key {
                best = choice;
                best_key = candidate;
            }
        }
        best
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

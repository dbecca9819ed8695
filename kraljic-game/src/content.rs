//! Scenario content catalog: the read-only lookup table of steps,
//! choices, and event responses the engine scores against.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::numbers::round_to_decimals;
use crate::quadrant::{Quadrant, STEPS_PER_QUADRANT};
use crate::scoring::{RawScore, ScoreError, compute_weighted};

/// Choices offered per scenario step and per event response.
pub const CHOICES_PER_STEP: usize = 3;

/// Learning feedback attached to a choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Feedback {
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub tradeoff: String,
    #[serde(default)]
    pub theory_connection: String,
}

/// One selectable choice with its fixed raw score tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceSpec {
    pub id: String,
    pub label: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub scores: RawScore,
    #[serde(default)]
    pub feedback: Feedback,
}

/// One scenario step with its three choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSpec {
    /// 1-based display number; stored rows use the 0-based index.
    pub step_number: usize,
    pub title: String,
    #[serde(default)]
    pub situation: String,
    pub choices: Vec<ChoiceSpec>,
}

/// Company framing shown before a quadrant scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CompanyBackground {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub item_description: String,
    #[serde(default)]
    pub annual_spend: String,
    #[serde(default)]
    pub key_metrics: Vec<String>,
    #[serde(default)]
    pub situation_briefing: String,
}

/// A full quadrant scenario: background plus four steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub quadrant: Quadrant,
    #[serde(default)]
    pub background: CompanyBackground,
    pub steps: Vec<StepSpec>,
}

/// One shock described in the event background.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EventShock {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub timeframe: String,
}

/// Framing for the disruptive event round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EventBackground {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub shocks: Vec<EventShock>,
}

/// Per-quadrant response set for the event round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventResponseSpec {
    pub quadrant: Quadrant,
    #[serde(default)]
    pub situation: String,
    pub choices: Vec<ChoiceSpec>,
}

/// The disruptive event: background plus one response set per quadrant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EventSpec {
    #[serde(default)]
    pub background: EventBackground,
    pub responses: Vec<EventResponseSpec>,
}

/// Complete content catalog: one scenario per quadrant plus the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Catalog {
    pub scenarios: Vec<ScenarioSpec>,
    #[serde(default)]
    pub event: EventSpec,
}

impl Catalog {
    /// Create an empty catalog (useful for tests).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a catalog from a JSON string and verify its shape.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or violates the
    /// fixed content shape (see [`Catalog::validate`]).
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Verify the fixed content shape: one scenario per quadrant, four
    /// steps each, three choices per step, one event response set per
    /// quadrant, unique choice ids, and in-range score tuples.
    ///
    /// # Errors
    ///
    /// Returns the first shape violation found.
    pub fn validate(&self) -> Result<(), ContentError> {
        let mut seen_ids = std::collections::HashSet::new();
        for quadrant in Quadrant::ORDER {
            let scenario = self
                .scenario(quadrant)
                .ok_or(ContentError::MissingScenario { quadrant })?;
            if scenario.steps.len() != STEPS_PER_QUADRANT {
                return Err(ContentError::StepCount {
                    quadrant,
                    count: scenario.steps.len(),
                });
            }
            for (index, step) in scenario.steps.iter().enumerate() {
                if step.step_number != index + 1 {
                    return Err(ContentError::StepNumberMismatch {
                        quadrant,
                        expected: index + 1,
                        found: step.step_number,
                    });
                }
                Self::validate_choices(&step.choices, quadrant, &mut seen_ids)?;
            }

            let response = self
                .event_response(quadrant)
                .ok_or(ContentError::MissingEventResponse { quadrant })?;
            Self::validate_choices(&response.choices, quadrant, &mut seen_ids)?;
        }
        Ok(())
    }

    fn validate_choices<'a>(
        choices: &'a [ChoiceSpec],
        quadrant: Quadrant,
        seen_ids: &mut std::collections::HashSet<&'a str>,
    ) -> Result<(), ContentError> {
        if choices.len() != CHOICES_PER_STEP {
            return Err(ContentError::ChoiceCount {
                quadrant,
                count: choices.len(),
            });
        }
        for choice in choices {
            if !seen_ids.insert(choice.id.as_str()) {
                return Err(ContentError::DuplicateChoiceId {
                    id: choice.id.clone(),
                });
            }
            choice
                .scores
                .validate()
                .map_err(|source| ContentError::InvalidScore {
                    choice_id: choice.id.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Scenario for a quadrant.
    #[must_use]
    pub fn scenario(&self, quadrant: Quadrant) -> Option<&ScenarioSpec> {
        self.scenarios.iter().find(|s| s.quadrant == quadrant)
    }

    /// Event response set for a quadrant.
    #[must_use]
    pub fn event_response(&self, quadrant: Quadrant) -> Option<&EventResponseSpec> {
        self.event.responses.iter().find(|r| r.quadrant == quadrant)
    }

    /// Resolve a step choice by `(quadrant, step index, choice id)`.
    /// Unknown identifiers return `None`; callers surface that as a
    /// content-not-found condition rather than defaulting.
    #[must_use]
    pub fn choice(&self, quadrant: Quadrant, step: usize, choice_id: &str) -> Option<&ChoiceSpec> {
        self.scenario(quadrant)?
            .steps
            .get(step)?
            .choices
            .iter()
            .find(|c| c.id == choice_id)
    }

    /// Resolve an event choice by `(quadrant, choice id)`.
    #[must_use]
    pub fn event_choice(&self, quadrant: Quadrant, choice_id: &str) -> Option<&ChoiceSpec> {
        self.event_response(quadrant)?
            .choices
            .iter()
            .find(|c| c.id == choice_id)
    }

    /// Best achievable weighted total for a quadrant, taking the highest
    /// weighted choice at every step. Computed from the catalog itself so
    /// content edits can never leave a stale maximum behind.
    #[must_use]
    pub fn max_weighted(&self, quadrant: Quadrant) -> f64 {
        let Some(scenario) = self.scenario(quadrant) else {
            return 0.0;
        };
        scenario
            .steps
            .iter()
            .map(|step| {
                step.choices
                    .iter()
                    .map(|choice| compute_weighted(choice.scores, quadrant).weighted)
                    .fold(0.0f64, f64::max)
            })
            .sum()
    }

    /// Normalize an achieved weighted total to a capped 0-100 scale
    /// against the best achievable total for the quadrant.
    #[must_use]
    pub fn normalize_score(&self, total_weighted: f64, quadrant: Quadrant) -> f64 {
        let max = self.max_weighted(quadrant);
        if max <= 0.0 {
            return 0.0;
        }
        round_to_decimals((total_weighted / max) * 100.0, 0).min(100.0)
    }
}

/// Errors raised when catalog content cannot be loaded or is malformed.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content JSON is invalid: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no scenario defined for quadrant {quadrant}")]
    MissingScenario { quadrant: Quadrant },
    #[error("quadrant {quadrant} must have {STEPS_PER_QUADRANT} steps (got {count})")]
    StepCount { quadrant: Quadrant, count: usize },
    #[error("quadrant {quadrant} step numbering broken (expected {expected}, found {found})")]
    StepNumberMismatch {
        quadrant: Quadrant,
        expected: usize,
        found: usize,
    },
    #[error("every step in quadrant {quadrant} must offer {CHOICES_PER_STEP} choices (got {count})")]
    ChoiceCount { quadrant: Quadrant, count: usize },
    #[error("choice id {id} appears more than once in the catalog")]
    DuplicateChoiceId { id: String },
    #[error("choice {choice_id} carries an invalid score: {source}")]
    InvalidScore {
        choice_id: String,
        source: ScoreError,
    },
    #[error("no event response set defined for quadrant {quadrant}")]
    MissingEventResponse { quadrant: Quadrant },
}

//! Kraljic Practice Simulation Engine
//!
//! Platform-agnostic scoring and session logic for the Kraljic matrix
//! procurement training game. This crate turns a participant's discrete
//! choices into weighted scores, quadrant totals, a final grade, a
//! cross-participant rank, and a dimension profile, without UI or
//! platform-specific dependencies.

pub mod aggregate;
pub mod content;
pub mod dashboard;
pub mod grade;
pub mod numbers;
pub mod persist;
pub mod playthrough;
pub mod profile;
pub mod quadrant;
pub mod rank;
pub mod scoring;

use chrono::{DateTime, Utc};
use thiserror::Error;

// Re-export commonly used types
pub use aggregate::{QuadrantResult, ScoredStep, aggregate_quadrant, optimal_score};
pub use content::{
    Catalog, ChoiceSpec, ContentError, EventResponseSpec, EventSpec, Feedback, ScenarioSpec,
    StepSpec,
};
pub use dashboard::{DashboardResult, EventResult, build_dashboard};
pub use grade::{Grade, GradeBands, SessionScore, score_session};
pub use persist::{
    EventSubmission, MemoryStore, MemoryStoreError, Session, SessionStore, Submission,
    latest_event_per_quadrant, latest_per_step,
};
pub use playthrough::{LocalEventSubmission, LocalSubmission, Phase, Playthrough};
pub use profile::{DimensionProfile, DimensionStat, build_profile};
pub use quadrant::{
    Dimension, DimensionWeights, ImpactLevel, Quadrant, QuadrantMeta, STEPS_PER_QUADRANT,
    WeightsError,
};
pub use rank::{RankSummary, SessionRecords, compute_rank};
pub use scoring::{RAW_SCORE_MAX, RAW_SCORE_MIN, RawScore, ScoreError, WeightedScore, compute_weighted};

/// Trait for abstracting content catalog loading.
/// Platform-specific implementations should provide this.
pub trait ContentSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the scenario content catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    fn load_catalog(&self) -> Result<Catalog, Self::Error>;
}

/// A catalog already in memory is its own source.
impl ContentSource for Catalog {
    type Error = std::convert::Infallible;

    fn load_catalog(&self) -> Result<Catalog, Self::Error> {
        Ok(self.clone())
    }
}

/// Errors surfaced by the engine's boundary operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("step index {step} out of range (max {max})")]
    StepOutOfRange { step: usize, max: usize },
    #[error("event submission requires at least one response")]
    EmptyResponses,
    #[error("session {id} not found")]
    SessionNotFound { id: String },
    #[error("unknown choice {choice_id} for quadrant {quadrant} step {step}")]
    ChoiceNotFound {
        quadrant: Quadrant,
        step: usize,
        choice_id: String,
    },
    #[error("unknown event choice {choice_id} for quadrant {quadrant}")]
    EventChoiceNotFound {
        quadrant: Quadrant,
        choice_id: String,
    },
    #[error("content source failed: {0}")]
    Content(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("storage failed: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl EngineError {
    fn content(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Content(Box::new(err))
    }

    fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Box::new(err))
    }
}

fn require_non_empty(value: &str, field: &'static str) -> Result<(), EngineError> {
    if value.trim().is_empty() {
        Err(EngineError::MissingField { field })
    } else {
        Ok(())
    }
}

/// Main engine binding a content source to a session store and exposing
/// the boundary operations: create a session, record choices, record the
/// event round, and assemble the dashboard.
pub struct SimulationEngine<C, S>
where
    C: ContentSource,
    S: SessionStore,
{
    content: C,
    store: S,
    bands: GradeBands,
}

impl<C, S> SimulationEngine<C, S>
where
    C: ContentSource,
    S: SessionStore,
{
    /// Create an engine with the canonical grade bands.
    pub fn new(content: C, store: S) -> Self {
        Self {
            content,
            store,
            bands: GradeBands::default(),
        }
    }

    /// Create an engine with an explicit grade banding policy.
    pub const fn with_bands(content: C, store: S, bands: GradeBands) -> Self {
        Self {
            content,
            store,
            bands,
        }
    }

    /// Grade banding policy in effect.
    #[must_use]
    pub const fn bands(&self) -> &GradeBands {
        &self.bands
    }

    /// Borrow the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    fn catalog(&self) -> Result<Catalog, EngineError> {
        self.content.load_catalog().map_err(EngineError::content)
    }

    fn require_session(&self, session_id: &str) -> Result<Session, EngineError> {
        require_non_empty(session_id, "sessionId")?;
        self.store
            .session(session_id)
            .map_err(EngineError::storage)?
            .ok_or_else(|| EngineError::SessionNotFound {
                id: session_id.to_string(),
            })
    }

    /// Create and persist a new session, stamped now.
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty identifiers, or a storage
    /// error if the row cannot be written.
    pub fn create_session(&self, id: &str, participant_name: &str) -> Result<Session, EngineError> {
        self.create_session_at(id, participant_name, Utc::now())
    }

    /// Create and persist a new session with an explicit creation time.
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty identifiers, or a storage
    /// error if the row cannot be written.
    pub fn create_session_at(
        &self,
        id: &str,
        participant_name: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Session, EngineError> {
        require_non_empty(id, "sessionId")?;
        require_non_empty(participant_name, "participantName")?;
        let session = Session {
            id: id.to_string(),
            participant_name: participant_name.to_string(),
            created_at,
            completed_at: None,
        };
        self.store
            .insert_session(&session)
            .map_err(EngineError::storage)?;
        log::debug!("created session {id} for {participant_name}");
        Ok(session)
    }

    /// Record one Layer-1 step choice, stamped now.
    ///
    /// # Errors
    ///
    /// See [`SimulationEngine::record_choice_at`].
    pub fn record_choice(
        &self,
        session_id: &str,
        quadrant: Quadrant,
        step: usize,
        choice_id: &str,
    ) -> Result<Submission, EngineError> {
        self.record_choice_at(
            session_id,
            quadrant,
            step,
            choice_id,
            Utc::now().timestamp_millis(),
        )
    }

    /// Record one Layer-1 step choice with an explicit timestamp. The
    /// choice's score tuple is resolved from the content catalog; an
    /// unknown identifier fails rather than defaulting.
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty/out-of-range fields, a
    /// not-found error for a missing session or unknown choice, or a
    /// storage error if the row cannot be appended.
    pub fn record_choice_at(
        &self,
        session_id: &str,
        quadrant: Quadrant,
        step: usize,
        choice_id: &str,
        timestamp_ms: i64,
    ) -> Result<Submission, EngineError> {
        require_non_empty(choice_id, "choiceId")?;
        if step >= STEPS_PER_QUADRANT {
            return Err(EngineError::StepOutOfRange {
                step,
                max: STEPS_PER_QUADRANT - 1,
            });
        }
        let session = self.require_session(session_id)?;
        let catalog = self.catalog()?;
        let choice =
            catalog
                .choice(quadrant, step, choice_id)
                .ok_or_else(|| EngineError::ChoiceNotFound {
                    quadrant,
                    step,
                    choice_id: choice_id.to_string(),
                })?;

        let row = Submission {
            session_id: session.id,
            quadrant,
            step,
            choice_id: choice.id.clone(),
            score: compute_weighted(choice.scores, quadrant),
            timestamp_ms,
        };
        self.store
            .append_submission(&row)
            .map_err(EngineError::storage)?;
        log::debug!(
            "recorded {quadrant} step {step} choice {choice_id} (weighted {:.2})",
            row.score.weighted
        );
        Ok(row)
    }

    /// Record the Layer-2 event responses and mark the session
    /// completed, stamped now.
    ///
    /// # Errors
    ///
    /// See [`SimulationEngine::record_event_responses_at`].
    pub fn record_event_responses(
        &self,
        session_id: &str,
        responses: &[(Quadrant, String)],
    ) -> Result<Vec<EventSubmission>, EngineError> {
        let now = Utc::now();
        self.record_event_responses_at(session_id, responses, now.timestamp_millis(), now)
    }

    /// Record the event responses with explicit timestamps. Every choice
    /// is resolved before anything is written, so an unknown identifier
    /// leaves the store untouched.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty response list, a
    /// not-found error for a missing session or unknown choice, or a
    /// storage error if a row cannot be appended.
    pub fn record_event_responses_at(
        &self,
        session_id: &str,
        responses: &[(Quadrant, String)],
        timestamp_ms: i64,
        completed_at: DateTime<Utc>,
    ) -> Result<Vec<EventSubmission>, EngineError> {
        if responses.is_empty() {
            return Err(EngineError::EmptyResponses);
        }
        let session = self.require_session(session_id)?;
        let catalog = self.catalog()?;

        let mut rows = Vec::with_capacity(responses.len());
        for (quadrant, choice_id) in responses {
            require_non_empty(choice_id, "choiceId")?;
            let choice = catalog.event_choice(*quadrant, choice_id).ok_or_else(|| {
                EngineError::EventChoiceNotFound {
                    quadrant: *quadrant,
                    choice_id: choice_id.clone(),
                }
            })?;
            rows.push(EventSubmission {
                session_id: session.id.clone(),
                quadrant: *quadrant,
                choice_id: choice.id.clone(),
                score: compute_weighted(choice.scores, *quadrant),
                timestamp_ms,
            });
        }

        for row in &rows {
            self.store
                .append_event_response(row)
                .map_err(EngineError::storage)?;
        }
        self.store
            .mark_completed(&session.id, completed_at)
            .map_err(EngineError::storage)?;
        log::debug!("session {session_id} completed with {} event responses", rows.len());
        Ok(rows)
    }

    /// Assemble the full dashboard for a session, including rank when at
    /// least two sessions qualify.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for a missing session or a storage
    /// error if rows cannot be read.
    pub fn dashboard(&self, session_id: &str) -> Result<DashboardResult, EngineError> {
        let session = self.require_session(session_id)?;
        let submissions = self
            .store
            .submissions(session_id)
            .map_err(EngineError::storage)?;
        let events = self
            .store
            .event_responses(session_id)
            .map_err(EngineError::storage)?;

        let rank = self.rank_of(session_id)?;
        Ok(build_dashboard(
            &session,
            &submissions,
            &events,
            &self.bands,
            rank,
        ))
    }

    fn rank_of(&self, session_id: &str) -> Result<Option<RankSummary>, EngineError> {
        let sessions = self.store.sessions().map_err(EngineError::storage)?;
        let mut all = Vec::with_capacity(sessions.len());
        for session in sessions {
            let submissions = self
                .store
                .submissions(&session.id)
                .map_err(EngineError::storage)?;
            let events = self
                .store
                .event_responses(&session.id)
                .map_err(EngineError::storage)?;
            all.push(SessionRecords {
                session,
                submissions,
                events,
            });
        }
        Ok(compute_rank(session_id, &all))
    }
}

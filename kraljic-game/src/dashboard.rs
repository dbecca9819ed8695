//! Dashboard assembly: the final aggregate result object handed to the
//! presentation layer.
//!
//! Pure functions over explicit inputs; the same computation runs off
//! durable rows or a local [`crate::playthrough::Playthrough`] snapshot.

use serde::{Deserialize, Serialize};

use crate::aggregate::{QuadrantResult, ScoredStep, aggregate_quadrant};
use crate::grade::{GradeBands, SessionScore, score_session};
use crate::persist::{
    EventSubmission, Session, Submission, latest_event_per_quadrant, latest_per_step,
};
use crate::profile::{DimensionProfile, build_profile};
use crate::quadrant::Quadrant;
use crate::rank::RankSummary;
use crate::scoring::WeightedScore;

/// Outcome of the event round for one quadrant. `None` fields mean the
/// quadrant was never answered; an unanswered quadrant contributes
/// nothing to Layer 2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventResult {
    pub quadrant: Quadrant,
    pub choice_id: Option<String>,
    pub score: Option<WeightedScore>,
}

/// The complete dashboard for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardResult {
    pub session_id: String,
    pub participant_name: String,
    pub score: SessionScore,
    /// One entry per quadrant, in canonical play order.
    pub quadrant_results: Vec<QuadrantResult>,
    /// One entry per quadrant, in canonical play order.
    pub event_results: Vec<EventResult>,
    pub dimension_profile: DimensionProfile,
    /// Omitted when fewer than two sessions qualify for ranking.
    pub rank: Option<RankSummary>,
}

/// Assemble the dashboard from a session and its (possibly duplicated)
/// stored rows. Rows are reduced under the last-confirmed-choice-wins
/// rule before any aggregation.
#[must_use]
pub fn build_dashboard(
    session: &Session,
    submissions: &[Submission],
    events: &[EventSubmission],
    bands: &GradeBands,
    rank: Option<RankSummary>,
) -> DashboardResult {
    let submissions = latest_per_step(submissions);
    let events = latest_event_per_quadrant(events);

    let quadrant_results: Vec<QuadrantResult> = Quadrant::ORDER
        .into_iter()
        .map(|quadrant| {
            let steps: Vec<ScoredStep> = submissions
                .iter()
                .filter(|row| row.quadrant == quadrant)
                .map(|row| ScoredStep {
                    step: row.step,
                    choice_id: row.choice_id.clone(),
                    score: row.score,
                })
                .collect();
            aggregate_quadrant(quadrant, &steps)
        })
        .collect();

    let event_results: Vec<EventResult> = Quadrant::ORDER
        .into_iter()
        .map(|quadrant| {
            let row = events.iter().find(|row| row.quadrant == quadrant);
            EventResult {
                quadrant,
                choice_id: row.map(|r| r.choice_id.clone()),
                score: row.map(|r| r.score),
            }
        })
        .collect();

    let event_scores: Vec<WeightedScore> =
        event_results.iter().filter_map(|r| r.score).collect();
    let score = score_session(&quadrant_results, &event_scores, bands);
    let dimension_profile = build_profile(&quadrant_results);

    DashboardResult {
        session_id: session.id.clone(),
        participant_name: session.participant_name.clone(),
        score,
        quadrant_results,
        event_results,
        dimension_profile,
        rank,
    }
}

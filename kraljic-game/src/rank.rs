//! Cross-participant ranking: ordinal position before and after the
//! event round, computed over every stored session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::numbers::round2;
use crate::persist::{EventSubmission, Session, Submission, latest_event_per_quadrant, latest_per_step};

/// One stored session with its rows, as fetched for ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecords {
    pub session: Session,
    pub submissions: Vec<Submission>,
    pub events: Vec<EventSubmission>,
}

/// Ordinal leaderboard position for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankSummary {
    /// 1-based position when sorted by Layer-1 score only.
    pub before: usize,
    /// 1-based position when sorted by final score.
    pub after: usize,
    /// Number of qualifying sessions ranked.
    pub total: usize,
}

#[derive(Debug, Clone)]
struct ScoredSession {
    id: String,
    created_at: DateTime<Utc>,
    layer1: f64,
    final_score: f64,
}

/// Compute the target session's rank among all qualifying sessions
/// (those with at least one submission). Returns `None` when fewer than
/// two sessions qualify, or when the target itself does not qualify.
///
/// Ties break deterministically: score descending, then session
/// creation time ascending, then session id ascending.
#[must_use]
pub fn compute_rank(target_session_id: &str, all: &[SessionRecords]) -> Option<RankSummary> {
    let scored: Vec<ScoredSession> = all
        .iter()
        .filter(|records| !records.submissions.is_empty())
        .map(score_records)
        .collect();

    if scored.len() < 2 {
        return None;
    }

    let before = position_by(&scored, target_session_id, |s| s.layer1)?;
    let after = position_by(&scored, target_session_id, |s| s.final_score)?;

    Some(RankSummary {
        before,
        after,
        total: scored.len(),
    })
}

fn score_records(records: &SessionRecords) -> ScoredSession {
    let submissions = latest_per_step(&records.submissions);
    let events = latest_event_per_quadrant(&records.events);
    let layer1 = round2(submissions.iter().map(|r| r.score.weighted).sum());
    let layer2 = round2(events.iter().map(|r| r.score.weighted).sum());
    ScoredSession {
        id: records.session.id.clone(),
        created_at: records.session.created_at,
        layer1,
        final_score: round2(layer1 + layer2),
    }
}

fn position_by(
    scored: &[ScoredSession],
    target_id: &str,
    key: impl Fn(&ScoredSession) -> f64,
) -> Option<usize> {
    let mut ordered: Vec<&ScoredSession> = scored.iter().collect();
    ordered.sort_by(|a, b| {
        key(b)
            .partial_cmp(&key(a))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
    ordered
        .iter()
        .position(|s| s.id == target_id)
        .map(|index| index + 1)
}

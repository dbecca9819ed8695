//! Persistence model and storage abstraction: sessions, append-only
//! submission rows, and the de-duplication rule every reader applies.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::quadrant::Quadrant;
use crate::scoring::WeightedScore;

/// One participant playthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub participant_name: String,
    pub created_at: DateTime<Utc>,
    /// Set exactly once, when the event round is submitted.
    pub completed_at: Option<DateTime<Utc>>,
}

/// One Layer-1 step choice. Append-only: a later row for the same
/// (session, quadrant, step) supersedes earlier ones at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub session_id: String,
    pub quadrant: Quadrant,
    /// 0-based step index.
    pub step: usize,
    pub choice_id: String,
    pub score: WeightedScore,
    /// Epoch milliseconds; orders duplicate rows for last-write-wins.
    pub timestamp_ms: i64,
}

/// One Layer-2 event response. Keyed by (session, quadrant) only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSubmission {
    pub session_id: String,
    pub quadrant: Quadrant,
    pub choice_id: String,
    pub score: WeightedScore,
    pub timestamp_ms: i64,
}

/// Durable storage boundary for sessions and their rows.
/// Platform-specific implementations should provide this.
pub trait SessionStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist a new session row.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written or the id
    /// already exists.
    fn insert_session(&self, session: &Session) -> Result<(), Self::Error>;

    /// Fetch one session by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn session(&self, id: &str) -> Result<Option<Session>, Self::Error>;

    /// Fetch every session.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn sessions(&self) -> Result<Vec<Session>, Self::Error>;

    /// Set the completion time of a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session does not exist or cannot be
    /// updated.
    fn mark_completed(&self, id: &str, at: DateTime<Utc>) -> Result<(), Self::Error>;

    /// Append one submission row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be written.
    fn append_submission(&self, row: &Submission) -> Result<(), Self::Error>;

    /// Fetch all submission rows for a session, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn submissions(&self, session_id: &str) -> Result<Vec<Submission>, Self::Error>;

    /// Append one event-response row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be written.
    fn append_event_response(&self, row: &EventSubmission) -> Result<(), Self::Error>;

    /// Fetch all event-response rows for a session, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn event_responses(&self, session_id: &str) -> Result<Vec<EventSubmission>, Self::Error>;
}

/// Last confirmed choice wins: reduce append-only submission rows to at
/// most one per (quadrant, step). The most recent `timestamp_ms` wins;
/// insertion order breaks exact ties. Output is ordered by quadrant
/// play order, then step index.
#[must_use]
pub fn latest_per_step(rows: &[Submission]) -> Vec<Submission> {
    let mut latest: HashMap<(Quadrant, usize), &Submission> = HashMap::new();
    for row in rows {
        match latest.get(&(row.quadrant, row.step)) {
            Some(current) if current.timestamp_ms > row.timestamp_ms => {}
            _ => {
                latest.insert((row.quadrant, row.step), row);
            }
        }
    }
    let mut rows: Vec<Submission> = latest.into_values().cloned().collect();
    rows.sort_by_key(|r| (quadrant_order_index(r.quadrant), r.step));
    rows
}

/// Event-round counterpart of [`latest_per_step`], keyed by quadrant.
#[must_use]
pub fn latest_event_per_quadrant(rows: &[EventSubmission]) -> Vec<EventSubmission> {
    let mut latest: HashMap<Quadrant, &EventSubmission> = HashMap::new();
    for row in rows {
        match latest.get(&row.quadrant) {
            Some(current) if current.timestamp_ms > row.timestamp_ms => {}
            _ => {
                latest.insert(row.quadrant, row);
            }
        }
    }
    let mut rows: Vec<EventSubmission> = latest.into_values().cloned().collect();
    rows.sort_by_key(|r| quadrant_order_index(r.quadrant));
    rows
}

fn quadrant_order_index(quadrant: Quadrant) -> usize {
    Quadrant::ORDER
        .iter()
        .position(|&q| q == quadrant)
        .unwrap_or(Quadrant::ORDER.len())
}

/// In-memory [`SessionStore`] used by the simulation driver and tests.
/// Clones share the same underlying rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    sessions: Vec<Session>,
    submissions: Vec<Submission>,
    events: Vec<EventSubmission>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_session(inner: &MemoryStoreInner, id: &str) -> Result<(), MemoryStoreError> {
        if inner.sessions.iter().any(|s| s.id == id) {
            Ok(())
        } else {
            Err(MemoryStoreError::UnknownSession { id: id.to_string() })
        }
    }
}

/// Errors raised by the in-memory store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryStoreError {
    #[error("session {id} already exists")]
    DuplicateSession { id: String },
    #[error("session {id} does not exist")]
    UnknownSession { id: String },
}

impl SessionStore for MemoryStore {
    type Error = MemoryStoreError;

    fn insert_session(&self, session: &Session) -> Result<(), Self::Error> {
        let mut inner = self.inner.borrow_mut();
        if inner.sessions.iter().any(|s| s.id == session.id) {
            return Err(MemoryStoreError::DuplicateSession {
                id: session.id.clone(),
            });
        }
        inner.sessions.push(session.clone());
        Ok(())
    }

    fn session(&self, id: &str) -> Result<Option<Session>, Self::Error> {
        Ok(self
            .inner
            .borrow()
            .sessions
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    fn sessions(&self) -> Result<Vec<Session>, Self::Error> {
        Ok(self.inner.borrow().sessions.clone())
    }

    fn mark_completed(&self, id: &str, at: DateTime<Utc>) -> Result<(), Self::Error> {
        let mut inner = self.inner.borrow_mut();
        let session = inner
            .sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| MemoryStoreError::UnknownSession { id: id.to_string() })?;
        if session.completed_at.is_none() {
            session.completed_at = Some(at);
        }
        Ok(())
    }

    fn append_submission(&self, row: &Submission) -> Result<(), Self::Error> {
        let mut inner = self.inner.borrow_mut();
        Self::ensure_session(&inner, &row.session_id)?;
        inner.submissions.push(row.clone());
        Ok(())
    }

    fn submissions(&self, session_id: &str) -> Result<Vec<Submission>, Self::Error> {
        Ok(self
            .inner
            .borrow()
            .submissions
            .iter()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect())
    }

    fn append_event_response(&self, row: &EventSubmission) -> Result<(), Self::Error> {
        let mut inner = self.inner.borrow_mut();
        Self::ensure_session(&inner, &row.session_id)?;
        inner.events.push(row.clone());
        Ok(())
    }

    fn event_responses(&self, session_id: &str) -> Result<Vec<EventSubmission>, Self::Error> {
        Ok(self
            .inner
            .borrow()
            .events
            .iter()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::RawScore;
    use chrono::TimeZone;

    fn session(id: &str) -> Session {
        Session {
            id: id.to_string(),
            participant_name: "Alex".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
            completed_at: None,
        }
    }

    fn submission(quadrant: Quadrant, step: usize, choice: &str, timestamp_ms: i64) -> Submission {
        Submission {
            session_id: "s1".to_string(),
            quadrant,
            step,
            choice_id: choice.to_string(),
            score: WeightedScore {
                raw: RawScore::new(3, 3, 3).unwrap(),
                weighted: 3.0,
            },
            timestamp_ms,
        }
    }

    #[test]
    fn store_round_trips_sessions_and_rows() {
        let store = MemoryStore::new();
        store.insert_session(&session("s1")).unwrap();
        store
            .append_submission(&submission(Quadrant::Bottleneck, 0, "a", 1))
            .unwrap();

        let fetched = store.session("s1").unwrap().unwrap();
        assert_eq!(fetched.participant_name, "Alex");
        assert!(store.session("missing").unwrap().is_none());
        assert_eq!(store.submissions("s1").unwrap().len(), 1);
        assert!(store.submissions("other").unwrap().is_empty());
    }

    #[test]
    fn duplicate_session_ids_are_rejected() {
        let store = MemoryStore::new();
        store.insert_session(&session("s1")).unwrap();
        assert_eq!(
            store.insert_session(&session("s1")),
            Err(MemoryStoreError::DuplicateSession {
                id: "s1".to_string()
            })
        );
    }

    #[test]
    fn rows_require_an_existing_session() {
        let store = MemoryStore::new();
        let result = store.append_submission(&submission(Quadrant::Leverage, 0, "a", 1));
        assert!(matches!(
            result,
            Err(MemoryStoreError::UnknownSession { .. })
        ));
    }

    #[test]
    fn completion_time_is_set_exactly_once() {
        let store = MemoryStore::new();
        store.insert_session(&session("s1")).unwrap();
        let first = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2026, 3, 1, 11, 0, 0).unwrap();
        store.mark_completed("s1", first).unwrap();
        store.mark_completed("s1", second).unwrap();
        let fetched = store.session("s1").unwrap().unwrap();
        assert_eq!(fetched.completed_at, Some(first));
    }

    #[test]
    fn latest_per_step_keeps_most_recent_choice() {
        let rows = vec![
            submission(Quadrant::Bottleneck, 0, "first", 100),
            submission(Quadrant::Bottleneck, 1, "other", 150),
            submission(Quadrant::Bottleneck, 0, "resubmitted", 200),
        ];
        let deduped = latest_per_step(&rows);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].choice_id, "resubmitted");
        assert_eq!(deduped[1].choice_id, "other");
    }

    #[test]
    fn latest_per_step_breaks_timestamp_ties_by_insertion_order() {
        let rows = vec![
            submission(Quadrant::Strategic, 2, "earlier-row", 500),
            submission(Quadrant::Strategic, 2, "later-row", 500),
        ];
        let deduped = latest_per_step(&rows);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].choice_id, "later-row");
    }

    #[test]
    fn latest_per_step_orders_by_quadrant_then_step() {
        let rows = vec![
            submission(Quadrant::Noncritical, 1, "n1", 1),
            submission(Quadrant::Bottleneck, 3, "b3", 1),
            submission(Quadrant::Bottleneck, 0, "b0", 1),
        ];
        let deduped = latest_per_step(&rows);
        let ids: Vec<&str> = deduped.iter().map(|r| r.choice_id.as_str()).collect();
        assert_eq!(ids, vec!["b0", "b3", "n1"]);
    }

    #[test]
    fn latest_event_per_quadrant_dedupes_and_orders() {
        let event = |quadrant, choice: &str, timestamp_ms| EventSubmission {
            session_id: "s1".to_string(),
            quadrant,
            choice_id: choice.to_string(),
            score: WeightedScore {
                raw: RawScore::new(3, 3, 3).unwrap(),
                weighted: 3.0,
            },
            timestamp_ms,
        };
        let rows = vec![
            event(Quadrant::Leverage, "old", 10),
            event(Quadrant::Bottleneck, "b", 10),
            event(Quadrant::Leverage, "new", 20),
        ];
        let deduped = latest_event_per_quadrant(&rows);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].quadrant, Quadrant::Bottleneck);
        assert_eq!(deduped[1].choice_id, "new");
    }
}

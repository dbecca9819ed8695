//! Client-side playthrough state: the write-ahead record of a
//! participant's progress that is reconciled with the durable store.
//!
//! Scoring never reads this state directly; it converts to the same row
//! shapes the store returns, so results are identical whichever source
//! supplied the data.

use serde::{Deserialize, Serialize};

use crate::persist::{EventSubmission, Submission, latest_per_step};
use crate::quadrant::{Quadrant, STEPS_PER_QUADRANT};
use crate::scoring::WeightedScore;

/// Where in the playthrough the participant currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Landing,
    /// Layer 1: playing through the quadrant scenarios.
    Scenario,
    /// Layer 2: responding to the disruptive event.
    Event,
    /// Viewing final results.
    Dashboard,
}

/// One locally recorded step choice (not yet necessarily durable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalSubmission {
    pub quadrant: Quadrant,
    pub step: usize,
    pub choice_id: String,
    pub score: WeightedScore,
    pub timestamp_ms: i64,
}

/// One locally recorded event response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalEventSubmission {
    pub quadrant: Quadrant,
    pub choice_id: String,
    pub score: WeightedScore,
    pub timestamp_ms: i64,
}

/// Progress summary for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub quadrant_index: usize,
    pub step_index: usize,
    pub total_steps: usize,
}

/// A participant's in-flight playthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Playthrough {
    pub session_id: Option<String>,
    pub participant_name: String,
    pub phase: Phase,
    current_quadrant_index: usize,
    current_step: usize,
    submissions: Vec<LocalSubmission>,
    event_submissions: Vec<LocalEventSubmission>,
}

impl Playthrough {
    /// Fresh state on the landing screen.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a playthrough: binds the session identity and moves to the
    /// first step of the first quadrant.
    pub fn start(&mut self, session_id: String, participant_name: String) {
        *self = Self {
            session_id: Some(session_id),
            participant_name,
            phase: Phase::Scenario,
            ..Self::default()
        };
    }

    /// Quadrant currently being played.
    #[must_use]
    pub fn current_quadrant(&self) -> Quadrant {
        Quadrant::ORDER[self.current_quadrant_index.min(Quadrant::ORDER.len() - 1)]
    }

    /// 0-based step index within the current quadrant.
    #[must_use]
    pub const fn current_step(&self) -> usize {
        self.current_step
    }

    /// Record a confirmed step choice.
    pub fn record_choice(&mut self, record: LocalSubmission) {
        self.submissions.push(record);
    }

    /// Record a confirmed event response.
    pub fn record_event_response(&mut self, record: LocalEventSubmission) {
        self.event_submissions.push(record);
    }

    /// Advance to the next step, staying on the last step once reached;
    /// the caller decides when to move on to the next quadrant.
    pub fn next_step(&mut self) {
        self.current_step = (self.current_step + 1).min(STEPS_PER_QUADRANT - 1);
    }

    /// Advance to the next quadrant and reset the step cursor. Stays on
    /// the last quadrant once all are complete.
    pub fn next_quadrant(&mut self) {
        if self.current_quadrant_index + 1 < Quadrant::ORDER.len() {
            self.current_quadrant_index += 1;
            self.current_step = 0;
        }
    }

    /// Move to the event round.
    pub fn go_to_event(&mut self) {
        self.phase = Phase::Event;
    }

    /// Move to the dashboard.
    pub fn go_to_dashboard(&mut self) {
        self.phase = Phase::Dashboard;
    }

    /// All locally recorded choices for one quadrant.
    #[must_use]
    pub fn quadrant_submissions(&self, quadrant: Quadrant) -> Vec<&LocalSubmission> {
        self.submissions
            .iter()
            .filter(|s| s.quadrant == quadrant)
            .collect()
    }

    /// Whether every step of a quadrant has at least one recorded
    /// choice. Re-submissions of the same step do not count twice.
    #[must_use]
    pub fn is_quadrant_complete(&self, quadrant: Quadrant) -> bool {
        let mut seen = [false; STEPS_PER_QUADRANT];
        for submission in self.submissions.iter().filter(|s| s.quadrant == quadrant) {
            if let Some(slot) = seen.get_mut(submission.step) {
                *slot = true;
            }
        }
        seen.iter().all(|&s| s)
    }

    /// Current position for progress display.
    #[must_use]
    pub const fn progress(&self) -> Progress {
        Progress {
            quadrant_index: self.current_quadrant_index,
            step_index: self.current_step,
            total_steps: Quadrant::ORDER.len() * STEPS_PER_QUADRANT,
        }
    }

    /// Convert local submissions into durable rows for reconciliation
    /// with a [`crate::persist::SessionStore`], already de-duplicated
    /// under the last-confirmed-choice-wins rule.
    #[must_use]
    pub fn submissions_for_store(&self, session_id: &str) -> Vec<Submission> {
        let rows: Vec<Submission> = self
            .submissions
            .iter()
            .map(|s| Submission {
                session_id: session_id.to_string(),
                quadrant: s.quadrant,
                step: s.step,
                choice_id: s.choice_id.clone(),
                score: s.score,
                timestamp_ms: s.timestamp_ms,
            })
            .collect();
        latest_per_step(&rows)
    }

    /// Convert local event responses into durable rows.
    #[must_use]
    pub fn events_for_store(&self, session_id: &str) -> Vec<EventSubmission> {
        self.event_submissions
            .iter()
            .map(|s| EventSubmission {
                session_id: session_id.to_string(),
                quadrant: s.quadrant,
                choice_id: s.choice_id.clone(),
                score: s.score,
                timestamp_ms: s.timestamp_ms,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::RawScore;

    fn local(quadrant: Quadrant, step: usize, choice: &str, timestamp_ms: i64) -> LocalSubmission {
        LocalSubmission {
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
    fn start_resets_state_and_enters_scenario_phase() {
        let mut play = Playthrough::new();
        assert_eq!(play.phase, Phase::Landing);
        play.record_choice(local(Quadrant::Leverage, 0, "stale", 1));

        play.start("s1".to_string(), "Alex".to_string());
        assert_eq!(play.phase, Phase::Scenario);
        assert_eq!(play.current_quadrant(), Quadrant::Bottleneck);
        assert_eq!(play.current_step(), 0);
        assert!(play.quadrant_submissions(Quadrant::Leverage).is_empty());
    }

    #[test]
    fn step_cursor_saturates_at_last_step() {
        let mut play = Playthrough::new();
        play.start("s1".to_string(), "Alex".to_string());
        for _ in 0..10 {
            play.next_step();
        }
        assert_eq!(play.current_step(), STEPS_PER_QUADRANT - 1);
    }

    #[test]
    fn quadrant_cursor_advances_in_play_order_and_saturates() {
        let mut play = Playthrough::new();
        play.start("s1".to_string(), "Alex".to_string());
        play.next_step();
        play.next_quadrant();
        assert_eq!(play.current_quadrant(), Quadrant::Leverage);
        assert_eq!(play.current_step(), 0);
        for _ in 0..10 {
            play.next_quadrant();
        }
        assert_eq!(play.current_quadrant(), Quadrant::Noncritical);
    }

    #[test]
    fn completion_requires_every_step_once() {
        let mut play = Playthrough::new();
        play.start("s1".to_string(), "Alex".to_string());
        for step in 0..3 {
            play.record_choice(local(Quadrant::Bottleneck, step, "a", 1));
        }
        // Step 0 resubmitted; step 3 still missing.
        play.record_choice(local(Quadrant::Bottleneck, 0, "b", 2));
        assert!(!play.is_quadrant_complete(Quadrant::Bottleneck));

        play.record_choice(local(Quadrant::Bottleneck, 3, "c", 3));
        assert!(play.is_quadrant_complete(Quadrant::Bottleneck));
    }

    #[test]
    fn phase_transitions_follow_play_order() {
        let mut play = Playthrough::new();
        play.start("s1".to_string(), "Alex".to_string());
        play.go_to_event();
        assert_eq!(play.phase, Phase::Event);
        play.go_to_dashboard();
        assert_eq!(play.phase, Phase::Dashboard);
    }

    #[test]
    fn store_conversion_applies_last_write_wins() {
        let mut play = Playthrough::new();
        play.start("s1".to_string(), "Alex".to_string());
        play.record_choice(local(Quadrant::Bottleneck, 0, "first", 100));
        play.record_choice(local(Quadrant::Bottleneck, 0, "final", 200));
        let rows = play.submissions_for_store("s1");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].choice_id, "final");
        assert_eq!(rows[0].session_id, "s1");
    }

    #[test]
    fn progress_reports_sixteen_total_steps() {
        let play = Playthrough::new();
        let progress = play.progress();
        assert_eq!(progress.total_steps, 16);
        assert_eq!(progress.quadrant_index, 0);
    }
}

//! Seeded multi-participant simulation over the scoring engine.

use anyhow::{Context, Result, ensure};
use chrono::{Duration, Utc};
use colored::Colorize;
use kraljic_game::{
    Catalog, DashboardResult, MemoryStore, Quadrant, SimulationEngine,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::catalog::demo_catalog;
use crate::strategy::Strategy;

/// Parameters of one simulation run.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub participants: usize,
    pub seed: u64,
    pub strategies: Vec<Strategy>,
    pub verbose: bool,
}

/// One participant's complete playthrough result.
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantOutcome {
    pub participant: String,
    pub strategy: Strategy,
    pub session_id: String,
    pub dashboard: DashboardResult,
}

/// Play `participants` full sessions against a fresh in-memory store and
/// return their dashboards. Strategies are assigned round-robin; the
/// per-participant RNG derives from the run seed, so a (seed,
/// participants, strategies) triple always reproduces the same scores.
///
/// # Errors
///
/// Returns an error when the configuration is empty or an engine
/// operation fails.
pub fn run_simulation(config: &SimulationConfig) -> Result<Vec<ParticipantOutcome>> {
    ensure!(config.participants > 0, "at least one participant required");
    ensure!(!config.strategies.is_empty(), "at least one strategy required");

    let catalog = demo_catalog();
    let engine = SimulationEngine::new(catalog.clone(), MemoryStore::new());
    let started_at = Utc::now();
    let base_ms = started_at.timestamp_millis();

    let mut roster = Vec::with_capacity(config.participants);
    for index in 0..config.participants {
        let strategy = config.strategies[index % config.strategies.len()];
        let session_id = format!("sim-{:04}", index + 1);
        let participant = format!("{}-{:02}", strategy.label(), index + 1);
        if config.verbose {
            println!(
                "🎯 {} plays as {}",
                participant.bright_white(),
                strategy.label().cyan()
            );
        }
        play_session(
            &engine,
            &catalog,
            &session_id,
            &participant,
            strategy,
            config.seed,
            index,
            base_ms,
            started_at,
        )?;
        roster.push((participant, strategy, session_id));
    }

    // Dashboards are collected after every session exists, so each one
    // ranks against the full field.
    let mut outcomes = Vec::with_capacity(roster.len());
    for (participant, strategy, session_id) in roster {
        let dashboard = engine
            .dashboard(&session_id)
            .with_context(|| format!("dashboard for {session_id}"))?;
        outcomes.push(ParticipantOutcome {
            participant,
            strategy,
            session_id,
            dashboard,
        });
    }
    Ok(outcomes)
}

#[allow(clippy::too_many_arguments)]
fn play_session(
    engine: &SimulationEngine<Catalog, MemoryStore>,
    catalog: &Catalog,
    session_id: &str,
    participant: &str,
    strategy: Strategy,
    seed: u64,
    index: usize,
    base_ms: i64,
    started_at: chrono::DateTime<Utc>,
) -> Result<()> {
    let offset = i64::try_from(index).unwrap_or(0);
    let mut rng =
        ChaCha8Rng::seed_from_u64(seed.wrapping_add(u64::try_from(index).unwrap_or(u64::MAX)));

    engine
        .create_session_at(
            session_id,
            participant,
            started_at + Duration::seconds(offset),
        )
        .with_context(|| format!("creating session {session_id}"))?;

    let mut tick = 0i64;
    for quadrant in Quadrant::ORDER {
        let scenario = catalog
            .scenario(quadrant)
            .with_context(|| format!("no scenario for {quadrant}"))?;
        for (step_index, step) in scenario.steps.iter().enumerate() {
            let choice = strategy.pick(quadrant, &step.choices, &mut rng);
            tick += 1;
            engine
                .record_choice_at(session_id, quadrant, step_index, &choice.id, base_ms + tick)
                .with_context(|| format!("recording {quadrant} step {step_index}"))?;
        }
    }

    let mut responses = Vec::with_capacity(Quadrant::ORDER.len());
    for quadrant in Quadrant::ORDER {
        let spec = catalog
            .event_response(quadrant)
            .with_context(|| format!("no event response set for {quadrant}"))?;
        let choice = strategy.pick(quadrant, &spec.choices, &mut rng);
        responses.push((quadrant, choice.id.clone()));
    }
    tick += 1;
    engine
        .record_event_responses_at(
            session_id,
            &responses,
            base_ms + tick,
            started_at + Duration::seconds(offset) + Duration::minutes(30),
        )
        .with_context(|| format!("recording event round for {session_id}"))?;
    Ok(())
}

//! End-to-end engine coverage: full playthroughs, leaderboard ranking,
//! re-submission handling, and local-state reconciliation.

use chrono::{DateTime, TimeZone, Utc};
use kraljic_game::content::{CompanyBackground, EventBackground};
use kraljic_game::{
    Catalog, ChoiceSpec, EventResponseSpec, EventSpec, Feedback, Grade, GradeBands,
    LocalEventSubmission, LocalSubmission, MemoryStore, Playthrough, Quadrant, RawScore,
    STEPS_PER_QUADRANT, ScenarioSpec, SessionStore, SimulationEngine, StepSpec, build_dashboard,
    compute_weighted,
};

fn choice(id: &str, ce: u8, ss: u8, sv: u8) -> ChoiceSpec {
    ChoiceSpec {
        id: id.to_string(),
        label: id.chars().last().unwrap_or('A').to_string(),
        title: format!("Option {id}"),
        description: String::new(),
        scores: RawScore::new(ce, ss, sv).unwrap(),
        feedback: Feedback::default(),
    }
}

fn catalog() -> Catalog {
    let scenarios = Quadrant::ORDER
        .into_iter()
        .map(|quadrant| ScenarioSpec {
            quadrant,
            background: CompanyBackground::default(),
            steps: (1..=STEPS_PER_QUADRANT)
                .map(|n| StepSpec {
                    step_number: n,
                    title: format!("Step {n}"),
                    situation: String::new(),
                    choices: vec![
                        choice(&format!("{quadrant}_step{n}_A"), 2, 4, 3),
                        choice(&format!("{quadrant}_step{n}_B"), 4, 2, 2),
                        choice(&format!("{quadrant}_step{n}_C"), 3, 3, 4),
                    ],
                })
                .collect(),
        })
        .collect();
    let responses = Quadrant::ORDER
        .into_iter()
        .map(|quadrant| EventResponseSpec {
            quadrant,
            situation: String::new(),
            choices: vec![
                choice(&format!("event_{quadrant}_A"), 3, 3, 3),
                choice(&format!("event_{quadrant}_B"), 4, 2, 3),
                choice(&format!("event_{quadrant}_C"), 2, 4, 4),
            ],
        })
        .collect();
    let catalog = Catalog {
        scenarios,
        event: EventSpec {
            background: EventBackground::default(),
            responses,
        },
    };
    catalog.validate().unwrap();
    catalog
}

fn engine() -> SimulationEngine<Catalog, MemoryStore> {
    SimulationEngine::new(catalog(), MemoryStore::new())
}

fn created(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 14, minute, 0).unwrap()
}

fn play_session(
    engine: &SimulationEngine<Catalog, MemoryStore>,
    id: &str,
    minute: u32,
    step_label: char,
    event_label: char,
) {
    engine
        .create_session_at(id, &format!("Participant {id}"), created(minute))
        .unwrap();
    for quadrant in Quadrant::ORDER {
        for step in 0..STEPS_PER_QUADRANT {
            let choice_id = format!("{quadrant}_step{}_{step_label}", step + 1);
            engine
                .record_choice_at(id, quadrant, step, &choice_id, 1_000)
                .unwrap();
        }
    }
    let responses: Vec<(Quadrant, String)> = Quadrant::ORDER
        .into_iter()
        .map(|q| (q, format!("event_{q}_{event_label}")))
        .collect();
    engine
        .record_event_responses_at(id, &responses, 2_000, created(minute + 20))
        .unwrap();
}

#[test]
fn full_playthrough_produces_expected_dashboard() {
    let engine = engine();
    play_session(&engine, "alpha", 0, 'A', 'C');

    let dashboard = engine.dashboard("alpha").unwrap();

    // Choice A = raw (2,4,3) in every quadrant; event C = raw (2,4,4).
    assert!((dashboard.score.layer1 - 47.0).abs() < 1e-9);
    assert!((dashboard.score.layer2 - 13.2).abs() < 1e-9);
    assert!((dashboard.score.final_score - 60.2).abs() < 1e-9);
    assert_eq!(dashboard.score.grade, Grade::Good);

    let bottleneck = &dashboard.quadrant_results[0];
    assert!((bottleneck.total_weighted - 13.2).abs() < 1e-9);
    assert!((bottleneck.optimal_score - 20.0).abs() < 1e-9);
    assert!((bottleneck.percent_of_optimal - 66.0).abs() < 1e-9);
    assert_eq!(bottleneck.choice_ids.len(), 4);

    let profile = &dashboard.dimension_profile;
    assert_eq!(profile.ce.total, 32);
    assert_eq!(profile.ss.total, 64);
    assert_eq!(profile.sv.total, 48);
    assert!((profile.ss.average - 4.0).abs() < 1e-9);
    assert_eq!(profile.strongest, kraljic_game::Dimension::Ss);
    assert_eq!(profile.weakest, kraljic_game::Dimension::Ce);

    for event in &dashboard.event_results {
        assert!(event.score.is_some());
    }
}

#[test]
fn leaderboard_ranks_sessions_before_and_after_event() {
    let engine = engine();
    play_session(&engine, "alpha", 0, 'A', 'C');
    play_session(&engine, "beta", 1, 'B', 'A');

    let alpha = engine.dashboard("alpha").unwrap().rank.unwrap();
    let beta = engine.dashboard("beta").unwrap().rank.unwrap();

    // alpha layer1 47.0 beats beta 43.2; alpha final 60.2 beats 55.2.
    assert_eq!(alpha.before, 1);
    assert_eq!(alpha.after, 1);
    assert_eq!(alpha.total, 2);
    assert_eq!(beta.before, 2);
    assert_eq!(beta.after, 2);
}

#[test]
fn resubmitting_a_step_replaces_its_contribution() {
    let engine = engine();
    play_session(&engine, "alpha", 0, 'A', 'C');

    // Step 1 of bottleneck re-confirmed later with choice B (weighted 2.4).
    engine
        .record_choice_at("alpha", Quadrant::Bottleneck, 0, "bottleneck_step1_B", 9_000)
        .unwrap();

    let dashboard = engine.dashboard("alpha").unwrap();
    let bottleneck = &dashboard.quadrant_results[0];
    assert_eq!(bottleneck.step_scores.len(), 4);
    assert!((bottleneck.total_weighted - (13.2 - 3.3 + 2.4)).abs() < 1e-9);
    assert_eq!(bottleneck.choice_ids[0], "bottleneck_step1_B");
    // Raw store still holds every appended row.
    assert_eq!(engine.store().submissions("alpha").unwrap().len(), 17);
}

#[test]
fn partially_played_session_still_produces_a_dashboard() {
    let engine = engine();
    engine
        .create_session_at("solo", "Sol", created(0))
        .unwrap();
    engine
        .record_choice_at("solo", Quadrant::Bottleneck, 0, "bottleneck_step1_A", 100)
        .unwrap();
    engine
        .record_choice_at("solo", Quadrant::Bottleneck, 1, "bottleneck_step2_C", 200)
        .unwrap();

    let dashboard = engine.dashboard("solo").unwrap();
    let bottleneck = &dashboard.quadrant_results[0];
    // 3.3 + 3.3 over two steps; remaining quadrants are empty, not errors.
    assert!((bottleneck.total_weighted - 6.6).abs() < 1e-9);
    assert!((dashboard.quadrant_results[1].total_weighted - 0.0).abs() < 1e-9);
    assert!(dashboard.event_results.iter().all(|e| e.score.is_none()));
    assert!(dashboard.rank.is_none());
}

#[test]
fn local_playthrough_reconciles_to_identical_scores() {
    let engine = engine();
    play_session(&engine, "alpha", 0, 'A', 'C');
    let durable = engine.dashboard("alpha").unwrap();

    // Replay the same choices into client-side state only.
    let content = catalog();
    let mut play = Playthrough::new();
    play.start("alpha".to_string(), "Participant alpha".to_string());
    for quadrant in Quadrant::ORDER {
        for step in 0..STEPS_PER_QUADRANT {
            let choice_id = format!("{quadrant}_step{}_A", step + 1);
            let spec = content.choice(quadrant, step, &choice_id).unwrap();
            play.record_choice(LocalSubmission {
                quadrant,
                step,
                choice_id,
                score: compute_weighted(spec.scores, quadrant),
                timestamp_ms: 1_000,
            });
        }
        assert!(play.is_quadrant_complete(quadrant));
        play.next_quadrant();
    }
    play.go_to_event();
    for quadrant in Quadrant::ORDER {
        let choice_id = format!("event_{quadrant}_C");
        let spec = content.event_choice(quadrant, &choice_id).unwrap();
        play.record_event_response(LocalEventSubmission {
            quadrant,
            choice_id,
            score: compute_weighted(spec.scores, quadrant),
            timestamp_ms: 2_000,
        });
    }

    let session = engine.store().session("alpha").unwrap().unwrap();
    let local = build_dashboard(
        &session,
        &play.submissions_for_store("alpha"),
        &play.events_for_store("alpha"),
        &GradeBands::default(),
        None,
    );

    assert_eq!(local.score, durable.score);
    assert_eq!(local.quadrant_results, durable.quadrant_results);
    assert_eq!(local.dimension_profile, durable.dimension_profile);
}

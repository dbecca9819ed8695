//! Demo content catalog bundled with the tester.

use kraljic_game::content::{
    CompanyBackground, EventBackground, EventResponseSpec, EventSpec, Feedback,
};
use kraljic_game::{Catalog, ChoiceSpec, Quadrant, RawScore, STEPS_PER_QUADRANT, ScenarioSpec, StepSpec};
use once_cell::sync::Lazy;

static DEMO_CATALOG: Lazy<Catalog> = Lazy::new(|| {
    Catalog::from_json(include_str!("../assets/catalog.json")).unwrap_or_else(|err| {
        log::warn!("bundled catalog rejected ({err}); using fallback content");
        fallback_catalog()
    })
});

/// The catalog every simulation run plays against.
#[must_use]
pub fn demo_catalog() -> Catalog {
    DEMO_CATALOG.clone()
}

fn fallback_choice(id: String, ce: u8, ss: u8, sv: u8) -> ChoiceSpec {
    ChoiceSpec {
        id,
        label: "A".to_string(),
        title: "Fallback choice".to_string(),
        description: String::new(),
        scores: RawScore::new(ce, ss, sv).unwrap_or(RawScore { ce: 3, ss: 3, sv: 3 }),
        feedback: Feedback::default(),
    }
}

/// Minimal stand-in used only when the bundled asset fails to parse.
fn fallback_catalog() -> Catalog {
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
                        fallback_choice(format!("{quadrant}_step{n}_A"), 2, 4, 3),
                        fallback_choice(format!("{quadrant}_step{n}_B"), 4, 2, 2),
                        fallback_choice(format!("{quadrant}_step{n}_C"), 3, 3, 4),
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
                fallback_choice(format!("event_{quadrant}_A"), 3, 3, 3),
                fallback_choice(format!("event_{quadrant}_B"), 4, 2, 3),
                fallback_choice(format!("event_{quadrant}_C"), 2, 4, 4),
            ],
        })
        .collect();
    Catalog {
        scenarios,
        event: EventSpec {
            background: EventBackground::default(),
            responses,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_loads_and_validates() {
        let catalog = demo_catalog();
        catalog.validate().unwrap();
        assert_eq!(catalog.scenarios.len(), 4);
    }

    #[test]
    fn fallback_catalog_is_itself_valid() {
        fallback_catalog().validate().unwrap();
    }
}

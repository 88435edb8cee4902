#![forbid(unsafe_code)]

//! Replay scripts are deterministic and always leave a valid project.
//!
//! Run:
//!   cargo test -p panelforge-doctor --test replay_determinism

use panelforge_core::event::{InputEvent, Key};
use panelforge_core::geometry::Point;
use panelforge_doctor::replay::{Action, Script, replay};
use panelforge_layout::ProjectSnapshot;
use panelforge_runtime::EditorConfig;
use proptest::prelude::*;

fn action_strategy() -> impl Strategy<Value = Action> {
    let point = (-100i32..1100, -100i32..1100).prop_map(|(x, y)| Point::new(x, y));
    prop_oneof![
        3 => Just(Action::AddPanel),
        1 => Just(Action::AddPage),
        1 => Just(Action::Undo),
        1 => Just(Action::Redo),
        1 => prop_oneof![Just("grid-2x3"), Just("manga-dialogue"), Just("splash-inset")]
            .prop_map(|template| Action::ApplyTemplate { template: template.to_owned() }),
        2 => point.clone().prop_map(|position| Action::Input {
            event: InputEvent::PointerDown { position, modifiers: Default::default() },
        }),
        3 => point.clone().prop_map(|position| Action::Input {
            event: InputEvent::PointerMove { position },
        }),
        2 => point.prop_map(|position| Action::Input {
            event: InputEvent::PointerUp { position },
        }),
        1 => prop_oneof![Just(Key::ArrowLeft), Just(Key::ArrowDown), Just(Key::Escape), Just(Key::Delete)]
            .prop_map(|key| Action::Input { event: InputEvent::key(key) }),
    ]
}

fn project_of(report: &serde_json::Value) -> ProjectSnapshot {
    serde_json::from_value(report["project"].clone()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn same_script_same_layout(actions in prop::collection::vec(action_strategy(), 1..60)) {
        let script = Script { actions };
        let config = EditorConfig::default();
        let first = replay(&config, None, &script, false).unwrap();
        let second = replay(&config, None, &script, false).unwrap();
        prop_assert_eq!(&first["layout_hash"], &second["layout_hash"]);
        prop_assert_eq!(&first["steps"], &second["steps"]);
    }

    #[test]
    fn replayed_projects_satisfy_geometry_rules(actions in prop::collection::vec(action_strategy(), 1..60)) {
        let script = Script { actions };
        let report = replay(&EditorConfig::default(), None, &script, false).unwrap();
        let project = project_of(&report);
        prop_assert!(project.validate().is_ok());
        for page in &project.pages {
            for panel in &page.panels {
                prop_assert!(panel.rect.width >= 50 && panel.rect.height >= 50);
                prop_assert!(panel.rect.is_within(page.size));
            }
        }
    }
}

#[test]
fn replay_report_is_plain_json() {
    let script: Script = serde_json::from_str(
        r#"{"actions": [
            {"action": "add_page"},
            {"action": "activate_page", "index": 1},
            {"action": "add_panel"},
            {"action": "select_panel", "panel": 0},
            {"action": "input", "event": {"kind": "key", "key": "arrow_right", "modifiers": "SHIFT"}}
        ]}"#,
    )
    .unwrap();
    let report = replay(&EditorConfig::default(), None, &script, true).unwrap();
    let project = project_of(&report);
    assert_eq!(project.pages.len(), 2);
    assert!(project.pages[0].panels.is_empty());
    assert_eq!(project.pages[1].panels[0].rect.x, 60);
}

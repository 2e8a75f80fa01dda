//! Gesture recognition on synthetic hands


use hand_gesture_mouse::{
    config::Config,
    constants::{INDEX_MCP, INDEX_TIP, MIDDLE_TIP, THUMB_TIP},
    fingers::{Finger, FingerStates, FingerVector},
    gesture::{Anchor, GestureCategory, GestureRule, GestureStateMachine, GestureTable, Recognition},
    landmarks::PixelPoint,
    preprocess::Preprocessor,
};
use test_helpers::{drag_hand, right_click_hand, scroll_hand, HandBuilder, Shape, FRAME};

fn machine(table: GestureTable) -> GestureStateMachine {
    GestureStateMachine::new(table, 30.0, 0.03, true).unwrap()
}

fn recognize(table: GestureTable, builder: &HandBuilder) -> Recognition {
    let hand = Preprocessor::default().process(&builder.build(), FRAME).unwrap();
    machine(table).evaluate(&hand)
}

#[test]
fn test_move() {
    let rec = recognize(GestureTable::standard(), &HandBuilder::with_extended([0, 1, 0, 0, 0]));
    assert_eq!(rec.gesture, GestureCategory::Move);
    assert_eq!(rec.actionable(), GestureCategory::Move);
    assert_eq!(rec.anchor, Some(PixelPoint::new(280, 200)));
    assert!(rec.confirmed);
    assert!(rec.proximity.is_empty());
}

#[test]
fn test_left_click_half_closed_index() {
    let hand = HandBuilder::right().finger(Finger::Index, Shape::HalfClosed);
    let rec = recognize(GestureTable::standard(), &hand);
    assert_eq!(rec.actionable(), GestureCategory::LeftClick);
}

#[test]
fn test_right_click_confirmation() {
    let rec = recognize(GestureTable::standard(), &right_click_hand());
    assert_eq!(rec.gesture, GestureCategory::RightClick);
    assert!(rec.confirmed);
    assert_eq!(rec.proximity.len(), 1);
    assert!(rec.proximity[0].distance < 30.0);

    // Same fingers, thumb tucked away from the pinky knuckle
    let rec = recognize(GestureTable::standard(), &HandBuilder::with_extended([0, 1, 1, 0, 0]));
    assert_eq!(rec.gesture, GestureCategory::RightClick);
    assert!(!rec.confirmed);
}

#[test]
fn test_drag_confirmation_needs_both_pairs() {
    let rec = recognize(GestureTable::standard(), &drag_hand());
    assert_eq!(rec.gesture, GestureCategory::Drag);
    assert!(rec.confirmed);
    assert_eq!(rec.anchor, Some(PixelPoint::new(325, 320)));
    assert!(rec.proximity.iter().all(|r| (r.distance - 10.0).abs() < 1e-9));

    // Ring tip pulled away: only one pair within range
    let rec = recognize(GestureTable::standard(), &drag_hand().at(16, 380, 320));
    assert_eq!(rec.gesture, GestureCategory::Drag);
    assert!(!rec.confirmed);
}

#[test]
fn test_scroll_confirmation_and_anchor() {
    let rec = recognize(GestureTable::standard(), &scroll_hand(200));
    assert_eq!(rec.gesture, GestureCategory::Scroll);
    assert!(rec.confirmed);
    assert_eq!(rec.anchor, Some(PixelPoint::new(310, 200)));

    // Default fingertip spacing is 30 px, not closer than the threshold
    let rec = recognize(GestureTable::standard(), &HandBuilder::with_extended([0, 1, 1, 1, 0]));
    assert_eq!(rec.gesture, GestureCategory::Scroll);
    assert!(!rec.confirmed);
}

#[test]
fn test_unmatched_pattern_is_none() {
    let rec = recognize(GestureTable::standard(), &HandBuilder::with_extended([1, 1, 1, 1, 1]));
    assert_eq!(rec.gesture, GestureCategory::None);
    assert!(rec.anchor.is_none());
    assert!(rec.states.is_some());
}

#[test]
fn test_precedence_resolves_ambiguous_states() {
    // Index both extended and half-closed: move is excluded by its
    // half-closed pattern, and left click precedes right click
    let states = FingerStates::new(
        FingerVector::from_bits([0, 1, 1, 0, 0]),
        FingerVector::from_bits([0, 1, 0, 0, 0]),
    );
    assert_eq!(machine(GestureTable::standard()).classify(&states), GestureCategory::LeftClick);

    let states = FingerStates::new(
        FingerVector::from_bits([0, 1, 0, 0, 0]),
        FingerVector::from_bits([0, 1, 0, 0, 0]),
    );
    assert_eq!(machine(GestureTable::standard()).classify(&states), GestureCategory::LeftClick);
}

#[test]
fn test_flipped_hand_is_gated() {
    let hand = HandBuilder::with_extended([0, 1, 0, 0, 0]).at(MIDDLE_TIP, 310, 420);
    let rec = recognize(GestureTable::standard(), &hand);
    assert_eq!(rec.gesture, GestureCategory::Move);
    assert!(!rec.upright);
    assert_eq!(rec.actionable(), GestureCategory::None);
}

#[test]
fn test_turned_hand_is_gated() {
    let hand = HandBuilder::with_extended([0, 1, 0, 0, 0]).at(INDEX_MCP, 400, 300);
    let rec = recognize(GestureTable::standard(), &hand);
    assert!(!rec.upright);
    assert_eq!(rec.actionable(), GestureCategory::None);
}

#[test]
fn test_orientation_gate_can_be_disabled() {
    let hand = HandBuilder::with_extended([0, 1, 0, 0, 0]).at(INDEX_MCP, 400, 300);
    let set = Preprocessor::default().process(&hand.build(), FRAME).unwrap();
    let lenient = GestureStateMachine::new(GestureTable::standard(), 30.0, 0.03, false).unwrap();
    assert_eq!(lenient.evaluate(&set).actionable(), GestureCategory::Move);
}

#[test]
fn test_depth_gate() {
    let shallow = HandBuilder::with_extended([0, 1, 0, 0, 0]).depth(INDEX_TIP, -0.02);
    let rec = recognize(GestureTable::standard(), &shallow);
    assert!(!rec.reaching);
    assert_eq!(rec.actionable(), GestureCategory::None);

    let deep = HandBuilder::with_extended([0, 1, 0, 0, 0]).depth(INDEX_TIP, -0.04);
    assert!(recognize(GestureTable::standard(), &deep).reaching);
}

#[test]
fn test_legacy_table() {
    let legacy = GestureTable::legacy();
    assert_eq!(
        recognize(legacy.clone(), &HandBuilder::with_extended([0, 1, 1, 0, 0])).gesture,
        GestureCategory::LeftClick
    );

    let drag = recognize(legacy.clone(), &HandBuilder::with_extended([1, 0, 0, 0, 0]));
    assert_eq!(drag.gesture, GestureCategory::Drag);
    assert!(drag.confirmed);
    assert_eq!(drag.anchor, Some(PixelPoint::new(215, 330)));

    let open = HandBuilder::with_extended([1, 1, 1, 1, 1]).at(THUMB_TIP, 215, 330);
    assert_eq!(recognize(legacy, &open).gesture, GestureCategory::RightClick);
}

#[test]
fn test_custom_rules_from_config() {
    let yaml = r#"
gestures:
  rules:
    - gesture: scroll
      extended: "01100"
    - gesture: move
      extended: "01***"
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    let table = config.gesture_table().unwrap();
    assert_eq!(table.rules().len(), 2);
    assert_eq!(table.rules()[1].anchor, Anchor::Landmark(INDEX_TIP));

    let rec = recognize(table.clone(), &HandBuilder::with_extended([0, 1, 1, 0, 0]));
    assert_eq!(rec.gesture, GestureCategory::Scroll);
    let rec = recognize(table, &HandBuilder::with_extended([0, 1, 0, 1, 1]));
    assert_eq!(rec.gesture, GestureCategory::Move);
}

#[test]
fn test_rule_serialization() {
    let table = GestureTable::standard();
    let rule: &GestureRule = &table.rules()[3];
    let yaml = serde_yaml::to_string(rule).unwrap();
    let parsed: GestureRule = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(&parsed, rule);
    assert!(yaml.contains("01001"));
}

#[test]
fn test_palm_table_tracks_palm_center() {
    let open = HandBuilder::with_extended([1, 1, 1, 1, 1]);
    let hand = Preprocessor::default().process(&open.build(), FRAME).unwrap();
    let rec = machine(GestureTable::palm()).evaluate(&hand);

    assert_eq!(rec.actionable(), GestureCategory::Move);
    assert_eq!(rec.anchor, Some(hand.palm_center));
    assert_ne!(rec.anchor, Some(hand.point(INDEX_TIP)));
}

#[test]
fn test_palm_table_fist_click() {
    let fist = recognize(GestureTable::palm(), &HandBuilder::right());
    assert_eq!(fist.gesture, GestureCategory::LeftClick);
    assert!(fist.confirmed);
    assert_eq!(fist.proximity.len(), 5);
    assert!(fist.proximity.iter().all(|reading| reading.distance < 64.0));

    // Curled but with the thumb tip far from its knuckle: no click
    let loose = recognize(GestureTable::palm(), &HandBuilder::right().at(THUMB_TIP, 380, 330));
    assert_eq!(loose.gesture, GestureCategory::LeftClick);
    assert!(!loose.confirmed);
}

#[test]
fn test_custom_rule_with_palm_anchor() {
    let yaml = r#"
gestures:
  rules:
    - gesture: left_click
      extended: "00000"
      confirm: [[8, 5]]
      max_distance: 5.0
    - gesture: move
      extended: "*****"
      anchor: palm_center
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    let table = config.gesture_table().unwrap();
    assert_eq!(table.rules()[1].anchor, Anchor::PalmCenter);

    // Index tip is 20 px from its knuckle, beyond the rule's 5 px
    let fist = recognize(table, &HandBuilder::right());
    assert_eq!(fist.gesture, GestureCategory::LeftClick);
    assert!(!fist.confirmed);

    let unknown = "gestures:\n  rules:\n    - gesture: move\n      extended: \"01000\"\n      anchor: wrist\n";
    assert!(serde_yaml::from_str::<Config>(unknown).is_err());
}

#[test]
fn test_gates_can_be_disabled_for_ungated_presets() {
    let turned_shallow = HandBuilder::with_extended([0, 1, 0, 0, 0])
        .at(INDEX_MCP, 400, 300)
        .depth(INDEX_TIP, 0.0);
    let hand = Preprocessor::default().process(&turned_shallow.build(), FRAME).unwrap();

    let gated = machine(GestureTable::legacy()).evaluate(&hand);
    assert_eq!(gated.actionable(), GestureCategory::None);

    let ungated = GestureStateMachine::new(GestureTable::legacy(), 30.0, 0.03, false)
        .unwrap()
        .with_require_reach(false)
        .evaluate(&hand);
    assert!(ungated.upright && ungated.reaching);
    assert_eq!(ungated.actionable(), GestureCategory::Move);
}

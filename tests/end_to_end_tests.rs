//! Full pipeline scenarios from landmarks to input commands


use hand_gesture_mouse::{
    config::{Config, GesturePreset},
    constants::INDEX_TIP,
    gesture::GestureCategory,
    input::{InputCommand, MouseButton, RecordingSink},
    landmarks::{Handedness, Landmark, LandmarkSet},
    mapper::ScreenSize,
    pipeline::GesturePipeline,
    source::FrameObservation,
};
use test_helpers::{
    drag_hand, no_hand, press_release_counts, right_click_hand, scroll_hand, HandBuilder, FRAME,
};

fn pipeline() -> GesturePipeline<RecordingSink> {
    GesturePipeline::from_config(&Config::default(), RecordingSink::new(), ScreenSize::new(1920, 1080)).unwrap()
}

#[test]
fn test_move_converges_toward_screen_center() {
    let mut pipeline = pipeline();
    let frame = HandBuilder::with_extended([0, 1, 0, 0, 0])
        .at(INDEX_TIP, 320, 240)
        .frame();

    let ratio: f64 = 6.0 / 7.0;
    let mut last_x = 0.0;
    for n in 1..=10 {
        let report = pipeline.process(&frame);
        assert_eq!(report.gesture(), GestureCategory::Move);
        assert_eq!(report.commands().len(), 1);
        assert!(matches!(report.commands()[0], InputCommand::MoveTo { .. }));

        let (x, y) = report.outcome.cursor;
        let remaining = ratio.powi(n);
        assert!((x - 960.0 * (1.0 - remaining)).abs() < 1e-9);
        assert!((y - 540.0 * (1.0 - remaining)).abs() < 1e-9);
        assert!(x > last_x && x < 960.0);
        last_x = x;
    }

    let expected_x = 960.0 * (1.0 - ratio.powi(10));
    let expected_y = 540.0 * (1.0 - ratio.powi(10));
    let commands = pipeline.dispatcher().sink().commands();
    assert_eq!(commands.len(), 10);
    assert_eq!(
        commands[9],
        InputCommand::MoveTo {
            x: expected_x as i32,
            y: expected_y as i32
        }
    );
}

#[test]
fn test_drag_presses_once_and_releases_on_gesture_loss() {
    let mut pipeline = pipeline();
    let drag = drag_hand().frame();

    for _ in 0..3 {
        let report = pipeline.process(&drag);
        assert_eq!(report.gesture(), GestureCategory::Drag);
        assert!(pipeline.dispatcher().is_dragging());
    }

    let open = HandBuilder::with_extended([1, 1, 1, 1, 1]).frame();
    let report = pipeline.process(&open);
    assert_eq!(report.gesture(), GestureCategory::None);
    assert_eq!(report.commands(), &[InputCommand::Release(MouseButton::Left)]);

    let commands = pipeline.dispatcher().sink().commands();
    assert_eq!(press_release_counts(commands), (1, 1));
    assert_eq!(commands[0], InputCommand::Press(MouseButton::Left));
    assert_eq!(commands.last(), Some(&InputCommand::Release(MouseButton::Left)));
}

#[test]
fn test_hand_lost_releases_drag() {
    let mut pipeline = pipeline();
    pipeline.process(&drag_hand().frame());
    let report = pipeline.process(&no_hand());

    assert!(report.hand.is_none());
    assert!(report.recognition.is_none());
    assert_eq!(report.commands(), &[InputCommand::Release(MouseButton::Left)]);
    assert!(!pipeline.dispatcher().is_dragging());
}

#[test]
fn test_empty_frames_are_quiet() {
    let mut pipeline = pipeline();
    for _ in 0..5 {
        let report = pipeline.process(&no_hand());
        assert_eq!(report.gesture(), GestureCategory::None);
        assert!(report.commands().is_empty());
    }
    assert_eq!(pipeline.frames_processed(), 5);
}

#[test]
fn test_right_click_end_to_end() {
    let mut pipeline = pipeline();
    let report = pipeline.process(&right_click_hand().frame());
    assert_eq!(report.commands(), &[InputCommand::Click(MouseButton::Right)]);
}

#[test]
fn test_scroll_end_to_end() {
    let mut pipeline = pipeline();
    // Park the cursor with a move first
    for _ in 0..3 {
        pipeline.process(&HandBuilder::with_extended([0, 1, 0, 0, 0]).frame());
    }

    let below = pipeline.process(&scroll_hand(200).frame());
    assert!(matches!(below.commands(), [InputCommand::ScrollBy { dx: 0, dy }] if *dy > 0));

    // Holding still keeps scrolling
    let held = pipeline.process(&scroll_hand(200).frame());
    assert_eq!(held.commands(), below.commands());

    let above = pipeline.process(&scroll_hand(20).frame());
    assert!(matches!(above.commands(), [InputCommand::ScrollBy { dx: 0, dy }] if *dy < 0));
}

#[test]
fn test_left_hand_moves_like_right_hand() {
    let right = HandBuilder::with_extended([0, 1, 0, 0, 0]).at(INDEX_TIP, 320, 240);
    let left = right.clone().mirrored();

    let mut pipeline = pipeline();
    let report = pipeline.process(&left.frame());
    assert_eq!(report.gesture(), GestureCategory::Move);
}

#[test]
fn test_reset_restarts_session() {
    let mut pipeline = pipeline();
    pipeline.process(&drag_hand().frame());
    let released = pipeline.reset();
    assert_eq!(released, vec![InputCommand::Release(MouseButton::Left)]);
    assert_eq!(pipeline.frames_processed(), 0);
    assert_eq!(pipeline.dispatcher().cursor().position(), (0.0, 0.0));
}

#[test]
fn test_far_out_of_frame_landmarks_are_processed() {
    let hand = HandBuilder::with_extended([0, 1, 0, 0, 0]).build();
    let mut landmarks = hand.landmarks().to_vec();
    landmarks[3] = Landmark::new(1.0e7, landmarks[3].y, landmarks[3].z);
    landmarks[4] = Landmark::new(-1.0e7, landmarks[4].y, landmarks[4].z);
    let set = LandmarkSet::new(landmarks, Handedness::Right, 0.9).unwrap();

    let mut pipeline = pipeline();
    let report = pipeline.process(&FrameObservation::new(FRAME, Some(set)));
    let states = report.recognition.as_ref().and_then(|rec| rec.states).unwrap();
    assert!(states.extended.as_array()[0]);
    assert_eq!(report.gesture(), GestureCategory::None);
}

#[test]
fn test_palm_preset_moves_with_palm_and_clicks_with_fist() {
    let mut config = Config::default();
    config.gestures.preset = GesturePreset::Palm;
    config.cursor.smoothing_factor = 1;
    let mut pipeline =
        GesturePipeline::from_config(&config, RecordingSink::new(), ScreenSize::new(1920, 1080)).unwrap();

    let open = pipeline.process(&HandBuilder::with_extended([1, 1, 1, 1, 1]).frame());
    assert_eq!(open.gesture(), GestureCategory::Move);
    let palm = open.hand.as_ref().unwrap().palm_center;
    let mapper = pipeline.dispatcher().mapper();
    let (x, y) = mapper.map(palm, FRAME).unwrap();
    assert_eq!(open.outcome.cursor, (x, y));

    let fist = pipeline.process(&HandBuilder::right().frame());
    assert_eq!(fist.gesture(), GestureCategory::LeftClick);
    assert_eq!(fist.commands(), &[InputCommand::Click(MouseButton::Left)]);
}

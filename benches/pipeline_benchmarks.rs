//! Benchmarks for the per-frame gesture pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hand_gesture_mouse::{
    config::{Config, GesturePreset},
    fingers,
    input::{InputSink, MouseButton},
    landmarks::{FrameSize, Handedness, Landmark, LandmarkSet},
    mapper::ScreenSize,
    pipeline::GesturePipeline,
    preprocess::Preprocessor,
    source::FrameObservation,
    Result,
};

const FRAME: FrameSize = FrameSize::new(640, 480);

/// Discards every command
struct NullSink;

impl InputSink for NullSink {
    fn move_to(&mut self, _x: i32, _y: i32) -> Result<()> {
        Ok(())
    }

    fn click(&mut self, _button: MouseButton) -> Result<()> {
        Ok(())
    }

    fn press_button(&mut self, _button: MouseButton) -> Result<()> {
        Ok(())
    }

    fn release_button(&mut self, _button: MouseButton) -> Result<()> {
        Ok(())
    }

    fn scroll_by(&mut self, _dx: i32, _dy: i32) -> Result<()> {
        Ok(())
    }
}

/// Upright right hand shifted by `(dx, dy)` pixels, fingers per `extended`
fn synthetic_hand(extended: [bool; 5], dx: i32, dy: i32) -> LandmarkSet {
    let mut points = [(0, 0); 21];
    points[0] = (320, 400);
    points[1] = (300, 380);
    points[2] = (275, 360);
    points[3] = (265, 345);
    points[4] = if extended[0] { (215, 330) } else { (300, 330) };

    for (finger, x) in [280, 310, 340, 370].into_iter().enumerate() {
        let base = 5 + finger * 4;
        let [pip, dip, tip] = if extended[finger + 1] {
            [270, 250, 200]
        } else {
            [275, 300, 320]
        };
        points[base] = (x, 300);
        points[base + 1] = (x, pip);
        points[base + 2] = (x, dip);
        points[base + 3] = (x, tip);
    }

    let landmarks = points
        .iter()
        .enumerate()
        .map(|(id, &(x, y))| {
            let z = if id == 8 { -0.05 } else { 0.0 };
            Landmark::new(
                (x + dx) as f32 / FRAME.width as f32,
                (y + dy) as f32 / FRAME.height as f32,
                z,
            )
        })
        .collect();

    LandmarkSet::new(landmarks, Handedness::Right, 0.95).unwrap()
}

/// Pointing hand tracing a circle, one frame per step
fn pointing_session(frames: usize) -> Vec<FrameObservation> {
    (0..frames)
        .map(|i| {
            let t = i as f64 * 0.1;
            let dx = (60.0 * t.cos()) as i32;
            let dy = (40.0 * t.sin()) as i32;
            FrameObservation::new(FRAME, Some(synthetic_hand([false, true, false, false, false], dx, dy)))
        })
        .collect()
}

fn benchmark_finger_states(c: &mut Criterion) {
    let mut group = c.benchmark_group("finger_states");
    let preprocessor = Preprocessor::new(20);

    let hands = [
        ("fist", [false; 5]),
        ("pointing", [false, true, false, false, false]),
        ("open", [true; 5]),
    ];

    for (name, extended) in hands {
        let set = synthetic_hand(extended, 0, 0);
        group.bench_with_input(BenchmarkId::new("preprocess", name), &set, |b, set| {
            b.iter(|| black_box(preprocessor.process(black_box(set), FRAME)));
        });

        let points = set.to_pixels(FRAME);
        group.bench_with_input(BenchmarkId::new("classify", name), &points, |b, points| {
            b.iter(|| black_box(fingers::classify(black_box(points), Handedness::Right)));
        });
    }

    group.finish();
}

fn benchmark_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let session = pointing_session(100);

    for preset in [GesturePreset::Standard, GesturePreset::Legacy, GesturePreset::Palm] {
        let mut config = Config::default();
        config.gestures.preset = preset;
        let mut pipeline =
            GesturePipeline::from_config(&config, NullSink, ScreenSize::new(1920, 1080)).unwrap();

        group.bench_with_input(
            BenchmarkId::new("single_frame", format!("{preset:?}")),
            &session[0],
            |b, frame| {
                b.iter(|| black_box(pipeline.process(black_box(frame))));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("sequence_100", format!("{preset:?}")),
            &session,
            |b, frames| {
                b.iter(|| {
                    pipeline.reset();
                    for frame in frames {
                        black_box(pipeline.process(black_box(frame)));
                    }
                });
            },
        );
    }

    group.finish();
}

fn benchmark_empty_frames(c: &mut Criterion) {
    let mut pipeline =
        GesturePipeline::from_config(&Config::default(), NullSink, ScreenSize::new(1920, 1080)).unwrap();
    let empty = FrameObservation::empty(FRAME);

    c.bench_function("pipeline_no_hand", |b| {
        b.iter(|| black_box(pipeline.process(black_box(&empty))));
    });
}

criterion_group!(benches, benchmark_finger_states, benchmark_pipeline, benchmark_empty_frames);
criterion_main!(benches);

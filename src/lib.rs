//! Hand gesture mouse library for controlling the pointer with hand landmarks.
//!
//! This library interprets the 21-point hand landmarks of an external
//! detector and turns them into mouse input:
//! - Data-driven gesture tables matched against finger states
//! - Exponential cursor smoothing over a camera active region
//! - X11 input injection through XTest
//!
//! The per-frame pipeline consists of:
//! 1. Landmark preprocessing (pixel projection, palm center, orientation)
//! 2. Finger state classification (extended and half-closed vectors)
//! 3. Gesture recognition with proximity confirmation and gating
//! 4. Action dispatch (move, click, drag, scroll)
//!
//! # Examples
//!
//! ## Replaying a recorded session
//!
//! ```no_run
//! use hand_gesture_mouse::{
//!     app::{GestureMouseApp, StopFlag},
//!     config::Config,
//!     input::RecordingSink,
//!     mapper::ScreenSize,
//!     pipeline::GesturePipeline,
//!     source::ReplaySource,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let pipeline = GesturePipeline::from_config(&config, RecordingSink::new(), ScreenSize::new(1920, 1080))?;
//! let source = ReplaySource::open("session.jsonl")?;
//!
//! let mut app = GestureMouseApp::new(source, pipeline, StopFlag::new());
//! let stats = app.run()?;
//! println!("Processed {} frames", stats.frames);
//! println!("Commands: {:?}", app.pipeline().dispatcher().sink().commands());
//! # Ok(())
//! # }
//! ```
//!
//! ## Classifying a single hand
//!
//! ```no_run
//! use hand_gesture_mouse::{
//!     gesture::{GestureStateMachine, GestureTable},
//!     landmarks::{FrameSize, Handedness, Landmark, LandmarkSet},
//!     preprocess::Preprocessor,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let points = vec![Landmark::new(0.5, 0.5, -0.05); 21];
//! let set = LandmarkSet::new(points, Handedness::Right, 0.9)?;
//!
//! let machine = GestureStateMachine::new(GestureTable::standard(), 30.0, 0.03, true)?;
//! if let Some(hand) = Preprocessor::default().process(&set, FrameSize::new(640, 480)) {
//!     let recognition = machine.evaluate(&hand);
//!     println!("Gesture: {}", recognition.actionable());
//! }
//! # Ok(())
//! # }
//! ```

/// Session loop, stop flag and signal handling
pub mod app;

/// Configuration management
pub mod config;

/// Landmark ids and defaults
pub mod constants;

/// X11 input injection
pub mod cursor_control;

/// Action dispatcher with drag and scroll sessions
pub mod dispatch;

/// Error types and result aliases
pub mod error;

/// Finger state classification
pub mod fingers;

/// Gesture tables and state machine
pub mod gesture;

/// Input-injection seam and simple sinks
pub mod input;

/// Hand landmark data model
pub mod landmarks;

/// Camera-to-screen mapping and smoothing
pub mod mapper;

/// Per-frame pipeline
pub mod pipeline;

/// Landmark preprocessing
pub mod preprocess;

/// Landmark sources and replay
pub mod source;

/// Coordinate conversion helpers
pub mod utils;

/// Camera capture and landmark model
#[cfg(feature = "vision")]
pub mod vision;

pub use error::{Error, Result};

//! Live capture: OpenCV camera, ONNX hand-landmark model and overlay window.
//!
//! Only built with the `vision` feature.

/// Hand landmark detection with `ONNX` Runtime
pub mod hand_landmarks;

/// Camera-backed [`LandmarkSource`](crate::source::LandmarkSource)
pub mod camera;

pub use camera::CameraSource;
pub use hand_landmarks::HandLandmarkDetector;

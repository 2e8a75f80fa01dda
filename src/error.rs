//! Error types for the hand gesture mouse library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// `OpenCV` operation failed
    #[cfg(feature = "vision")]
    #[error("OpenCV error: {0}")]
    OpenCV(#[from] opencv::Error),

    /// `ONNX` Runtime inference failed
    #[cfg(feature = "vision")]
    #[error("ONNX Runtime error: {0}")]
    OnnxRuntime(#[from] ort::OrtError),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// `X11` window system operation failed
    #[error("X11 error: {0}")]
    X11(String),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Model loading or inference error
    #[cfg(feature = "vision")]
    #[error("Model error: {0}")]
    ModelError(String),

    /// Model output processing error
    #[cfg(feature = "vision")]
    #[error("Model output error: {0}")]
    ModelOutputError(String),

    /// Synthetic input command was rejected
    #[error("Input injection error: {0}")]
    InputInjection(String),

    /// The frame source could not deliver a frame
    #[error("Frame acquisition error: {0}")]
    FrameAcquisition(String),

    /// Recorded landmark stream is malformed
    #[error("Replay error: {0}")]
    Replay(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic I/O error with description
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Application-specific error type (alias for main Error type)
pub type AppError = Error;

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;

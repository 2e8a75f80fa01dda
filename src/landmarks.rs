//! Hand landmark data produced by the external detector.
//!
//! A [`LandmarkSet`] holds the 21 normalized points of one hand for one
//! frame. Coordinates `x`/`y` are fractions of the frame size and `z` is
//! depth relative to the wrist (negative values are closer to the camera).

use crate::{
    constants::NUM_HAND_LANDMARKS,
    utils::safe_cast::f32_to_i32_clamp,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which physical hand produced a landmark set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    /// Left hand
    Left,
    /// Right hand
    Right,
}

impl Handedness {
    /// Sign of the X axis pointing away from the palm on the thumb side.
    ///
    /// Every handedness-dependent ordering test multiplies its X difference
    /// by this value, so the left and right rules are the same expression.
    #[must_use]
    pub const fn thumb_side(self) -> i32 {
        match self {
            Self::Left => 1,
            Self::Right => -1,
        }
    }

    /// Label used by detectors and logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel dimensions of a camera frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
}

impl FrameSize {
    /// Create a frame size
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A single normalized landmark
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    /// Horizontal position as a fraction of frame width
    pub x: f32,
    /// Vertical position as a fraction of frame height
    pub y: f32,
    /// Depth relative to the wrist
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    /// Create a landmark
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Integer pixel position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelPoint {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl PixelPoint {
    /// Create a pixel point
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        (f64::from(other.x) - f64::from(self.x)).hypot(f64::from(other.y) - f64::from(self.y))
    }

    /// Integer midpoint between two points
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // The midpoint of two i32 values fits in i32
    pub const fn midpoint(&self, other: &Self) -> Self {
        Self::new(
            ((self.x as i64 + other.x as i64) / 2) as i32,
            ((self.y as i64 + other.y as i64) / 2) as i32,
        )
    }
}

/// A landmark projected onto the frame in pixels, keeping its depth
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelLandmark {
    /// Pixel position
    pub point: PixelPoint,
    /// Relative depth copied from the normalized landmark
    pub z: f32,
}

/// All landmarks of one detected hand in one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLandmarkSet", into = "RawLandmarkSet")]
pub struct LandmarkSet {
    landmarks: Vec<Landmark>,
    handedness: Handedness,
    confidence: f32,
}

impl LandmarkSet {
    /// Create a landmark set
    ///
    /// # Errors
    ///
    /// Returns an error if the set holds neither 0 nor 21 landmarks, or if
    /// any coordinate is not finite.
    pub fn new(landmarks: Vec<Landmark>, handedness: Handedness, confidence: f32) -> Result<Self> {
        if !landmarks.is_empty() && landmarks.len() != NUM_HAND_LANDMARKS {
            return Err(Error::InvalidInput(format!(
                "Expected {NUM_HAND_LANDMARKS} hand landmarks, got {}",
                landmarks.len()
            )));
        }
        if let Some(id) = landmarks
            .iter()
            .position(|lm| !(lm.x.is_finite() && lm.y.is_finite() && lm.z.is_finite()))
        {
            return Err(Error::InvalidInput(format!("Landmark {id} has a non-finite coordinate")));
        }

        Ok(Self {
            landmarks,
            handedness,
            confidence,
        })
    }

    /// True when the detector produced no points for this hand
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// Normalized landmarks, indexed by landmark id
    #[must_use]
    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    /// Landmark by id
    #[must_use]
    pub fn get(&self, id: usize) -> Option<&Landmark> {
        self.landmarks.get(id)
    }

    /// Handedness label reported by the detector
    #[must_use]
    pub const fn handedness(&self) -> Handedness {
        self.handedness
    }

    /// Detector confidence for this hand
    #[must_use]
    pub const fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Project every landmark onto a frame of the given size.
    ///
    /// Pixel coordinates are truncated toward zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Frame dimensions are far below f32 precision limits
    pub fn to_pixels(&self, frame: FrameSize) -> Vec<PixelLandmark> {
        let width = frame.width as f32;
        let height = frame.height as f32;
        self.landmarks
            .iter()
            .map(|lm| PixelLandmark {
                point: PixelPoint::new(
                    f32_to_i32_clamp(lm.x * width, i32::MIN, i32::MAX),
                    f32_to_i32_clamp(lm.y * height, i32::MIN, i32::MAX),
                ),
                z: lm.z,
            })
            .collect()
    }
}

/// Wire form of a landmark set, validated on conversion
#[derive(Serialize, Deserialize)]
struct RawLandmarkSet {
    handedness: Handedness,
    #[serde(default = "default_confidence")]
    confidence: f32,
    #[serde(default)]
    landmarks: Vec<Landmark>,
}

const fn default_confidence() -> f32 {
    1.0
}

impl TryFrom<RawLandmarkSet> for LandmarkSet {
    type Error = Error;

    fn try_from(raw: RawLandmarkSet) -> Result<Self> {
        Self::new(raw.landmarks, raw.handedness, raw.confidence)
    }
}

impl From<LandmarkSet> for RawLandmarkSet {
    fn from(set: LandmarkSet) -> Self {
        Self {
            handedness: set.handedness,
            confidence: set.confidence,
            landmarks: set.landmarks,
        }
    }
}

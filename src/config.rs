//! Configuration management for the hand gesture mouse

use crate::{
    constants::{
        DEFAULT_BBOX_MARGIN, DEFAULT_CAMERA_HEIGHT, DEFAULT_CAMERA_WIDTH, DEFAULT_DEPTH_GATE_THRESHOLD,
        DEFAULT_FRAME_MARGIN, DEFAULT_MIN_CONFIDENCE, DEFAULT_PROXIMITY_THRESHOLD, DEFAULT_SCROLL_CLAMP,
        DEFAULT_SCROLL_DAMPING, DEFAULT_SMOOTHING_FACTOR,
    },
    gesture::{GestureRule, GestureTable},
    landmarks::FrameSize,
    mapper::{ActiveRegion, ScreenSize},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Camera capture settings
    pub camera: CameraConfig,

    /// Cursor mapping and smoothing
    pub cursor: CursorConfig,

    /// Gesture recognition
    pub gestures: GestureConfig,

    /// Overlay window
    pub display: DisplayConfig,

    /// Model configuration
    pub models: ModelConfig,
}

/// Camera capture settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Capture device index
    pub index: i32,

    /// Requested frame width
    pub width: u32,

    /// Requested frame height
    pub height: u32,

    /// Mirror frames horizontally before detection
    pub flip_x: bool,
}

/// Cursor mapping configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    /// Divisor of the exponential smoothing step, at least 1
    pub smoothing_factor: u32,

    /// Pixels cut from every side of the frame to form the active region
    pub frame_margin: u32,

    /// Screen width used when no display can be queried
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_width: Option<u32>,

    /// Screen height used when no display can be queried
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_height: Option<u32>,
}

/// Which built-in gesture table to use.
///
/// A preset only picks the table. The orientation and depth gates follow
/// `require_upright` and `require_reach` for every preset; the drivers behind
/// `legacy` and `palm` had no gates, so turn both off to reproduce them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GesturePreset {
    /// Half-closed index click, proximity-confirmed right click, drag and scroll
    #[default]
    Standard,
    /// Extension-only patterns
    Legacy,
    /// Palm center steers the cursor, a closed fist clicks
    Palm,
}

impl GesturePreset {
    /// Gesture table for this preset
    #[must_use]
    pub fn table(self) -> GestureTable {
        match self {
            Self::Standard => GestureTable::standard(),
            Self::Legacy => GestureTable::legacy(),
            Self::Palm => GestureTable::palm(),
        }
    }
}

/// Gesture recognition configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Built-in table, ignored when `rules` is set
    pub preset: GesturePreset,

    /// Custom rule list, first match wins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<GestureRule>>,

    /// Maximum pixel distance for a confirmation pair
    pub proximity_threshold: f64,

    /// Minimum index-tip reach toward the camera
    pub depth_gate_threshold: f32,

    /// Ignore gestures from a turned or flipped hand
    pub require_upright: bool,

    /// Ignore gestures from a hand not reaching toward the camera
    pub require_reach: bool,

    /// Screen pixels of hand motion per wheel step
    pub scroll_damping: f64,

    /// Maximum wheel steps per frame
    pub scroll_clamp: i32,
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show the overlay window
    pub enabled: bool,

    /// Margin around the drawn hand bounding box
    pub bbox_margin: i32,

    /// Draw the frame rate
    pub show_fps: bool,
}

/// Model file paths configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the hand landmark ONNX model
    pub hand_landmarks: PathBuf,

    /// Minimum hand presence score
    pub min_confidence: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            width: DEFAULT_CAMERA_WIDTH,
            height: DEFAULT_CAMERA_HEIGHT,
            flip_x: true,
        }
    }
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
            frame_margin: DEFAULT_FRAME_MARGIN,
            screen_width: None,
            screen_height: None,
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            preset: GesturePreset::Standard,
            rules: None,
            proximity_threshold: DEFAULT_PROXIMITY_THRESHOLD,
            depth_gate_threshold: DEFAULT_DEPTH_GATE_THRESHOLD,
            require_upright: true,
            require_reach: true,
            scroll_damping: DEFAULT_SCROLL_DAMPING,
            scroll_clamp: DEFAULT_SCROLL_CLAMP,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bbox_margin: DEFAULT_BBOX_MARGIN,
            show_fps: true,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            hand_landmarks: PathBuf::from("assets/hand_landmarks.onnx"),
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        serde_yaml::from_str(&content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Gesture table from custom rules, or the preset when none are given
    pub fn gesture_table(&self) -> Result<GestureTable> {
        match &self.gestures.rules {
            Some(rules) => GestureTable::from_rules(rules.clone()),
            None => Ok(self.gestures.preset.table()),
        }
    }

    /// Configured camera frame size
    #[must_use]
    pub const fn frame_size(&self) -> FrameSize {
        FrameSize::new(self.camera.width, self.camera.height)
    }

    /// Screen size override, when both dimensions are set
    #[must_use]
    pub fn screen_override(&self) -> Option<ScreenSize> {
        Some(ScreenSize::new(self.cursor.screen_width?, self.cursor.screen_height?))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // Cursor
        if self.cursor.smoothing_factor == 0 {
            return Err(Error::ConfigError(
                "Smoothing factor must be at least 1".to_string(),
            ));
        }
        if ActiveRegion::for_frame(self.frame_size(), self.cursor.frame_margin).is_none() {
            return Err(Error::ConfigError(format!(
                "Frame margin {} leaves no active region in a {}x{} frame",
                self.cursor.frame_margin, self.camera.width, self.camera.height
            )));
        }
        if self.cursor.screen_width == Some(0) || self.cursor.screen_height == Some(0) {
            return Err(Error::ConfigError("Screen size must be non-zero".to_string()));
        }

        // Gestures
        let gestures = &self.gestures;
        if !(gestures.proximity_threshold.is_finite() && gestures.proximity_threshold > 0.0) {
            return Err(Error::ConfigError(
                "Proximity threshold must be a positive number".to_string(),
            ));
        }
        if !(gestures.depth_gate_threshold.is_finite() && gestures.depth_gate_threshold >= 0.0) {
            return Err(Error::ConfigError(
                "Depth gate threshold must be a non-negative number".to_string(),
            ));
        }
        if !(gestures.scroll_damping.is_finite() && gestures.scroll_damping > 0.0) {
            return Err(Error::ConfigError(
                "Scroll damping must be a positive number".to_string(),
            ));
        }
        if gestures.scroll_clamp < 1 {
            return Err(Error::ConfigError("Scroll clamp must be at least 1".to_string()));
        }
        self.gesture_table()?;

        // Display and models
        if self.display.bbox_margin < 0 {
            return Err(Error::ConfigError(
                "Bounding box margin must not be negative".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.models.min_confidence) {
            return Err(Error::ConfigError(
                "Minimum confidence must be between 0.0 and 1.0".to_string(),
            ));
        }

        Ok(())
    }

    /// Check that model files exist; only needed for live capture
    pub fn validate_models(&self) -> Result<()> {
        if !self.models.hand_landmarks.exists() {
            return Err(Error::ConfigError(format!(
                "Hand landmark model not found: {}",
                self.models.hand_landmarks.display()
            )));
        }
        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Hand Gesture Mouse Configuration

# Camera capture
camera:
  index: 0
  width: 640
  height: 480
  flip_x: true

# Cursor mapping
cursor:
  smoothing_factor: 7
  frame_margin: 100
  # screen_width: 1920
  # screen_height: 1080

# Gesture recognition
gestures:
  preset: standard  # standard, legacy or palm
  proximity_threshold: 30.0
  depth_gate_threshold: 0.03
  require_upright: true
  require_reach: true
  # legacy and palm presets ran ungated: set both flags above to false
  scroll_damping: 5.0
  scroll_clamp: 3
  # Custom rules replace the preset; first match wins.
  # Patterns list thumb..pinky as 0, 1 or * (any).
  # rules:
  #   - gesture: move
  #     extended: "01000"
  #     half_closed: "*0***"
  #     anchor: 8
  #   - gesture: right_click
  #     extended: "01100"
  #     confirm: [[4, 17]]

# Display settings
display:
  enabled: true
  bbox_margin: 20
  show_fps: true

# Model paths
models:
  hand_landmarks: "assets/hand_landmarks.onnx"
  min_confidence: 0.5
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let parsed: Config = serde_yaml::from_str(EXAMPLE_CONFIG).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = serde_yaml::from_str("cursor:\n  smoothing_factor: 3\n").unwrap();
        assert_eq!(parsed.cursor.smoothing_factor, 3);
        assert_eq!(parsed.cursor.frame_margin, DEFAULT_FRAME_MARGIN);
        assert_eq!(parsed.gestures.preset, GesturePreset::Standard);
    }

    #[test]
    fn test_screen_override_needs_both_dimensions() {
        let mut config = Config::default();
        config.cursor.screen_width = Some(1280);
        assert!(config.screen_override().is_none());
        config.cursor.screen_height = Some(720);
        assert_eq!(config.screen_override(), Some(ScreenSize::new(1280, 720)));
    }
}

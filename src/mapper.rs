//! Camera-to-screen mapping and cursor smoothing.
//!
//! A landmark position inside the active region (the camera frame shrunk by
//! a margin on every side) is linearly remapped onto the full screen, with
//! positions outside the region clamped to the screen edges. The mapped
//! target is then smoothed exponentially:
//!
//! ```text
//! next = prev + (target - prev) / smoothing_factor
//! ```

use crate::{
    landmarks::{FrameSize, PixelPoint},
    Error, Result,
};
use serde::{Deserialize, Serialize};

/// Screen dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Sub-rectangle of the camera frame that maps onto the whole screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveRegion {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl ActiveRegion {
    /// Frame shrunk by `margin` on all sides.
    ///
    /// Returns `None` when the margin leaves no area to map from.
    #[must_use]
    pub fn for_frame(frame: FrameSize, margin: u32) -> Option<Self> {
        let doubled = u64::from(margin) * 2;
        if u64::from(frame.width) <= doubled || u64::from(frame.height) <= doubled {
            return None;
        }
        let margin = f64::from(margin);
        Some(Self {
            x_min: margin,
            x_max: f64::from(frame.width) - margin,
            y_min: margin,
            y_max: f64::from(frame.height) - margin,
        })
    }

    /// True when a pixel lies inside the region, borders included
    #[must_use]
    pub fn contains(&self, point: PixelPoint) -> bool {
        let (x, y) = (f64::from(point.x), f64::from(point.y));
        (self.x_min..=self.x_max).contains(&x) && (self.y_min..=self.y_max).contains(&y)
    }
}

/// Piecewise-linear interpolation from `[from_lo, from_hi]` to `[to_lo, to_hi]`,
/// clamped to the end points outside the input range
#[must_use]
pub fn interp(value: f64, from_lo: f64, from_hi: f64, to_lo: f64, to_hi: f64) -> f64 {
    if value <= from_lo {
        to_lo
    } else if value >= from_hi {
        to_hi
    } else {
        to_lo + (value - from_lo) * (to_hi - to_lo) / (from_hi - from_lo)
    }
}

/// Maps camera pixels onto screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorMapper {
    screen: ScreenSize,
    margin: u32,
}

impl CursorMapper {
    /// Create a mapper
    ///
    /// # Errors
    ///
    /// Returns an error if the screen has a zero dimension.
    pub fn new(screen: ScreenSize, margin: u32) -> Result<Self> {
        if screen.width == 0 || screen.height == 0 {
            return Err(Error::ConfigError(format!(
                "Screen size must be non-zero, got {}x{}",
                screen.width, screen.height
            )));
        }
        Ok(Self { screen, margin })
    }

    #[must_use]
    pub const fn screen(&self) -> ScreenSize {
        self.screen
    }

    #[must_use]
    pub const fn margin(&self) -> u32 {
        self.margin
    }

    /// Active region for a frame, see [`ActiveRegion::for_frame`]
    #[must_use]
    pub fn active_region(&self, frame: FrameSize) -> Option<ActiveRegion> {
        ActiveRegion::for_frame(frame, self.margin)
    }

    /// Screen-space target for a camera pixel, `None` for a degenerate region
    #[must_use]
    pub fn map(&self, point: PixelPoint, frame: FrameSize) -> Option<(f64, f64)> {
        let region = self.active_region(frame)?;
        Some((
            interp(
                f64::from(point.x),
                region.x_min,
                region.x_max,
                0.0,
                f64::from(self.screen.width),
            ),
            interp(
                f64::from(point.y),
                region.y_min,
                region.y_max,
                0.0,
                f64::from(self.screen.height),
            ),
        ))
    }
}

/// Smoothed cursor position carried across frames
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorState {
    x: f64,
    y: f64,
    smoothing_factor: u32,
}

impl CursorState {
    /// Create a cursor state at the origin
    ///
    /// # Errors
    ///
    /// Returns an error if the smoothing factor is zero.
    pub fn new(smoothing_factor: u32) -> Result<Self> {
        if smoothing_factor == 0 {
            return Err(Error::ConfigError(
                "Smoothing factor must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            x: 0.0,
            y: 0.0,
            smoothing_factor,
        })
    }

    /// Last committed position
    #[must_use]
    pub const fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    #[must_use]
    pub const fn smoothing_factor(&self) -> u32 {
        self.smoothing_factor
    }

    /// Next position toward `target`, without committing it
    #[must_use]
    pub fn smoothed(&self, target: (f64, f64)) -> (f64, f64) {
        let factor = f64::from(self.smoothing_factor);
        (
            self.x + (target.0 - self.x) / factor,
            self.y + (target.1 - self.y) / factor,
        )
    }

    /// Move one smoothing step toward `target` and return the new position
    pub fn advance(&mut self, target: (f64, f64)) -> (f64, f64) {
        let (x, y) = self.smoothed(target);
        self.x = x;
        self.y = y;
        (x, y)
    }

    /// Return to the origin
    pub fn reset(&mut self) {
        self.x = 0.0;
        self.y = 0.0;
    }
}

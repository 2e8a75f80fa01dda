//! Landmark preprocessing: palm center, bounding box and hand orientation.

use crate::{
    constants::{
        DEFAULT_BBOX_MARGIN, INDEX_MCP, MIDDLE_TIP, NUM_HAND_LANDMARKS, PALM_LANDMARKS, PINKY_MCP, WRIST,
    },
    landmarks::{FrameSize, Handedness, LandmarkSet, PixelLandmark, PixelPoint},
    utils::safe_cast::f32_to_i32_clamp,
};

/// Pixel-space extent of a hand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub xmin: i32,
    pub ymin: i32,
    pub xmax: i32,
    pub ymax: i32,
}

impl BoundingBox {
    /// Smallest box containing every point, `None` for an empty slice
    #[must_use]
    pub fn enclosing(points: &[PixelLandmark]) -> Option<Self> {
        let first = points.first()?.point;
        let init = Self {
            xmin: first.x,
            ymin: first.y,
            xmax: first.x,
            ymax: first.y,
        };
        Some(points.iter().fold(init, |bbox, lm| Self {
            xmin: bbox.xmin.min(lm.point.x),
            ymin: bbox.ymin.min(lm.point.y),
            xmax: bbox.xmax.max(lm.point.x),
            ymax: bbox.ymax.max(lm.point.y),
        }))
    }

    /// Box grown by `margin` pixels on every side
    #[must_use]
    pub const fn expanded(&self, margin: i32) -> Self {
        Self {
            xmin: self.xmin.saturating_sub(margin),
            ymin: self.ymin.saturating_sub(margin),
            xmax: self.xmax.saturating_add(margin),
            ymax: self.ymax.saturating_add(margin),
        }
    }

    #[must_use]
    pub const fn width(&self) -> i32 {
        self.xmax.saturating_sub(self.xmin)
    }

    #[must_use]
    pub const fn height(&self) -> i32 {
        self.ymax.saturating_sub(self.ymin)
    }
}

/// One hand after preprocessing, ready for classification
#[derive(Debug, Clone, PartialEq)]
pub struct HandObservation {
    /// Handedness label reported by the detector
    pub handedness: Handedness,
    /// Detector confidence
    pub confidence: f32,
    /// Frame the pixel coordinates refer to
    pub frame: FrameSize,
    /// All 21 landmarks in pixel space
    pub points: Vec<PixelLandmark>,
    /// Mean of wrist, index MCP, pinky MCP and middle PIP
    pub palm_center: PixelPoint,
    /// Tight bounding box over all landmarks
    pub bounding_box: BoundingBox,
    /// Palm facing away: middle fingertip below the wrist
    pub flipped: bool,
    /// Hand rotated so the index knuckle is on the wrong side of the pinky knuckle
    pub turned: bool,
}

impl HandObservation {
    /// Pixel position of a landmark; ids are validated upstream
    #[must_use]
    pub fn point(&self, id: usize) -> PixelPoint {
        self.points.get(id).map(|lm| lm.point).unwrap_or_default()
    }

    /// Relative depth of a landmark
    #[must_use]
    pub fn depth(&self, id: usize) -> f32 {
        self.points.get(id).map_or(0.0, |lm| lm.z)
    }

    /// Neither turned nor flipped
    #[must_use]
    pub const fn is_upright(&self) -> bool {
        !(self.turned || self.flipped)
    }
}

/// Turns a raw landmark set into a [`HandObservation`]
#[derive(Debug, Clone, Copy)]
pub struct Preprocessor {
    bbox_margin: i32,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(DEFAULT_BBOX_MARGIN)
    }
}

impl Preprocessor {
    /// Create a preprocessor with the given display margin for bounding boxes
    #[must_use]
    pub const fn new(bbox_margin: i32) -> Self {
        Self { bbox_margin }
    }

    /// Margin added around the bounding box when drawn
    #[must_use]
    pub const fn bbox_margin(&self) -> i32 {
        self.bbox_margin
    }

    /// Bounding box of a hand grown by the display margin
    #[must_use]
    pub const fn display_box(&self, hand: &HandObservation) -> BoundingBox {
        hand.bounding_box.expanded(self.bbox_margin)
    }

    /// Preprocess one landmark set.
    ///
    /// Returns `None` for an empty set; downstream gesture logic is then
    /// skipped for the frame.
    #[must_use]
    pub fn process(&self, set: &LandmarkSet, frame: FrameSize) -> Option<HandObservation> {
        if set.landmarks().len() < NUM_HAND_LANDMARKS {
            return None;
        }

        let points = set.to_pixels(frame);
        let bounding_box = BoundingBox::enclosing(&points)?;

        Some(HandObservation {
            handedness: set.handedness(),
            confidence: set.confidence(),
            frame,
            palm_center: palm_center(set, frame),
            bounding_box,
            flipped: is_flipped(set),
            turned: is_turned(set),
            points,
        })
    }
}

/// Pixel-space mean of the palm landmarks
#[allow(clippy::cast_precision_loss)] // Frame dimensions are far below f32 precision limits
fn palm_center(set: &LandmarkSet, frame: FrameSize) -> PixelPoint {
    let lms = set.landmarks();
    let count = PALM_LANDMARKS.len() as f32;
    let mean_x = PALM_LANDMARKS.iter().map(|&id| lms[id].x).sum::<f32>() / count;
    let mean_y = PALM_LANDMARKS.iter().map(|&id| lms[id].y).sum::<f32>() / count;

    PixelPoint::new(
        f32_to_i32_clamp(mean_x * frame.width as f32, i32::MIN, i32::MAX),
        f32_to_i32_clamp(mean_y * frame.height as f32, i32::MIN, i32::MAX),
    )
}

fn is_flipped(set: &LandmarkSet) -> bool {
    let lms = set.landmarks();
    lms[MIDDLE_TIP].y > lms[WRIST].y
}

fn is_turned(set: &LandmarkSet) -> bool {
    let lms = set.landmarks();
    let side = set.handedness().thumb_side() as f32;
    side * (lms[INDEX_MCP].x - lms[PINKY_MCP].x) < 0.0
}

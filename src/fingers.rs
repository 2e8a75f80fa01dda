//! Finger state classification.
//!
//! Two independent boolean vectors are derived per hand, both purely from
//! the ordering of landmark coordinates (no distance thresholds), which
//! keeps them independent of hand scale and camera distance:
//!
//! - **extended**: the thumb tip lies past its IP joint on the thumb side;
//!   any other fingertip lies above the joint two landmarks down the chain.
//! - **half-closed**: the thumb tip lies between its IP and MCP joints;
//!   any other fingertip lies vertically between the joint one landmark
//!   down (DIP) and the joint three landmarks down (MCP), in either order.

use crate::{
    constants::{FINGERTIPS, NUM_HAND_LANDMARKS},
    landmarks::{Handedness, PixelLandmark},
};
use std::fmt;

/// The five fingers, in vector order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    /// All fingers in vector order
    pub const ALL: [Self; 5] = [Self::Thumb, Self::Index, Self::Middle, Self::Ring, Self::Pinky];

    /// Position of this finger in a [`FingerVector`]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Landmark id of the fingertip
    #[must_use]
    pub const fn tip(self) -> usize {
        FINGERTIPS[self as usize]
    }
}

/// One boolean per finger, thumb first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FingerVector([bool; 5]);

impl FingerVector {
    /// Create a vector from explicit flags
    #[must_use]
    pub const fn new(flags: [bool; 5]) -> Self {
        Self(flags)
    }

    /// Create a vector from `0`/`1` digits, e.g. `[0, 1, 0, 0, 0]`
    #[must_use]
    pub const fn from_bits(bits: [u8; 5]) -> Self {
        Self([bits[0] != 0, bits[1] != 0, bits[2] != 0, bits[3] != 0, bits[4] != 0])
    }

    /// Flag for one finger
    #[must_use]
    pub const fn is_set(&self, finger: Finger) -> bool {
        self.0[finger.index()]
    }

    /// Flags as an array
    #[must_use]
    pub const fn as_array(&self) -> [bool; 5] {
        self.0
    }

    /// Number of fingers flagged
    #[must_use]
    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&flag| flag).count()
    }
}

impl fmt::Display for FingerVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for flag in self.0 {
            f.write_str(if flag { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Both finger vectors of one hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FingerStates {
    /// Fully extended fingers
    pub extended: FingerVector,
    /// Partially curled fingers
    pub half_closed: FingerVector,
}

impl FingerStates {
    /// Create from two vectors
    #[must_use]
    pub const fn new(extended: FingerVector, half_closed: FingerVector) -> Self {
        Self { extended, half_closed }
    }
}

/// Classify both vectors.
///
/// Returns `None` when the hand has no landmarks; an absent classification
/// is distinct from "no finger raised".
#[must_use]
pub fn classify(points: &[PixelLandmark], handedness: Handedness) -> Option<FingerStates> {
    Some(FingerStates {
        extended: extended(points, handedness)?,
        half_closed: half_closed(points, handedness)?,
    })
}

/// Fully extended fingers
#[must_use]
pub fn extended(points: &[PixelLandmark], handedness: Handedness) -> Option<FingerVector> {
    if points.len() < NUM_HAND_LANDMARKS {
        return None;
    }
    let x = |id: usize| i64::from(points[id].point.x);
    let y = |id: usize| i64::from(points[id].point.y);
    let side = i64::from(handedness.thumb_side());

    let mut flags = [false; 5];
    let thumb = Finger::Thumb.tip();
    flags[0] = side * (x(thumb) - x(thumb - 1)) > 0;
    for finger in &Finger::ALL[1..] {
        let tip = finger.tip();
        flags[finger.index()] = y(tip) < y(tip - 2);
    }
    Some(FingerVector(flags))
}

/// Partially curled fingers
#[must_use]
pub fn half_closed(points: &[PixelLandmark], handedness: Handedness) -> Option<FingerVector> {
    if points.len() < NUM_HAND_LANDMARKS {
        return None;
    }
    let x = |id: usize| i64::from(points[id].point.x);
    let y = |id: usize| i64::from(points[id].point.y);
    let side = i64::from(handedness.thumb_side());

    let mut flags = [false; 5];
    let thumb = Finger::Thumb.tip();
    flags[0] = side * (x(thumb) - x(thumb - 1)) < 0 && side * (x(thumb) - x(thumb - 2)) > 0;
    for finger in &Finger::ALL[1..] {
        let tip = finger.tip();
        let (tip_y, dip_y, mcp_y) = (y(tip), y(tip - 1), y(tip - 3));
        flags[finger.index()] = (dip_y..=mcp_y).contains(&tip_y) || (mcp_y..=dip_y).contains(&tip_y);
    }
    Some(FingerVector(flags))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::PixelPoint;

    fn points_from(coords: &[(i32, i32)]) -> Vec<PixelLandmark> {
        coords
            .iter()
            .map(|&(x, y)| PixelLandmark {
                point: PixelPoint::new(x, y),
                z: 0.0,
            })
            .collect()
    }

    /// Right hand with only the index finger raised
    fn pointing_right_hand() -> Vec<PixelLandmark> {
        points_from(&[
            (320, 400), // wrist
            (300, 380), (275, 360), (265, 345), (300, 330), // thumb tucked
            (280, 300), (280, 270), (280, 250), (280, 200), // index extended
            (310, 300), (310, 275), (310, 300), (310, 320), // middle curled
            (340, 300), (340, 275), (340, 300), (340, 320), // ring curled
            (370, 300), (370, 275), (370, 300), (370, 320), // pinky curled
        ])
    }

    #[test]
    fn test_pointing_hand() {
        let states = classify(&pointing_right_hand(), Handedness::Right).unwrap();
        assert_eq!(states.extended, FingerVector::from_bits([0, 1, 0, 0, 0]));
        assert_eq!(states.half_closed, FingerVector::from_bits([0, 0, 0, 0, 0]));
    }

    #[test]
    fn test_empty_points_yield_no_classification() {
        assert!(classify(&[], Handedness::Right).is_none());
        assert!(extended(&[], Handedness::Left).is_none());
        assert!(half_closed(&[], Handedness::Left).is_none());
    }

    #[test]
    fn test_half_closed_band_either_order() {
        let mut points = pointing_right_hand();
        // Middle tip between DIP (250) and MCP (300)
        points[12].point.y = 270;
        points[11].point.y = 250;
        // Ring tip between MCP (300) and a DIP hooked below it (330)
        points[16].point.y = 310;
        points[15].point.y = 330;

        let half = half_closed(&points, Handedness::Right).unwrap();
        assert!(half.is_set(Finger::Middle));
        assert!(half.is_set(Finger::Ring));
        assert!(!half.is_set(Finger::Pinky));
    }

    #[test]
    fn test_thumb_half_closed_band() {
        let mut points = pointing_right_hand();
        // Right hand: tip between IP (265) and MCP (275)
        points[4].point.x = 270;
        let half = half_closed(&points, Handedness::Right).unwrap();
        assert!(half.is_set(Finger::Thumb));

        let ext = extended(&points, Handedness::Right).unwrap();
        assert!(!ext.is_set(Finger::Thumb));
    }

    #[test]
    fn test_extreme_coordinates_compare_without_overflow() {
        let mut points = pointing_right_hand();
        points[3].point.x = i32::MAX;
        points[4].point.x = i32::MIN;
        points[16].point.y = i32::MIN;
        points[14].point.y = i32::MAX;

        let states = classify(&points, Handedness::Right).unwrap();
        assert!(states.extended.is_set(Finger::Thumb));
        assert!(states.extended.is_set(Finger::Ring));
        assert!(!states.half_closed.is_set(Finger::Thumb));
    }

    #[test]
    fn test_vector_display() {
        assert_eq!(FingerVector::from_bits([0, 1, 1, 0, 1]).to_string(), "01101");
        assert_eq!(FingerVector::from_bits([1, 1, 1, 1, 1]).count(), 5);
    }
}

//! Constants used throughout the application

/// Number of landmarks in the hand skeleton model
pub const NUM_HAND_LANDMARKS: usize = 21;

/// Hand landmark indices
pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// Fingertip landmark ids, thumb first
pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Landmarks averaged to obtain the palm center
pub const PALM_LANDMARKS: [usize; 4] = [WRIST, INDEX_MCP, PINKY_MCP, MIDDLE_PIP];

/// Landmark whose depth decides whether the hand reaches toward the camera
pub const DEPTH_GATE_LANDMARK: usize = INDEX_TIP;

/// Default camera frame size
pub const DEFAULT_CAMERA_WIDTH: u32 = 640;
pub const DEFAULT_CAMERA_HEIGHT: u32 = 480;

/// Default cursor smoothing factor
pub const DEFAULT_SMOOTHING_FACTOR: u32 = 7;

/// Default margin (pixels) trimmed from every side of the camera frame
pub const DEFAULT_FRAME_MARGIN: u32 = 100;

/// Default pixel distance below which a landmark pair counts as touching
pub const DEFAULT_PROXIMITY_THRESHOLD: f64 = 30.0;

/// Fingertip-to-knuckle pixel distance of a closed fist, a tenth of the
/// default frame width
pub const FIST_TIP_DISTANCE: f64 = 64.0;

/// Default forward reach (negative relative depth) required to act
pub const DEFAULT_DEPTH_GATE_THRESHOLD: f32 = 0.03;

/// Default scroll damping divisor
pub const DEFAULT_SCROLL_DAMPING: f64 = 5.0;

/// Default maximum scroll step per frame
pub const DEFAULT_SCROLL_CLAMP: i32 = 3;

/// Margin (pixels) added around the bounding box when drawn
pub const DEFAULT_BBOX_MARGIN: i32 = 20;

/// Default minimum detector confidence for a hand to be used
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.5;

/// Screen size assumed when no screen geometry is available
pub const FALLBACK_SCREEN_WIDTH: u32 = 1920;
pub const FALLBACK_SCREEN_HEIGHT: u32 = 1080;

/// Bones of the hand skeleton, drawn by the overlay
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (WRIST, THUMB_CMC),
    (THUMB_CMC, THUMB_MCP),
    (THUMB_MCP, THUMB_IP),
    (THUMB_IP, THUMB_TIP),
    (WRIST, INDEX_MCP),
    (INDEX_MCP, INDEX_PIP),
    (INDEX_PIP, INDEX_DIP),
    (INDEX_DIP, INDEX_TIP),
    (INDEX_MCP, MIDDLE_MCP),
    (MIDDLE_MCP, MIDDLE_PIP),
    (MIDDLE_PIP, MIDDLE_DIP),
    (MIDDLE_DIP, MIDDLE_TIP),
    (MIDDLE_MCP, RING_MCP),
    (RING_MCP, RING_PIP),
    (RING_PIP, RING_DIP),
    (RING_DIP, RING_TIP),
    (RING_MCP, PINKY_MCP),
    (PINKY_MCP, PINKY_PIP),
    (PINKY_PIP, PINKY_DIP),
    (PINKY_DIP, PINKY_TIP),
    (WRIST, PINKY_MCP),
];

//! Gesture state machine.
//!
//! Finger states are matched against an ordered [`GestureTable`]; the first
//! matching rule decides the frame's [`GestureCategory`]. Rules are plain
//! data so the same machinery serves every driver variant and custom tables
//! loaded from configuration.

use crate::{
    constants::{
        DEPTH_GATE_LANDMARK, FIST_TIP_DISTANCE, INDEX_MCP, INDEX_TIP, MIDDLE_MCP, MIDDLE_TIP,
        NUM_HAND_LANDMARKS, PINKY_MCP, PINKY_TIP, RING_MCP, RING_TIP, THUMB_MCP, THUMB_TIP,
    },
    fingers::{self, FingerStates, FingerVector},
    landmarks::PixelPoint,
    preprocess::HandObservation,
    Error, Result,
};
use log::debug;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// The single gesture recognized for a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureCategory {
    /// No recognized gesture
    #[default]
    None,
    /// Cursor follows the rule's anchor
    Move,
    /// Primary button click
    LeftClick,
    /// Secondary button click
    RightClick,
    /// Press-and-hold while moving
    Drag,
    /// Vertical wheel scrolling
    Scroll,
}

impl GestureCategory {
    /// Name used in logs and configuration
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Move => "move",
            Self::LeftClick => "left_click",
            Self::RightClick => "right_click",
            Self::Drag => "drag",
            Self::Scroll => "scroll",
        }
    }
}

impl fmt::Display for GestureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Five tri-state slots matched against a [`FingerVector`].
///
/// Written as five characters of `0`, `1` or `*` (any), thumb first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FingerPattern([Option<bool>; 5]);

impl FingerPattern {
    /// Pattern matching exactly the given vector
    #[must_use]
    pub const fn exact(vector: FingerVector) -> Self {
        let v = vector.as_array();
        Self([Some(v[0]), Some(v[1]), Some(v[2]), Some(v[3]), Some(v[4])])
    }

    /// True when every constrained slot agrees with the vector
    #[must_use]
    pub fn matches(&self, vector: &FingerVector) -> bool {
        self.0
            .iter()
            .zip(vector.as_array())
            .all(|(slot, flag)| slot.map_or(true, |want| want == flag))
    }

    fn literal(s: &'static str) -> Self {
        s.parse().unwrap_or(Self([None; 5]))
    }
}

impl FromStr for FingerPattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let chars: Vec<char> = s.trim().chars().collect();
        if chars.len() != 5 {
            return Err(Error::ConfigError(format!(
                "Finger pattern '{s}' must have exactly 5 slots"
            )));
        }

        let mut slots = [None; 5];
        for (slot, c) in slots.iter_mut().zip(chars) {
            *slot = match c {
                '0' => Some(false),
                '1' => Some(true),
                '*' => None,
                other => {
                    return Err(Error::ConfigError(format!(
                        "Invalid character '{other}' in finger pattern '{s}'"
                    )))
                }
            };
        }
        Ok(Self(slots))
    }
}

impl TryFrom<String> for FingerPattern {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<FingerPattern> for String {
    fn from(pattern: FingerPattern) -> Self {
        pattern.to_string()
    }
}

impl fmt::Display for FingerPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for slot in self.0 {
            f.write_str(match slot {
                Some(true) => "1",
                Some(false) => "0",
                None => "*",
            })?;
        }
        Ok(())
    }
}

/// Two landmark ids whose pixel distance confirms a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProximityPair(pub usize, pub usize);

const PALM_CENTER: &str = "palm_center";

/// Point whose pixel position drives the cursor for a gesture.
///
/// Written in configuration as a landmark id or `palm_center`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// One of the 21 landmarks
    Landmark(usize),
    /// Mean of wrist, index MCP, pinky MCP and middle PIP
    PalmCenter,
}

impl Anchor {
    /// Pixel position of the anchor on a preprocessed hand
    #[must_use]
    pub fn locate(self, hand: &HandObservation) -> PixelPoint {
        match self {
            Self::Landmark(id) => hand.point(id),
            Self::PalmCenter => hand.palm_center,
        }
    }
}

impl From<usize> for Anchor {
    fn from(id: usize) -> Self {
        Self::Landmark(id)
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Landmark(id) => write!(f, "landmark {id}"),
            Self::PalmCenter => f.write_str(PALM_CENTER),
        }
    }
}

impl Serialize for Anchor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Landmark(id) => serializer.serialize_u64(*id as u64),
            Self::PalmCenter => serializer.serialize_str(PALM_CENTER),
        }
    }
}

impl<'de> Deserialize<'de> for Anchor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Landmark(usize),
            Named(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Landmark(id) => Ok(Self::Landmark(id)),
            Repr::Named(name) if name == PALM_CENTER => Ok(Self::PalmCenter),
            Repr::Named(name) => Err(serde::de::Error::custom(format!(
                "unknown anchor '{name}', expected a landmark id or '{PALM_CENTER}'"
            ))),
        }
    }
}

/// One entry of a gesture table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureRule {
    /// Gesture reported when the rule matches
    pub gesture: GestureCategory,
    /// Required extended-finger pattern
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended: Option<FingerPattern>,
    /// Required half-closed-finger pattern
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half_closed: Option<FingerPattern>,
    /// Landmark pairs that must all be close for the action to fire
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub confirm: Vec<ProximityPair>,
    /// Pixel distance for `confirm`, overriding the global proximity threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_distance: Option<f64>,
    /// Point driving the cursor for this gesture
    #[serde(default = "default_anchor")]
    pub anchor: Anchor,
}

const fn default_anchor() -> Anchor {
    Anchor::Landmark(INDEX_TIP)
}

impl GestureRule {
    fn new(gesture: GestureCategory, anchor: impl Into<Anchor>) -> Self {
        Self {
            gesture,
            extended: None,
            half_closed: None,
            confirm: Vec::new(),
            max_distance: None,
            anchor: anchor.into(),
        }
    }

    fn extended(mut self, pattern: &'static str) -> Self {
        self.extended = Some(FingerPattern::literal(pattern));
        self
    }

    fn half_closed(mut self, pattern: &'static str) -> Self {
        self.half_closed = Some(FingerPattern::literal(pattern));
        self
    }

    fn confirm(mut self, a: usize, b: usize) -> Self {
        self.confirm.push(ProximityPair(a, b));
        self
    }

    fn within(mut self, distance: f64) -> Self {
        self.max_distance = Some(distance);
        self
    }

    /// True when every pattern named by the rule matches
    #[must_use]
    pub fn matches(&self, states: &FingerStates) -> bool {
        self.extended.map_or(true, |p| p.matches(&states.extended))
            && self.half_closed.map_or(true, |p| p.matches(&states.half_closed))
    }

    fn validate(&self) -> Result<()> {
        if self.extended.is_none() && self.half_closed.is_none() {
            return Err(Error::ConfigError(format!(
                "Gesture rule '{}' names no finger pattern",
                self.gesture
            )));
        }
        if let Some(distance) = self.max_distance {
            if !(distance.is_finite() && distance > 0.0) {
                return Err(Error::ConfigError(format!(
                    "Gesture rule '{}' has max_distance {distance}, expected a positive number",
                    self.gesture
                )));
            }
        }
        let anchor_id = match self.anchor {
            Anchor::Landmark(id) => Some(id),
            Anchor::PalmCenter => None,
        };
        let ids = self
            .confirm
            .iter()
            .flat_map(|pair| [pair.0, pair.1])
            .chain(anchor_id);
        for id in ids {
            if id >= NUM_HAND_LANDMARKS {
                return Err(Error::ConfigError(format!(
                    "Gesture rule '{}' refers to landmark {id}, valid ids are 0..{NUM_HAND_LANDMARKS}",
                    self.gesture
                )));
            }
        }
        Ok(())
    }
}

/// Ordered list of gesture rules; the first match wins
#[derive(Debug, Clone, PartialEq)]
pub struct GestureTable {
    rules: Vec<GestureRule>,
}

impl Default for GestureTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl GestureTable {
    /// Build a table from custom rules
    ///
    /// # Errors
    ///
    /// Returns an error if a rule names no pattern or refers to a landmark
    /// outside the 21-point model.
    pub fn from_rules(rules: Vec<GestureRule>) -> Result<Self> {
        for rule in &rules {
            rule.validate()?;
        }
        Ok(Self { rules })
    }

    /// Half-closed index click with proximity-confirmed right click, drag
    /// and scroll
    #[must_use]
    pub fn standard() -> Self {
        Self {
            rules: vec![
                GestureRule::new(GestureCategory::Move, INDEX_TIP)
                    .extended("01000")
                    .half_closed("*0***"),
                GestureRule::new(GestureCategory::LeftClick, INDEX_TIP).half_closed("01000"),
                GestureRule::new(GestureCategory::RightClick, INDEX_TIP)
                    .extended("01100")
                    .confirm(THUMB_TIP, PINKY_MCP),
                GestureRule::new(GestureCategory::Drag, THUMB_TIP)
                    .extended("01001")
                    .confirm(THUMB_TIP, MIDDLE_TIP)
                    .confirm(THUMB_TIP, RING_TIP),
                GestureRule::new(GestureCategory::Scroll, MIDDLE_TIP)
                    .extended("01110")
                    .confirm(INDEX_TIP, MIDDLE_TIP)
                    .confirm(MIDDLE_TIP, RING_TIP),
            ],
        }
    }

    /// Extension-only table: two-finger left click, open-hand right click,
    /// thumb-only drag and unconfirmed scroll.
    ///
    /// The driver this reproduces checked neither orientation nor depth; the
    /// gates are configured separately on [`GestureStateMachine`].
    #[must_use]
    pub fn legacy() -> Self {
        Self {
            rules: vec![
                GestureRule::new(GestureCategory::Move, INDEX_TIP).extended("01000"),
                GestureRule::new(GestureCategory::LeftClick, INDEX_TIP).extended("01100"),
                GestureRule::new(GestureCategory::RightClick, INDEX_TIP)
                    .extended("*1111")
                    .confirm(THUMB_TIP, PINKY_MCP),
                GestureRule::new(GestureCategory::Drag, THUMB_TIP).extended("10000"),
                GestureRule::new(GestureCategory::Scroll, INDEX_TIP).extended("01110"),
            ],
        }
    }

    /// Palm-tracking table: the palm center steers the cursor and a closed
    /// fist, every fingertip near its knuckle, clicks.
    ///
    /// Like [`GestureTable::legacy`] it comes from a driver without gates.
    #[must_use]
    pub fn palm() -> Self {
        Self {
            rules: vec![
                GestureRule::new(GestureCategory::LeftClick, Anchor::PalmCenter)
                    .extended("00000")
                    .confirm(THUMB_TIP, THUMB_MCP)
                    .confirm(INDEX_TIP, INDEX_MCP)
                    .confirm(MIDDLE_TIP, MIDDLE_MCP)
                    .confirm(RING_TIP, RING_MCP)
                    .confirm(PINKY_TIP, PINKY_MCP)
                    .within(FIST_TIP_DISTANCE),
                GestureRule::new(GestureCategory::Move, Anchor::PalmCenter).extended("*****"),
            ],
        }
    }

    /// Rules in priority order
    #[must_use]
    pub fn rules(&self) -> &[GestureRule] {
        &self.rules
    }

    /// First rule matching the finger states
    #[must_use]
    pub fn lookup(&self, states: &FingerStates) -> Option<&GestureRule> {
        self.rules.iter().find(|rule| rule.matches(states))
    }

    /// Category of the first matching rule, `None` if nothing matches
    #[must_use]
    pub fn classify(&self, states: &FingerStates) -> GestureCategory {
        self.lookup(states).map_or(GestureCategory::None, |rule| rule.gesture)
    }
}

/// Distance measured for one confirmation pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityReading {
    pub pair: ProximityPair,
    pub from: PixelPoint,
    pub to: PixelPoint,
    pub distance: f64,
    pub within: bool,
}

/// Result of evaluating one hand
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Recognition {
    /// Finger states the decision was based on
    pub states: Option<FingerStates>,
    /// Category chosen by the table, before gating
    pub gesture: GestureCategory,
    /// All confirmation pairs are within the proximity threshold
    pub confirmed: bool,
    /// Hand neither turned nor flipped (or orientation not required)
    pub upright: bool,
    /// Hand reaches far enough toward the camera
    pub reaching: bool,
    /// Pixel position driving the cursor for this gesture
    pub anchor: Option<PixelPoint>,
    /// Confirmation measurements, for display
    pub proximity: Vec<ProximityReading>,
}

impl Recognition {
    /// Both orientation and depth gates pass
    #[must_use]
    pub const fn gate_open(&self) -> bool {
        self.upright && self.reaching
    }

    /// Gesture to act on: the table's choice when the gates are open, else `None`
    #[must_use]
    pub const fn actionable(&self) -> GestureCategory {
        if self.gate_open() {
            self.gesture
        } else {
            GestureCategory::None
        }
    }
}

/// Maps a preprocessed hand to a [`Recognition`]
#[derive(Debug, Clone)]
pub struct GestureStateMachine {
    table: GestureTable,
    proximity_threshold: f64,
    depth_gate_threshold: f32,
    require_upright: bool,
    require_reach: bool,
}

impl GestureStateMachine {
    /// Create a state machine
    ///
    /// # Errors
    ///
    /// Returns an error if the proximity threshold is not positive or the
    /// depth gate is negative or not finite.
    pub fn new(
        table: GestureTable,
        proximity_threshold: f64,
        depth_gate_threshold: f32,
        require_upright: bool,
    ) -> Result<Self> {
        if !(proximity_threshold.is_finite() && proximity_threshold > 0.0) {
            return Err(Error::ConfigError(format!(
                "Proximity threshold must be positive, got {proximity_threshold}"
            )));
        }
        if !(depth_gate_threshold.is_finite() && depth_gate_threshold >= 0.0) {
            return Err(Error::ConfigError(format!(
                "Depth gate threshold must be non-negative, got {depth_gate_threshold}"
            )));
        }
        Ok(Self {
            table,
            proximity_threshold,
            depth_gate_threshold,
            require_upright,
            require_reach: true,
        })
    }

    /// Enable or disable the depth gate; it is on by default
    #[must_use]
    pub fn with_require_reach(mut self, require_reach: bool) -> Self {
        self.require_reach = require_reach;
        self
    }

    /// The gesture table in use
    #[must_use]
    pub const fn table(&self) -> &GestureTable {
        &self.table
    }

    /// Pure table lookup, without gates or confirmation
    #[must_use]
    pub fn classify(&self, states: &FingerStates) -> GestureCategory {
        self.table.classify(states)
    }

    /// Evaluate one hand
    #[must_use]
    pub fn evaluate(&self, hand: &HandObservation) -> Recognition {
        let upright = !self.require_upright || hand.is_upright();
        let reaching =
            !self.require_reach || -hand.depth(DEPTH_GATE_LANDMARK) > self.depth_gate_threshold;

        let Some(states) = fingers::classify(&hand.points, hand.handedness) else {
            return Recognition {
                upright,
                reaching,
                ..Recognition::default()
            };
        };

        let Some(rule) = self.table.lookup(&states) else {
            debug!(
                "No gesture for extended={} half_closed={}",
                states.extended, states.half_closed
            );
            return Recognition {
                states: Some(states),
                upright,
                reaching,
                ..Recognition::default()
            };
        };

        let threshold = rule.max_distance.unwrap_or(self.proximity_threshold);
        let proximity: Vec<ProximityReading> = rule
            .confirm
            .iter()
            .map(|&pair| {
                let from = hand.point(pair.0);
                let to = hand.point(pair.1);
                let distance = from.distance_to(&to);
                ProximityReading {
                    pair,
                    from,
                    to,
                    distance,
                    within: distance < threshold,
                }
            })
            .collect();
        let confirmed = proximity.iter().all(|reading| reading.within);

        debug!(
            "Gesture {} (extended={} half_closed={} confirmed={} upright={} reaching={})",
            rule.gesture, states.extended, states.half_closed, confirmed, upright, reaching
        );

        Recognition {
            states: Some(states),
            gesture: rule.gesture,
            confirmed,
            upright,
            reaching,
            anchor: Some(rule.anchor.locate(hand)),
            proximity,
        }
    }
}

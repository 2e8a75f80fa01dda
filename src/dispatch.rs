//! Action dispatcher.
//!
//! Turns one frame's [`Recognition`] into input commands. The dispatcher
//! exclusively owns all state that lives across frames: the smoothed
//! [`CursorState`], the [`DragSession`] and the [`ScrollBaseline`].

use crate::{
    constants::{DEFAULT_SCROLL_CLAMP, DEFAULT_SCROLL_DAMPING},
    gesture::{GestureCategory, Recognition},
    input::{InputCommand, InputSink, MouseButton},
    landmarks::FrameSize,
    mapper::{CursorMapper, CursorState},
    utils::safe_cast::f64_to_i32_clamp,
    Error, Result,
};
use log::{info, warn};

/// Conversion of vertical hand motion into wheel steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSettings {
    damping: f64,
    clamp: i32,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            damping: DEFAULT_SCROLL_DAMPING,
            clamp: DEFAULT_SCROLL_CLAMP,
        }
    }
}

impl ScrollSettings {
    /// Create scroll settings
    ///
    /// # Errors
    ///
    /// Returns an error if `damping` is not a positive finite number or
    /// `clamp` is below 1.
    pub fn new(damping: f64, clamp: i32) -> Result<Self> {
        if !(damping.is_finite() && damping > 0.0) {
            return Err(Error::ConfigError(format!(
                "Scroll damping must be positive, got {damping}"
            )));
        }
        if clamp < 1 {
            return Err(Error::ConfigError(format!(
                "Scroll clamp must be at least 1, got {clamp}"
            )));
        }
        Ok(Self { damping, clamp })
    }

    #[must_use]
    pub const fn damping(&self) -> f64 {
        self.damping
    }

    #[must_use]
    pub const fn clamp(&self) -> i32 {
        self.clamp
    }

    /// Wheel steps for a move from `baseline` to `current`, truncated toward
    /// zero and limited to `[-clamp, clamp]`
    #[must_use]
    pub fn delta(&self, baseline: f64, current: f64) -> i32 {
        f64_to_i32_clamp((current - baseline) / self.damping, -self.clamp, self.clamp)
    }
}

/// Press-and-hold interval of the primary button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragSession {
    active: bool,
}

impl DragSession {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

/// Cursor row a scroll is measured from, captured on its first frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollBaseline {
    last_y: Option<f64>,
}

impl ScrollBaseline {
    /// Screen Y every delta is measured from, if a scroll is in progress
    #[must_use]
    pub const fn last_y(&self) -> Option<f64> {
        self.last_y
    }

    pub fn clear(&mut self) {
        self.last_y = None;
    }
}

/// What the dispatcher did for one frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DispatchOutcome {
    /// Gesture acted upon, after gating
    pub gesture: GestureCategory,
    /// Commands sent to the sink, in order
    pub commands: Vec<InputCommand>,
    /// Smoothed cursor position after the frame
    pub cursor: (f64, f64),
}

/// Executes gestures against an [`InputSink`]
pub struct ActionDispatcher<S: InputSink> {
    sink: S,
    mapper: CursorMapper,
    cursor: CursorState,
    scroll_settings: ScrollSettings,
    drag: DragSession,
    scroll: ScrollBaseline,
    issued: Vec<InputCommand>,
}

impl<S: InputSink> ActionDispatcher<S> {
    #[must_use]
    pub const fn new(
        sink: S,
        mapper: CursorMapper,
        cursor: CursorState,
        scroll_settings: ScrollSettings,
    ) -> Self {
        Self {
            sink,
            mapper,
            cursor,
            scroll_settings,
            drag: DragSession { active: false },
            scroll: ScrollBaseline { last_y: None },
            issued: Vec::new(),
        }
    }

    /// Act on one frame
    pub fn dispatch(&mut self, recognition: &Recognition, frame: FrameSize) -> DispatchOutcome {
        self.issued.clear();
        let gesture = recognition.actionable();
        let confirmed = recognition.confirmed;

        if self.drag.active && !(gesture == GestureCategory::Drag && confirmed) {
            self.stop_drag();
        }
        if !(gesture == GestureCategory::Scroll && confirmed) {
            self.scroll.clear();
        }

        match gesture {
            GestureCategory::Move => self.follow(recognition, frame),
            GestureCategory::LeftClick if confirmed => {
                self.send(InputCommand::Click(MouseButton::Left));
            }
            GestureCategory::RightClick if confirmed => {
                self.send(InputCommand::Click(MouseButton::Right));
            }
            GestureCategory::Drag if confirmed => {
                self.start_drag();
                self.follow(recognition, frame);
            }
            GestureCategory::Scroll if confirmed => self.scroll(recognition, frame),
            _ => {}
        }

        DispatchOutcome {
            gesture,
            commands: std::mem::take(&mut self.issued),
            cursor: self.cursor.position(),
        }
    }

    /// Press the primary button unless a drag is already active.
    ///
    /// Returns `true` when a press was issued and accepted.
    pub fn start_drag(&mut self) -> bool {
        if self.drag.active {
            return false;
        }
        if self.send(InputCommand::Press(MouseButton::Left)) {
            info!("Drag started");
            self.drag.active = true;
            true
        } else {
            false
        }
    }

    /// Release the primary button if a drag is active.
    ///
    /// The session ends even if the release fails, so no second release is
    /// ever attempted for the same press.
    pub fn stop_drag(&mut self) -> bool {
        if !self.drag.active {
            return false;
        }
        self.drag.active = false;
        info!("Drag stopped");
        self.send(InputCommand::Release(MouseButton::Left));
        true
    }

    /// End drag and scroll sessions, e.g. when the hand leaves the frame
    pub fn end_sessions(&mut self) -> Vec<InputCommand> {
        self.issued.clear();
        self.stop_drag();
        self.scroll.clear();
        std::mem::take(&mut self.issued)
    }

    /// Release everything before the sink is dropped
    pub fn shutdown(&mut self) -> Vec<InputCommand> {
        if self.drag.active {
            info!("Releasing active drag on shutdown");
        }
        self.end_sessions()
    }

    /// End sessions and move the smoothed cursor back to the origin
    pub fn reset(&mut self) -> Vec<InputCommand> {
        let released = self.end_sessions();
        self.cursor.reset();
        released
    }

    #[must_use]
    pub const fn mapper(&self) -> &CursorMapper {
        &self.mapper
    }

    #[must_use]
    pub const fn cursor(&self) -> &CursorState {
        &self.cursor
    }

    #[must_use]
    pub const fn drag_session(&self) -> DragSession {
        self.drag
    }

    #[must_use]
    pub const fn scroll_baseline(&self) -> ScrollBaseline {
        self.scroll
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.drag.active
    }

    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Smooth toward the anchor and move the pointer there
    fn follow(&mut self, recognition: &Recognition, frame: FrameSize) {
        let Some(target) = self.target(recognition, frame) else {
            return;
        };
        let (x, y) = self.cursor.advance(target);
        self.send(InputCommand::MoveTo {
            x: f64_to_i32_clamp(x, i32::MIN, i32::MAX),
            y: f64_to_i32_clamp(y, i32::MIN, i32::MAX),
        });
    }

    /// Scroll by the offset of the anchor from the cursor row captured when
    /// the scroll started. A hand held away from that row keeps scrolling.
    fn scroll(&mut self, recognition: &Recognition, frame: FrameSize) {
        let Some((_, current_y)) = self.target(recognition, frame) else {
            return;
        };
        let cursor_y = self.cursor.position().1;
        let baseline = *self.scroll.last_y.get_or_insert(cursor_y);

        let delta = self.scroll_settings.delta(baseline, current_y);
        if delta != 0 {
            self.send(InputCommand::ScrollBy { dx: 0, dy: delta });
        }
    }

    fn target(&self, recognition: &Recognition, frame: FrameSize) -> Option<(f64, f64)> {
        let anchor = recognition.anchor?;
        let target = self.mapper.map(anchor, frame);
        if target.is_none() {
            warn!(
                "Margin {} leaves no active region in a {}x{} frame",
                self.mapper.margin(),
                frame.width,
                frame.height
            );
        }
        target
    }

    /// Send a command, logging rather than propagating a failure
    fn send(&mut self, command: InputCommand) -> bool {
        self.issued.push(command);
        match self.sink.send(command) {
            Ok(()) => true,
            Err(e) => {
                warn!("Input command {command} failed: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{input::RecordingSink, landmarks::PixelPoint, mapper::ScreenSize};

    fn dispatcher() -> ActionDispatcher<RecordingSink> {
        ActionDispatcher::new(
            RecordingSink::new(),
            CursorMapper::new(ScreenSize::new(1920, 1080), 100).unwrap(),
            CursorState::new(1).unwrap(),
            ScrollSettings::default(),
        )
    }

    fn recognition(gesture: GestureCategory, confirmed: bool, anchor: (i32, i32)) -> Recognition {
        Recognition {
            gesture,
            confirmed,
            upright: true,
            reaching: true,
            anchor: Some(PixelPoint::new(anchor.0, anchor.1)),
            ..Recognition::default()
        }
    }

    const FRAME: FrameSize = FrameSize::new(640, 480);

    #[test]
    fn test_scroll_settings_validation() {
        assert!(ScrollSettings::new(0.0, 3).is_err());
        assert!(ScrollSettings::new(5.0, 0).is_err());
        assert!(ScrollSettings::new(f64::INFINITY, 3).is_err());
        assert!(ScrollSettings::new(5.0, 3).is_ok());
    }

    #[test]
    fn test_scroll_delta_truncates_and_clamps() {
        let settings = ScrollSettings::default();
        assert_eq!(settings.delta(100.0, 109.9), 1);
        assert_eq!(settings.delta(100.0, 104.9), 0);
        assert_eq!(settings.delta(100.0, 90.1), -1);
        assert_eq!(settings.delta(0.0, 500.0), 3);
        assert_eq!(settings.delta(500.0, 0.0), -3);
    }

    #[test]
    fn test_move_uses_smoothed_position() {
        let mut d = dispatcher();
        let outcome = d.dispatch(&recognition(GestureCategory::Move, false, (320, 240)), FRAME);
        assert_eq!(outcome.commands, vec![InputCommand::MoveTo { x: 960, y: 540 }]);
        assert_eq!(outcome.cursor, (960.0, 540.0));
    }

    #[test]
    fn test_click_does_not_touch_cursor() {
        let mut d = dispatcher();
        d.dispatch(&recognition(GestureCategory::Move, false, (320, 240)), FRAME);
        let outcome = d.dispatch(&recognition(GestureCategory::LeftClick, true, (100, 100)), FRAME);
        assert_eq!(outcome.commands, vec![InputCommand::Click(MouseButton::Left)]);
        assert_eq!(outcome.cursor, (960.0, 540.0));
    }

    #[test]
    fn test_gated_frame_dispatches_nothing() {
        let mut d = dispatcher();
        let mut rec = recognition(GestureCategory::Move, false, (320, 240));
        rec.upright = false;
        let outcome = d.dispatch(&rec, FRAME);
        assert_eq!(outcome.gesture, GestureCategory::None);
        assert!(outcome.commands.is_empty());
    }

    #[test]
    fn test_reset_returns_cursor_to_origin() {
        let mut d = dispatcher();
        d.dispatch(&recognition(GestureCategory::Drag, true, (320, 240)), FRAME);
        let released = d.reset();
        assert_eq!(released, vec![InputCommand::Release(MouseButton::Left)]);
        assert_eq!(d.cursor().position(), (0.0, 0.0));
        assert!(!d.is_dragging());
    }
}

//! Per-frame composition of the gesture stages.
//!
//! ```text
//! LandmarkSet -> Preprocessor -> finger classifier -> GestureStateMachine -> ActionDispatcher
//! ```

use crate::{
    config::Config,
    dispatch::{ActionDispatcher, DispatchOutcome, ScrollSettings},
    gesture::{GestureCategory, GestureStateMachine, Recognition},
    input::{InputCommand, InputSink},
    mapper::{CursorMapper, CursorState, ScreenSize},
    preprocess::{HandObservation, Preprocessor},
    source::FrameObservation,
    Result,
};
use log::debug;

/// Everything computed for one frame, for overlays and tests
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Zero-based frame counter
    pub frame_index: u64,
    /// Preprocessed hand, if one was detected
    pub hand: Option<HandObservation>,
    /// Gesture evaluation, if a hand was detected
    pub recognition: Option<Recognition>,
    /// Commands issued and resulting cursor state
    pub outcome: DispatchOutcome,
}

impl FrameReport {
    /// Gesture acted upon this frame
    #[must_use]
    pub const fn gesture(&self) -> GestureCategory {
        self.outcome.gesture
    }

    #[must_use]
    pub fn commands(&self) -> &[InputCommand] {
        &self.outcome.commands
    }
}

/// Preprocessor, state machine and dispatcher wired together
pub struct GesturePipeline<S: InputSink> {
    preprocessor: Preprocessor,
    machine: GestureStateMachine,
    dispatcher: ActionDispatcher<S>,
    frame_index: u64,
}

impl<S: InputSink> GesturePipeline<S> {
    #[must_use]
    pub const fn new(
        preprocessor: Preprocessor,
        machine: GestureStateMachine,
        dispatcher: ActionDispatcher<S>,
    ) -> Self {
        Self {
            preprocessor,
            machine,
            dispatcher,
            frame_index: 0,
        }
    }

    /// Build every stage from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: &Config, sink: S, screen: ScreenSize) -> Result<Self> {
        config.validate()?;

        let machine = GestureStateMachine::new(
            config.gesture_table()?,
            config.gestures.proximity_threshold,
            config.gestures.depth_gate_threshold,
            config.gestures.require_upright,
        )?
        .with_require_reach(config.gestures.require_reach);
        let dispatcher = ActionDispatcher::new(
            sink,
            CursorMapper::new(screen, config.cursor.frame_margin)?,
            CursorState::new(config.cursor.smoothing_factor)?,
            ScrollSettings::new(config.gestures.scroll_damping, config.gestures.scroll_clamp)?,
        );

        Ok(Self::new(
            Preprocessor::new(config.display.bbox_margin),
            machine,
            dispatcher,
        ))
    }

    /// Run every stage for one frame
    pub fn process(&mut self, frame: &FrameObservation) -> FrameReport {
        let frame_index = self.frame_index;
        self.frame_index += 1;

        let hand = frame
            .hand
            .as_ref()
            .and_then(|set| self.preprocessor.process(set, frame.size));

        let Some(hand) = hand else {
            if self.dispatcher.is_dragging() {
                debug!("Hand lost during drag at frame {frame_index}");
            }
            let commands = self.dispatcher.end_sessions();
            return FrameReport {
                frame_index,
                hand: None,
                recognition: None,
                outcome: DispatchOutcome {
                    gesture: GestureCategory::None,
                    commands,
                    cursor: self.dispatcher.cursor().position(),
                },
            };
        };

        let recognition = self.machine.evaluate(&hand);
        let outcome = self.dispatcher.dispatch(&recognition, frame.size);

        FrameReport {
            frame_index,
            hand: Some(hand),
            recognition: Some(recognition),
            outcome,
        }
    }

    /// Release any held button; call before the sink goes away
    pub fn shutdown(&mut self) -> Vec<InputCommand> {
        self.dispatcher.shutdown()
    }

    /// Start a fresh control session
    pub fn reset(&mut self) -> Vec<InputCommand> {
        self.frame_index = 0;
        self.dispatcher.reset()
    }

    /// Frames processed since construction or the last reset
    #[must_use]
    pub const fn frames_processed(&self) -> u64 {
        self.frame_index
    }

    #[must_use]
    pub const fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    #[must_use]
    pub const fn state_machine(&self) -> &GestureStateMachine {
        &self.machine
    }

    #[must_use]
    pub const fn dispatcher(&self) -> &ActionDispatcher<S> {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut ActionDispatcher<S> {
        &mut self.dispatcher
    }
}

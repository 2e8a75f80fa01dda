//! Input-injection and screen-geometry seams.
//!
//! The dispatcher talks to the operating system only through [`InputSink`],
//! so the same gesture logic drives X11, a dry-run logger or a recorder in
//! tests.

use crate::{mapper::ScreenSize, Result};
use log::info;
use std::fmt;

/// Mouse buttons the dispatcher can press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Middle => "middle",
        })
    }
}

/// A primitive, fire-and-forget input command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputCommand {
    /// Absolute pointer move in screen pixels
    MoveTo { x: i32, y: i32 },
    /// Press and release
    Click(MouseButton),
    /// Press and hold
    Press(MouseButton),
    /// Release a held button
    Release(MouseButton),
    /// Wheel steps; positive `dy` scrolls up, positive `dx` scrolls right
    ScrollBy { dx: i32, dy: i32 },
}

impl fmt::Display for InputCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MoveTo { x, y } => write!(f, "move_to({x}, {y})"),
            Self::Click(button) => write!(f, "click({button})"),
            Self::Press(button) => write!(f, "press({button})"),
            Self::Release(button) => write!(f, "release({button})"),
            Self::ScrollBy { dx, dy } => write!(f, "scroll_by({dx}, {dy})"),
        }
    }
}

/// Receiver of synthetic input
pub trait InputSink {
    /// Move the pointer to absolute screen coordinates
    fn move_to(&mut self, x: i32, y: i32) -> Result<()>;

    /// Click a button
    fn click(&mut self, button: MouseButton) -> Result<()>;

    /// Press and hold a button
    fn press_button(&mut self, button: MouseButton) -> Result<()>;

    /// Release a held button
    fn release_button(&mut self, button: MouseButton) -> Result<()>;

    /// Scroll by whole wheel steps
    fn scroll_by(&mut self, dx: i32, dy: i32) -> Result<()>;

    /// Route a command to the matching method
    fn send(&mut self, command: InputCommand) -> Result<()> {
        match command {
            InputCommand::MoveTo { x, y } => self.move_to(x, y),
            InputCommand::Click(button) => self.click(button),
            InputCommand::Press(button) => self.press_button(button),
            InputCommand::Release(button) => self.release_button(button),
            InputCommand::ScrollBy { dx, dy } => self.scroll_by(dx, dy),
        }
    }
}

impl<S: InputSink + ?Sized> InputSink for Box<S> {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        (**self).move_to(x, y)
    }

    fn click(&mut self, button: MouseButton) -> Result<()> {
        (**self).click(button)
    }

    fn press_button(&mut self, button: MouseButton) -> Result<()> {
        (**self).press_button(button)
    }

    fn release_button(&mut self, button: MouseButton) -> Result<()> {
        (**self).release_button(button)
    }

    fn scroll_by(&mut self, dx: i32, dy: i32) -> Result<()> {
        (**self).scroll_by(dx, dy)
    }

    fn send(&mut self, command: InputCommand) -> Result<()> {
        (**self).send(command)
    }
}

/// Source of the screen dimensions, queried once at startup
pub trait ScreenGeometry {
    fn screen_size(&self) -> Result<ScreenSize>;
}

/// Screen geometry from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedScreen(pub ScreenSize);

impl ScreenGeometry for FixedScreen {
    fn screen_size(&self) -> Result<ScreenSize> {
        Ok(self.0)
    }
}

/// Stores every command it receives
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    commands: Vec<InputCommand>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands received so far, oldest first
    #[must_use]
    pub fn commands(&self) -> &[InputCommand] {
        &self.commands
    }

    /// Number of received commands equal to `command`
    #[must_use]
    pub fn count(&self, command: InputCommand) -> usize {
        self.commands.iter().filter(|&&c| c == command).count()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl InputSink for RecordingSink {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        self.commands.push(InputCommand::MoveTo { x, y });
        Ok(())
    }

    fn click(&mut self, button: MouseButton) -> Result<()> {
        self.commands.push(InputCommand::Click(button));
        Ok(())
    }

    fn press_button(&mut self, button: MouseButton) -> Result<()> {
        self.commands.push(InputCommand::Press(button));
        Ok(())
    }

    fn release_button(&mut self, button: MouseButton) -> Result<()> {
        self.commands.push(InputCommand::Release(button));
        Ok(())
    }

    fn scroll_by(&mut self, dx: i32, dy: i32) -> Result<()> {
        self.commands.push(InputCommand::ScrollBy { dx, dy });
        Ok(())
    }
}

/// Dry-run sink that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl LogSink {
    fn log(command: InputCommand) -> Result<()> {
        info!("[dry-run] {command}");
        Ok(())
    }
}

impl InputSink for LogSink {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        Self::log(InputCommand::MoveTo { x, y })
    }

    fn click(&mut self, button: MouseButton) -> Result<()> {
        Self::log(InputCommand::Click(button))
    }

    fn press_button(&mut self, button: MouseButton) -> Result<()> {
        Self::log(InputCommand::Press(button))
    }

    fn release_button(&mut self, button: MouseButton) -> Result<()> {
        Self::log(InputCommand::Release(button))
    }

    fn scroll_by(&mut self, dx: i32, dy: i32) -> Result<()> {
        Self::log(InputCommand::ScrollBy { dx, dy })
    }
}

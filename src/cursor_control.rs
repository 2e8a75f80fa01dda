//! Cursor control for X11-based systems.
//!
//! Pointer motion uses `WarpPointer`; button presses, releases and wheel
//! steps are synthesized with the XTest extension. Wheel scrolling is a
//! click on the core buttons 4/5 (vertical) and 6/7 (horizontal).

use crate::{
    error::{AppError, Result},
    input::{InputSink, MouseButton, ScreenGeometry},
    mapper::ScreenSize,
    utils::safe_cast::i32_to_i16_clamp,
};
use log::{debug, info};
use x11rb::{
    connection::Connection,
    protocol::{
        xproto::{ConnectionExt, Screen, BUTTON_PRESS_EVENT, BUTTON_RELEASE_EVENT},
        xtest::ConnectionExt as XTestExt,
    },
    rust_connection::RustConnection,
};

const BUTTON_LEFT: u8 = 1;
const BUTTON_MIDDLE: u8 = 2;
const BUTTON_RIGHT: u8 = 3;
const WHEEL_UP: u8 = 4;
const WHEEL_DOWN: u8 = 5;
const WHEEL_LEFT: u8 = 6;
const WHEEL_RIGHT: u8 = 7;

const fn button_code(button: MouseButton) -> u8 {
    match button {
        MouseButton::Left => BUTTON_LEFT,
        MouseButton::Middle => BUTTON_MIDDLE,
        MouseButton::Right => BUTTON_RIGHT,
    }
}

/// Wheel button and repeat count for a signed step count
fn wheel_steps(delta: i32, positive: u8, negative: u8) -> (u8, u32) {
    let button = if delta > 0 { positive } else { negative };
    (button, delta.unsigned_abs())
}

/// Input sink backed by an X11 connection
pub struct X11InputSink {
    connection: RustConnection,
    screen: Screen,
    screen_width: u16,
    screen_height: u16,
}

impl X11InputSink {
    /// Connect to the default display and check for XTest
    pub fn new() -> Result<Self> {
        info!("Initializing X11 input sink");

        let (connection, screen_num) = RustConnection::connect(None)
            .map_err(|e| AppError::X11(format!("Failed to connect to X11: {e}")))?;

        let screen = connection
            .setup()
            .roots
            .get(screen_num)
            .ok_or_else(|| AppError::X11("Failed to get screen".to_string()))?
            .clone();

        let version = connection
            .xtest_get_version(2, 2)
            .map_err(|e| AppError::X11(format!("XTest extension unavailable: {e}")))?
            .reply()
            .map_err(|e| AppError::X11(format!("Failed to query XTest version: {e}")))?;

        let screen_width = screen.width_in_pixels;
        let screen_height = screen.height_in_pixels;

        info!(
            "Connected to X11 display, screen: {}x{}, XTest {}.{}",
            screen_width, screen_height, version.major_version, version.minor_version
        );

        Ok(Self {
            connection,
            screen,
            screen_width,
            screen_height,
        })
    }

    fn fake_button(&self, event: u8, detail: u8) -> Result<()> {
        self.connection
            .xtest_fake_input(event, detail, x11rb::CURRENT_TIME, x11rb::NONE, 0, 0, 0)
            .map_err(|e| AppError::InputInjection(format!("Failed to send fake input: {e}")))?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.connection
            .flush()
            .map_err(|e| AppError::InputInjection(format!("Failed to flush connection: {e}")))?;
        Ok(())
    }

    fn tap(&self, detail: u8, repeat: u32) -> Result<()> {
        for _ in 0..repeat {
            self.fake_button(BUTTON_PRESS_EVENT, detail)?;
            self.fake_button(BUTTON_RELEASE_EVENT, detail)?;
        }
        self.flush()
    }
}

impl InputSink for X11InputSink {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        // Clamp to screen bounds
        let x = i32_to_i16_clamp(x.clamp(0, i32::from(self.screen_width.saturating_sub(1))));
        let y = i32_to_i16_clamp(y.clamp(0, i32::from(self.screen_height.saturating_sub(1))));

        debug!("Setting cursor position to ({}, {})", x, y);

        self.connection
            .warp_pointer(x11rb::NONE, self.screen.root, 0, 0, 0, 0, x, y)
            .map_err(|e| AppError::InputInjection(format!("Failed to warp pointer: {e}")))?;
        self.flush()
    }

    fn click(&mut self, button: MouseButton) -> Result<()> {
        debug!("Clicking {} button", button);
        self.tap(button_code(button), 1)
    }

    fn press_button(&mut self, button: MouseButton) -> Result<()> {
        debug!("Pressing {} button", button);
        self.fake_button(BUTTON_PRESS_EVENT, button_code(button))?;
        self.flush()
    }

    fn release_button(&mut self, button: MouseButton) -> Result<()> {
        debug!("Releasing {} button", button);
        self.fake_button(BUTTON_RELEASE_EVENT, button_code(button))?;
        self.flush()
    }

    fn scroll_by(&mut self, dx: i32, dy: i32) -> Result<()> {
        debug!("Scrolling by ({}, {})", dx, dy);
        if dy != 0 {
            let (button, repeat) = wheel_steps(dy, WHEEL_UP, WHEEL_DOWN);
            self.tap(button, repeat)?;
        }
        if dx != 0 {
            let (button, repeat) = wheel_steps(dx, WHEEL_RIGHT, WHEEL_LEFT);
            self.tap(button, repeat)?;
        }
        Ok(())
    }
}

impl ScreenGeometry for X11InputSink {
    fn screen_size(&self) -> Result<ScreenSize> {
        Ok(ScreenSize::new(
            u32::from(self.screen_width),
            u32::from(self.screen_height),
        ))
    }
}

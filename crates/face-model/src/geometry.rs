//! Screen, overlay window and cursor geometry in screen pixels.

use serde::{Deserialize, Serialize};

/// Primary display geometry, captured once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenGeometry {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Refresh rate in Hz.
    pub refresh_hz: u32,
}

impl ScreenGeometry {
    pub fn new(width: u32, height: u32, refresh_hz: u32) -> Self {
        Self {
            width,
            height,
            refresh_hz,
        }
    }

    /// Screen center in pixels.
    pub fn center(&self) -> (f64, f64) {
        (f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }
}

impl Default for ScreenGeometry {
    fn default() -> Self {
        Self::new(1920, 1080, 60)
    }
}

/// Size of the cursor proxy window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    pub const CURSOR_PROXY: WindowSize = WindowSize {
        width: 32,
        height: 32,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self::CURSOR_PROXY
    }
}

/// Top-left position of the overlay window, in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct CursorPosition {
    pub x: i32,
    pub y: i32,
}

impl CursorPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Valid top-left range for a window of `window` size on `screen`.
///
/// Returns `(max_x, max_y)`; the minimum is always `(0, 0)`. A window
/// larger than the screen pins to the origin.
pub fn position_bounds(screen: &ScreenGeometry, window: &WindowSize) -> (f64, f64) {
    let max_x = (f64::from(screen.width) - f64::from(window.width)).max(0.0);
    let max_y = (f64::from(screen.height) - f64::from(window.height)).max(0.0);
    (max_x, max_y)
}

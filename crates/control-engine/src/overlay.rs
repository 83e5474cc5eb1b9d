//! Overlay window abstraction.
//!
//! The cursor proxy is a borderless, click-through, always-on-top window.
//! Its position is the only thing the control session writes.

use gazemouse_common::error::GazemouseResult;
use gazemouse_face_model::geometry::CursorPosition;

/// Handle to the cursor proxy window.
pub trait OverlayWindow: Send {
    /// Move the window's top-left corner.
    fn set_position(&mut self, position: CursorPosition) -> GazemouseResult<()>;

    /// Re-assert the always-on-top state.
    fn keep_on_top(&mut self) -> GazemouseResult<()> {
        Ok(())
    }

    /// Window name for logging.
    fn name(&self) -> &str;
}

/// An overlay with no window behind it. Records what it was told.
#[derive(Debug, Default)]
pub struct HeadlessOverlay {
    position: Option<CursorPosition>,
    moves: Vec<CursorPosition>,
    writes: u64,
    raises: u64,
}

impl HeadlessOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last position written.
    pub fn position(&self) -> Option<CursorPosition> {
        self.position
    }

    /// Each distinct position, in the order it was written.
    pub fn moves(&self) -> &[CursorPosition] {
        &self.moves
    }

    /// Total `set_position` calls.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Total `keep_on_top` calls.
    pub fn raises(&self) -> u64 {
        self.raises
    }
}

impl OverlayWindow for HeadlessOverlay {
    fn set_position(&mut self, position: CursorPosition) -> GazemouseResult<()> {
        self.writes += 1;
        if self.position != Some(position) {
            tracing::trace!(x = position.x, y = position.y, "Overlay moved");
            self.moves.push(position);
        }
        self.position = Some(position);
        Ok(())
    }

    fn keep_on_top(&mut self) -> GazemouseResult<()> {
        self.raises += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "headless"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_records_distinct_moves() {
        let mut overlay = HeadlessOverlay::new();
        overlay.set_position(CursorPosition::new(944, 524)).unwrap();
        overlay.set_position(CursorPosition::new(944, 524)).unwrap();
        overlay.set_position(CursorPosition::new(1000, 524)).unwrap();
        overlay.keep_on_top().unwrap();

        assert_eq!(overlay.writes(), 3);
        assert_eq!(
            overlay.moves(),
            &[CursorPosition::new(944, 524), CursorPosition::new(1000, 524)]
        );
        assert_eq!(overlay.position(), Some(CursorPosition::new(1000, 524)));
        assert_eq!(overlay.raises(), 1);
    }
}

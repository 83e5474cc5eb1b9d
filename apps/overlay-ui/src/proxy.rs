//! Hand-off between the control session and the egui loop.
//!
//! The session runs on the tokio runtime; egui owns the native window on
//! the main thread. Commits land in a shared slot and the next frame
//! applies them with viewport commands.

use std::sync::{Arc, Mutex};

use eframe::egui;
use gazemouse_common::error::{GazemouseError, GazemouseResult};
use gazemouse_control_engine::OverlayWindow;
use gazemouse_face_model::geometry::CursorPosition;

/// Pending window updates, drained once per egui frame.
#[derive(Debug, Default)]
pub struct ProxySlot {
    position: Option<CursorPosition>,
    raise: bool,
    finished: bool,
}

/// What the egui frame should do.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProxyUpdate {
    pub position: Option<CursorPosition>,
    pub raise: bool,
    pub finished: bool,
}

pub type SharedSlot = Arc<Mutex<ProxySlot>>;

/// Take whatever is pending. `position` is only reported when it differs
/// from `applied`.
pub fn take_update(slot: &SharedSlot, applied: Option<CursorPosition>) -> ProxyUpdate {
    let Ok(mut slot) = slot.lock() else {
        return ProxyUpdate::default();
    };
    let position = slot.position.filter(|p| Some(*p) != applied);
    let raise = std::mem::take(&mut slot.raise);
    ProxyUpdate {
        position,
        raise,
        finished: slot.finished,
    }
}

/// Mark the session as over so the window can close.
pub fn mark_finished(slot: &SharedSlot) {
    if let Ok(mut slot) = slot.lock() {
        slot.finished = true;
    }
}

/// [`OverlayWindow`] backed by the egui viewport.
pub struct EguiOverlay {
    slot: SharedSlot,
    ctx: Option<egui::Context>,
}

impl EguiOverlay {
    pub fn new(slot: SharedSlot, ctx: Option<egui::Context>) -> Self {
        Self { slot, ctx }
    }

    fn with_slot(&self, apply: impl FnOnce(&mut ProxySlot)) -> GazemouseResult<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| GazemouseError::overlay("overlay slot poisoned"))?;
        apply(&mut slot);
        drop(slot);

        if let Some(ctx) = &self.ctx {
            ctx.request_repaint();
        }
        Ok(())
    }
}

impl OverlayWindow for EguiOverlay {
    fn set_position(&mut self, position: CursorPosition) -> GazemouseResult<()> {
        self.with_slot(|slot| slot.position = Some(position))
    }

    fn keep_on_top(&mut self) -> GazemouseResult<()> {
        self.with_slot(|slot| slot.raise = true)
    }

    fn name(&self) -> &str {
        "egui"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_reported_once() {
        let slot = SharedSlot::default();
        let mut overlay = EguiOverlay::new(slot.clone(), None);
        overlay.set_position(CursorPosition::new(10, 20)).unwrap();

        let update = take_update(&slot, None);
        assert_eq!(update.position, Some(CursorPosition::new(10, 20)));

        let update = take_update(&slot, update.position);
        assert_eq!(update.position, None);
    }

    #[test]
    fn test_raise_is_consumed() {
        let slot = SharedSlot::default();
        let mut overlay = EguiOverlay::new(slot.clone(), None);
        overlay.keep_on_top().unwrap();

        assert!(take_update(&slot, None).raise);
        assert!(!take_update(&slot, None).raise);
    }

    #[test]
    fn test_finished_is_sticky() {
        let slot = SharedSlot::default();
        mark_finished(&slot);
        assert!(take_update(&slot, None).finished);
        assert!(take_update(&slot, None).finished);
    }
}

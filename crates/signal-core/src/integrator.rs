//! Cursor position integrator.
//!
//! Owns the authoritative cursor coordinates and reconciles two update
//! sources running at different cadences:
//!
//! 1. **Samples** from the detector overwrite the target position.
//! 2. **Commit ticks** at the display refresh rate clamp the position and
//!    hand it to the overlay window.
//!
//! Positioning is absolute relative to the screen center: every sample
//! replaces the previous target instead of adding a delta to it. Between
//! a sample and the next commit the position may sit outside the screen;
//! only commits are externally visible.

use gazemouse_face_model::event::MotionFlags;
use gazemouse_face_model::geometry::{position_bounds, CursorPosition, ScreenGeometry, WindowSize};

#[derive(Debug, Clone)]
pub struct PositionIntegrator {
    screen: ScreenGeometry,
    window: WindowSize,
    current_x: f64,
    current_y: f64,
}

impl PositionIntegrator {
    /// Create an integrator with the cursor centered on screen.
    pub fn new(screen: ScreenGeometry, window: WindowSize) -> Self {
        let (x, y) = centered(&screen, &window);
        Self {
            screen,
            window,
            current_x: x,
            current_y: y,
        }
    }

    /// Set the target from a motion sample.
    ///
    /// `x = width/2 + normalized_x * width/2 + x_offset`, same for `y`.
    pub fn apply_displacement(&mut self, flags: &MotionFlags) {
        let (center_x, center_y) = self.screen.center();
        let pixel_dx = flags.normalized_x() * center_x;
        let pixel_dy = flags.normalized_y() * center_y;

        self.current_x = center_x + pixel_dx + flags.x_offset;
        self.current_y = center_y + pixel_dy + flags.y_offset;
    }

    /// Put the window back in the middle of the screen.
    pub fn recenter(&mut self) {
        let (x, y) = centered(&self.screen, &self.window);
        self.current_x = x;
        self.current_y = y;
    }

    /// Clamp the position into the screen and return the pixel position
    /// the overlay should be moved to.
    ///
    /// Idempotent when nothing changed since the previous commit.
    pub fn commit_tick(&mut self) -> CursorPosition {
        if !self.current_x.is_finite() || !self.current_y.is_finite() {
            tracing::warn!(
                x = self.current_x,
                y = self.current_y,
                "Non-finite cursor target, recentering"
            );
            self.recenter();
        }

        let (max_x, max_y) = position_bounds(&self.screen, &self.window);
        self.current_x = self.current_x.clamp(0.0, max_x);
        self.current_y = self.current_y.clamp(0.0, max_y);

        CursorPosition::new(self.current_x.floor() as i32, self.current_y.floor() as i32)
    }

    /// Current (possibly uncommitted) target.
    pub fn current(&self) -> (f64, f64) {
        (self.current_x, self.current_y)
    }

    pub fn screen(&self) -> &ScreenGeometry {
        &self.screen
    }

    pub fn window(&self) -> &WindowSize {
        &self.window
    }
}

/// Top-left position that centers the window, floored to whole pixels.
fn centered(screen: &ScreenGeometry, window: &WindowSize) -> (f64, f64) {
    let x = ((f64::from(screen.width) - f64::from(window.width)) / 2.0).floor();
    let y = ((f64::from(screen.height) - f64::from(window.height)) / 2.0).floor();
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hd() -> PositionIntegrator {
        PositionIntegrator::new(ScreenGeometry::new(1920, 1080, 60), WindowSize::CURSOR_PROXY)
    }

    fn unit_speeds() -> MotionFlags {
        MotionFlags {
            right_speed: 1.0,
            left_speed: 1.0,
            up_speed: 1.0,
            down_speed: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_starts_centered() {
        let mut integrator = hd();
        assert_eq!(integrator.commit_tick(), CursorPosition::new(944, 524));
    }

    #[test]
    fn test_right_gaze_example() {
        let mut integrator = hd();
        integrator.apply_displacement(&MotionFlags {
            right_vector: 0.8,
            ..unit_speeds()
        });
        let (x, y) = integrator.current();
        assert!((x - 1728.0).abs() < 1e-9);
        assert!((y - 540.0).abs() < 1e-9);
        assert_eq!(integrator.commit_tick().x, 1728);
    }

    #[test]
    fn test_displacement_is_absolute_not_accumulated() {
        let mut integrator = hd();
        let flags = MotionFlags {
            down_vector: 0.5,
            ..unit_speeds()
        };
        integrator.apply_displacement(&flags);
        integrator.apply_displacement(&flags);
        assert!((integrator.current().1 - 810.0).abs() < 1e-9);
    }

    #[test]
    fn test_offsets_are_added() {
        let mut integrator = hd();
        integrator.apply_displacement(&MotionFlags {
            x_offset: -100.0,
            y_offset: 25.0,
            ..unit_speeds()
        });
        assert_eq!(integrator.commit_tick(), CursorPosition::new(860, 565));
    }

    #[test]
    fn test_commit_clamps_far_left() {
        let mut integrator = hd();
        integrator.apply_displacement(&MotionFlags {
            left_vector: 1.0,
            left_speed: 2.5,
            ..unit_speeds()
        });
        assert!((integrator.current().0 - -1440.0).abs() < 1e-9);
        assert_eq!(integrator.commit_tick().x, 0);
        assert_eq!(integrator.current().0, 0.0);
    }

    #[test]
    fn test_commit_clamps_far_bottom_right() {
        let mut integrator = hd();
        integrator.apply_displacement(&MotionFlags {
            right_vector: 1.0,
            down_vector: 1.0,
            ..unit_speeds()
        });
        assert_eq!(integrator.commit_tick(), CursorPosition::new(1888, 1048));
    }

    #[test]
    fn test_recenter_then_commit() {
        let mut integrator = hd();
        integrator.apply_displacement(&MotionFlags {
            up_vector: 1.0,
            ..unit_speeds()
        });
        integrator.commit_tick();
        integrator.recenter();
        assert_eq!(
            integrator.commit_tick(),
            CursorPosition::new((1920 - 32) / 2, (1080 - 32) / 2)
        );
    }

    #[test]
    fn test_commit_is_idempotent() {
        let mut integrator = hd();
        integrator.apply_displacement(&MotionFlags {
            right_vector: 0.3,
            up_vector: 0.2,
            ..unit_speeds()
        });
        let first = integrator.commit_tick();
        assert_eq!(integrator.commit_tick(), first);
    }

    #[test]
    fn test_non_finite_target_recenters() {
        let mut integrator = hd();
        integrator.apply_displacement(&MotionFlags {
            x_offset: f64::NAN,
            ..unit_speeds()
        });
        assert_eq!(integrator.commit_tick(), CursorPosition::new(944, 524));
    }

    proptest! {
        #[test]
        fn prop_commit_always_within_bounds(
            width in 1u32..4000,
            height in 1u32..3000,
            right in 0.0f64..1.0,
            left in 0.0f64..1.0,
            up in 0.0f64..1.0,
            down in 0.0f64..1.0,
            speed in 0.0f64..20.0,
            x_offset in -5000.0f64..5000.0,
            y_offset in -5000.0f64..5000.0,
        ) {
            let mut integrator = PositionIntegrator::new(
                ScreenGeometry::new(width, height, 60),
                WindowSize::CURSOR_PROXY,
            );
            integrator.apply_displacement(&MotionFlags {
                right_speed: speed,
                left_speed: speed,
                up_speed: speed,
                down_speed: speed,
                x_offset,
                y_offset,
                right_vector: right,
                left_vector: left,
                up_vector: up,
                down_vector: down,
            });

            let position = integrator.commit_tick();
            let max_x = (width as i64 - 32).max(0);
            let max_y = (height as i64 - 32).max(0);
            prop_assert!(position.x >= 0 && i64::from(position.x) <= max_x);
            prop_assert!(position.y >= 0 && i64::from(position.y) <= max_y);

            let (x, y) = integrator.current();
            prop_assert!(x >= 0.0 && x <= max_x as f64);
            prop_assert!(y >= 0.0 && y <= max_y as f64);
        }
    }
}

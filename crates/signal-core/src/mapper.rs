//! Blendshape → motion mapping.
//!
//! One call to [`SignalMapper::map`] per detection frame. The directional
//! vectors are forwarded every frame regardless of thresholds; thresholds
//! only decide the "moving" gates and the gesture latches.
//!
//! | Vector | Source categories | Gate |
//! |--------|-------------------|------|
//! | up     | avg(eyeLookUpLeft, eyeLookUpRight) | both ≥ up threshold |
//! | down   | avg(eyeLookDownLeft, eyeLookDownRight) | both ≥ down threshold |
//! | right  | eyeLookOutRight | ≥ right threshold |
//! | left   | eyeLookInRight | ≥ left threshold |
//!
//! Left gaze is read from the inner motion of the right eye alone.

use gazemouse_common::config::{AppConfig, MotionConfig, PrecisionConfig, ThresholdConfig};
use gazemouse_face_model::blendshape::{BlendshapeCategory, BlendshapeFrame};
use gazemouse_face_model::event::MotionFlags;

use crate::gesture::{Edge, GestureKind, GestureState, GestureTransition};

/// Per-direction gaze intensity, each in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DirectionalVectors {
    pub up: f64,
    pub down: f64,
    pub left: f64,
    pub right: f64,
}

impl DirectionalVectors {
    pub fn from_frame(frame: &BlendshapeFrame) -> Self {
        let avg = |a: BlendshapeCategory, b: BlendshapeCategory| {
            (f64::from(frame.score(a)) + f64::from(frame.score(b))) / 2.0
        };
        Self {
            up: avg(
                BlendshapeCategory::EyeLookUpLeft,
                BlendshapeCategory::EyeLookUpRight,
            ),
            down: avg(
                BlendshapeCategory::EyeLookDownLeft,
                BlendshapeCategory::EyeLookDownRight,
            ),
            left: f64::from(frame.score(BlendshapeCategory::EyeLookInRight)),
            right: f64::from(frame.score(BlendshapeCategory::EyeLookOutRight)),
        }
    }
}

/// Whether each direction is past its threshold this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirectionalGates {
    pub moving_up: bool,
    pub moving_down: bool,
    pub moving_left: bool,
    pub moving_right: bool,
}

impl DirectionalGates {
    /// Up and down require both eyes past the threshold, not their average.
    pub fn from_frame(frame: &BlendshapeFrame, thresholds: &ThresholdConfig) -> Self {
        let both = |a: BlendshapeCategory, b: BlendshapeCategory, threshold: f32| {
            frame.score(a) >= threshold && frame.score(b) >= threshold
        };
        Self {
            moving_up: both(
                BlendshapeCategory::EyeLookUpLeft,
                BlendshapeCategory::EyeLookUpRight,
                thresholds.up,
            ),
            moving_down: both(
                BlendshapeCategory::EyeLookDownLeft,
                BlendshapeCategory::EyeLookDownRight,
                thresholds.down,
            ),
            moving_left: frame.score(BlendshapeCategory::EyeLookInRight) >= thresholds.left,
            moving_right: frame.score(BlendshapeCategory::EyeLookOutRight) >= thresholds.right,
        }
    }
}

/// Result of mapping one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedSample {
    /// Continuous motion payload, emitted every frame.
    pub flags: MotionFlags,

    /// Directional threshold results.
    pub gates: DirectionalGates,

    /// Gesture latch transitions produced by this frame.
    pub transitions: Vec<GestureTransition>,
}

/// Tunables consumed by the mapper.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MapperConfig {
    pub thresholds: ThresholdConfig,
    pub motion: MotionConfig,
    pub precision: PrecisionConfig,

    /// Run the directional gates through latches and emit nudge cues.
    pub directional_cues: bool,
}

impl MapperConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            thresholds: config.thresholds,
            motion: config.motion,
            precision: config.precision,
            directional_cues: config.cues.directional,
        }
    }
}

/// Converts blendshape frames into motion flags and gesture events.
///
/// Owns the gesture latches, so one mapper corresponds to one tracked face.
#[derive(Debug, Clone)]
pub struct SignalMapper {
    config: MapperConfig,
    gestures: GestureState,
}

impl SignalMapper {
    pub fn new(config: MapperConfig) -> Self {
        Self {
            config,
            gestures: GestureState::new(),
        }
    }

    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(MapperConfig::from_app_config(config))
    }

    /// Map a single frame. Release transitions precede press transitions.
    pub fn map(&mut self, frame: &BlendshapeFrame) -> MappedSample {
        let thresholds = self.config.thresholds;
        let vectors = DirectionalVectors::from_frame(frame);
        let gates = DirectionalGates::from_frame(frame, &thresholds);

        let mut transitions = Vec::new();
        let checks = [
            (
                GestureKind::BrowUp,
                frame.score(BlendshapeCategory::BrowInnerUp) >= thresholds.brow,
            ),
            (
                GestureKind::JawOpen,
                frame.score(BlendshapeCategory::JawOpen) >= thresholds.jaw,
            ),
            (
                GestureKind::MouthPucker,
                frame.score(BlendshapeCategory::MouthPucker) >= thresholds.mouth,
            ),
        ];
        for (kind, above) in checks {
            transitions.extend(self.gestures.update(kind, above));
        }

        if self.config.directional_cues {
            let nudges = [
                (GestureKind::Up, gates.moving_up),
                (GestureKind::Down, gates.moving_down),
                (GestureKind::Left, gates.moving_left),
                (GestureKind::Right, gates.moving_right),
            ];
            for (kind, above) in nudges {
                transitions.extend(self.gestures.update(kind, above));
            }
        }

        // Releases go out before presses; latch order is kept within each edge.
        transitions.sort_by_key(|t| match t.edge {
            Edge::End => 0,
            Edge::Start => 1,
        });

        for transition in &transitions {
            tracing::debug!(
                gesture = ?transition.kind,
                edge = ?transition.edge,
                t_ms = frame.timestamp_ms(),
                "Gesture transition"
            );
        }

        let flags = self.motion_flags(&vectors);
        tracing::trace!(
            up = vectors.up,
            down = vectors.down,
            left = vectors.left,
            right = vectors.right,
            "Mapped frame"
        );

        MappedSample {
            flags,
            gates,
            transitions,
        }
    }

    /// Build the motion payload, applying jaw precision mode if latched.
    fn motion_flags(&self, vectors: &DirectionalVectors) -> MotionFlags {
        let motion = self.config.motion;
        let (h_scale, v_scale) = if self.gestures.is_active(GestureKind::JawOpen) {
            (
                self.config.precision.horizontal_reducer_pct / 100.0,
                self.config.precision.vertical_reducer_pct / 100.0,
            )
        } else {
            (1.0, 1.0)
        };

        MotionFlags {
            right_speed: motion.right_speed * h_scale,
            left_speed: motion.left_speed * h_scale,
            up_speed: motion.up_speed * v_scale,
            down_speed: motion.down_speed * v_scale,
            x_offset: motion.x_offset,
            y_offset: motion.y_offset,
            right_vector: vectors.right,
            left_vector: vectors.left,
            up_vector: vectors.up,
            down_vector: vectors.down,
        }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Replace thresholds at runtime. Latch states are kept.
    pub fn set_thresholds(&mut self, thresholds: ThresholdConfig) {
        self.config.thresholds = thresholds;
    }

    /// Replace speeds and offsets at runtime.
    pub fn set_motion(&mut self, motion: MotionConfig) {
        self.config.motion = motion;
    }

    pub fn gestures(&self) -> &GestureState {
        &self.gestures
    }

    /// Re-initialize every latch.
    pub fn reset(&mut self) {
        self.gestures.reset();
    }
}

impl Default for SignalMapper {
    fn default() -> Self {
        Self::new(MapperConfig::default())
    }
}

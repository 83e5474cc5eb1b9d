//! Edge-triggered gesture latches.
//!
//! Each gesture is a two-state machine:
//!
//! ```text
//!            score >= threshold / Start
//!   Idle ─────────────────────────────▶ Active
//!    ▲                                   │
//!    └───────────────────────────────────┘
//!       score < threshold / End (press/release gestures only)
//! ```
//!
//! There is no hysteresis band and no timer. A score sitting exactly on the
//! threshold may chatter; that is accepted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A discrete gesture tracked by its own latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GestureKind {
    Up,
    Down,
    Left,
    Right,
    BrowUp,
    JawOpen,
    MouthPucker,
}

impl GestureKind {
    pub const ALL: [GestureKind; 7] = [
        GestureKind::Up,
        GestureKind::Down,
        GestureKind::Left,
        GestureKind::Right,
        GestureKind::BrowUp,
        GestureKind::JawOpen,
        GestureKind::MouthPucker,
    ];

    /// Name of the sound cue played when the gesture starts.
    pub fn sound_name(&self) -> &'static str {
        match self {
            GestureKind::Up => "Up",
            GestureKind::Down => "Down",
            GestureKind::Left => "Left",
            GestureKind::Right => "Right",
            GestureKind::BrowUp => "BrowUp",
            GestureKind::JawOpen => "JawOpen",
            GestureKind::MouthPucker => "MouthPucker",
        }
    }

    /// Gestures that also report their release.
    pub fn is_press_release(&self) -> bool {
        matches!(self, GestureKind::MouthPucker)
    }
}

/// Latch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LatchState {
    #[default]
    Idle,
    Active,
}

/// Which edge of a latch produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    Start,
    End,
}

/// An event emitted by a latch transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureTransition {
    pub kind: GestureKind,
    pub edge: Edge,
}

/// One latch per gesture, keyed by gesture.
#[derive(Debug, Clone)]
pub struct GestureState {
    latches: BTreeMap<GestureKind, LatchState>,
}

impl GestureState {
    /// All latches idle.
    pub fn new() -> Self {
        Self {
            latches: GestureKind::ALL
                .iter()
                .map(|kind| (*kind, LatchState::Idle))
                .collect(),
        }
    }

    /// Feed one frame's threshold result for `kind`.
    ///
    /// Returns the event produced by this frame, if any.
    pub fn update(&mut self, kind: GestureKind, above_threshold: bool) -> Option<GestureTransition> {
        let latch = self.latches.entry(kind).or_default();
        match (*latch, above_threshold) {
            (LatchState::Idle, true) => {
                *latch = LatchState::Active;
                Some(GestureTransition {
                    kind,
                    edge: Edge::Start,
                })
            }
            (LatchState::Active, false) => {
                *latch = LatchState::Idle;
                kind.is_press_release().then_some(GestureTransition {
                    kind,
                    edge: Edge::End,
                })
            }
            _ => None,
        }
    }

    /// Current latch state of a gesture.
    pub fn state(&self, kind: GestureKind) -> LatchState {
        self.latches.get(&kind).copied().unwrap_or_default()
    }

    pub fn is_active(&self, kind: GestureKind) -> bool {
        self.state(kind) == LatchState::Active
    }

    /// Return every latch to idle without emitting anything.
    pub fn reset(&mut self) {
        for latch in self.latches.values_mut() {
            *latch = LatchState::Idle;
        }
    }
}

impl Default for GestureState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_start_fires_once_per_run() {
        let mut state = GestureState::new();
        let events: Vec<_> = (0..5)
            .filter_map(|_| state.update(GestureKind::BrowUp, true))
            .collect();
        assert_eq!(
            events,
            vec![GestureTransition {
                kind: GestureKind::BrowUp,
                edge: Edge::Start
            }]
        );
        assert!(state.is_active(GestureKind::BrowUp));
    }

    #[test]
    fn test_release_is_silent_for_plain_gestures() {
        let mut state = GestureState::new();
        state.update(GestureKind::JawOpen, true);
        assert_eq!(state.update(GestureKind::JawOpen, false), None);
        assert!(!state.is_active(GestureKind::JawOpen));

        // Re-arms after release.
        assert!(state.update(GestureKind::JawOpen, true).is_some());
    }

    #[test]
    fn test_press_release_emits_end() {
        let mut state = GestureState::new();
        state.update(GestureKind::MouthPucker, true);
        state.update(GestureKind::MouthPucker, true);
        assert_eq!(
            state.update(GestureKind::MouthPucker, false),
            Some(GestureTransition {
                kind: GestureKind::MouthPucker,
                edge: Edge::End
            })
        );
        assert_eq!(state.update(GestureKind::MouthPucker, false), None);
    }

    #[test]
    fn test_latches_are_independent() {
        let mut state = GestureState::new();
        state.update(GestureKind::BrowUp, true);
        assert!(!state.is_active(GestureKind::JawOpen));
        assert!(state.update(GestureKind::JawOpen, true).is_some());
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut state = GestureState::new();
        state.update(GestureKind::MouthPucker, true);
        state.reset();
        assert_eq!(state.state(GestureKind::MouthPucker), LatchState::Idle);
        assert!(state.update(GestureKind::MouthPucker, true).is_some());
    }

    proptest! {
        #[test]
        fn prop_starts_equal_rising_edges(inputs in proptest::collection::vec(any::<bool>(), 0..200)) {
            let mut state = GestureState::new();
            let mut starts = 0usize;
            let mut ends = 0usize;
            for above in &inputs {
                match state.update(GestureKind::MouthPucker, *above) {
                    Some(GestureTransition { edge: Edge::Start, .. }) => starts += 1,
                    Some(GestureTransition { edge: Edge::End, .. }) => ends += 1,
                    None => {}
                }
            }

            let mut previous = false;
            let mut rising = 0usize;
            let mut falling = 0usize;
            for above in &inputs {
                if *above && !previous {
                    rising += 1;
                }
                if !*above && previous {
                    falling += 1;
                }
                previous = *above;
            }

            prop_assert_eq!(starts, rising);
            prop_assert_eq!(ends, falling);
            // A press is never followed by a second press before its release.
            prop_assert!(starts == ends || starts == ends + 1);
        }
    }
}

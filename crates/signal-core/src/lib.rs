//! Gazemouse Signal Core — The Control Loop
//!
//! Turns per-frame blendshape scores into cursor motion and discrete events:
//! - **Mapping:** Normalize gaze scores into directional vectors and motion flags
//! - **Gestures:** Edge-triggered latches for brow, jaw, mouth and nudge cues
//! - **Integration:** Own the cursor position, clamp it, and commit it per tick
//!
//! This crate does no I/O and has no platform dependencies.
//! Frames come in as data and samples go out as data.

pub mod gesture;
pub mod integrator;
pub mod mapper;

pub use gesture::{Edge, GestureKind, GestureState, GestureTransition};
pub use integrator::PositionIntegrator;
pub use mapper::{MappedSample, MapperConfig, SignalMapper};

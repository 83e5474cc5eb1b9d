//! Gazemouse Control Engine
//!
//! Runs the two cooperating loops of a gaze-controlled pointer and the
//! channel between them. The detector side pulls frames from a
//! [`source::BlendshapeSource`] and maps them; the control side owns the
//! cursor position and drives the overlay window on its own timer.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐                 ┌───────────────────────────┐
//! │     DetectorLoop     │                 │      ControlSession       │
//! │  ┌────────────────┐  │  EventSender    │  ┌─────────────────────┐  │
//! │  │ BlendshapeSrc  │  │ ──────────────▶ │  │ PositionIntegrator  │  │
//! │  └───────┬────────┘  │  (unbounded,    │  └──────────┬──────────┘  │
//! │          ▼           │   fire and      │   commit    ▼   timer     │
//! │  ┌────────────────┐  │   forget)       │  ┌─────────────────────┐  │
//! │  │  SignalMapper  │  │                 │  │   OverlayWindow     │  │
//! │  └────────────────┘  │                 │  └─────────────────────┘  │
//! └──────────────────────┘                 │        AudioGate          │
//!                                          └───────────────────────────┘
//! ```

pub mod channel;
pub mod detector;
pub mod feedback;
pub mod overlay;
pub mod session;
pub mod source;

pub use channel::{event_channel, EventReceiver, EventSender};
pub use detector::{DetectorLoop, DetectorStats};
pub use feedback::{AudioGate, CommandFeedback, Cue, FeedbackSink, TracingFeedback};
pub use overlay::{HeadlessOverlay, OverlayWindow};
pub use session::*;
pub use source::{BlendshapeSource, Pacing, ReplaySource, ScriptedSource, ZoomCapability};

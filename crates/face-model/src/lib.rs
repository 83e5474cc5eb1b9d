//! Gazemouse Face Model
//!
//! Defines the data contracts shared by the detector and control contexts:
//! - **Blendshapes:** The 52 named scores produced per detection frame
//! - **Events:** Motion flags and the messages carried by the event channel
//! - **Geometry:** Screen, overlay window and cursor position types
//! - **Recordings:** JSONL frame captures with interleaved user commands
//!
//! Blendshape scores are confidences in `[0.0, 1.0]`; geometry is in
//! screen pixels.

pub mod blendshape;
pub mod event;
pub mod geometry;
pub mod recording;

pub use blendshape::*;
pub use event::*;
pub use geometry::*;
pub use recording::*;

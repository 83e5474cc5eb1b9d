//! Gazemouse Common Utilities
//!
//! Shared infrastructure for all Gazemouse crates:
//! - Error types and result aliases
//! - Clock and cadence utilities for the commit timer
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;

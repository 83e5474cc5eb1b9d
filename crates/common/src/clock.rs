//! Clock and cadence utilities for the control loop.
//!
//! The commit timer runs at the display refresh rate, independent of how
//! fast the detector produces frames. This module provides:
//! - A session clock anchored to a monotonic epoch
//! - The commit cadence derived from the refresh rate

use std::time::{Duration, Instant};

/// A session clock that provides monotonic timestamps relative to
/// a fixed epoch (the moment the control session started).
#[derive(Debug, Clone)]
pub struct SessionClock {
    /// The instant the session started.
    epoch: Instant,

    /// Wall-clock time at epoch (ISO 8601 string).
    epoch_wall: String,
}

impl SessionClock {
    /// Create a new clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Get nanoseconds elapsed since session start.
    pub fn elapsed_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    /// Get seconds elapsed since session start.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at session start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// Convert a millisecond detector timestamp to nanoseconds.
    pub fn ms_to_ns(ms: f64) -> u64 {
        (ms.max(0.0) * 1_000_000.0) as u64
    }
}

/// Fixed-rate cadence for committing the cursor position.
///
/// The interval is `1000 / refresh_hz` milliseconds, floored to whole
/// milliseconds and never below 1 ms.
#[derive(Debug)]
pub struct CommitCadence {
    interval: Duration,
    last_tick_ns: Option<u64>,
}

impl CommitCadence {
    /// Create a cadence for the given display refresh rate.
    pub fn from_refresh_hz(refresh_hz: u32) -> Self {
        let millis = (1000 / u64::from(refresh_hz.max(1))).max(1);
        Self {
            interval: Duration::from_millis(millis),
            last_tick_ns: None,
        }
    }

    /// Commit period.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Check if enough time has passed for the next commit.
    /// Returns true and updates internal state if ready.
    /// The first call always returns true.
    pub fn should_tick(&mut self, current_ns: u64) -> bool {
        let interval_ns = self.interval.as_nanos() as u64;
        match self.last_tick_ns {
            None => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            Some(last) if current_ns >= last + interval_ns => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            _ => false,
        }
    }
}

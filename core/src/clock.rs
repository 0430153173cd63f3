//! Wall clock and time scaling.
//!
//! RULE: Nothing in the simulation reads the system time directly.
//! The engine asks its injected Clock, and every real duration is turned
//! into simulated seconds by exactly one TimeScale. Live ticks and
//! catch-up share that conversion, so a debug speed-up can never apply
//! to one path and not the other.

use crate::types::Timestamp;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

pub trait Clock: Send {
    fn now(&self) -> Timestamp;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// A clock that only moves when told to. Clones share the same instant,
/// so a test can keep one handle while the engine owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self { now: Arc::new(Mutex::new(start)) }
    }

    pub fn set(&self, at: Timestamp) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = at;
    }

    /// Move forward (or backward, for negative input) by whole seconds.
    pub fn advance_secs(&self, secs: i64) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += chrono::Duration::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Multiplier from real seconds to simulated seconds. 1.0 in production.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TimeScale(f64);

impl TimeScale {
    pub const REAL_TIME: TimeScale = TimeScale(1.0);

    /// Scales below 1.0 (or non-finite) fall back to real time.
    pub fn new(multiplier: f64) -> Self {
        if multiplier.is_finite() && multiplier >= 1.0 {
            Self(multiplier)
        } else {
            Self::REAL_TIME
        }
    }

    pub fn multiplier(&self) -> f64 {
        self.0
    }

    /// Simulated seconds between two instants. A `to` earlier than `from`
    /// yields zero: time never runs backwards in the simulation.
    pub fn elapsed(&self, from: Timestamp, to: Timestamp) -> f64 {
        let real = (to - from).num_milliseconds() as f64 / 1000.0;
        if real <= 0.0 {
            0.0
        } else {
            real * self.0
        }
    }

    /// Real duration that covers `simulated` seconds, rounded up to the
    /// next millisecond.
    pub fn real_duration(&self, simulated: f64) -> chrono::Duration {
        let millis = (simulated.max(0.0) * 1000.0 / self.0).ceil() as i64;
        chrono::Duration::milliseconds(millis)
    }
}

impl Default for TimeScale {
    fn default() -> Self {
        Self::REAL_TIME
    }
}

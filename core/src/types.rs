//! Shared primitive types used across the entire simulation.

use chrono::{DateTime, Utc};

/// A wall-clock instant. All persisted times are UTC.
pub type Timestamp = DateTime<Utc>;

/// Cumulative growth-days since the session anchor.
pub type Days = u32;

/// One growth-day, in simulated seconds.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

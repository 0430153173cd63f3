//! Offline catch-up and the elapsed-time arithmetic shared with live ticks.
//!
//! RULES:
//!   - Catch-up is O(1): one tick() per track for the whole gap, never a
//!     loop over simulated seconds.
//!   - Growth-days are anchored to the session start, not accumulated,
//!     so many short catch-ups land on the same day count as one long one.
//!   - Time that runs backwards counts as zero. Decay is never reversed.
//!   - The checkpoint moves forward together with the decay it covers.

use crate::{
    clock::TimeScale,
    growth::GrowthTable,
    pet::Pet,
    types::{Days, Timestamp, SECONDS_PER_DAY},
};
use serde::{Deserialize, Serialize};

/// What one application of elapsed time did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub simulated_seconds: f64,
    pub days_added:        Days,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatchUpReport {
    /// Wall-clock gap being reconciled. Negative if the clock moved back.
    pub real_seconds:      f64,
    pub simulated_seconds: f64,
    pub days_added:        Days,
}

impl CatchUpReport {
    pub fn clock_moved_backwards(&self) -> bool {
        self.real_seconds < 0.0
    }
}

/// Bring `pet` from its last checkpoint up to `now` in one step.
///
/// The baseline is `accounted_until`, which equals the persisted
/// checkpoint after any load or save, and also covers live ticks applied
/// since then if the host resumes without suspending first.
/// The caller persists immediately afterwards; `last_checkpoint_time` is
/// already `now` when this returns. A dead pet is frozen: only the
/// checkpoint moves.
pub fn reconcile(
    pet: &mut Pet,
    now: Timestamp,
    scale: TimeScale,
    growth: &GrowthTable,
    alive: bool,
) -> CatchUpReport {
    let real_seconds = (now - pet.accounted_until).num_milliseconds() as f64 / 1000.0;
    let progress = apply(pet, pet.accounted_until, now, scale, growth, alive);
    pet.last_checkpoint_time = now;

    let report = CatchUpReport {
        real_seconds,
        simulated_seconds: progress.simulated_seconds,
        days_added:        progress.days_added,
    };
    if report.clock_moved_backwards() {
        log::warn!(
            "catch-up: clock is {:.0}s behind the last checkpoint; treating the gap as zero",
            -real_seconds
        );
    }
    log::info!(
        "catch-up: {:.1} min real, {:.0}s simulated, +{} days -> day {}",
        real_seconds / 60.0,
        progress.simulated_seconds,
        progress.days_added,
        pet.days_passed
    );
    report
}

/// Apply whatever time has passed since the last live tick (or the last
/// catch-up). Same arithmetic as `reconcile`; the checkpoint is left for
/// the caller to move when it persists.
pub fn advance_live(
    pet: &mut Pet,
    now: Timestamp,
    scale: TimeScale,
    growth: &GrowthTable,
    alive: bool,
) -> Progress {
    apply(pet, pet.accounted_until, now, scale, growth, alive)
}

/// Recompute growth-days from the session anchor. Only ever adds.
pub fn sync_days(pet: &mut Pet, now: Timestamp, scale: TimeScale, growth: &GrowthTable) -> Days {
    let since_start = scale.elapsed(pet.session_start_time, now);
    // Float-to-int casts saturate, so a huge gap lands on Days::MAX.
    let anchored = growth.clamp_days((since_start / SECONDS_PER_DAY).floor() as Days);
    if anchored > pet.days_passed {
        let added = anchored - pet.days_passed;
        pet.days_passed = anchored;
        added
    } else {
        0
    }
}

fn apply(
    pet: &mut Pet,
    from: Timestamp,
    now: Timestamp,
    scale: TimeScale,
    growth: &GrowthTable,
    alive: bool,
) -> Progress {
    let simulated_seconds = scale.elapsed(from, now);
    let mut days_added = 0;

    if alive {
        days_added = sync_days(pet, now, scale, growth);
        pet.hunger.tick(simulated_seconds);
        pet.pollution.tick(simulated_seconds);
    }
    pet.accounted_until = now;

    Progress { simulated_seconds, days_added }
}

//! Everything the core reports outward.
//!
//! RULE: State changes are announced as PetEvents. Collaborators are only
//! ever driven from these events, never called from inside a component.

use crate::{
    alert::AlertKind,
    growth::GrowthStage,
    lifecycle::DeathCause,
    types::{Days, Timestamp},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PetEvent {
    // ── Host lifecycle ─────────────────────────────
    Resumed {
        at: Timestamp,
    },
    CatchUpApplied {
        real_seconds:      f64,
        simulated_seconds: f64,
        days_added:        Days,
        hunger:            f64,
        pollution:         f64,
    },
    Suspended {
        at: Timestamp,
    },

    // ── Growth ─────────────────────────────────────
    DaysAdvanced {
        days_passed: Days,
    },
    GrowthStageChanged {
        from:        GrowthStage,
        to:          GrowthStage,
        days_passed: Days,
    },

    // ── Lifecycle ──────────────────────────────────
    WeakStateChanged {
        is_weak: bool,
    },
    Died {
        cause: DeathCause,
    },
    LifeReset {
        at: Timestamp,
    },

    // ── Alerts ─────────────────────────────────────
    AlertRaised {
        alert:         AlertKind,
        title:         String,
        body:          String,
        delay_seconds: u64,
    },

    // ── Care and debug actions ─────────────────────
    Fed {
        amount: f64,
        hunger: f64,
    },
    Cleaned {
        previous_pollution: f64,
    },
    CareRejected {
        action: CareAction,
        reason: RejectReason,
    },
    Renamed {
        name: String,
    },
    DaysOverridden {
        days_passed: Days,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CareAction {
    Feed,
    Clean,
    Rename,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The pet has died; only a reset brings it back.
    Dead,
    /// Eggs cannot eat.
    StillAnEgg,
    InvalidInput,
}

/// Stable string name for a PetEvent variant, used in log lines.
pub fn event_type_name(event: &PetEvent) -> &'static str {
    match event {
        PetEvent::Resumed { .. }            => "resumed",
        PetEvent::CatchUpApplied { .. }     => "catch_up_applied",
        PetEvent::Suspended { .. }          => "suspended",
        PetEvent::DaysAdvanced { .. }       => "days_advanced",
        PetEvent::GrowthStageChanged { .. } => "growth_stage_changed",
        PetEvent::WeakStateChanged { .. }   => "weak_state_changed",
        PetEvent::Died { .. }               => "died",
        PetEvent::LifeReset { .. }          => "life_reset",
        PetEvent::AlertRaised { .. }        => "alert_raised",
        PetEvent::Fed { .. }                => "fed",
        PetEvent::Cleaned { .. }            => "cleaned",
        PetEvent::CareRejected { .. }       => "care_rejected",
        PetEvent::Renamed { .. }            => "renamed",
        PetEvent::DaysOverridden { .. }     => "days_overridden",
    }
}

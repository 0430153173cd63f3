use crate::types::{Days, Timestamp};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PET_NAME: &str = "Mermaid";

/// The single persisted aggregate.
///
/// Derived values (growth stage, size, the precise life state) are never
/// stored; `is_weak` is kept only so a UI can restore its look before the
/// first evaluation runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaveState {
    pub is_alive:             bool,
    pub hunger:               f64,
    pub pollution:            f64,
    pub days_passed:          Days,
    pub is_weak:              bool,
    pub last_checkpoint_time: Timestamp,
    pub session_start_time:   Timestamp,
    pub pet_name:             String,
}

impl SaveState {
    /// A brand-new life created at `now`.
    pub fn fresh(now: Timestamp) -> Self {
        Self {
            is_alive:             true,
            hunger:               100.0,
            pollution:            0.0,
            days_passed:          0,
            is_weak:              false,
            last_checkpoint_time: now,
            session_start_time:   now,
            pet_name:             DEFAULT_PET_NAME.to_string(),
        }
    }

    /// Field-wise equality with a tolerance on the vitals.
    pub fn approx_eq(&self, other: &SaveState, tolerance: f64) -> bool {
        self.is_alive == other.is_alive
            && (self.hunger - other.hunger).abs() <= tolerance
            && (self.pollution - other.pollution).abs() <= tolerance
            && self.days_passed == other.days_passed
            && self.is_weak == other.is_weak
            && self.last_checkpoint_time == other.last_checkpoint_time
            && self.session_start_time == other.session_start_time
            && self.pet_name == other.pet_name
    }
}

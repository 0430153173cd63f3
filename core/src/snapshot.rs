//! Read model of the pet for UIs and tooling.

use crate::{
    growth::GrowthStage,
    lifecycle::LifeState,
    types::{Days, Timestamp},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PetSnapshot {
    pub name:                 String,
    pub hunger:               f64,
    pub pollution:            f64,
    pub days_passed:          Days,
    pub stage:                GrowthStage,
    pub stage_label:          String,
    pub size_cm:              f64,
    pub life:                 LifeState,
    pub session_start_time:   Timestamp,
    pub last_checkpoint_time: Timestamp,
    /// Whether the live tick scheduler is running.
    pub ticking:              bool,
}

impl PetSnapshot {
    pub fn is_alive(&self) -> bool {
        self.life != LifeState::Dead
    }

    pub fn is_weak(&self) -> bool {
        self.life == LifeState::Weak
    }
}

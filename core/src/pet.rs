//! The in-memory pet: vitals, growth-days and the time bookkeeping that
//! keeps catch-up and live ticking from counting the same span twice.

use crate::{
    config::PetConfig,
    growth::{GrowthStage, GrowthTable},
    lifecycle::LifecycleController,
    save_state::SaveState,
    types::{Days, Timestamp},
    vital_track::VitalTrack,
};

#[derive(Debug, Clone)]
pub struct Pet {
    pub name:                 String,
    pub hunger:               VitalTrack,
    pub pollution:            VitalTrack,
    pub days_passed:          Days,
    pub session_start_time:   Timestamp,
    pub last_checkpoint_time: Timestamp,
    /// Elapsed time up to this instant has been applied to the vitals.
    /// Equals `last_checkpoint_time` right after a load or a save.
    pub accounted_until:      Timestamp,
}

impl Pet {
    pub fn from_save(state: &SaveState, config: &PetConfig, growth: &GrowthTable) -> Self {
        let mut hunger = VitalTrack::hunger(&config.hunger);
        hunger.set(state.hunger);
        let mut pollution = VitalTrack::pollution(&config.pollution);
        pollution.set(state.pollution);

        Self {
            name: state.pet_name.clone(),
            hunger,
            pollution,
            days_passed:          growth.clamp_days(state.days_passed),
            session_start_time:   state.session_start_time,
            last_checkpoint_time: state.last_checkpoint_time,
            accounted_until:      state.last_checkpoint_time,
        }
    }

    pub fn to_save(&self, lifecycle: &LifecycleController) -> SaveState {
        SaveState {
            is_alive:             lifecycle.is_alive(),
            hunger:               self.hunger.value(),
            pollution:            self.pollution.value(),
            days_passed:          self.days_passed,
            is_weak:              lifecycle.is_weak(),
            last_checkpoint_time: self.last_checkpoint_time,
            session_start_time:   self.session_start_time,
            pet_name:             self.name.clone(),
        }
    }

    pub fn stage(&self, growth: &GrowthTable) -> GrowthStage {
        growth.stage_for(self.days_passed)
    }
}

//! Alive / Weak / Dead state machine.
//!
//! Weak is a reversible sub-state of Alive, recomputed from the vitals on
//! every evaluation. Dead is terminal: once entered, evaluate() is a no-op
//! until the whole state is replaced by a reset.

use crate::{config::LifecycleConfig, growth::GrowthStage, vital_track::VitalTrack};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LifeState {
    Alive,
    Weak,
    Dead,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    Starved,
    Polluted,
    /// Debug tooling.
    Forced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeTransition {
    BecameWeak,
    Recovered,
    Died(DeathCause),
}

#[derive(Debug, Clone)]
pub struct LifecycleController {
    state:                    LifeState,
    weak_hunger_threshold:    f64,
    weak_pollution_threshold: f64,
}

impl LifecycleController {
    pub fn new(config: &LifecycleConfig) -> Self {
        Self {
            state:                    LifeState::Alive,
            weak_hunger_threshold:    config.weak_hunger_threshold,
            weak_pollution_threshold: config.weak_pollution_threshold,
        }
    }

    /// Resume from persisted flags. `is_weak` is only a hint; the next
    /// evaluate() corrects it against the vitals.
    pub fn restore(config: &LifecycleConfig, is_alive: bool, is_weak: bool) -> Self {
        let mut controller = Self::new(config);
        controller.state = match (is_alive, is_weak) {
            (false, _)    => LifeState::Dead,
            (true, true)  => LifeState::Weak,
            (true, false) => LifeState::Alive,
        };
        controller
    }

    pub fn state(&self) -> LifeState { self.state }
    pub fn is_alive(&self) -> bool { self.state != LifeState::Dead }
    pub fn is_weak(&self) -> bool { self.state == LifeState::Weak }

    /// Weak condition ignoring growth stage.
    pub fn weak_condition(&self, hunger: &VitalTrack, pollution: &VitalTrack) -> bool {
        hunger.value() <= self.weak_hunger_threshold
            || pollution.value() >= self.weak_pollution_threshold
    }

    /// Re-derive the state from the current vitals. Returns the transition
    /// taken, if any; an unchanged state returns None.
    pub fn evaluate(
        &mut self,
        hunger: &VitalTrack,
        pollution: &VitalTrack,
        stage: GrowthStage,
    ) -> Option<LifeTransition> {
        if self.state == LifeState::Dead {
            return None;
        }

        // Death first: an Egg is immune to weakness, not to starvation.
        let cause = if hunger.at_terminal_bound() {
            Some(DeathCause::Starved)
        } else if pollution.at_terminal_bound() {
            Some(DeathCause::Polluted)
        } else {
            None
        };
        if let Some(cause) = cause {
            return Some(self.kill(cause));
        }

        let weak = !stage.is_egg() && self.weak_condition(hunger, pollution);
        match (self.state, weak) {
            (LifeState::Alive, true) => {
                self.state = LifeState::Weak;
                Some(LifeTransition::BecameWeak)
            }
            (LifeState::Weak, false) => {
                self.state = LifeState::Alive;
                Some(LifeTransition::Recovered)
            }
            _ => None,
        }
    }

    /// Kill unconditionally. Only used for the Died transition itself and
    /// debug tooling; a second call while Dead returns None.
    pub fn force_death(&mut self, cause: DeathCause) -> Option<LifeTransition> {
        if self.state == LifeState::Dead {
            return None;
        }
        Some(self.kill(cause))
    }

    fn kill(&mut self, cause: DeathCause) -> LifeTransition {
        log::info!("lifecycle: {:?} -> Dead ({cause:?})", self.state);
        self.state = LifeState::Dead;
        LifeTransition::Died(cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PetConfig;

    fn tracks(hunger: f64, pollution: f64) -> (VitalTrack, VitalTrack) {
        let config = PetConfig::default();
        let mut h = VitalTrack::hunger(&config.hunger);
        h.set(hunger);
        let mut p = VitalTrack::pollution(&config.pollution);
        p.set(pollution);
        (h, p)
    }

    fn controller() -> LifecycleController {
        LifecycleController::new(&PetConfig::default().lifecycle)
    }

    #[test]
    fn weak_thresholds_are_inclusive() {
        let mut c = controller();
        let (h, p) = tracks(10.0, 0.0);
        assert_eq!(c.evaluate(&h, &p, GrowthStage::Child), Some(LifeTransition::BecameWeak));

        let mut c = controller();
        let (h, p) = tracks(50.0, 90.0);
        assert_eq!(c.evaluate(&h, &p, GrowthStage::Child), Some(LifeTransition::BecameWeak));
    }

    #[test]
    fn starvation_wins_over_pollution() {
        let mut c = controller();
        let (h, p) = tracks(0.0, 100.0);
        assert_eq!(
            c.evaluate(&h, &p, GrowthStage::Adult),
            Some(LifeTransition::Died(DeathCause::Starved))
        );
    }

    #[test]
    fn dead_ignores_everything() {
        let mut c = LifecycleController::restore(&PetConfig::default().lifecycle, false, true);
        assert_eq!(c.state(), LifeState::Dead);
        let (h, p) = tracks(0.0, 100.0);
        assert_eq!(c.evaluate(&h, &p, GrowthStage::Adult), None);
        assert_eq!(c.force_death(DeathCause::Forced), None);
    }

    #[test]
    fn restored_weak_flag_is_corrected() {
        let mut c = LifecycleController::restore(&PetConfig::default().lifecycle, true, true);
        let (h, p) = tracks(80.0, 10.0);
        assert_eq!(c.evaluate(&h, &p, GrowthStage::Teen), Some(LifeTransition::Recovered));
        assert_eq!(c.evaluate(&h, &p, GrowthStage::Teen), None);
    }
}

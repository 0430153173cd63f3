//! Threshold alerts — the decision to request a push notification.
//!
//! Each gate fires once when its condition becomes true and re-arms only
//! after the condition has cleared again. Delivery is someone else's job.

use crate::{
    config::{AlertText, PetConfig},
    vital_track::VitalTrack,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Hungry,
    DirtyWater,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdAlert {
    raised: bool,
}

impl ThresholdAlert {
    /// A gate whose condition already holds starts raised, so it stays
    /// quiet until the condition clears and returns.
    pub fn primed(condition: bool) -> Self {
        Self { raised: condition }
    }

    pub fn is_raised(&self) -> bool {
        self.raised
    }

    /// Feed the current condition. True exactly on the false→true edge.
    pub fn observe(&mut self, condition: bool) -> bool {
        let fire = condition && !self.raised;
        self.raised = condition;
        fire
    }
}

/// The pair of gates the pet carries.
#[derive(Debug, Clone)]
pub struct AlertGates {
    hungry:              ThresholdAlert,
    dirty_water:         ThresholdAlert,
    hunger_threshold:    f64,
    pollution_threshold: f64,
}

impl AlertGates {
    pub fn primed(config: &PetConfig, hunger: &VitalTrack, pollution: &VitalTrack) -> Self {
        let mut gates = Self {
            hungry:              ThresholdAlert::default(),
            dirty_water:         ThresholdAlert::default(),
            hunger_threshold:    config.lifecycle.weak_hunger_threshold,
            pollution_threshold: config.lifecycle.weak_pollution_threshold,
        };
        gates.hungry = ThresholdAlert::primed(gates.hungry_condition(hunger));
        gates.dirty_water = ThresholdAlert::primed(gates.dirty_condition(pollution));
        gates
    }

    /// Alerts newly crossed by the current vitals.
    pub fn observe(&mut self, hunger: &VitalTrack, pollution: &VitalTrack) -> Vec<AlertKind> {
        let mut fired = Vec::new();
        if self.hungry.observe(self.hungry_condition(hunger)) {
            fired.push(AlertKind::Hungry);
        }
        if self.dirty_water.observe(self.dirty_condition(pollution)) {
            fired.push(AlertKind::DirtyWater);
        }
        fired
    }

    fn hungry_condition(&self, hunger: &VitalTrack) -> bool {
        hunger.value() <= self.hunger_threshold
    }

    fn dirty_condition(&self, pollution: &VitalTrack) -> bool {
        pollution.value() >= self.pollution_threshold
    }
}

pub fn alert_text(config: &PetConfig, kind: AlertKind) -> &AlertText {
    match kind {
        AlertKind::Hungry     => &config.notifications.hungry,
        AlertKind::DirtyWater => &config.notifications.dirty_water,
    }
}

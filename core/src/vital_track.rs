//! Vital decay tracks: bounded scalars that drift toward a bound at a
//! fixed rate per simulated second.
//!
//! A track never decides anything about life or death. It only moves and
//! clamps; the lifecycle controller reads the value afterwards.

use crate::config::VitalConfig;
use serde::{Deserialize, Serialize};

/// Accumulated float error tolerated at a bound.
pub const BOUND_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Increasing,
    Decreasing,
}

impl Direction {
    fn sign(self) -> f64 {
        match self {
            Self::Increasing =>  1.0,
            Self::Decreasing => -1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VitalTrack {
    value:           f64,
    min:             f64,
    max:             f64,
    rate_per_second: f64,
    direction:       Direction,
}

impl VitalTrack {
    /// Starts at the bound opposite to where it drifts.
    pub fn new(min: f64, max: f64, rate_per_second: f64, direction: Direction) -> Self {
        let mut track = Self { value: min, min, max, rate_per_second, direction };
        track.reset();
        track
    }

    /// Satiety: full at start, empties over time.
    pub fn hunger(config: &VitalConfig) -> Self {
        Self::new(config.min, config.max, config.rate_per_second(), Direction::Decreasing)
    }

    /// Habitat dirtiness: clean at start, fills over time.
    pub fn pollution(config: &VitalConfig) -> Self {
        Self::new(config.min, config.max, config.rate_per_second(), Direction::Increasing)
    }

    pub fn value(&self) -> f64 { self.value }
    pub fn min(&self) -> f64 { self.min }
    pub fn max(&self) -> f64 { self.max }
    pub fn rate_per_second(&self) -> f64 { self.rate_per_second }
    pub fn direction(&self) -> Direction { self.direction }

    /// Drift for `seconds` of simulated time.
    pub fn tick(&mut self, seconds: f64) {
        if !seconds.is_finite() || seconds <= 0.0 {
            return;
        }
        let delta = self.direction.sign() * self.rate_per_second * seconds;
        self.set(self.value + delta);
    }

    /// Apply an external change (feeding, debug tools). Clamped.
    pub fn add(&mut self, amount: f64) {
        self.set(self.value + amount);
    }

    /// Non-finite input is ignored. Values within `BOUND_EPSILON` of a
    /// bound land on it, so many small ticks reach the bound at the same
    /// instant as one large one.
    pub fn set(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        let value = value.clamp(self.min, self.max);
        self.value = if value - self.min < BOUND_EPSILON {
            self.min
        } else if self.max - value < BOUND_EPSILON {
            self.max
        } else {
            value
        };
    }

    /// Back to the starting bound: hunger full, pollution clean.
    pub fn reset(&mut self) {
        self.value = match self.direction {
            Direction::Increasing => self.min,
            Direction::Decreasing => self.max,
        };
    }

    /// True once the track sits on the bound it drifts toward.
    pub fn at_terminal_bound(&self) -> bool {
        match self.direction {
            Direction::Increasing => self.value >= self.max,
            Direction::Decreasing => self.value <= self.min,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PetConfig;

    #[test]
    fn hunger_empties_in_exactly_four_days() {
        let mut hunger = VitalTrack::hunger(&PetConfig::default().hunger);
        hunger.tick(345_599.0);
        assert!(hunger.value() > 0.0);
        assert!(!hunger.at_terminal_bound());
        hunger.tick(1.0);
        assert_eq!(hunger.value(), 0.0);
        assert!(hunger.at_terminal_bound());
    }

    #[test]
    fn one_second_steps_reach_the_bound_with_one_big_step() {
        let config = PetConfig::default();
        let mut stepped = VitalTrack::hunger(&config.hunger);
        for _ in 0..345_599 {
            stepped.tick(1.0);
        }
        assert!(!stepped.at_terminal_bound(), "one second early is still alive");
        stepped.tick(1.0);

        let mut single = VitalTrack::hunger(&config.hunger);
        single.tick(345_600.0);

        assert_eq!(stepped.value(), 0.0);
        assert_eq!(stepped.value(), single.value());
        assert!(stepped.at_terminal_bound());
    }

    #[test]
    fn values_near_a_bound_snap_onto_it() {
        let mut pollution = VitalTrack::pollution(&PetConfig::default().pollution);
        pollution.set(100.0 - 1e-9);
        assert_eq!(pollution.value(), 100.0);
        pollution.set(1e-9);
        assert_eq!(pollution.value(), 0.0);
        pollution.set(0.5);
        assert_eq!(pollution.value(), 0.5);
    }

    #[test]
    fn pollution_fills_in_exactly_five_days() {
        let mut pollution = VitalTrack::pollution(&PetConfig::default().pollution);
        assert_eq!(pollution.value(), 0.0);
        pollution.tick(432_000.0);
        assert_eq!(pollution.value(), 100.0);
    }

    #[test]
    fn never_leaves_bounds() {
        let mut hunger = VitalTrack::hunger(&PetConfig::default().hunger);
        hunger.tick(10.0 * 345_600.0);
        assert_eq!(hunger.value(), 0.0);
        assert!(hunger.at_terminal_bound());
        hunger.add(1_000.0);
        assert_eq!(hunger.value(), 100.0);
        hunger.add(-1_000.0);
        assert_eq!(hunger.value(), 0.0);
    }

    #[test]
    fn negative_and_nan_ticks_are_ignored() {
        let mut pollution = VitalTrack::pollution(&PetConfig::default().pollution);
        pollution.set(40.0);
        pollution.tick(-3_600.0);
        pollution.tick(f64::NAN);
        assert_eq!(pollution.value(), 40.0);
    }
}

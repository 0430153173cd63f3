//! Growth stages derived from cumulative growth-days.
//!
//! The stage is never stored. It is recomputed from `days_passed`
//! whenever anyone asks, so the two can never disagree.

use crate::{config::GrowthConfig, types::Days};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GrowthStage {
    Egg,
    Hatchling,
    Child,
    Young,
    Teen,
    Adult,
    Perfect,
}

impl GrowthStage {
    pub const ALL: [GrowthStage; 7] = [
        Self::Egg,
        Self::Hatchling,
        Self::Child,
        Self::Young,
        Self::Teen,
        Self::Adult,
        Self::Perfect,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Egg       => "Egg",
            Self::Hatchling => "Hatchling",
            Self::Child     => "Child",
            Self::Young     => "Young",
            Self::Teen      => "Teen",
            Self::Adult     => "Adult",
            Self::Perfect   => "Perfect",
        }
    }

    pub fn is_egg(&self) -> bool {
        matches!(self, Self::Egg)
    }
}

/// Ascending lower bounds for Hatchling..=Perfect plus the size curve.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthTable {
    bounds:      [Days; 6],
    max_days:    Days,
    min_size_cm: f64,
    max_size_cm: f64,
}

impl GrowthTable {
    pub fn new(config: &GrowthConfig) -> Self {
        Self {
            bounds:      config.bounds(),
            max_days:    config.max_days,
            min_size_cm: config.min_size_cm,
            max_size_cm: config.max_size_cm,
        }
    }

    pub fn stage_for(&self, days: Days) -> GrowthStage {
        let passed = self.bounds.iter().take_while(|&&bound| days >= bound).count();
        GrowthStage::ALL[passed]
    }

    /// First day of `stage`.
    pub fn lower_bound(&self, stage: GrowthStage) -> Days {
        match GrowthStage::ALL.iter().position(|s| *s == stage) {
            Some(0) | None => 0,
            Some(i) => self.bounds[i - 1],
        }
    }

    pub fn max_days(&self) -> Days {
        self.max_days
    }

    pub fn clamp_days(&self, days: Days) -> Days {
        days.min(self.max_days)
    }

    /// Displayed body length. Linear in days, flat after `max_days`.
    pub fn size_cm(&self, days: Days) -> f64 {
        let t = f64::from(self.clamp_days(days)) / f64::from(self.max_days.max(1));
        self.min_size_cm + (self.max_size_cm - self.min_size_cm) * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PetConfig;

    fn table() -> GrowthTable {
        GrowthTable::new(&PetConfig::default().growth)
    }

    #[test]
    fn stage_boundaries() {
        let t = table();
        let expect = [
            (0, GrowthStage::Egg),
            (1, GrowthStage::Hatchling),
            (2, GrowthStage::Hatchling),
            (3, GrowthStage::Child),
            (5, GrowthStage::Child),
            (6, GrowthStage::Young),
            (10, GrowthStage::Young),
            (11, GrowthStage::Teen),
            (15, GrowthStage::Teen),
            (16, GrowthStage::Adult),
            (20, GrowthStage::Adult),
            (21, GrowthStage::Perfect),
            (1500, GrowthStage::Perfect),
            (Days::MAX, GrowthStage::Perfect),
        ];
        for (days, stage) in expect {
            assert_eq!(t.stage_for(days), stage, "day {days}");
        }
    }

    #[test]
    fn lower_bound_round_trips_through_stage_for() {
        let t = table();
        for stage in GrowthStage::ALL {
            assert_eq!(t.stage_for(t.lower_bound(stage)), stage);
        }
    }

    #[test]
    fn size_grows_from_three_to_twenty_one_cm() {
        let t = table();
        assert!((t.size_cm(0) - 3.0).abs() < 1e-9);
        assert!((t.size_cm(750) - 12.0).abs() < 1e-9);
        assert!((t.size_cm(1500) - 21.0).abs() < 1e-9);
        assert!((t.size_cm(4000) - 21.0).abs() < 1e-9);
    }
}

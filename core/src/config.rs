use crate::{
    clock::TimeScale,
    error::{PetError, PetResult},
    types::Days,
};
use serde::{Deserialize, Serialize};

// ── Vital tracks ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VitalConfig {
    pub min: f64,
    pub max: f64,
    /// Real seconds for the track to travel its whole range untended.
    pub seconds_to_bound: f64,
}

impl VitalConfig {
    pub fn rate_per_second(&self) -> f64 {
        (self.max - self.min) / self.seconds_to_bound
    }

    fn validate(&self, name: &str) -> PetResult<()> {
        if !(self.min < self.max) {
            return Err(invalid(format!("{name}: min {} must be below max {}", self.min, self.max)));
        }
        if !(self.seconds_to_bound > 0.0) {
            return Err(invalid(format!("{name}: seconds_to_bound must be positive")));
        }
        Ok(())
    }
}

// ── Lifecycle ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LifecycleConfig {
    /// Weak at or below this hunger.
    pub weak_hunger_threshold: f64,
    /// Weak at or above this pollution.
    pub weak_pollution_threshold: f64,
}

// ── Growth ─────────────────────────────────────────────────────────

/// Inclusive lower bound, in days, of every stage after Egg.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrowthConfig {
    pub hatchling_days: Days,
    pub child_days:     Days,
    pub young_days:     Days,
    pub teen_days:      Days,
    pub adult_days:     Days,
    pub perfect_days:   Days,
    pub max_days:       Days,
    pub min_size_cm:    f64,
    pub max_size_cm:    f64,
}

impl GrowthConfig {
    pub fn bounds(&self) -> [Days; 6] {
        [
            self.hatchling_days,
            self.child_days,
            self.young_days,
            self.teen_days,
            self.adult_days,
            self.perfect_days,
        ]
    }
}

// ── Care, notifications, time ──────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CareConfig {
    pub feed_amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertText {
    pub title: String,
    pub body:  String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationConfig {
    pub hungry:      AlertText,
    pub dirty_water: AlertText,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeConfig {
    /// Debug acceleration. Applies to live ticks and catch-up alike.
    pub time_scale:       f64,
    pub tick_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PetConfig {
    pub hunger:        VitalConfig,
    pub pollution:     VitalConfig,
    pub lifecycle:     LifecycleConfig,
    pub growth:        GrowthConfig,
    pub care:          CareConfig,
    pub notifications: NotificationConfig,
    pub time:          TimeConfig,
}

impl Default for PetConfig {
    fn default() -> Self {
        Self {
            hunger: VitalConfig {
                min: 0.0,
                max: 100.0,
                seconds_to_bound: 345_600.0, // 4 days
            },
            pollution: VitalConfig {
                min: 0.0,
                max: 100.0,
                seconds_to_bound: 432_000.0, // 5 days
            },
            lifecycle: LifecycleConfig {
                weak_hunger_threshold:    10.0,
                weak_pollution_threshold: 90.0,
            },
            growth: GrowthConfig {
                hatchling_days: 1,
                child_days:     3,
                young_days:     6,
                teen_days:      11,
                adult_days:     16,
                perfect_days:   21,
                max_days:       1500,
                min_size_cm:    3.0,
                max_size_cm:    21.0,
            },
            care: CareConfig { feed_amount: 10.0 },
            notifications: NotificationConfig {
                hungry: AlertText {
                    title: "Warning".into(),
                    body:  "Your mermaid is hungry!".into(),
                },
                dirty_water: AlertText {
                    title: "Warning".into(),
                    body:  "The water is getting dirty!".into(),
                },
            },
            time: TimeConfig {
                time_scale:       1.0,
                tick_interval_ms: 1000,
            },
        }
    }
}

impl PetConfig {
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/pet_config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: PetConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PetResult<()> {
        self.hunger.validate("hunger")?;
        self.pollution.validate("pollution")?;

        let bounds = self.growth.bounds();
        if bounds[0] == 0 {
            return Err(invalid("growth: hatchling_days must be at least 1".into()));
        }
        if bounds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(invalid(format!("growth: stage bounds must strictly increase, got {bounds:?}")));
        }
        if self.growth.max_days < self.growth.perfect_days {
            return Err(invalid("growth: max_days must be at least perfect_days".into()));
        }
        if !(self.time.time_scale >= 1.0) {
            return Err(invalid(format!("time: time_scale {} must be >= 1", self.time.time_scale)));
        }
        if self.time.tick_interval_ms == 0 {
            return Err(invalid("time: tick_interval_ms must be positive".into()));
        }
        if !(self.care.feed_amount > 0.0) {
            return Err(invalid("care: feed_amount must be positive".into()));
        }
        Ok(())
    }

    pub fn time_scale(&self) -> TimeScale {
        TimeScale::new(self.time.time_scale)
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.time.tick_interval_ms)
    }

    /// Defaults with a short tick interval, for tests that run the real timer.
    pub fn default_test() -> Self {
        let mut config = Self::default();
        config.time.tick_interval_ms = 10;
        config
    }
}

fn invalid(reason: String) -> PetError {
    PetError::InvalidConfig { reason }
}

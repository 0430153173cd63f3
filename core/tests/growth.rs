//! Growth stages over the days of a life.

use mermaid_core::{
    config::PetConfig,
    growth::{GrowthStage, GrowthTable},
};

fn table() -> GrowthTable {
    GrowthTable::new(&PetConfig::default().growth)
}

#[test]
fn stages_never_go_backwards() {
    let t = table();
    let mut previous = GrowthStage::Egg;
    for day in 0..=t.max_days() {
        let stage = t.stage_for(day);
        assert!(stage >= previous, "day {day}: {stage:?} after {previous:?}");
        previous = stage;
    }
    assert_eq!(previous, GrowthStage::Perfect);
}

#[test]
fn first_and_last_stage() {
    let t = table();
    assert_eq!(t.stage_for(0), GrowthStage::Egg);
    assert_eq!(t.stage_for(20), GrowthStage::Adult);
    assert_eq!(t.stage_for(21), GrowthStage::Perfect);
    assert_eq!(t.stage_for(u32::MAX), GrowthStage::Perfect);
}

#[test]
fn every_stage_is_reached_at_its_lower_bound() {
    let t = table();
    for stage in GrowthStage::ALL {
        assert_eq!(t.stage_for(t.lower_bound(stage)), stage);
    }
}

#[test]
fn size_grows_with_age_and_then_stops() {
    let t = table();
    assert_eq!(t.size_cm(0), 3.0);
    assert!(t.size_cm(100) < t.size_cm(101));
    assert_eq!(t.size_cm(1_500), 21.0);
    assert_eq!(t.size_cm(4_000), 21.0);
}

#[test]
fn custom_bounds_are_respected() {
    let mut config = PetConfig::default();
    config.growth.hatchling_days = 2;
    config.growth.child_days = 4;
    assert!(config.validate().is_ok());
    let t = GrowthTable::new(&config.growth);
    assert_eq!(t.stage_for(1), GrowthStage::Egg);
    assert_eq!(t.stage_for(3), GrowthStage::Hatchling);

    config.growth.child_days = 2;
    assert!(config.validate().is_err(), "bounds must strictly increase");
}

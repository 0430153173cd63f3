//! Save/load round-trips and the store's fallbacks for missing or
//! corrupt data.

use chrono::{TimeZone, Utc};
use mermaid_core::{
    clock::ManualClock,
    collaborator::Collaborators,
    config::PetConfig,
    engine::{PetEngine, StateSource},
    save_state::{SaveState, DEFAULT_PET_NAME},
    store::{keys, PetStore},
    types::Timestamp,
};

fn t0() -> Timestamp {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

fn migrated_store() -> PetStore {
    let store = PetStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store
}

fn sample_state() -> SaveState {
    SaveState {
        is_alive:             true,
        hunger:               37.123_456,
        pollution:            61.5,
        days_passed:          8,
        is_weak:              false,
        last_checkpoint_time: t0(),
        session_start_time:   t0() - chrono::Duration::days(8),
        pet_name:             "Marina".into(),
    }
}

#[test]
fn save_then_load_restores_every_field() {
    let mut store = migrated_store();
    let mut state = sample_state();
    let now = t0() + chrono::Duration::seconds(90);
    store.save(&mut state, now).expect("save");

    assert_eq!(state.last_checkpoint_time, now, "save stamps the checkpoint");

    let loaded = store.load(now);
    assert!(
        loaded.approx_eq(&state, 1e-3),
        "loaded state differs: {loaded:?} vs {state:?}"
    );
}

#[test]
fn dead_and_weak_flags_round_trip() {
    let mut store = migrated_store();
    let mut state = sample_state();
    state.is_alive = false;
    state.hunger = 0.0;
    store.save(&mut state, t0()).expect("save");

    let loaded = store.load(t0());
    assert!(!loaded.is_alive);
    assert_eq!(loaded.hunger, 0.0);

    let mut weak = sample_state();
    weak.is_weak = true;
    weak.hunger = 4.0;
    store.save(&mut weak, t0()).expect("save");
    assert!(store.load(t0()).is_weak);
}

#[test]
fn empty_store_yields_a_fresh_pet() {
    let store = migrated_store();
    let loaded = store.load(t0());

    assert_eq!(loaded, SaveState::fresh(t0()));
    assert!(loaded.is_alive);
    assert_eq!(loaded.hunger, 100.0);
    assert_eq!(loaded.pollution, 0.0);
    assert_eq!(loaded.days_passed, 0);
    assert_eq!(loaded.pet_name, DEFAULT_PET_NAME);
}

#[test]
fn corrupt_keys_fall_back_individually() {
    let mut store = migrated_store();
    let mut state = sample_state();
    store.save(&mut state, t0()).expect("save");

    store.write_raw(keys::HUNGER, "not-a-number").expect("write");
    store.write_raw(keys::DAYS_PASSED, "-3").expect("write");
    store.write_raw(keys::IS_ALIVE, "maybe").expect("write");

    let loaded = store.load(t0());
    assert_eq!(loaded.hunger, 100.0, "corrupt hunger falls back to full");
    assert_eq!(loaded.days_passed, 0, "negative days fall back to zero");
    assert!(loaded.is_alive, "unparseable flag falls back to alive");
    assert_eq!(loaded.pollution, 61.5, "intact keys are still used");
    assert_eq!(loaded.pet_name, "Marina");
}

#[test]
fn out_of_range_vitals_are_clamped() {
    let mut store = migrated_store();
    let mut state = sample_state();
    store.save(&mut state, t0()).expect("save");
    store.write_raw(keys::POLLUTION, "250").expect("write");
    store.write_raw(keys::HUNGER, "-12").expect("write");

    let loaded = store.load(t0());
    assert_eq!(loaded.pollution, 100.0);
    assert_eq!(loaded.hunger, 0.0);
}

#[test]
fn missing_session_start_defaults_to_checkpoint() {
    let mut store = migrated_store();
    let mut state = sample_state();
    store.save(&mut state, t0()).expect("save");
    store.remove_raw(keys::SESSION_START_TIME).expect("remove");

    let loaded = store.load(t0() + chrono::Duration::hours(5));
    assert_eq!(loaded.session_start_time, loaded.last_checkpoint_time);
    assert_eq!(loaded.last_checkpoint_time, t0());
}

#[test]
fn reset_all_replaces_everything() {
    let mut store = migrated_store();
    let mut state = sample_state();
    state.is_alive = false;
    store.save(&mut state, t0()).expect("save");

    let later = t0() + chrono::Duration::days(3);
    let fresh = store.reset_all(later).expect("reset");
    assert_eq!(fresh, SaveState::fresh(later));
    assert_eq!(store.load(later), fresh);
    assert_eq!(
        store.raw_value(keys::PET_NAME).expect("read").as_deref(),
        Some(DEFAULT_PET_NAME)
    );
}

#[test]
fn suspended_engine_state_survives_a_restart() {
    let clock = ManualClock::new(t0());
    let store = migrated_store();
    let mut engine = PetEngine::open(
        PetConfig::default(),
        store,
        Box::new(clock.clone()),
        Collaborators::none(),
    )
    .expect("engine");

    engine.on_resume().expect("resume");
    engine.rename("Coral").expect("rename");
    clock.advance_secs(3_600);
    engine.on_suspend().expect("suspend");
    let before = engine.save_state();

    let store = engine.into_store();
    let engine = PetEngine::open(
        PetConfig::default(),
        store,
        Box::new(clock.clone()),
        Collaborators::none(),
    )
    .expect("reopen");

    assert!(engine.save_state().approx_eq(&before, 1e-3));
    assert_eq!(engine.snapshot().name, "Coral");
}

#[test]
fn fresh_source_skips_the_stored_snapshot() {
    let mut store = migrated_store();
    let mut dead = sample_state();
    dead.is_alive = false;
    store.save(&mut dead, t0()).expect("save");

    let engine = PetEngine::open_with(
        PetConfig::default(),
        store,
        Box::new(ManualClock::new(t0())),
        Collaborators::none(),
        StateSource::Fresh(SaveState::fresh(t0())),
    )
    .expect("engine");

    assert!(engine.snapshot().is_alive());
    assert_eq!(engine.snapshot().days_passed, 0);
}

#[test]
fn file_store_opens_in_wal_mode_and_survives_reopening() {
    let path = std::env::temp_dir().join(format!("mermaid-store-{}.db", std::process::id()));
    let path = path.to_string_lossy().into_owned();
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{path}{suffix}"));
    }

    let mut state = sample_state();
    {
        let mut store = PetStore::open(&path).expect("open file store");
        store.migrate().expect("migration");
        store.save(&mut state, t0()).expect("save");
    }

    let store = PetStore::open(&path).expect("reopen file store");
    store.migrate().expect("migration");
    assert!(store.load(t0()).approx_eq(&state, 1e-3));
    drop(store);

    assert!(
        std::path::Path::new(&format!("{path}-wal")).exists()
            || std::path::Path::new(&path).exists(),
        "database file written"
    );
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{path}{suffix}"));
    }
}

//! Alert decisions handed to the notification collaborator.

use chrono::{TimeZone, Utc};
use mermaid_core::{
    alert::AlertKind,
    clock::ManualClock,
    collaborator::{Collaborators, NotificationCollaborator},
    config::PetConfig,
    engine::PetEngine,
    event::PetEvent,
    save_state::SaveState,
    store::PetStore,
    types::Timestamp,
};
use std::sync::{Arc, Mutex};

fn t0() -> Timestamp {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

#[derive(Debug, Default)]
struct Outbox {
    scheduled: Vec<(String, String, u64)>,
    clears:    usize,
}

struct RecordingNotifier(Arc<Mutex<Outbox>>);

impl NotificationCollaborator for RecordingNotifier {
    fn schedule(&mut self, title: &str, body: &str, delay_seconds: u64) {
        self.0
            .lock()
            .unwrap()
            .scheduled
            .push((title.to_string(), body.to_string(), delay_seconds));
    }

    fn clear_all(&mut self) {
        self.0.lock().unwrap().clears += 1;
    }
}

fn build_engine(hunger: f64, pollution: f64, clock: &ManualClock) -> (PetEngine, Arc<Mutex<Outbox>>) {
    let mut store = PetStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    let mut state = SaveState::fresh(t0());
    state.session_start_time = t0() - chrono::Duration::days(4);
    state.days_passed = 4;
    state.hunger = hunger;
    state.pollution = pollution;
    store.save(&mut state, t0()).expect("save");

    let outbox = Arc::new(Mutex::new(Outbox::default()));
    let collaborators =
        Collaborators::none().with_notifications(Box::new(RecordingNotifier(outbox.clone())));
    let mut engine = PetEngine::open(PetConfig::default(), store, Box::new(clock.clone()), collaborators)
        .expect("engine");
    engine.on_resume().expect("resume");
    (engine, outbox)
}

fn hungry_alerts(events: &[PetEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, PetEvent::AlertRaised { alert: AlertKind::Hungry, .. }))
        .count()
}

#[test]
fn crossing_the_hunger_threshold_notifies_once() {
    let clock = ManualClock::new(t0());
    let (mut engine, outbox) = build_engine(20.0, 0.0, &clock);

    // 20 → about 5.5 over many small ticks.
    let mut raised = 0;
    for _ in 0..100 {
        clock.advance_secs(500);
        raised += hungry_alerts(&engine.live_tick().expect("tick"));
    }

    assert!(engine.snapshot().hunger < 10.0);
    assert_eq!(raised, 1);
    let outbox = outbox.lock().unwrap();
    assert_eq!(
        outbox.scheduled,
        vec![("Warning".to_string(), "Your mermaid is hungry!".to_string(), 0)]
    );
}

#[test]
fn alert_rearms_after_the_condition_clears() {
    let clock = ManualClock::new(t0());
    let (mut engine, outbox) = build_engine(12.0, 0.0, &clock);

    engine.debug_add_hunger(-4.0).expect("starve");
    engine.feed(Some(30.0)).expect("feed");
    engine.debug_add_hunger(-30.0).expect("starve");

    assert_eq!(outbox.lock().unwrap().scheduled.len(), 2);
}

#[test]
fn dirty_water_is_announced_when_crossed() {
    let clock = ManualClock::new(t0());
    let (mut engine, outbox) = build_engine(100.0, 85.0, &clock);

    // 85 → 90 takes 21600 s.
    clock.advance_secs(25_000);
    let events = engine.live_tick().expect("tick");

    assert!(events.iter().any(|e| matches!(
        e,
        PetEvent::AlertRaised { alert: AlertKind::DirtyWater, delay_seconds: 0, .. }
    )));
    assert_eq!(
        outbox.lock().unwrap().scheduled[0].1,
        "The water is getting dirty!"
    );
}

#[test]
fn a_condition_already_true_at_load_stays_quiet() {
    let clock = ManualClock::new(t0());
    let (mut engine, outbox) = build_engine(5.0, 95.0, &clock);

    clock.advance_secs(60);
    engine.live_tick().expect("tick");

    assert!(engine.snapshot().is_weak());
    assert!(outbox.lock().unwrap().scheduled.is_empty());
}

#[test]
fn threshold_crossed_while_suspended_is_announced_on_resume() {
    let clock = ManualClock::new(t0());
    let (mut engine, outbox) = build_engine(30.0, 0.0, &clock);
    engine.on_suspend().expect("suspend");

    // 30 → about 9.2 while away.
    clock.advance_secs(72_000);
    let events = engine.on_resume().expect("resume");

    assert_eq!(hungry_alerts(&events), 1);
    assert_eq!(outbox.lock().unwrap().scheduled.len(), 1);
}

#[test]
fn pending_notifications_are_cleared_on_every_resume() {
    let clock = ManualClock::new(t0());
    let (mut engine, outbox) = build_engine(100.0, 0.0, &clock);
    engine.on_suspend().expect("suspend");
    engine.on_resume().expect("resume");
    engine.on_resume().expect("resume");

    assert_eq!(outbox.lock().unwrap().clears, 3);
}

#[test]
fn a_dead_pet_raises_no_alerts() {
    let clock = ManualClock::new(t0());
    let (mut engine, outbox) = build_engine(50.0, 50.0, &clock);
    engine.debug_force_die().expect("die");

    let events = engine.debug_set_pollution(100.0).expect("pollute");
    assert!(events.is_empty());
    clock.advance_secs(10 * 86_400);
    engine.live_tick().expect("tick");

    assert!(outbox.lock().unwrap().scheduled.is_empty());
}

#[test]
fn alerts_without_a_notifier_do_not_fail() {
    let clock = ManualClock::new(t0());
    let store = PetStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    let mut engine = PetEngine::open(
        PetConfig::default(),
        store,
        Box::new(clock.clone()),
        Collaborators::none(),
    )
    .expect("engine");
    engine.on_resume().expect("resume");

    let events = engine.debug_add_hunger(-95.0).expect("starve");
    assert_eq!(hungry_alerts(&events), 1);
}

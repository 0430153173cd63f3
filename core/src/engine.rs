//! The pet engine — owns the one mutable pet and every path that changes it.
//!
//! HOST LIFECYCLE:
//!   open()       load the snapshot (or take a fresh one) and install it
//!   on_resume()  stop ticking → clear pending notifications → catch-up →
//!                evaluate → persist → notify → start ticking
//!   pump()       apply queued live ticks (call from the host's loop)
//!   on_suspend() stop ticking → apply the tail since the last tick → persist
//!
//! RULES:
//!   - All mutation happens on the thread that owns the engine.
//!   - Live ticking is stopped before catch-up runs and restarted only
//!     after the checkpoint has moved, so no span is applied twice.
//!   - Every mutation first settles elapsed time up to now, then applies
//!     its change, then re-evaluates growth, lifecycle and alerts.
//!   - A death is persisted as soon as it happens. A dead pet keeps
//!     receiving ticks; they change nothing.

use crate::{
    alert::{alert_text, AlertGates},
    catch_up::{self, CatchUpReport},
    clock::{Clock, TimeScale},
    collaborator::Collaborators,
    command::PetCommand,
    config::PetConfig,
    error::PetResult,
    event::{CareAction, PetEvent, RejectReason},
    growth::{GrowthStage, GrowthTable},
    lifecycle::{DeathCause, LifeState, LifeTransition, LifecycleController},
    pet::Pet,
    save_state::SaveState,
    scheduler::{LiveTickScheduler, TickSignal},
    snapshot::PetSnapshot,
    store::PetStore,
    types::{Days, Timestamp, SECONDS_PER_DAY},
};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

/// Where the engine's initial state comes from.
#[derive(Debug, Clone)]
pub enum StateSource {
    /// Read the snapshot from the store.
    Stored,
    /// Already built and persisted, e.g. by a reset. Used as-is; the store
    /// is not read again.
    Fresh(SaveState),
}

/// Result of `reset_everything`. The state is already persisted and
/// installed; hand it to anything that would otherwise reload the store.
#[derive(Debug, Clone)]
pub struct ResetReport {
    pub state:  SaveState,
    pub events: Vec<PetEvent>,
}

pub struct PetEngine {
    config:        PetConfig,
    growth:        GrowthTable,
    scale:         TimeScale,
    clock:         Box<dyn Clock>,
    store:         PetStore,
    pet:           Pet,
    lifecycle:     LifecycleController,
    alerts:        AlertGates,
    collaborators: Collaborators,
    scheduler:     LiveTickScheduler,
    tick_tx:       Sender<TickSignal>,
    tick_rx:       Receiver<TickSignal>,
}

impl PetEngine {
    /// Load the stored snapshot. Call `on_resume()` next.
    pub fn open(
        config: PetConfig,
        store: PetStore,
        clock: Box<dyn Clock>,
        collaborators: Collaborators,
    ) -> PetResult<Self> {
        Self::open_with(config, store, clock, collaborators, StateSource::Stored)
    }

    pub fn open_with(
        config: PetConfig,
        store: PetStore,
        clock: Box<dyn Clock>,
        collaborators: Collaborators,
        source: StateSource,
    ) -> PetResult<Self> {
        config.validate()?;
        store.migrate()?;

        let state = match source {
            StateSource::Stored => store.load(clock.now()),
            StateSource::Fresh(state) => {
                log::info!("engine: starting from a fresh state; skipping load");
                state
            }
        };

        let growth = GrowthTable::new(&config.growth);
        let pet = Pet::from_save(&state, &config, &growth);
        let lifecycle = LifecycleController::restore(&config.lifecycle, state.is_alive, state.is_weak);
        let alerts = AlertGates::primed(&config, &pet.hunger, &pet.pollution);
        let (tick_tx, tick_rx) = mpsc::channel();

        Ok(Self {
            scale: config.time_scale(),
            scheduler: LiveTickScheduler::new(config.tick_interval()),
            growth,
            config,
            clock,
            store,
            pet,
            lifecycle,
            alerts,
            collaborators,
            tick_tx,
            tick_rx,
        })
    }

    // ── Host lifecycle ─────────────────────────────────────────

    /// Reconcile the time spent suspended, then start live ticking.
    pub fn on_resume(&mut self) -> PetResult<Vec<PetEvent>> {
        self.stop_ticking();
        self.collaborators.clear_notifications();

        let now = self.clock.now();
        let stage_before = self.stage();
        let report: CatchUpReport = catch_up::reconcile(
            &mut self.pet,
            now,
            self.scale,
            &self.growth,
            self.lifecycle.is_alive(),
        );

        let mut events = vec![
            PetEvent::Resumed { at: now },
            PetEvent::CatchUpApplied {
                real_seconds:      report.real_seconds,
                simulated_seconds: report.simulated_seconds,
                days_added:        report.days_added,
                hunger:            self.pet.hunger.value(),
                pollution:         self.pet.pollution.value(),
            },
        ];
        if report.days_added > 0 {
            events.push(PetEvent::DaysAdvanced { days_passed: self.pet.days_passed });
        }
        self.evaluate(stage_before, &mut events);

        let saved = self.persist(now);
        let events = self.publish(events);
        let started = self.scheduler.start(self.tick_tx.clone());

        saved?;
        started?;
        Ok(events)
    }

    /// Stop ticking and checkpoint everything up to now.
    pub fn on_suspend(&mut self) -> PetResult<Vec<PetEvent>> {
        self.stop_ticking();

        let now = self.clock.now();
        let mut events = self.settle(now);
        events.push(PetEvent::Suspended { at: now });

        let saved = self.persist(now);
        let events = self.publish(events);
        saved?;
        Ok(events)
    }

    // ── Live ticking ───────────────────────────────────────────

    pub fn is_ticking(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Apply every queued tick from the running timer. Never blocks.
    pub fn pump(&mut self) -> PetResult<Vec<PetEvent>> {
        let mut events = Vec::new();
        while let Ok(signal) = self.tick_rx.try_recv() {
            if self.scheduler.accepts(&signal) {
                events.extend(self.live_tick()?);
            } else {
                log::debug!("engine: dropped stale tick from generation {}", signal.generation);
            }
        }
        Ok(events)
    }

    /// Block up to `timeout` for the next tick and apply it.
    pub fn wait_for_tick(&mut self, timeout: Duration) -> PetResult<Vec<PetEvent>> {
        match self.tick_rx.recv_timeout(timeout) {
            Ok(signal) if self.scheduler.accepts(&signal) => self.live_tick(),
            Ok(signal) => {
                log::debug!("engine: dropped stale tick from generation {}", signal.generation);
                Ok(Vec::new())
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => Ok(Vec::new()),
        }
    }

    /// Keep applying live ticks for `duration` of host time.
    pub fn run_for(&mut self, duration: Duration) -> PetResult<Vec<PetEvent>> {
        let deadline = Instant::now() + duration;
        let mut events = Vec::new();
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() || !self.is_ticking() {
                break;
            }
            events.extend(self.wait_for_tick(remaining)?);
        }
        Ok(events)
    }

    /// One live tick: apply the time since the previous one.
    /// Hosts that drive their own loop may call this directly.
    pub fn live_tick(&mut self) -> PetResult<Vec<PetEvent>> {
        let now = self.clock.now();
        let events = self.settle(now);
        self.finish(now, events)
    }

    // ── Care ───────────────────────────────────────────────────

    /// Feed `amount` (default: the configured meal). Eggs cannot eat.
    pub fn feed(&mut self, amount: Option<f64>) -> PetResult<Vec<PetEvent>> {
        let now = self.clock.now();
        let mut events = self.settle(now);
        let amount = amount.unwrap_or(self.config.care.feed_amount);

        let rejected = if !self.lifecycle.is_alive() {
            Some(RejectReason::Dead)
        } else if self.stage().is_egg() {
            Some(RejectReason::StillAnEgg)
        } else if !amount.is_finite() || amount <= 0.0 {
            Some(RejectReason::InvalidInput)
        } else {
            None
        };

        match rejected {
            Some(reason) => {
                log::debug!("engine: feed rejected ({reason:?})");
                events.push(PetEvent::CareRejected { action: CareAction::Feed, reason });
            }
            None => {
                let stage = self.stage();
                self.pet.hunger.add(amount);
                events.push(PetEvent::Fed { amount, hunger: self.pet.hunger.value() });
                self.evaluate(stage, &mut events);
            }
        }
        self.finish(now, events)
    }

    /// Reset pollution to clean water.
    pub fn clean(&mut self) -> PetResult<Vec<PetEvent>> {
        let now = self.clock.now();
        let mut events = self.settle(now);

        if !self.lifecycle.is_alive() {
            events.push(PetEvent::CareRejected {
                action: CareAction::Clean,
                reason: RejectReason::Dead,
            });
        } else {
            let stage = self.stage();
            let previous_pollution = self.pet.pollution.value();
            self.pet.pollution.reset();
            events.push(PetEvent::Cleaned { previous_pollution });
            self.evaluate(stage, &mut events);
        }
        self.finish(now, events)
    }

    pub fn rename(&mut self, name: &str) -> PetResult<Vec<PetEvent>> {
        let now = self.clock.now();
        let mut events = self.settle(now);

        let name = name.trim();
        if name.is_empty() {
            events.push(PetEvent::CareRejected {
                action: CareAction::Rename,
                reason: RejectReason::InvalidInput,
            });
            return self.finish(now, events);
        }

        self.pet.name = name.to_string();
        events.push(PetEvent::Renamed { name: self.pet.name.clone() });
        let saved = self.persist(now);
        let events = self.publish(events);
        saved?;
        Ok(events)
    }

    // ── Debug tools ────────────────────────────────────────────

    /// Jump growth to `days`. The session anchor is moved so that absolute
    /// day counting keeps producing `days` from here on. A dead pet's day
    /// count is frozen; the call is a no-op.
    pub fn debug_set_days(&mut self, days: Days) -> PetResult<Vec<PetEvent>> {
        let now = self.clock.now();
        let mut events = self.settle(now);
        if !self.lifecycle.is_alive() {
            log::debug!("debug: set days ignored, pet is dead");
            return self.finish(now, events);
        }
        let stage = self.stage();

        let days = self.growth.clamp_days(days);
        let span = self.scale.real_duration(f64::from(days) * SECONDS_PER_DAY);
        self.pet.session_start_time = now - span;
        self.pet.days_passed = days;
        log::info!("debug: days set to {days}");

        events.push(PetEvent::DaysOverridden { days_passed: days });
        self.evaluate(stage, &mut events);

        let saved = self.persist(now);
        let events = self.publish(events);
        saved?;
        Ok(events)
    }

    /// Set water pollution to `percent` of its range.
    pub fn debug_set_pollution(&mut self, percent: f64) -> PetResult<Vec<PetEvent>> {
        let now = self.clock.now();
        let mut events = self.settle(now);
        if self.lifecycle.is_alive() && percent.is_finite() {
            let stage = self.stage();
            let (min, max) = (self.pet.pollution.min(), self.pet.pollution.max());
            self.pet.pollution.set(min + (max - min) * percent / 100.0);
            self.evaluate(stage, &mut events);
        }
        self.finish(now, events)
    }

    /// Shift hunger by `amount` (negative starves).
    pub fn debug_add_hunger(&mut self, amount: f64) -> PetResult<Vec<PetEvent>> {
        let now = self.clock.now();
        let mut events = self.settle(now);
        if self.lifecycle.is_alive() && amount.is_finite() {
            let stage = self.stage();
            self.pet.hunger.add(amount);
            self.evaluate(stage, &mut events);
        }
        self.finish(now, events)
    }

    /// Empty the stomach and kill the pet outright.
    pub fn debug_force_die(&mut self) -> PetResult<Vec<PetEvent>> {
        let now = self.clock.now();
        let mut events = self.settle(now);

        let hunger_min = self.pet.hunger.min();
        self.pet.hunger.set(hunger_min);
        if let Some(transition) = self.lifecycle.force_death(DeathCause::Forced) {
            events.push(transition_event(transition));
        }

        let saved = self.persist(now);
        let events = self.publish(events);
        saved?;
        Ok(events)
    }

    // ── Reset ──────────────────────────────────────────────────

    /// Replace everything with a brand-new pet. The only way out of Dead.
    pub fn reset_everything(&mut self) -> PetResult<ResetReport> {
        let was_ticking = self.is_ticking();
        self.stop_ticking();

        let now = self.clock.now();
        let state = match self.store.reset_all(now) {
            Ok(state) => state,
            Err(e) => {
                if was_ticking {
                    self.scheduler.start(self.tick_tx.clone())?;
                }
                return Err(e);
            }
        };

        let stage_before = self.stage();
        let was_weak = self.lifecycle.is_weak();
        self.install(&state);

        let mut events = vec![PetEvent::LifeReset { at: now }];
        if was_weak {
            events.push(PetEvent::WeakStateChanged { is_weak: false });
        }
        let stage = self.stage();
        if stage != stage_before {
            events.push(PetEvent::GrowthStageChanged {
                from:        stage_before,
                to:          stage,
                days_passed: self.pet.days_passed,
            });
        }
        let events = self.publish(events);

        if was_ticking {
            self.scheduler.start(self.tick_tx.clone())?;
        }
        log::info!("engine: everything reset");
        Ok(ResetReport { state, events })
    }

    // ── Commands ───────────────────────────────────────────────

    pub fn apply(&mut self, command: PetCommand) -> PetResult<Vec<PetEvent>> {
        match command {
            PetCommand::Feed { amount }               => self.feed(amount),
            PetCommand::Clean                         => self.clean(),
            PetCommand::Rename { name }               => self.rename(&name),
            PetCommand::DebugSetDays { days }         => self.debug_set_days(days),
            PetCommand::DebugSetPollution { percent } => self.debug_set_pollution(percent),
            PetCommand::DebugAddHunger { amount }     => self.debug_add_hunger(amount),
            PetCommand::DebugForceDie                 => self.debug_force_die(),
            PetCommand::ResetEverything               => Ok(self.reset_everything()?.events),
        }
    }

    // ── Queries ────────────────────────────────────────────────

    pub fn snapshot(&self) -> PetSnapshot {
        let stage = self.stage();
        PetSnapshot {
            name:                 self.pet.name.clone(),
            hunger:               self.pet.hunger.value(),
            pollution:            self.pet.pollution.value(),
            days_passed:          self.pet.days_passed,
            stage,
            stage_label:          stage.label().to_string(),
            size_cm:              self.growth.size_cm(self.pet.days_passed),
            life:                 self.lifecycle.state(),
            session_start_time:   self.pet.session_start_time,
            last_checkpoint_time: self.pet.last_checkpoint_time,
            ticking:              self.is_ticking(),
        }
    }

    /// The state as it would be persisted right now.
    pub fn save_state(&self) -> SaveState {
        self.pet.to_save(&self.lifecycle)
    }

    pub fn stage(&self) -> GrowthStage {
        self.pet.stage(&self.growth)
    }

    pub fn life_state(&self) -> LifeState {
        self.lifecycle.state()
    }

    pub fn config(&self) -> &PetConfig {
        &self.config
    }

    pub fn store(&self) -> &PetStore {
        &self.store
    }

    /// Shut down and hand the store back, e.g. to simulate a process restart.
    pub fn into_store(mut self) -> PetStore {
        self.stop_ticking();
        self.store
    }

    // ── Internals ──────────────────────────────────────────────

    fn install(&mut self, state: &SaveState) {
        self.pet = Pet::from_save(state, &self.config, &self.growth);
        self.lifecycle =
            LifecycleController::restore(&self.config.lifecycle, state.is_alive, state.is_weak);
        self.alerts = AlertGates::primed(&self.config, &self.pet.hunger, &self.pet.pollution);
    }

    /// Stop the timer and throw away anything it already queued.
    fn stop_ticking(&mut self) {
        self.scheduler.stop();
        while self.tick_rx.try_recv().is_ok() {}
    }

    /// Apply elapsed time up to `now` and re-evaluate.
    fn settle(&mut self, now: Timestamp) -> Vec<PetEvent> {
        let stage_before = self.stage();
        let progress = catch_up::advance_live(
            &mut self.pet,
            now,
            self.scale,
            &self.growth,
            self.lifecycle.is_alive(),
        );

        let mut events = Vec::new();
        if progress.days_added > 0 {
            events.push(PetEvent::DaysAdvanced { days_passed: self.pet.days_passed });
        }
        self.evaluate(stage_before, &mut events);

        log::debug!(
            "tick: +{:.1}s hunger={:.4} pollution={:.4} day={}",
            progress.simulated_seconds,
            self.pet.hunger.value(),
            self.pet.pollution.value(),
            self.pet.days_passed
        );
        events
    }

    /// Derive growth stage, life state and alerts from the current values.
    fn evaluate(&mut self, stage_before: GrowthStage, events: &mut Vec<PetEvent>) {
        let stage = self.stage();
        if stage != stage_before {
            log::info!("growth: {} -> {} on day {}", stage_before.label(), stage.label(), self.pet.days_passed);
            events.push(PetEvent::GrowthStageChanged {
                from:        stage_before,
                to:          stage,
                days_passed: self.pet.days_passed,
            });
        }

        if let Some(transition) = self.lifecycle.evaluate(&self.pet.hunger, &self.pet.pollution, stage) {
            events.push(transition_event(transition));
        }

        if self.lifecycle.is_alive() {
            for alert in self.alerts.observe(&self.pet.hunger, &self.pet.pollution) {
                let text = alert_text(&self.config, alert);
                events.push(PetEvent::AlertRaised {
                    alert,
                    title:         text.title.clone(),
                    body:          text.body.clone(),
                    delay_seconds: 0,
                });
            }
        }
    }

    /// Write the snapshot with `now` as its checkpoint.
    fn persist(&mut self, now: Timestamp) -> PetResult<()> {
        let mut state = self.pet.to_save(&self.lifecycle);
        let result = self.store.save(&mut state, now);
        // The in-memory checkpoint moves even if the write failed: the
        // decay up to `now` has been applied either way.
        self.pet.last_checkpoint_time = now;
        self.pet.accounted_until = now;
        if let Err(e) = &result {
            log::error!("engine: checkpoint failed: {e}");
        }
        result
    }

    /// Publish `events`, persisting first if they contain a death.
    fn finish(&mut self, now: Timestamp, events: Vec<PetEvent>) -> PetResult<Vec<PetEvent>> {
        let died = events.iter().any(|e| matches!(e, PetEvent::Died { .. }));
        let saved = if died { self.persist(now) } else { Ok(()) };
        let events = self.publish(events);
        saved?;
        Ok(events)
    }

    fn publish(&mut self, events: Vec<PetEvent>) -> Vec<PetEvent> {
        self.collaborators.dispatch(&events);
        events
    }
}

fn transition_event(transition: LifeTransition) -> PetEvent {
    match transition {
        LifeTransition::BecameWeak => PetEvent::WeakStateChanged { is_weak: true },
        LifeTransition::Recovered  => PetEvent::WeakStateChanged { is_weak: false },
        LifeTransition::Died(cause) => PetEvent::Died { cause },
    }
}

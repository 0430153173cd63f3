//! Live tick scheduler: a cancellable repeating timer.
//!
//! The timer thread never touches pet state. It only posts TickSignals to
//! a channel the engine drains on its own thread, so every mutation stays
//! on one serialized timeline even though the timer is preemptive.
//! Each start() opens a new generation; signals from an older generation,
//! including ones already queued when stop() ran, are refused.

use crate::error::PetResult;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSignal {
    pub generation: u64,
}

struct TimerHandle {
    stop_tx: Sender<()>,
    thread:  JoinHandle<()>,
}

pub struct LiveTickScheduler {
    interval:   Duration,
    generation: u64,
    timer:      Option<TimerHandle>,
}

impl LiveTickScheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval, generation: 0, timer: None }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Start posting one signal per interval to `ticks`. Restarts the
    /// timer if it is already running.
    pub fn start(&mut self, ticks: Sender<TickSignal>) -> PetResult<()> {
        self.stop();
        self.generation += 1;

        let generation = self.generation;
        let interval = self.interval;
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let thread = std::thread::Builder::new()
            .name("live-tick".into())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        if ticks.send(TickSignal { generation }).is_err() {
                            break; // engine gone
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .map_err(|e| anyhow::anyhow!("cannot spawn live tick timer: {e}"))?;

        self.timer = Some(TimerHandle { stop_tx, thread });
        log::debug!("scheduler: started generation {generation} every {interval:?}");
        Ok(())
    }

    /// Stop the timer and wait for its thread to exit. When this returns
    /// no further signal of the stopped generation will be accepted.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            let _ = timer.stop_tx.send(());
            if timer.thread.join().is_err() {
                log::warn!("scheduler: timer thread panicked");
            }
            log::debug!("scheduler: stopped generation {}", self.generation);
        }
    }

    /// Whether `signal` belongs to the running generation.
    pub fn accepts(&self, signal: &TickSignal) -> bool {
        self.is_running() && signal.generation == self.generation
    }
}

impl Drop for LiveTickScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

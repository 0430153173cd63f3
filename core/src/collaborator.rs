//! Narrow interfaces to the out-of-scope subsystems (push notifications,
//! rendering and UI), and the dispatcher that drives them from events.

use crate::{
    event::{event_type_name, PetEvent},
    growth::GrowthStage,
};

/// Delivers push notifications. Only the decision to send one is ours.
pub trait NotificationCollaborator {
    fn schedule(&mut self, title: &str, body: &str, delay_seconds: u64);

    /// Drop anything still pending. Called on every resume.
    fn clear_all(&mut self) {}
}

/// Whatever draws the pet.
pub trait PresentationCollaborator {
    /// Called exactly once per life.
    fn on_death(&mut self);
    fn on_weak_state_changed(&mut self, is_weak: bool);
    fn on_growth_stage_changed(&mut self, stage: GrowthStage);
}

/// The collaborators a host has wired up. Either may be missing; calls to
/// a missing collaborator are skipped and the core carries on.
#[derive(Default)]
pub struct Collaborators {
    notifications: Option<Box<dyn NotificationCollaborator>>,
    presentation:  Option<Box<dyn PresentationCollaborator>>,
}

impl Collaborators {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_notifications(mut self, n: Box<dyn NotificationCollaborator>) -> Self {
        self.notifications = Some(n);
        self
    }

    pub fn with_presentation(mut self, p: Box<dyn PresentationCollaborator>) -> Self {
        self.presentation = Some(p);
        self
    }

    pub fn clear_notifications(&mut self) {
        if let Some(n) = self.notifications.as_mut() {
            n.clear_all();
        }
    }

    pub fn dispatch(&mut self, events: &[PetEvent]) {
        for event in events {
            log::debug!("event: {} {event:?}", event_type_name(event));
            match event {
                PetEvent::AlertRaised { title, body, delay_seconds, alert } => {
                    match self.notifications.as_mut() {
                        Some(n) => n.schedule(title, body, *delay_seconds),
                        None => log::warn!("alert {alert:?} raised with no notification collaborator; skipped"),
                    }
                }
                PetEvent::Died { .. } => {
                    if let Some(p) = self.presentation.as_mut() {
                        p.on_death();
                    }
                }
                PetEvent::WeakStateChanged { is_weak } => {
                    if let Some(p) = self.presentation.as_mut() {
                        p.on_weak_state_changed(*is_weak);
                    }
                }
                PetEvent::GrowthStageChanged { to, .. } => {
                    if let Some(p) = self.presentation.as_mut() {
                        p.on_growth_stage_changed(*to);
                    }
                }
                _ => {}
            }
        }
    }
}

/// Writes notification requests to the log. Used by the headless runner.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl NotificationCollaborator for LogNotifier {
    fn schedule(&mut self, title: &str, body: &str, delay_seconds: u64) {
        log::info!("notification in {delay_seconds}s: {title} - {body}");
    }

    fn clear_all(&mut self) {
        log::debug!("notifications cleared");
    }
}

#[derive(Debug, Default)]
pub struct LogPresenter;

impl PresentationCollaborator for LogPresenter {
    fn on_death(&mut self) {
        log::info!("presentation: game over");
    }

    fn on_weak_state_changed(&mut self, is_weak: bool) {
        log::info!("presentation: weak expression {}", if is_weak { "on" } else { "off" });
    }

    fn on_growth_stage_changed(&mut self, stage: GrowthStage) {
        log::info!("presentation: now a {}", stage.label());
    }
}

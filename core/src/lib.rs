//! Lifecycle simulation core for a virtual pet mermaid.
//!
//! Vitals drift in real time, including while the host app is closed.
//! On every resume the offline gap is reconciled in one step, growth is
//! re-derived from the session anchor, and the Alive/Weak/Dead state
//! machine is re-evaluated before live ticking takes over again.

pub mod alert;
pub mod catch_up;
pub mod clock;
pub mod collaborator;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod growth;
pub mod lifecycle;
pub mod pet;
pub mod save_state;
pub mod scheduler;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod vital_track;

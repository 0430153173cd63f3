//! SQLite persistence layer: one flat key/value snapshot.
//!
//! RULE: Only store.rs talks to the database.
//! The engine hands whole SaveStates in and out; nothing else runs SQL.

use crate::{
    error::{PetError, PetResult},
    save_state::{SaveState, DEFAULT_PET_NAME},
    types::Timestamp,
};
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;

pub mod keys {
    pub const IS_ALIVE:             &str = "isAlive";
    pub const HUNGER:               &str = "hunger";
    pub const POLLUTION:            &str = "pollution";
    pub const DAYS_PASSED:          &str = "daysPassed";
    pub const IS_WEAK:              &str = "isWeak";
    pub const LAST_CHECKPOINT_TIME: &str = "lastCheckpointTime";
    pub const SESSION_START_TIME:   &str = "sessionStartTime";
    pub const PET_NAME:             &str = "petName";
}

pub struct PetStore {
    conn: Connection,
}

impl PetStore {
    pub fn open(path: &str) -> PetResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> PetResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> PetResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_save_data.sql"))?;
        Ok(())
    }

    // ── Snapshot ───────────────────────────────────────────────

    /// Read the snapshot. Never fails: an empty or unreadable database
    /// yields a fresh state, and each missing or corrupt key falls back to
    /// its default on its own.
    pub fn load(&self, now: Timestamp) -> SaveState {
        let raw = match self.read_all() {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("store: snapshot unreadable ({e}); starting from defaults");
                return SaveState::fresh(now);
            }
        };
        if raw.is_empty() {
            log::info!("store: no snapshot found; creating a new pet");
            return SaveState::fresh(now);
        }

        let defaults = SaveState::fresh(now);
        let last_checkpoint_time =
            decode(&raw, keys::LAST_CHECKPOINT_TIME, defaults.last_checkpoint_time, parse_time);
        let state = SaveState {
            is_alive:    decode(&raw, keys::IS_ALIVE, defaults.is_alive, parse_bool),
            hunger:      decode(&raw, keys::HUNGER, defaults.hunger, parse_f64).clamp(0.0, 100.0),
            pollution:   decode(&raw, keys::POLLUTION, defaults.pollution, parse_f64).clamp(0.0, 100.0),
            days_passed: decode(&raw, keys::DAYS_PASSED, defaults.days_passed, |s| s.trim().parse().ok()),
            is_weak:     decode(&raw, keys::IS_WEAK, defaults.is_weak, parse_bool),
            last_checkpoint_time,
            // Without its anchor the best guess is the last checkpoint.
            session_start_time: decode(&raw, keys::SESSION_START_TIME, last_checkpoint_time, parse_time),
            pet_name: raw
                .get(keys::PET_NAME)
                .filter(|n| !n.trim().is_empty())
                .cloned()
                .unwrap_or_else(|| DEFAULT_PET_NAME.to_string()),
        };

        log::debug!(
            "store: loaded days={} hunger={:.2} pollution={:.2} alive={}",
            state.days_passed,
            state.hunger,
            state.pollution,
            state.is_alive
        );
        state
    }

    /// Stamp `state` with `now` as its checkpoint and write every field.
    pub fn save(&mut self, state: &mut SaveState, now: Timestamp) -> PetResult<()> {
        state.last_checkpoint_time = now;

        let tx = self.conn.transaction()?;
        for (key, value) in encode(state) {
            tx.execute(
                "INSERT INTO save_data (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
        }
        tx.commit()?;

        log::debug!("store: checkpoint at {}", format_time(now));
        Ok(())
    }

    /// Discard everything and persist a brand-new pet.
    pub fn reset_all(&mut self, now: Timestamp) -> PetResult<SaveState> {
        self.conn.execute("DELETE FROM save_data", [])?;
        let mut state = SaveState::fresh(now);
        self.save(&mut state, now)?;
        log::info!("store: all data reset");
        Ok(state)
    }

    // ── Raw access ─────────────────────────────────────────────

    pub fn raw_value(&self, key: &str) -> PetResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM save_data WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Overwrite a single key. Tooling and tests only.
    pub fn write_raw(&self, key: &str, value: &str) -> PetResult<()> {
        self.conn.execute(
            "INSERT INTO save_data (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn remove_raw(&self, key: &str) -> PetResult<()> {
        self.conn
            .execute("DELETE FROM save_data WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn read_all(&self) -> PetResult<HashMap<String, String>> {
        let mut stmt = self.conn.prepare("SELECT key, value FROM save_data")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(rows)
    }
}

fn encode(state: &SaveState) -> [(&'static str, String); 8] {
    [
        (keys::IS_ALIVE, state.is_alive.to_string()),
        (keys::HUNGER, state.hunger.to_string()),
        (keys::POLLUTION, state.pollution.to_string()),
        (keys::DAYS_PASSED, state.days_passed.to_string()),
        (keys::IS_WEAK, state.is_weak.to_string()),
        (keys::LAST_CHECKPOINT_TIME, format_time(state.last_checkpoint_time)),
        (keys::SESSION_START_TIME, format_time(state.session_start_time)),
        (keys::PET_NAME, state.pet_name.clone()),
    ]
}

/// Missing → default silently; present but unparsable → default, logged.
fn decode<T>(
    raw: &HashMap<String, String>,
    key: &str,
    default: T,
    parse: impl Fn(&str) -> Option<T>,
) -> T {
    match raw.get(key) {
        None => default,
        Some(value) => parse(value).unwrap_or_else(|| {
            let err = PetError::CorruptValue { key: key.to_string(), value: value.clone() };
            log::warn!("store: {err}; using default");
            default
        }),
    }
}

pub fn format_time(t: Timestamp) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// RFC 3339 / ISO 8601, or whole epoch seconds.
fn parse_time(s: &str) -> Option<Timestamp> {
    let s = s.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    s.parse::<i64>()
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
}

fn parse_f64(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

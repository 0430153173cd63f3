use crate::types::Days;
use serde::{Deserialize, Serialize};

/// Every action a UI can ask of the core, in JSON-friendly form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PetCommand {
    // ── Care ──────────────────────────────────────
    /// Omitted amount means the configured meal size.
    Feed {
        #[serde(default)]
        amount: Option<f64>,
    },
    Clean,
    Rename {
        name: String,
    },

    // ── Debug tools ───────────────────────────────
    DebugSetDays {
        days: Days,
    },
    DebugSetPollution {
        percent: f64,
    },
    DebugAddHunger {
        amount: f64,
    },
    DebugForceDie,

    // ── Game over ─────────────────────────────────
    ResetEverything,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ui_commands() {
        let feed: PetCommand = serde_json::from_str(r#"{"cmd":"feed"}"#).unwrap();
        assert_eq!(feed, PetCommand::Feed { amount: None });

        let days: PetCommand = serde_json::from_str(r#"{"cmd":"debug_set_days","days":16}"#).unwrap();
        assert_eq!(days, PetCommand::DebugSetDays { days: 16 });

        let reset: PetCommand = serde_json::from_str(r#"{"cmd":"reset_everything"}"#).unwrap();
        assert_eq!(reset, PetCommand::ResetEverything);
    }

    #[test]
    fn rejects_unknown_commands() {
        assert!(serde_json::from_str::<PetCommand>(r#"{"cmd":"pet_the_fish"}"#).is_err());
    }
}

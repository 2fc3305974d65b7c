//! Game modes and their static budgets

use serde::{Deserialize, Serialize};

use crate::consts::{CLASSIC_ATTEMPTS, DZEN_TIMER_MS};

/// Selectable game modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    /// Attempts-limited, no timer; difficulty ramps with iteration
    Classic,
    /// Time-limited, no attempt limit, never bombs
    Dzen,
}

impl GameMode {
    pub const ALL: [GameMode; 2] = [GameMode::Classic, GameMode::Dzen];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Classic => "Classic",
            GameMode::Dzen => "Dzen",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Classic" => Some(GameMode::Classic),
            "Dzen" => Some(GameMode::Dzen),
            _ => None,
        }
    }
}

/// Immutable per-mode budgets; exactly one of timer/attempts is set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeConfig {
    pub mode: GameMode,
    pub timer_ms: Option<u64>,
    pub attempts: Option<u32>,
}

impl ModeConfig {
    /// Static config table, keyed by mode
    pub fn for_mode(mode: GameMode) -> Self {
        match mode {
            GameMode::Classic => Self {
                mode,
                timer_ms: None,
                attempts: Some(CLASSIC_ATTEMPTS),
            },
            GameMode::Dzen => Self {
                mode,
                timer_ms: Some(DZEN_TIMER_MS),
                attempts: None,
            },
        }
    }
}

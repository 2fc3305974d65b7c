//! Best-score record
//!
//! One score per mode, persisted as a single JSON object under the
//! `"bestScore"` key. Absent or corrupt data reads as an all-zero record.

use serde::{Deserialize, Serialize};

use crate::config::GameMode;
use crate::storage::KeyValueStorage;

/// Storage key for the record
pub const BEST_SCORE_KEY: &str = "bestScore";

/// Per-mode best scores
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestScoreRecord {
    #[serde(rename = "Classic", default)]
    pub classic: u32,
    #[serde(rename = "Dzen", default)]
    pub dzen: u32,
}

impl BestScoreRecord {
    pub fn get(&self, mode: GameMode) -> u32 {
        match mode {
            GameMode::Classic => self.classic,
            GameMode::Dzen => self.dzen,
        }
    }

    pub fn set(&mut self, mode: GameMode, score: u32) {
        match mode {
            GameMode::Classic => self.classic = score,
            GameMode::Dzen => self.dzen = score,
        }
    }

    /// Load the record, treating absent or unreadable data as all zeros
    pub fn load(storage: &dyn KeyValueStorage) -> Self {
        if let Some(json) = storage.get(BEST_SCORE_KEY) {
            if let Ok(record) = serde_json::from_str::<BestScoreRecord>(&json) {
                return record;
            }
            log::warn!("best score record unreadable, starting fresh");
        }
        Self::default()
    }

    /// Read-modify-write: reload the stored record, raise `mode`'s entry to
    /// `score` if that improves it, write the merged record back.
    /// Returns the merged record.
    pub fn record_improvement(
        storage: &mut dyn KeyValueStorage,
        mode: GameMode,
        score: u32,
    ) -> Self {
        let mut record = Self::load(storage);
        if score > record.get(mode) {
            record.set(mode, score);
            record.save(storage);
            log::info!("new best score for {}: {score}", mode.as_str());
        }
        record
    }

    fn save(&self, storage: &mut dyn KeyValueStorage) {
        match serde_json::to_string(self) {
            Ok(json) => storage.set(BEST_SCORE_KEY, &json),
            Err(err) => log::warn!("best score record not serializable: {err}"),
        }
    }
}

//! Error taxonomy
//!
//! Only construction can fail. Gameplay commands are infallible: decrements
//! at zero, timer ticks in the wrong mode and generation while paused are
//! silent no-ops, not errors.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GameError {
    /// Spawn geometry is unusable; fail fast at startup
    #[error("spawn interval must be a positive finite half-width, got {0}")]
    InvalidSpawnInterval(f32),
}

//! Fruit Slash - a fruit-slicing arcade game core
//!
//! Core modules:
//! - `generator`: Procedural fruit-sequence generation (per-mode difficulty curves)
//! - `session`: Session/scoring state machine (attempts, timer, combos, best score)
//! - `orchestrator`: Clock-driven orchestration loop (spawn cadence, countdown, cut batching)
//! - `storage`: Key-value persistence capability (LocalStorage on web)
//! - `platform`: Browser/native platform abstraction
//!
//! Rendering, audio and all UI live outside this crate: the orchestrator
//! emits [`orchestrator::Directive`] commands for the presentation layer
//! and consumes [`orchestrator::SceneEvent`] reports from it.

pub mod bestscore;
pub mod config;
pub mod error;
pub mod fruit;
pub mod generator;
pub mod orchestrator;
pub mod platform;
pub mod rng;
pub mod session;
pub mod storage;

pub use bestscore::BestScoreRecord;
pub use config::{GameMode, ModeConfig};
pub use error::GameError;
pub use fruit::{ComboEvent, CutFruit, FruitKind, FruitSequence, FruitSpawn, FruitSpeed};
pub use generator::{FruitsGenerator, SpawnInterval};
pub use orchestrator::{Directive, Orchestrator, SceneEvent};
pub use rng::{Entropy, GameRng};
pub use session::GameSession;

/// Game configuration constants
pub mod consts {
    /// Scene edge length in world units; the camera frames this square
    pub const SCENE_SIZE: f32 = 9.0;
    /// Horizontal spawn half-width: fruits start in [-interval, interval]
    pub const FRUIT_POSITION_INTERVAL: f32 = SCENE_SIZE / 2.0;

    /// Attempt budget for Classic mode
    pub const CLASSIC_ATTEMPTS: u32 = 3;
    /// Time budget for Dzen mode (milliseconds)
    pub const DZEN_TIMER_MS: u64 = 90_000;

    /// Cuts in one batching window needed for a combo bonus
    pub const MIN_CUT_COMBO: usize = 3;
    /// Cut batching window: intersections this close together count as one burst (ms)
    pub const CUT_WINDOW_MS: u64 = 200;
    /// How long the render layer keeps a combo callout on screen (ms)
    pub const COMBO_DISPLAY_MS: u64 = 3_000;

    /// Rest period between fruit batches (ms)
    pub const GROUP_DELAY_MS: u64 = 3_000;
    /// Countdown driver tick period (ms)
    pub const COUNTDOWN_TICK_MS: u64 = 1_000;

    /// Per-fruit spawn delay in Classic mode off-wave batches (ms)
    pub const CLASSIC_FRUIT_DELAY_MS: u64 = 500;
    /// Per-fruit spawn delay for dense Dzen batches (ms)
    pub const DZEN_FRUIT_DELAY_MS: u64 = 300;
    /// Dzen batches at or above this count use the Dzen delay
    pub const DZEN_DENSE_LIMIT: u32 = 8;
}

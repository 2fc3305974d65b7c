//! Session store / state machine
//!
//! `GameSession` is the single owner of all per-session state. Every
//! mutation goes through a command; reads are derived on demand, never
//! cached. Commands are infallible by contract: hitting a terminal bound
//! (attempts or time at zero) is a no-op, and the orchestration loop is
//! responsible for noticing the terminal state and stopping generation.

use crate::bestscore::BestScoreRecord;
use crate::config::{GameMode, ModeConfig};
use crate::consts::{COUNTDOWN_TICK_MS, MIN_CUT_COMBO};
use crate::error::GameError;
use crate::fruit::{FruitKind, FruitSequence};
use crate::generator::{FruitsGenerator, SpawnInterval};
use crate::rng::GameRng;
use crate::storage::KeyValueStorage;

/// One play-through's state, from mode selection to game over or exit
pub struct GameSession {
    interval: SpawnInterval,
    seed: u64,
    storage: Box<dyn KeyValueStorage>,
    best: BestScoreRecord,
    /// 0 means no session; strictly increases across mode selections
    session_id: u64,
    next_session_id: u64,
    config: Option<ModeConfig>,
    generator: Option<FruitsGenerator<GameRng>>,
    iteration: u32,
    score: u32,
    attempts: Option<u32>,
    time_remaining_ms: Option<u64>,
    paused: bool,
    next_fruits: FruitSequence,
}

impl GameSession {
    /// Fails fast on unusable spawn geometry; everything after
    /// construction is infallible.
    pub fn new(
        half_width: f32,
        seed: u64,
        storage: Box<dyn KeyValueStorage>,
    ) -> Result<Self, GameError> {
        let interval = SpawnInterval::new(half_width)?;
        let best = BestScoreRecord::load(storage.as_ref());
        Ok(Self {
            interval,
            seed,
            storage,
            best,
            session_id: 0,
            next_session_id: 0,
            config: None,
            generator: None,
            iteration: 0,
            score: 0,
            attempts: None,
            time_remaining_ms: None,
            paused: false,
            next_fruits: FruitSequence::default(),
        })
    }

    /// Browser session over LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn browser(half_width: f32, seed: u64) -> Result<Self, GameError> {
        Self::new(half_width, seed, Box::new(crate::storage::BrowserStorage))
    }

    /// Start a fresh session in `mode`: budgets from the mode table, all
    /// counters reset, a new generator seeded for this session.
    pub fn select_mode(&mut self, mode: GameMode) {
        let config = ModeConfig::for_mode(mode);
        self.next_session_id += 1;
        self.session_id = self.next_session_id;
        self.iteration = 0;
        self.score = 0;
        self.paused = false;
        self.next_fruits = FruitSequence::default();
        self.attempts = config.attempts;
        self.time_remaining_ms = config.timer_ms;
        self.generator = Some(FruitsGenerator::new(
            mode,
            self.interval,
            GameRng::new(self.seed.wrapping_add(self.session_id)),
        ));
        self.config = Some(config);
        log::info!("{} session {} started", mode.as_str(), self.session_id);
    }

    /// Produce the next batch at the current iteration
    pub fn generate_new_fruits(&mut self) {
        self.generate_new_fruits_at(self.iteration);
    }

    /// Produce the next batch at an explicit iteration. The argument is
    /// advisory: the stored counter advances either way.
    pub fn generate_new_fruits_at(&mut self, iteration: u32) {
        if self.paused {
            return;
        }
        let Some(generator) = self.generator.as_mut() else {
            return;
        };
        self.next_fruits = generator.generate_fruits_sequence(iteration);
        self.iteration += 1;
    }

    /// Score a cutting burst. A bomb in the burst voids it and exhausts
    /// the attempt budget (immediate loss in Classic; Dzen has no budget
    /// to exhaust). Bursts at the combo threshold score double.
    pub fn update_score(&mut self, cut: &[FruitKind]) {
        if cut.iter().any(|kind| kind.is_bomb()) {
            if self.attempts.is_some() {
                self.attempts = Some(0);
                log::info!("bomb cut, attempts exhausted");
            }
            return;
        }

        let amount = cut.len() as u32;
        if amount == 0 {
            return;
        }
        self.score += if cut.len() >= MIN_CUT_COMBO {
            amount * 2
        } else {
            amount
        };

        if let Some(config) = self.config {
            if self.score > self.best.get(config.mode) {
                self.best = BestScoreRecord::record_improvement(
                    self.storage.as_mut(),
                    config.mode,
                    self.score,
                );
            }
        }
    }

    /// A fruit fell past the boundary. Letting a bomb fall is the correct
    /// play and never costs an attempt.
    pub fn decrement_attempts(&mut self, missed: FruitKind) {
        if missed.is_bomb() {
            return;
        }
        if let Some(attempts) = self.attempts {
            if attempts > 0 {
                self.attempts = Some(attempts - 1);
                log::debug!("fruit missed, {} attempts left", attempts - 1);
            }
        }
    }

    /// One countdown tick: burn a second of the time budget, floor zero.
    /// No-op outside timer modes.
    pub fn update_game_time(&mut self) {
        if let Some(remaining) = self.time_remaining_ms {
            self.time_remaining_ms = Some(remaining.saturating_sub(COUNTDOWN_TICK_MS));
        }
    }

    /// Toggle the pause flag; score and iteration are untouched
    pub fn pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Fresh session in the same mode (new session id). No-op without a mode.
    pub fn replay(&mut self) {
        if let Some(config) = self.config {
            self.select_mode(config.mode);
        }
    }

    /// Back to the start menu: every observable field returns to its
    /// initial state and the session id resets to the 0 sentinel.
    pub fn exit_from_current_mode(&mut self) {
        self.session_id = 0;
        self.config = None;
        self.generator = None;
        self.iteration = 0;
        self.score = 0;
        self.attempts = None;
        self.time_remaining_ms = None;
        self.paused = false;
        self.next_fruits = FruitSequence::default();
        log::info!("exited to menu");
    }

    /// Activity predicate, recomputed on every call: Classic plays while
    /// attempts remain, Dzen while time remains.
    pub fn is_active_game(&self) -> bool {
        match self.config.map(|c| c.mode) {
            Some(GameMode::Classic) => self.attempts.is_some_and(|a| a > 0),
            Some(GameMode::Dzen) => self.time_remaining_ms.is_some_and(|t| t > 0),
            None => false,
        }
    }

    /// Best persisted score for the active mode, 0 when unset or no mode
    pub fn best_score_for_current_mode(&self) -> u32 {
        self.config.map(|c| self.best.get(c.mode)).unwrap_or(0)
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn mode_config(&self) -> Option<ModeConfig> {
        self.config
    }

    pub fn mode(&self) -> Option<GameMode> {
        self.config.map(|c| c.mode)
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn attempts(&self) -> Option<u32> {
        self.attempts
    }

    pub fn time_remaining_ms(&self) -> Option<u64> {
        self.time_remaining_ms
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn next_fruits(&self) -> &FruitSequence {
        &self.next_fruits
    }

    pub fn best_scores(&self) -> BestScoreRecord {
        self.best
    }
}

//! Procedural fruit-sequence generation
//!
//! One batch per spawn tick. The iteration counter (not wall-clock time)
//! drives the difficulty curve, so a seeded entropy stream replays a whole
//! run. The two mode algorithms share the spawn primitives and differ only
//! in sequencing, dispatched on the mode tag.

use glam::Vec2;

use crate::config::GameMode;
use crate::consts::{CLASSIC_FRUIT_DELAY_MS, DZEN_DENSE_LIMIT, DZEN_FRUIT_DELAY_MS};
use crate::error::GameError;
use crate::fruit::{FruitKind, FruitSequence, FruitSpawn, FruitSpeed};
use crate::rng::Entropy;

/// The one Classic iteration that launches only bombs
const BOMBS_ONLY_ITERATION: u32 = 5;
/// Every such iteration in Classic is a five-fruit wave with no delay
const WAVE_MULTIPLE: u32 = 5;
/// Fruit count on a wave iteration
const WAVE_FRUIT_COUNT: u32 = 5;
/// Bombs join Classic batches after this iteration
const BOMB_RAMP_ITERATION: u32 = 8;
/// Random Classic batches cap out at this many fruits
const CLASSIC_MAX_FRUITS: u32 = 10;
/// Dzen batch size bounds
const DZEN_MIN_FRUITS: u32 = 5;
const DZEN_MAX_FRUITS: u32 = 12;

/// Validated horizontal spawn half-width
///
/// Construction is the only fallible step of generator setup; a
/// non-positive half-width would collapse the spawn band to nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnInterval(f32);

impl SpawnInterval {
    pub fn new(half_width: f32) -> Result<Self, GameError> {
        if half_width.is_finite() && half_width > 0.0 {
            Ok(Self(half_width))
        } else {
            Err(GameError::InvalidSpawnInterval(half_width))
        }
    }

    pub fn half_width(self) -> f32 {
        self.0
    }
}

/// Per-mode fruit sequence generator
#[derive(Debug, Clone)]
pub struct FruitsGenerator<E> {
    mode: GameMode,
    interval: SpawnInterval,
    rng: E,
    next_id: u64,
}

impl<E: Entropy> FruitsGenerator<E> {
    pub fn new(mode: GameMode, interval: SpawnInterval, rng: E) -> Self {
        Self {
            mode,
            interval,
            rng,
            next_id: 1,
        }
    }

    /// Produce the batch for one spawn tick
    pub fn generate_fruits_sequence(&mut self, iteration: u32) -> FruitSequence {
        let sequence = match self.mode {
            GameMode::Classic => self.classic_sequence(iteration),
            GameMode::Dzen => self.dzen_sequence(),
        };
        log::debug!(
            "iteration {iteration}: {} fruits ({} bombs), {}ms between launches",
            sequence.fruits.len(),
            sequence.bomb_count(),
            sequence.delay_between_fruits_ms
        );
        sequence
    }

    /// Classic ramps batch size, bomb pressure and speed with the iteration
    fn classic_sequence(&mut self, iteration: u32) -> FruitSequence {
        let mut fruits = if iteration == BOMBS_ONLY_ITERATION {
            let amount = self.roll(1, 2);
            self.generate_fruits(amount, true)
        } else {
            let fruit_amount = if iteration <= 1 {
                1
            } else if iteration % WAVE_MULTIPLE == 0 {
                WAVE_FRUIT_COUNT
            } else {
                self.roll(2, iteration.min(CLASSIC_MAX_FRUITS))
            };
            let bomb_amount = if iteration > BOMB_RAMP_ITERATION {
                self.roll(1, 5)
            } else {
                0
            };

            // Shuffle so bombs are not telegraphed by batch position
            let mut batch = self.generate_fruits(fruit_amount, false);
            batch.extend(self.generate_fruits(bomb_amount, true));
            self.rng.shuffle_batch(&mut batch);
            batch
        };

        attach_speed(&mut fruits, classic_speed(iteration));
        FruitSequence {
            fruits,
            delay_between_fruits_ms: if iteration % WAVE_MULTIPLE == 0 {
                0
            } else {
                CLASSIC_FRUIT_DELAY_MS
            },
        }
    }

    /// Dzen is a flat dense stream: more fruit, no bombs, one speed
    fn dzen_sequence(&mut self) -> FruitSequence {
        let amount = self.roll(DZEN_MIN_FRUITS, DZEN_MAX_FRUITS);
        let mut fruits = self.generate_fruits(amount, false);
        attach_speed(&mut fruits, FruitSpeed::Average);
        FruitSequence {
            fruits,
            delay_between_fruits_ms: if amount < DZEN_DENSE_LIMIT {
                0
            } else {
                DZEN_FRUIT_DELAY_MS
            },
        }
    }

    fn generate_fruits(&mut self, count: u32, is_bomb: bool) -> Vec<FruitSpawn> {
        let kind = is_bomb.then_some(FruitKind::Bomb);
        (0..count).map(|_| self.generate_fruit(kind)).collect()
    }

    /// Assemble one descriptor; speed is stamped later, per batch
    fn generate_fruit(&mut self, kind: Option<FruitKind>) -> FruitSpawn {
        let half_width = self.interval.half_width();
        let start_position_x = self.rng.uniform(-half_width, half_width);
        let end_position_x = self.generate_end_position_x(start_position_x);
        let fly_height = self.rng.uniform(half_width - 0.5, half_width);
        let kind = match kind {
            Some(kind) => kind,
            None => self.generate_fruit_kind(),
        };
        FruitSpawn {
            id: self.next_spawn_id(),
            kind,
            start_position_x,
            fly_direction: Vec2::new(end_position_x, fly_height),
            speed: FruitSpeed::default(),
        }
    }

    /// End x biases toward crossing the side opposite the start
    fn generate_end_position_x(&mut self, start_position_x: f32) -> f32 {
        let limit = if start_position_x <= 0.0 { 1.0 } else { -1.0 };
        self.rng.uniform(0.0, limit)
    }

    fn generate_fruit_kind(&mut self) -> FruitKind {
        let last = (FruitKind::GENERATABLE.len() - 1) as f32;
        let index = self.rng.uniform_inclusive_int(0.0, last);
        FruitKind::GENERATABLE[index as usize]
    }

    fn roll(&mut self, min: u32, max: u32) -> u32 {
        self.rng.uniform_inclusive_int(min as f32, max as f32).max(0) as u32
    }

    fn next_spawn_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Stamp one speed tier onto a whole batch
fn attach_speed(fruits: &mut [FruitSpawn], speed: FruitSpeed) {
    for fruit in fruits {
        fruit.speed = speed;
    }
}

/// Classic speed ramp: Low, then Average, then Fast
fn classic_speed(iteration: u32) -> FruitSpeed {
    if iteration < 10 {
        FruitSpeed::Low
    } else if iteration < 25 {
        FruitSpeed::Average
    } else {
        FruitSpeed::Fast
    }
}

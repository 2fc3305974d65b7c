//! Fruit data model
//!
//! Spawn descriptors are created by the generator, consumed by the render
//! layer, and immutable after creation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Everything the generator can put in the air
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FruitKind {
    Apple,
    Banana,
    Lemon,
    Pear,
    /// Hazard, never a scoring fruit
    Bomb,
}

impl FruitKind {
    /// The real fruits, in generator draw order (bomb excluded)
    pub const GENERATABLE: [FruitKind; 4] = [
        FruitKind::Apple,
        FruitKind::Banana,
        FruitKind::Lemon,
        FruitKind::Pear,
    ];

    pub fn is_bomb(self) -> bool {
        self == FruitKind::Bomb
    }
}

/// Speed tier stamped on a whole batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FruitSpeed {
    Low,
    #[default]
    Average,
    Fast,
}

impl FruitSpeed {
    /// Velocity scale consumed by the render layer's impulse math
    pub fn value(self) -> f32 {
        match self {
            FruitSpeed::Low => 2.8,
            FruitSpeed::Average => 3.0,
            FruitSpeed::Fast => 3.4,
        }
    }
}

/// One fruit to launch: where it starts, where it flies, how fast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FruitSpawn {
    /// Unique within a generator's lifetime
    pub id: u64,
    pub kind: FruitKind,
    pub start_position_x: f32,
    /// Impulse direction; x biases toward the side opposite the start
    pub fly_direction: Vec2,
    pub speed: FruitSpeed,
}

/// One spawn tick's worth of fruit plus the pause between launches
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FruitSequence {
    pub fruits: Vec<FruitSpawn>,
    pub delay_between_fruits_ms: u64,
}

impl FruitSequence {
    pub fn is_empty(&self) -> bool {
        self.fruits.is_empty()
    }

    /// How many descriptors in the batch are bombs
    pub fn bomb_count(&self) -> usize {
        self.fruits.iter().filter(|f| f.kind.is_bomb()).count()
    }
}

/// A fruit intersection reported by the render layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutFruit {
    pub kind: FruitKind,
    /// Screen point of the intersection (anchors the combo callout)
    pub point: Vec2,
}

/// A cutting burst of at least the combo threshold, detected by the cut buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComboEvent {
    pub id: u64,
    /// Fruits cut in the burst
    pub amount: usize,
    /// Where the callout appears (last cut of the burst)
    pub point: Vec2,
}

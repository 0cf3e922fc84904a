//! Simulation state and core types
//!
//! A [`SimState`] is a single value owned by the loop driver. Each tick
//! consumes it and hands back its successor.

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Title screen, nothing moves
    #[default]
    Idle,
    /// Pre-game countdown, driven by a wall-clock timer
    Countdown,
    /// Active gameplay
    Playing,
    /// Run ended, state frozen
    GameOver,
}

/// The player's bird
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bird {
    /// Top edge of the sprite (screen space, y grows downward)
    pub y: f32,
    /// Vertical speed per tick (negative is up)
    pub velocity: f32,
}

impl Bird {
    pub fn new(y: f32) -> Self {
        Self { y, velocity: 0.0 }
    }
}

/// A pair of pipes with a vertical opening between them
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Left edge
    pub x: f32,
    /// Bottom of the upper pipe
    pub gap_top: f32,
    /// Top of the lower pipe
    pub gap_bottom: f32,
}

impl Obstacle {
    pub fn new(x: f32, gap_top: f32, gap_size: f32) -> Self {
        Self {
            x,
            gap_top,
            gap_bottom: gap_top + gap_size,
        }
    }

    #[inline]
    pub fn gap_height(&self) -> f32 {
        self.gap_bottom - self.gap_top
    }

    #[inline]
    pub fn gap_center(&self) -> f32 {
        (self.gap_top + self.gap_bottom) / 2.0
    }
}

/// A bonus coin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub x: f32,
    pub y: f32,
    pub collected: bool,
}

impl Collectible {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            collected: false,
        }
    }
}

/// What ended the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionCause {
    Ceiling,
    Floor,
    Obstacle,
}

/// Semantic notifications for the render/audio layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEvent {
    /// Countdown shows a new number (3, 2, 1)
    CountdownTick { remaining: u32 },
    /// Countdown finished, bird is live
    GameStarted,
    /// A jump impulse was accepted
    Jumped,
    /// Points from passing an obstacle
    Scored { points: u64, total: u64 },
    /// A collectible was picked up
    Collected { bonus: u64, total: u64 },
    /// Bird touched something
    Collided { cause: CollisionCause },
    /// Run is over
    GameOverReached {
        score: u64,
        high_score: u64,
        new_record: bool,
    },
}

/// Complete simulation state (serializable for debugging/replay)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimState {
    pub phase: Phase,
    /// Countdown seconds left before Playing
    pub countdown_ticks: u32,
    pub bird: Bird,
    /// Sorted by x ascending (append-only at the tail)
    pub obstacles: Vec<Obstacle>,
    pub collectibles: Vec<Collectible>,
    pub score: u64,
    /// Best completed run score this session
    pub high_score: u64,
    /// Scroll speed factor, derived from score
    pub speed_multiplier: f32,
    /// Simulation tick counter for the current run
    pub time_ticks: u64,
}

impl SimState {
    /// Fresh idle state
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            phase: Phase::Idle,
            countdown_ticks: tuning.countdown_seconds,
            bird: Bird::new(tuning.bird_start_y),
            obstacles: Vec::new(),
            collectibles: Vec::new(),
            score: 0,
            high_score: 0,
            speed_multiplier: 1.0,
            time_ticks: 0,
        }
    }

    /// Fresh idle state that remembers a previous high score
    pub fn with_high_score(tuning: &Tuning, high_score: u64) -> Self {
        Self {
            high_score,
            ..Self::new(tuning)
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Playing
    }
}

impl Default for SimState {
    fn default() -> Self {
        Self::new(&Tuning::default())
    }
}

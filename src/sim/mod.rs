//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Tick-based integration only
//! - Randomness only through the caller's `Rng`
//! - Obstacles kept in spawn (x-ascending) order
//! - No rendering, audio or platform dependencies

pub mod collectibles;
pub mod collision;
pub mod obstacles;
pub mod physics;
pub mod state;
pub mod tick;

pub use collectibles::advance_collectibles;
pub use collision::{Evaluation, Rect, evaluate};
pub use obstacles::advance_obstacles;
pub use physics::integrate;
pub use state::{Bird, Collectible, CollisionCause, Obstacle, Phase, SimEvent, SimState};
pub use tick::{
    TickInput, TickOutcome, advance, countdown_step, reset_game, speed_multiplier, start_game,
};

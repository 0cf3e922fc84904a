//! Bird physics
//!
//! Tick-based integration: gravity is a fixed per-tick acceleration, so the
//! caller decides how many ticks a frame is worth.

use super::state::Bird;
use crate::tuning::Tuning;

/// Advance the bird one tick.
///
/// A jump replaces the velocity with `jump_force` for this tick instead of
/// adding gravity to it.
pub fn integrate(bird: Bird, jump: bool, tuning: &Tuning) -> Bird {
    let velocity = if jump {
        tuning.jump_force
    } else {
        bird.velocity + tuning.gravity
    };
    Bird {
        y: bird.y + velocity,
        velocity,
    }
}

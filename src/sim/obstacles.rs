//! Obstacle generation and scrolling
//!
//! Obstacles are appended at the tail and retired from the head, so the
//! sequence stays sorted by `x` without ever being re-sorted.

use rand::Rng;

use super::state::Obstacle;
use crate::tuning::Tuning;

/// Hand-placed opening obstacles `(x, gap_top)` for a new run
const SEED_OBSTACLES: [(f32, f32); 3] = [(1200.0, 200.0), (1400.0, 150.0), (1600.0, 250.0)];

/// Initial obstacles for a run, all off-screen to the right
pub fn seed_obstacles(tuning: &Tuning) -> Vec<Obstacle> {
    SEED_OBSTACLES
        .iter()
        .map(|&(x, gap_top)| Obstacle::new(x, gap_top, tuning.gap_size))
        .collect()
}

/// Draw a gap top uniformly from the configured range.
///
/// An empty, inverted or unbounded range yields `gap_top_min` (or 0 if that
/// is not finite either) instead of sampling.
pub fn random_gap_top<R: Rng>(rng: &mut R, tuning: &Tuning) -> f32 {
    let (min, max) = (tuning.gap_top_min, tuning.gap_top_max);
    if max > min && (max - min).is_finite() {
        rng.random_range(min..max)
    } else if min.is_finite() {
        min
    } else {
        0.0
    }
}

/// Scroll, retire and (at most once per tick) spawn obstacles
pub fn advance_obstacles<R: Rng>(
    obstacles: &[Obstacle],
    speed_multiplier: f32,
    rng: &mut R,
    tuning: &Tuning,
) -> Vec<Obstacle> {
    let step = tuning.base_speed * speed_multiplier;
    let mut next: Vec<Obstacle> = obstacles
        .iter()
        .map(|o| Obstacle { x: o.x - step, ..*o })
        .filter(|o| o.x > -tuning.obstacle_width)
        .collect();

    let spawn_from = match next.last() {
        None => Some(tuning.empty_spawn_origin_x),
        Some(last) if last.x < tuning.spawn_trigger_x => Some(last.x),
        Some(_) => None,
    };

    if let Some(last_x) = spawn_from {
        let gap_top = random_gap_top(rng, tuning);
        let obstacle = Obstacle::new(last_x + tuning.spawn_spacing, gap_top, tuning.gap_size);
        log::debug!("Spawned obstacle at x={:.1} gap_top={:.1}", obstacle.x, gap_top);
        next.push(obstacle);
    }

    next
}

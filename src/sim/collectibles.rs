//! Collectible (coin) generation and scrolling
//!
//! Coins are placed in an obstacle's gap when they spawn. The link to that
//! obstacle is not tracked afterwards; both simply scroll at the same speed.

use rand::Rng;

use super::state::{Collectible, Obstacle};
use crate::tuning::Tuning;

/// Coin centered in an obstacle's gap (no jitter)
pub fn coin_for_gap(obstacle: &Obstacle, tuning: &Tuning) -> Collectible {
    Collectible::new(obstacle.x + tuning.coin_x_offset, obstacle.gap_center())
}

/// Coins for the opening obstacles, each present with the spawn probability
pub fn seed_collectibles<R: Rng>(
    obstacles: &[Obstacle],
    rng: &mut R,
    tuning: &Tuning,
) -> Vec<Collectible> {
    let chance = tuning.coin_chance();
    obstacles
        .iter()
        .filter(|_| rng.random_bool(chance))
        .map(|o| coin_for_gap(o, tuning))
        .collect()
}

/// Scroll and retire coins, then maybe spawn one in an upcoming gap.
///
/// Coins collected on a previous tick are dropped here, so a pickup stays
/// visible (with `collected = true`) for exactly one tick.
pub fn advance_collectibles<R: Rng>(
    collectibles: &[Collectible],
    obstacles: &[Obstacle],
    speed_multiplier: f32,
    rng: &mut R,
    tuning: &Tuning,
) -> Vec<Collectible> {
    let step = tuning.base_speed * speed_multiplier;
    let mut next: Vec<Collectible> = collectibles
        .iter()
        .filter(|c| !c.collected && c.x > tuning.coin_offscreen_x)
        .map(|c| Collectible { x: c.x - step, ..*c })
        .collect();

    let last_x = match next.last() {
        None => tuning.empty_spawn_origin_x,
        Some(last) if last.x < tuning.spawn_trigger_x => last.x,
        Some(_) => return next,
    };

    if !rng.random_bool(tuning.coin_chance()) {
        return next;
    }

    // First obstacle far enough past the previous coin
    let Some(target) = obstacles
        .iter()
        .find(|o| o.x > last_x + tuning.coin_lookahead)
    else {
        return next;
    };

    let half = tuning.coin_jitter / 2.0;
    let jitter = if half > 0.0 && half.is_finite() {
        rng.random_range(-half..half)
    } else {
        0.0
    };
    let y = clamp_to_band(target.gap_center() + jitter, tuning);
    log::debug!("Spawned coin at x={:.1} y={:.1}", target.x + tuning.coin_x_offset, y);
    next.push(Collectible::new(target.x + tuning.coin_x_offset, y));

    next
}

/// Clamp into the safe band, whichever way round its ends are given
fn clamp_to_band(y: f32, tuning: &Tuning) -> f32 {
    let lo = tuning.coin_safe_min_y.min(tuning.coin_safe_max_y);
    let hi = tuning.coin_safe_min_y.max(tuning.coin_safe_max_y);
    y.max(lo).min(hi)
}

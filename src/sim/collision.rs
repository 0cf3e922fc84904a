//! Collision detection and scoring
//!
//! Everything here is axis-aligned: the bird, both pipe segments and the
//! coins are rectangles in screen space (y grows downward).

use glam::Vec2;

use super::state::{Bird, Collectible, CollisionCause, Obstacle};
use crate::tuning::{ScoringMode, Tuning};

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Top-left corner
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Strict overlap (touching edges do not count)
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.overlaps_x(other.min.x, other.max().x)
            && self.min.y < other.max().y
            && self.max().y > other.min.y
    }

    #[inline]
    pub fn overlaps_x(&self, left: f32, right: f32) -> bool {
        self.min.x < right && self.max().x > left
    }
}

/// The bird's hitbox, optionally inset from the sprite bounds
pub fn bird_rect(bird: &Bird, tuning: &Tuning) -> Rect {
    let inset = if tuning.policy.inset_hitbox {
        tuning.hitbox_inset
    } else {
        0.0
    };
    let side = (tuning.bird_size - 2.0 * inset).max(0.0);
    Rect::new(tuning.bird_x + inset, bird.y + inset, side, side)
}

/// Result of testing one tick's positions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    /// First thing the bird hit, if any
    pub collision: Option<CollisionCause>,
    /// Indices of uncollected coins the bird now overlaps
    pub coin_hits: Vec<usize>,
    /// Obstacles whose trailing edge crossed the bird this tick
    pub passed: u32,
    pub score_delta: u64,
}

impl Evaluation {
    pub fn collided(&self) -> bool {
        self.collision.is_some()
    }
}

/// Ceiling/floor test on the nominal sprite position
pub fn bounds_collision(bird: &Bird, tuning: &Tuning) -> Option<CollisionCause> {
    if bird.y <= 0.0 {
        Some(CollisionCause::Ceiling)
    } else if bird.y >= tuning.floor_y() {
        Some(CollisionCause::Floor)
    } else {
        None
    }
}

/// Does the hitbox touch either pipe of an obstacle?
pub fn hits_obstacle(rect: &Rect, obstacle: &Obstacle, tuning: &Tuning) -> bool {
    // Cheap band test before the rectangle test
    if obstacle.x > tuning.collision_band_max_x || obstacle.x < tuning.collision_band_min_x {
        return false;
    }
    if !rect.overlaps_x(obstacle.x, obstacle.x + tuning.obstacle_width) {
        return false;
    }
    rect.min.y < obstacle.gap_top || rect.max().y > obstacle.gap_bottom
}

/// Did this obstacle's trailing edge move past the bird during the last scroll step?
pub fn crossed_bird(obstacle: &Obstacle, scroll_step: f32, tuning: &Tuning) -> bool {
    let trailing = obstacle.x + tuning.obstacle_width;
    trailing < tuning.bird_x && trailing + scroll_step >= tuning.bird_x
}

/// Test the bird against the world for one tick.
///
/// `obstacles` are post-scroll positions and `scroll_step` is how far they
/// moved this tick. Pure: same inputs, same result.
pub fn evaluate(
    bird: &Bird,
    obstacles: &[Obstacle],
    collectibles: &[Collectible],
    scroll_step: f32,
    tuning: &Tuning,
) -> Evaluation {
    if let Some(cause) = bounds_collision(bird, tuning) {
        return Evaluation {
            collision: Some(cause),
            ..Default::default()
        };
    }

    let rect = bird_rect(bird, tuning);
    if obstacles.iter().any(|o| hits_obstacle(&rect, o, tuning)) {
        return Evaluation {
            collision: Some(CollisionCause::Obstacle),
            ..Default::default()
        };
    }

    let mut eval = Evaluation::default();
    match tuning.policy.scoring_mode {
        ScoringMode::PassBased => {
            eval.passed = obstacles
                .iter()
                .filter(|o| crossed_bird(o, scroll_step, tuning))
                .count() as u32;
            eval.score_delta = eval.passed as u64 * tuning.pass_points;
        }
        ScoringMode::CollectibleBased => {
            let coin = Vec2::splat(tuning.coin_size);
            eval.coin_hits = collectibles
                .iter()
                .enumerate()
                .filter(|(_, c)| !c.collected)
                .filter(|(_, c)| rect.overlaps(&Rect { min: Vec2::new(c.x, c.y), size: coin }))
                .map(|(i, _)| i)
                .collect();
            eval.score_delta = eval.coin_hits.len() as u64 * tuning.coin_bonus;
        }
    }
    eval
}

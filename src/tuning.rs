//! Data-driven game balance
//!
//! Every number the simulation uses comes through [`Tuning`]. The defaults
//! are the values in [`crate::consts`]; a JSON document can override any
//! subset of them.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// How the run earns points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// +1 for every obstacle whose trailing edge crosses the bird. No collectibles.
    PassBased,
    /// Only collectibles score. Obstacles are pure hazards.
    #[default]
    CollectibleBased,
}

impl ScoringMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringMode::PassBased => "pass",
            ScoringMode::CollectibleBased => "collectible",
        }
    }
}

/// Errors from loading a tuning document
#[derive(Debug)]
pub enum TuningError {
    /// Not valid JSON, or a field has the wrong type
    Parse(serde_json::Error),
    /// Parsed, but a value is out of its domain
    Invalid(String),
}

impl std::fmt::Display for TuningError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TuningError::Parse(e) => write!(f, "unreadable tuning: {}", e),
            TuningError::Invalid(reason) => write!(f, "invalid tuning: {}", reason),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TuningError::Parse(e) => Some(e),
            TuningError::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(e: serde_json::Error) -> Self {
        TuningError::Parse(e)
    }
}

/// Collision and scoring policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionPolicy {
    /// Shrink the bird hitbox by [`HITBOX_INSET`] on every side
    pub inset_hitbox: bool,
    pub scoring_mode: ScoringMode,
}

impl Default for CollisionPolicy {
    fn default() -> Self {
        Self {
            inset_hitbox: true,
            scoring_mode: ScoringMode::CollectibleBased,
        }
    }
}

impl CollisionPolicy {
    /// The simpler variant: full-size hitbox, pass-based scoring
    pub fn classic() -> Self {
        Self {
            inset_hitbox: false,
            scoring_mode: ScoringMode::PassBased,
        }
    }

    pub fn collectibles_enabled(&self) -> bool {
        self.scoring_mode == ScoringMode::CollectibleBased
    }
}

/// Complete set of tunable simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub play_height: f32,

    // === Bird ===
    pub bird_x: f32,
    pub bird_size: f32,
    pub bird_start_y: f32,
    pub hitbox_inset: f32,
    pub gravity: f32,
    pub jump_force: f32,

    // === Obstacles ===
    pub obstacle_width: f32,
    pub gap_size: f32,
    pub base_speed: f32,
    pub spawn_trigger_x: f32,
    pub spawn_spacing: f32,
    pub empty_spawn_origin_x: f32,
    pub gap_top_min: f32,
    pub gap_top_max: f32,
    pub collision_band_min_x: f32,
    pub collision_band_max_x: f32,

    // === Collectibles ===
    pub coin_size: f32,
    pub coin_bonus: u64,
    pub coin_offscreen_x: f32,
    pub coin_spawn_chance: f64,
    pub coin_lookahead: f32,
    pub coin_jitter: f32,
    pub coin_safe_min_y: f32,
    pub coin_safe_max_y: f32,
    pub coin_x_offset: f32,

    // === Scoring / difficulty ===
    pub pass_points: u64,
    pub speed_ramp_score: f32,
    pub max_speed_multiplier: f32,
    pub countdown_seconds: u32,

    pub policy: CollisionPolicy,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            play_height: PLAY_HEIGHT,

            bird_x: BIRD_X,
            bird_size: BIRD_SIZE,
            bird_start_y: BIRD_START_Y,
            hitbox_inset: HITBOX_INSET,
            gravity: GRAVITY,
            jump_force: JUMP_FORCE,

            obstacle_width: OBSTACLE_WIDTH,
            gap_size: GAP_SIZE,
            base_speed: BASE_SPEED,
            spawn_trigger_x: SPAWN_TRIGGER_X,
            spawn_spacing: SPAWN_SPACING,
            empty_spawn_origin_x: EMPTY_SPAWN_ORIGIN_X,
            gap_top_min: GAP_TOP_MIN,
            gap_top_max: GAP_TOP_MAX,
            collision_band_min_x: COLLISION_BAND_MIN_X,
            collision_band_max_x: COLLISION_BAND_MAX_X,

            coin_size: COIN_SIZE,
            coin_bonus: COIN_BONUS,
            coin_offscreen_x: COIN_OFFSCREEN_X,
            coin_spawn_chance: COIN_SPAWN_CHANCE,
            coin_lookahead: COIN_LOOKAHEAD,
            coin_jitter: COIN_JITTER,
            coin_safe_min_y: COIN_SAFE_MIN_Y,
            coin_safe_max_y: COIN_SAFE_MAX_Y,
            coin_x_offset: COIN_X_OFFSET,

            pass_points: PASS_POINTS,
            speed_ramp_score: SPEED_RAMP_SCORE,
            max_speed_multiplier: MAX_SPEED_MULTIPLIER,
            countdown_seconds: COUNTDOWN_SECONDS,

            policy: CollisionPolicy::default(),
        }
    }
}

impl Tuning {
    /// Default tuning with a different collision/scoring policy
    pub fn with_policy(policy: CollisionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Parse a (possibly partial) JSON override document.
    ///
    /// The result is validated, so a loaded tuning never sends the
    /// generators an empty or infinite range.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check every value is finite and every range is ordered
    pub fn validate(&self) -> Result<(), TuningError> {
        let fields = [
            ("play_height", self.play_height),
            ("bird_x", self.bird_x),
            ("bird_size", self.bird_size),
            ("bird_start_y", self.bird_start_y),
            ("hitbox_inset", self.hitbox_inset),
            ("gravity", self.gravity),
            ("jump_force", self.jump_force),
            ("obstacle_width", self.obstacle_width),
            ("gap_size", self.gap_size),
            ("base_speed", self.base_speed),
            ("spawn_trigger_x", self.spawn_trigger_x),
            ("spawn_spacing", self.spawn_spacing),
            ("empty_spawn_origin_x", self.empty_spawn_origin_x),
            ("gap_top_min", self.gap_top_min),
            ("gap_top_max", self.gap_top_max),
            ("collision_band_min_x", self.collision_band_min_x),
            ("collision_band_max_x", self.collision_band_max_x),
            ("coin_size", self.coin_size),
            ("coin_offscreen_x", self.coin_offscreen_x),
            ("coin_lookahead", self.coin_lookahead),
            ("coin_jitter", self.coin_jitter),
            ("coin_safe_min_y", self.coin_safe_min_y),
            ("coin_safe_max_y", self.coin_safe_max_y),
            ("coin_x_offset", self.coin_x_offset),
            ("speed_ramp_score", self.speed_ramp_score),
            ("max_speed_multiplier", self.max_speed_multiplier),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(TuningError::Invalid(format!("{} is {}", name, value)));
        }
        if !self.coin_spawn_chance.is_finite() {
            return Err(TuningError::Invalid(format!(
                "coin_spawn_chance is {}",
                self.coin_spawn_chance
            )));
        }

        let ranges = [
            ("gap_top", self.gap_top_min, self.gap_top_max),
            ("coin_safe_y", self.coin_safe_min_y, self.coin_safe_max_y),
            ("collision_band_x", self.collision_band_min_x, self.collision_band_max_x),
        ];
        if let Some((name, min, max)) = ranges.iter().find(|(_, min, max)| min > max) {
            return Err(TuningError::Invalid(format!(
                "{} range is inverted ({} > {})",
                name, min, max
            )));
        }
        // Uniform sampling needs a finite width, not just finite ends
        if !(self.gap_top_max - self.gap_top_min).is_finite() {
            return Err(TuningError::Invalid("gap_top range is too wide".into()));
        }

        let non_negative = [
            ("gap_size", self.gap_size),
            ("coin_jitter", self.coin_jitter),
            ("bird_size", self.bird_size),
            ("obstacle_width", self.obstacle_width),
            ("coin_size", self.coin_size),
        ];
        if let Some((name, value)) = non_negative.iter().find(|(_, v)| *v < 0.0) {
            return Err(TuningError::Invalid(format!("{} is negative ({})", name, value)));
        }
        Ok(())
    }

    /// Coin spawn probability, clamped so it is always a valid Bernoulli parameter
    pub fn coin_chance(&self) -> f64 {
        if self.coin_spawn_chance.is_nan() {
            0.0
        } else {
            self.coin_spawn_chance.clamp(0.0, 1.0)
        }
    }

    /// Lowest y a bird may reach before touching the floor
    pub fn floor_y(&self) -> f32 {
        self.play_height - self.bird_size
    }
}

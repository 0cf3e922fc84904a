//! Flappy Arcade - a side-scrolling flap-through-the-gaps arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, obstacles, collectibles, collisions)
//! - `session`: Loop driver owning the state between ticks
//! - `tuning`: Data-driven game balance
//! - `submission`: Score submission / leaderboard boundary
//! - `highscores`: Local leaderboard
//! - `settings`: Player preferences
//! - `audio`: Advisory sound cues derived from simulation events
//! - `platform`: Browser/native differences (clock, seeding)

pub mod audio;
pub mod highscores;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod submission;
pub mod tuning;

pub use highscores::Leaderboard;
pub use session::Session;
pub use settings::Settings;
pub use tuning::{CollisionPolicy, ScoringMode, Tuning, TuningError};

/// Game configuration constants
///
/// Speeds and accelerations are per tick, calibrated for a ~60 Hz display.
pub mod consts {
    /// Nominal simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Longest frame the session will account for (tab switches, debugger pauses)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Play field
    pub const PLAY_HEIGHT: f32 = 600.0;

    /// Bird
    pub const BIRD_X: f32 = 100.0;
    pub const BIRD_SIZE: f32 = 80.0;
    pub const BIRD_START_Y: f32 = 300.0;
    /// Hitbox inset on every side (absorbs transparent sprite padding)
    pub const HITBOX_INSET: f32 = 8.0;

    /// Physics
    pub const GRAVITY: f32 = 0.06;
    pub const JUMP_FORCE: f32 = -3.2;

    /// Obstacles
    pub const OBSTACLE_WIDTH: f32 = 80.0;
    pub const GAP_SIZE: f32 = 200.0;
    pub const BASE_SPEED: f32 = 1.5;
    pub const SPAWN_TRIGGER_X: f32 = 800.0;
    pub const SPAWN_SPACING: f32 = 250.0;
    /// Where spawning resumes from when no obstacle is left on screen
    pub const EMPTY_SPAWN_ORIGIN_X: f32 = 1200.0;
    pub const GAP_TOP_MIN: f32 = 100.0;
    pub const GAP_TOP_MAX: f32 = 300.0;
    /// Only obstacles whose x lies in this band are tested against the bird
    pub const COLLISION_BAND_MIN_X: f32 = 80.0;
    pub const COLLISION_BAND_MAX_X: f32 = 200.0;

    /// Collectibles
    pub const COIN_SIZE: f32 = 30.0;
    pub const COIN_BONUS: u64 = 10;
    pub const COIN_OFFSCREEN_X: f32 = -50.0;
    pub const COIN_SPAWN_CHANCE: f64 = 0.5;
    pub const COIN_LOOKAHEAD: f32 = 200.0;
    /// Total width of the vertical jitter window (±half)
    pub const COIN_JITTER: f32 = 20.0;
    pub const COIN_SAFE_MIN_Y: f32 = 120.0;
    pub const COIN_SAFE_MAX_Y: f32 = 480.0;
    /// Horizontal offset of a coin from its obstacle's left edge
    pub const COIN_X_OFFSET: f32 = OBSTACLE_WIDTH / 2.0 - 5.0;

    /// Scoring
    pub const PASS_POINTS: u64 = 1;
    /// Score at which the speed multiplier has grown by 1.0
    pub const SPEED_RAMP_SCORE: f32 = 100.0;
    pub const MAX_SPEED_MULTIPLIER: f32 = 2.0;

    /// Pre-game countdown (whole seconds)
    pub const COUNTDOWN_SECONDS: u32 = 3;
}

//! Loop driver
//!
//! Owns the simulation state between ticks and turns variable frame times
//! into fixed ticks. Two independent clocks run here: the 60 Hz play clock
//! and the 1 Hz countdown clock. Input is latched and consumed by the next
//! play tick.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::sim::{
    Phase, SimEvent, SimState, TickInput, TickOutcome, advance, countdown_step, reset_game,
    start_game,
};
use crate::submission::SubmissionTracker;
use crate::tuning::Tuning;

/// Length of one countdown step, in seconds
const COUNTDOWN_STEP_SECS: f32 = 1.0;

/// Summary of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunResult {
    pub score: u64,
    pub high_score: u64,
    pub new_record: bool,
}

/// Game session driving the simulation
pub struct Session {
    state: SimState,
    tuning: Tuning,
    rng: Pcg32,
    seed: u64,
    /// Unsimulated play time
    accumulator: f32,
    /// Time since the last countdown step
    countdown_clock: f32,
    jump_latched: bool,
    halted: bool,
    last_result: Option<RunResult>,
    pub submission: SubmissionTracker,
}

impl Session {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self::with_high_score(tuning, seed, 0)
    }

    /// Session carrying a high score from an earlier visit
    pub fn with_high_score(tuning: Tuning, seed: u64, high_score: u64) -> Self {
        log::info!(
            "Session created (seed {:#x}, scoring {}, high score {})",
            seed,
            tuning.policy.scoring_mode.as_str(),
            high_score
        );
        Self {
            state: SimState::with_high_score(&tuning, high_score),
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            seed,
            accumulator: 0.0,
            countdown_clock: 0.0,
            jump_latched: false,
            halted: false,
            last_result: None,
            submission: SubmissionTracker::default(),
        }
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Result of the most recent finished run
    pub fn last_result(&self) -> Option<RunResult> {
        self.last_result
    }

    /// Begin a run from Idle. Ignored in any other phase.
    pub fn start(&mut self) -> Vec<SimEvent> {
        if self.halted || self.state.phase != Phase::Idle {
            return Vec::new();
        }
        self.clear_clocks();
        self.submission.reset();
        self.last_result = None;
        let state = std::mem::take(&mut self.state);
        let outcome = start_game(state, &mut self.rng, &self.tuning);
        self.apply(outcome)
    }

    /// Back to Idle (play again). Keeps the high score.
    pub fn reset(&mut self) {
        if self.halted {
            return;
        }
        let state = std::mem::take(&mut self.state);
        self.state = reset_game(state, &self.tuning);
        self.clear_clocks();
        self.submission.reset();
    }

    /// Latch a jump for the next play tick. Returns whether it was accepted.
    pub fn request_jump(&mut self) -> bool {
        if self.halted || !self.state.is_running() {
            return false;
        }
        self.jump_latched = true;
        true
    }

    /// Advance by one frame's worth of wall time (seconds).
    ///
    /// The frame time is clamped to `[0, MAX_FRAME_DT]` and at most
    /// `MAX_SUBSTEPS` ticks run per call.
    pub fn update(&mut self, frame_dt: f32) -> Vec<SimEvent> {
        if self.halted {
            return Vec::new();
        }
        let dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };

        match self.state.phase {
            Phase::Countdown => self.run_countdown(dt),
            Phase::Playing => self.run_ticks(dt),
            Phase::Idle | Phase::GameOver => Vec::new(),
        }
    }

    /// Stop for good (teardown). Nothing advances afterwards.
    pub fn halt(&mut self) {
        if !self.halted {
            log::info!("Session halted at tick {}", self.state.time_ticks);
        }
        self.halted = true;
        self.clear_clocks();
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    fn run_countdown(&mut self, dt: f32) -> Vec<SimEvent> {
        let mut events = Vec::new();
        self.countdown_clock += dt;
        while self.countdown_clock >= COUNTDOWN_STEP_SECS && self.state.phase == Phase::Countdown {
            self.countdown_clock -= COUNTDOWN_STEP_SECS;
            let state = std::mem::take(&mut self.state);
            events.extend(self.apply(countdown_step(state)));
        }
        if self.state.phase != Phase::Countdown {
            self.clear_clocks();
        }
        events
    }

    fn run_ticks(&mut self, dt: f32) -> Vec<SimEvent> {
        let mut events = Vec::new();
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = TickInput {
                jump: std::mem::take(&mut self.jump_latched),
            };
            let state = std::mem::take(&mut self.state);
            let outcome = advance(state, SIM_DT, &input, &mut self.rng, &self.tuning);
            events.extend(self.apply(outcome));
            self.accumulator -= SIM_DT;
            substeps += 1;

            if self.state.phase != Phase::Playing {
                self.clear_clocks();
                break;
            }
        }

        // Drop time we could not catch up on
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        events
    }

    fn apply(&mut self, outcome: TickOutcome) -> Vec<SimEvent> {
        self.state = outcome.state;
        for event in &outcome.events {
            if let SimEvent::GameOverReached {
                score,
                high_score,
                new_record,
            } = *event
            {
                self.last_result = Some(RunResult {
                    score,
                    high_score,
                    new_record,
                });
            }
        }
        outcome.events
    }

    fn clear_clocks(&mut self) {
        self.accumulator = 0.0;
        self.countdown_clock = 0.0;
        self.jump_latched = false;
    }
}

/// Game-over message for a final score
pub fn encouragement(score: u64) -> &'static str {
    match score {
        0..5 => "Not bad for a first try!",
        5..15 => "Well played!",
        15..30 => "Amazing! You're a pro!",
        _ => "Incredible! You're a legend!",
    }
}

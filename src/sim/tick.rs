//! Per-tick state transitions
//!
//! Every function here takes a [`SimState`] by value and returns its
//! successor together with the events the transition produced. Nothing is
//! mutated behind the caller's back, so each call is testable on its own.

use rand::Rng;

use super::collectibles::{advance_collectibles, seed_collectibles};
use super::collision::evaluate;
use super::obstacles::{advance_obstacles, seed_obstacles};
use super::physics::integrate;
use super::state::{Bird, CollisionCause, Phase, SimEvent, SimState};
use crate::tuning::Tuning;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Jump requested (any number of presses within one tick collapse to one)
    pub jump: bool,
}

impl TickInput {
    pub fn jump() -> Self {
        Self { jump: true }
    }
}

/// A successor state plus what happened on the way there
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub state: SimState,
    pub events: Vec<SimEvent>,
}

impl TickOutcome {
    fn unchanged(state: SimState) -> Self {
        Self {
            state,
            events: Vec::new(),
        }
    }
}

/// Scroll speed factor for a score, clamped to `[1, max_speed_multiplier]`
pub fn speed_multiplier(score: u64, tuning: &Tuning) -> f32 {
    let max = tuning.max_speed_multiplier.max(1.0);
    if tuning.speed_ramp_score <= 0.0 {
        return max;
    }
    (1.0 + score as f32 / tuning.speed_ramp_score).clamp(1.0, max)
}

/// Idle -> Countdown with a freshly seeded world
pub fn start_game<R: Rng>(state: SimState, rng: &mut R, tuning: &Tuning) -> TickOutcome {
    if state.phase != Phase::Idle {
        log::debug!("Ignoring start in phase {:?}", state.phase);
        return TickOutcome::unchanged(state);
    }

    let obstacles = seed_obstacles(tuning);
    let collectibles = if tuning.policy.collectibles_enabled() {
        seed_collectibles(&obstacles, rng, tuning)
    } else {
        Vec::new()
    };

    let next = SimState {
        phase: Phase::Countdown,
        countdown_ticks: tuning.countdown_seconds,
        bird: Bird::new(tuning.bird_start_y),
        obstacles,
        collectibles,
        score: 0,
        high_score: state.high_score,
        speed_multiplier: 1.0,
        time_ticks: 0,
    };
    log::info!(
        "Run starting ({} coins seeded, {}s countdown)",
        next.collectibles.len(),
        next.countdown_ticks
    );

    if next.countdown_ticks == 0 {
        return TickOutcome {
            state: SimState {
                phase: Phase::Playing,
                ..next
            },
            events: vec![SimEvent::GameStarted],
        };
    }

    let remaining = next.countdown_ticks;
    TickOutcome {
        state: next,
        events: vec![SimEvent::CountdownTick { remaining }],
    }
}

/// One second of countdown. Reaching zero starts play.
pub fn countdown_step(state: SimState) -> TickOutcome {
    if state.phase != Phase::Countdown {
        return TickOutcome::unchanged(state);
    }

    let remaining = state.countdown_ticks.saturating_sub(1);
    if remaining == 0 {
        log::info!("Countdown finished, playing");
        TickOutcome {
            state: SimState {
                phase: Phase::Playing,
                countdown_ticks: 0,
                ..state
            },
            events: vec![SimEvent::GameStarted],
        }
    } else {
        TickOutcome {
            state: SimState {
                countdown_ticks: remaining,
                ..state
            },
            events: vec![SimEvent::CountdownTick { remaining }],
        }
    }
}

/// Any phase -> Idle, keeping only the session high score
pub fn reset_game(state: SimState, tuning: &Tuning) -> SimState {
    SimState::with_high_score(tuning, state.high_score)
}

/// Advance a running game by one tick.
///
/// Outside `Playing` this is a no-op (jumps included). A non-positive or
/// non-finite `dt` is treated as a zero-length tick and also changes nothing;
/// motion constants are per tick, so any positive `dt` is one tick.
pub fn advance<R: Rng>(
    state: SimState,
    dt: f32,
    input: &TickInput,
    rng: &mut R,
    tuning: &Tuning,
) -> TickOutcome {
    if state.phase != Phase::Playing {
        return TickOutcome::unchanged(state);
    }
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
    if dt == 0.0 {
        return TickOutcome::unchanged(state);
    }

    let mut events = Vec::new();
    if input.jump {
        events.push(SimEvent::Jumped);
    }

    let bird = integrate(state.bird, input.jump, tuning);
    let scroll_step = tuning.base_speed * state.speed_multiplier;
    let obstacles = advance_obstacles(&state.obstacles, state.speed_multiplier, rng, tuning);
    let mut collectibles = if tuning.policy.collectibles_enabled() {
        advance_collectibles(
            &state.collectibles,
            &obstacles,
            state.speed_multiplier,
            rng,
            tuning,
        )
    } else {
        Vec::new()
    };

    let eval = evaluate(&bird, &obstacles, &collectibles, scroll_step, tuning);
    if let Some(cause) = eval.collision {
        return game_over(state, cause, events);
    }

    let mut score = state.score;
    for &i in &eval.coin_hits {
        collectibles[i].collected = true;
        score += tuning.coin_bonus;
        events.push(SimEvent::Collected {
            bonus: tuning.coin_bonus,
            total: score,
        });
    }
    for _ in 0..eval.passed {
        score += tuning.pass_points;
        events.push(SimEvent::Scored {
            points: tuning.pass_points,
            total: score,
        });
    }

    TickOutcome {
        state: SimState {
            bird,
            obstacles,
            collectibles,
            score,
            speed_multiplier: speed_multiplier(score, tuning),
            time_ticks: state.time_ticks + 1,
            ..state
        },
        events,
    }
}

/// Freeze the pre-collision snapshot and close the run
fn game_over(state: SimState, cause: CollisionCause, mut events: Vec<SimEvent>) -> TickOutcome {
    let high_score = state.high_score.max(state.score);
    let new_record = state.score > state.high_score;
    log::info!(
        "Game over ({:?}) score={} high={}{}",
        cause,
        state.score,
        high_score,
        if new_record { " NEW RECORD" } else { "" }
    );

    events.push(SimEvent::Collided { cause });
    events.push(SimEvent::GameOverReached {
        score: state.score,
        high_score,
        new_record,
    });

    TickOutcome {
        state: SimState {
            phase: Phase::GameOver,
            high_score,
            ..state
        },
        events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::state::{Collectible, Obstacle};
    use crate::tuning::CollisionPolicy;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    /// A run that is already past its countdown
    fn playing(tuning: &Tuning, rng: &mut Pcg32) -> SimState {
        let mut out = start_game(SimState::new(tuning), rng, tuning);
        while out.state.phase == Phase::Countdown {
            out = countdown_step(out.state);
        }
        out.state
    }

    #[test]
    fn test_idle_to_countdown_to_playing() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(12345);

        let out = start_game(SimState::new(&tuning), &mut rng, &tuning);
        assert_eq!(out.state.phase, Phase::Countdown);
        assert_eq!(out.state.obstacles.len(), 3);
        assert_eq!(out.events, vec![SimEvent::CountdownTick { remaining: 3 }]);

        let out = countdown_step(out.state);
        assert_eq!(out.events, vec![SimEvent::CountdownTick { remaining: 2 }]);
        let out = countdown_step(out.state);
        assert_eq!(out.events, vec![SimEvent::CountdownTick { remaining: 1 }]);
        let out = countdown_step(out.state);
        assert_eq!(out.state.phase, Phase::Playing);
        assert_eq!(out.events, vec![SimEvent::GameStarted]);
    }

    #[test]
    fn test_zero_countdown_starts_immediately() {
        let tuning = Tuning {
            countdown_seconds: 0,
            ..Tuning::default()
        };
        let mut rng = Pcg32::seed_from_u64(1);
        let out = start_game(SimState::new(&tuning), &mut rng, &tuning);
        assert_eq!(out.state.phase, Phase::Playing);
        assert_eq!(out.events, vec![SimEvent::GameStarted]);
    }

    #[test]
    fn test_start_only_from_idle() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let state = playing(&tuning, &mut rng);
        let out = start_game(state.clone(), &mut rng, &tuning);
        assert_eq!(out.state, state);
        assert!(out.events.is_empty());
    }

    #[test]
    fn test_classic_policy_seeds_no_coins() {
        let tuning = Tuning {
            coin_spawn_chance: 1.0,
            ..Tuning::with_policy(CollisionPolicy::classic())
        };
        let mut rng = Pcg32::seed_from_u64(1);
        let out = start_game(SimState::new(&tuning), &mut rng, &tuning);
        assert!(out.state.collectibles.is_empty());
    }

    #[test]
    fn test_jump_ignored_outside_playing() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let idle = SimState::new(&tuning);
        let out = advance(idle.clone(), SIM_DT, &TickInput::jump(), &mut rng, &tuning);
        assert_eq!(out.state, idle);
        assert!(out.events.is_empty());

        let countdown = start_game(idle, &mut rng, &tuning).state;
        let out = advance(countdown.clone(), SIM_DT, &TickInput::jump(), &mut rng, &tuning);
        assert_eq!(out.state, countdown);
        assert!(out.events.is_empty());
    }

    #[test]
    fn test_first_tick_gravity() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let state = playing(&tuning, &mut rng);
        let out = advance(state, SIM_DT, &TickInput::default(), &mut rng, &tuning);
        assert!(approx(out.state.bird.velocity, 0.06));
        assert!(approx(out.state.bird.y, 300.06));
        assert!(out.events.is_empty());
    }

    #[test]
    fn test_jump_sets_jump_force() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = playing(&tuning, &mut rng);
        state.bird.velocity = 2.7;
        let out = advance(state, SIM_DT, &TickInput::jump(), &mut rng, &tuning);
        assert_eq!(out.state.bird.velocity, -3.2);
        assert!(approx(out.state.bird.y, 296.8));
        assert_eq!(out.events, vec![SimEvent::Jumped]);
    }

    #[test]
    fn test_zero_and_negative_dt_are_noops() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let state = playing(&tuning, &mut rng);
        for dt in [0.0, -0.5, f32::NAN, f32::NEG_INFINITY] {
            let out = advance(state.clone(), dt, &TickInput::jump(), &mut rng, &tuning);
            assert_eq!(out.state, state);
            assert!(out.events.is_empty());
        }
    }

    #[test]
    fn test_floor_collision_freezes_state() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = playing(&tuning, &mut rng);
        state.score = 30;
        state.high_score = 12;
        state.bird = Bird {
            y: 519.0,
            velocity: 1.5,
        };
        let before = state.clone();

        let out = advance(state, SIM_DT, &TickInput::default(), &mut rng, &tuning);
        assert_eq!(out.state.phase, Phase::GameOver);
        assert_eq!(out.state.high_score, 30);
        assert_eq!(out.state.bird, before.bird);
        assert_eq!(out.state.obstacles, before.obstacles);
        assert_eq!(out.state.score, 30);
        assert_eq!(
            out.events,
            vec![
                SimEvent::Collided {
                    cause: CollisionCause::Floor
                },
                SimEvent::GameOverReached {
                    score: 30,
                    high_score: 30,
                    new_record: true
                },
            ]
        );
    }

    #[test]
    fn test_ceiling_collision_keeps_higher_record() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = playing(&tuning, &mut rng);
        state.score = 5;
        state.high_score = 50;
        state.bird = Bird {
            y: 2.0,
            velocity: -3.2,
        };
        let out = advance(state, SIM_DT, &TickInput::jump(), &mut rng, &tuning);
        assert_eq!(out.state.phase, Phase::GameOver);
        assert_eq!(out.state.high_score, 50);
        assert_eq!(out.events[0], SimEvent::Jumped);
        assert_eq!(
            out.events[1],
            SimEvent::Collided {
                cause: CollisionCause::Ceiling
            }
        );
        assert_eq!(
            out.events[2],
            SimEvent::GameOverReached {
                score: 5,
                high_score: 50,
                new_record: false
            }
        );
    }

    #[test]
    fn test_game_over_is_terminal() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = playing(&tuning, &mut rng);
        state.bird.y = 600.0;
        let over = advance(state, SIM_DT, &TickInput::default(), &mut rng, &tuning).state;
        let again = advance(over.clone(), SIM_DT, &TickInput::jump(), &mut rng, &tuning);
        assert_eq!(again.state, over);
        assert!(again.events.is_empty());
    }

    #[test]
    fn test_coin_collected_exactly_once() {
        let tuning = Tuning {
            coin_spawn_chance: 0.0,
            ..Tuning::default()
        };
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = playing(&tuning, &mut rng);
        // Gap 240..440 around the bird, coin at the gap center
        let obstacle = Obstacle::new(110.0, 240.0, 200.0);
        state.obstacles = vec![obstacle, Obstacle::new(1000.0, 200.0, 200.0)];
        state.collectibles = vec![Collectible::new(
            obstacle.x + tuning.coin_x_offset,
            obstacle.gap_center() - tuning.coin_size / 2.0,
        )];

        let out = advance(state, SIM_DT, &TickInput::default(), &mut rng, &tuning);
        assert_eq!(out.state.phase, Phase::Playing);
        assert!(out.state.collectibles[0].collected);
        assert_eq!(out.state.score, 10);
        assert_eq!(out.events, vec![SimEvent::Collected { bonus: 10, total: 10 }]);

        let out = advance(out.state, SIM_DT, &TickInput::default(), &mut rng, &tuning);
        assert!(out.state.collectibles.is_empty());
        assert_eq!(out.state.score, 10);
        assert!(out.events.is_empty());
    }

    #[test]
    fn test_pass_scoring_once_per_obstacle() {
        let tuning = Tuning::with_policy(CollisionPolicy::classic());
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = playing(&tuning, &mut rng);
        // Trailing edge at 103, bird at 100: crosses on the third tick
        state.obstacles = vec![Obstacle::new(23.0, 240.0, 200.0), Obstacle::new(1000.0, 200.0, 200.0)];

        let mut scored = 0;
        for _ in 0..10 {
            let out = advance(state, SIM_DT, &TickInput::default(), &mut rng, &tuning);
            scored += out
                .events
                .iter()
                .filter(|e| matches!(e, SimEvent::Scored { .. }))
                .count();
            state = out.state;
        }
        assert_eq!(scored, 1);
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_speed_multiplier_clamped() {
        let tuning = Tuning::default();
        assert_eq!(speed_multiplier(0, &tuning), 1.0);
        assert!(approx(speed_multiplier(50, &tuning), 1.5));
        assert_eq!(speed_multiplier(100, &tuning), 2.0);
        assert_eq!(speed_multiplier(10_000, &tuning), 2.0);
    }

    #[test]
    fn test_speed_recomputed_from_score() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = playing(&tuning, &mut rng);
        state.score = 250;
        let out = advance(state, SIM_DT, &TickInput::default(), &mut rng, &tuning);
        assert_eq!(out.state.speed_multiplier, 2.0);
    }

    #[test]
    fn test_falls_to_floor_without_input() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(77);
        let mut state = playing(&tuning, &mut rng);
        let mut last_velocity = state.bird.velocity;
        let mut game_over_events = Vec::new();

        for _ in 0..500 {
            let out = advance(state, SIM_DT, &TickInput::default(), &mut rng, &tuning);
            state = out.state;
            if state.phase == Phase::GameOver {
                game_over_events = out.events;
                break;
            }
            assert!(state.bird.velocity > last_velocity);
            last_velocity = state.bird.velocity;
        }

        assert_eq!(state.phase, Phase::GameOver);
        assert_eq!(
            game_over_events[0],
            SimEvent::Collided {
                cause: CollisionCause::Floor
            }
        );
    }

    #[test]
    fn test_reset_keeps_high_score() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = playing(&tuning, &mut rng);
        state.score = 40;
        state.bird.y = 600.0;
        let over = advance(state, SIM_DT, &TickInput::default(), &mut rng, &tuning).state;
        let idle = reset_game(over, &tuning);
        assert_eq!(idle.phase, Phase::Idle);
        assert_eq!(idle.high_score, 40);
        assert_eq!(idle.score, 0);
        assert!(idle.obstacles.is_empty());
    }

    #[test]
    fn test_determinism() {
        let tuning = Tuning::default();
        let mut rng1 = Pcg32::seed_from_u64(99999);
        let mut rng2 = Pcg32::seed_from_u64(99999);
        let mut s1 = playing(&tuning, &mut rng1);
        let mut s2 = playing(&tuning, &mut rng2);

        for i in 0..400 {
            let input = TickInput { jump: i % 25 == 0 };
            let o1 = advance(s1, SIM_DT, &input, &mut rng1, &tuning);
            let o2 = advance(s2, SIM_DT, &input, &mut rng2, &tuning);
            assert_eq!(o1.events, o2.events);
            s1 = o1.state;
            s2 = o2.state;
        }
        assert_eq!(s1, s2);
    }

    proptest! {
        #[test]
        fn prop_speed_multiplier_in_range(score in any::<u64>()) {
            let m = speed_multiplier(score, &Tuning::default());
            prop_assert!((1.0..=2.0).contains(&m));
        }

        #[test]
        fn prop_score_never_decreases(seed in any::<u64>(), jump_every in 10u32..40) {
            let tuning = Tuning::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut state = playing(&tuning, &mut rng);
            for i in 0..2000u32 {
                let input = TickInput { jump: i % jump_every == 0 };
                let before = state.score;
                state = advance(state, SIM_DT, &input, &mut rng, &tuning).state;
                prop_assert!(state.score >= before);
                prop_assert!(state.obstacles.windows(2).all(|w| w[0].x < w[1].x));
                if state.phase == Phase::GameOver {
                    prop_assert_eq!(state.high_score, state.score);
                    break;
                }
            }
        }
    }
}

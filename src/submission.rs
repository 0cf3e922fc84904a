//! Score submission and leaderboard boundary
//!
//! The simulation never waits on this. A submission is only possible once a
//! run is over, and its outcome never touches [`SimState`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::{Future, ready};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::highscores::{Leaderboard, LeaderboardEntry};
use crate::platform;
use crate::sim::{Phase, SimState};

/// A score the endpoint accepted
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSubmission {
    pub player: String,
    pub score: u64,
    /// Unix timestamp (ms)
    pub timestamp: f64,
    /// Endpoint-issued receipt (transaction hash for the on-chain backend)
    pub receipt: String,
}

/// Why a submission did not go through
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// No player identity connected
    NotConnected,
    /// Run still in progress (or never started)
    RunNotFinished,
    /// This run's score was already submitted
    AlreadySubmitted,
    /// Another submission is still in flight
    InFlight,
    /// Endpoint refused or failed
    Rejected(String),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::NotConnected => write!(f, "wallet not connected"),
            SubmitError::RunNotFinished => write!(f, "run is not over yet"),
            SubmitError::AlreadySubmitted => write!(f, "score already submitted for this run"),
            SubmitError::InFlight => write!(f, "a submission is already in progress"),
            SubmitError::Rejected(reason) => write!(f, "submission rejected: {}", reason),
        }
    }
}

impl std::error::Error for SubmitError {}

/// Remote score store
pub trait ScoreEndpoint {
    /// Record `score` for `player`. May take a long time.
    fn submit(
        &self,
        player: &str,
        score: u64,
    ) -> impl Future<Output = Result<ScoreSubmission, SubmitError>>;

    /// Current leaderboard, best first
    fn leaderboard(&self) -> impl Future<Output = Vec<LeaderboardEntry>>;
}

/// In-memory endpoint standing in for the on-chain contract
pub struct MockEndpoint {
    board: RefCell<Leaderboard>,
    receipts: RefCell<Pcg32>,
    /// When set, every submission is rejected with this reason
    failure: Option<String>,
    submitted: Cell<u32>,
}

impl MockEndpoint {
    /// Endpoint issuing receipts from a fresh random seed
    pub fn new(board: Leaderboard) -> Self {
        Self::with_receipt_seed(board, platform::run_seed())
    }

    /// Endpoint with a fixed receipt sequence
    pub fn with_receipt_seed(board: Leaderboard, seed: u64) -> Self {
        Self {
            board: RefCell::new(board),
            receipts: RefCell::new(Pcg32::seed_from_u64(seed)),
            failure: None,
            submitted: Cell::new(0),
        }
    }

    /// Endpoint that rejects everything
    pub fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Self::new(Leaderboard::new())
        }
    }

    /// Number of accepted submissions
    pub fn submitted(&self) -> u32 {
        self.submitted.get()
    }

    pub fn board(&self) -> Leaderboard {
        self.board.borrow().clone()
    }
}

impl Default for MockEndpoint {
    fn default() -> Self {
        Self::new(Leaderboard::sample(platform::now_ms()))
    }
}

impl ScoreEndpoint for MockEndpoint {
    fn submit(
        &self,
        player: &str,
        score: u64,
    ) -> impl Future<Output = Result<ScoreSubmission, SubmitError>> {
        let result = match &self.failure {
            Some(reason) => Err(SubmitError::Rejected(reason.clone())),
            None => {
                let receipt = format!(
                    "0x{:016x}{:016x}",
                    self.receipts.borrow_mut().random::<u64>(),
                    self.receipts.borrow_mut().random::<u64>()
                );
                let submission = ScoreSubmission {
                    player: player.to_string(),
                    score,
                    timestamp: platform::now_ms(),
                    receipt,
                };
                self.board.borrow_mut().add_entry(LeaderboardEntry {
                    player: submission.player.clone(),
                    score,
                    timestamp: submission.timestamp,
                });
                self.submitted.set(self.submitted.get() + 1);
                Ok(submission)
            }
        };
        ready(result)
    }

    fn leaderboard(&self) -> impl Future<Output = Vec<LeaderboardEntry>> {
        ready(self.board.borrow().entries.clone())
    }
}

/// Where the current run's submission stands
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionStatus {
    #[default]
    NotSubmitted,
    Submitting,
    Submitted(ScoreSubmission),
    Failed(String),
}

/// A submission handed to the endpoint, tagged with the run it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingSubmission {
    pub run: u64,
    pub score: u64,
}

/// Per-run submission bookkeeping kept by the session
#[derive(Debug, Clone, Default)]
pub struct SubmissionTracker {
    pub status: SubmissionStatus,
    /// Most recent accepted submission, across runs
    pub last_submission: Option<ScoreSubmission>,
    /// Bumped on every reset so late answers can be told apart
    run: u64,
}

impl SubmissionTracker {
    pub fn is_submitting(&self) -> bool {
        self.status == SubmissionStatus::Submitting
    }

    /// Validate and mark a submission as in flight
    pub fn begin(
        &mut self,
        state: &SimState,
        player: Option<&str>,
    ) -> Result<PendingSubmission, SubmitError> {
        if state.phase != Phase::GameOver {
            return Err(SubmitError::RunNotFinished);
        }
        if player.is_none_or(str::is_empty) {
            return Err(SubmitError::NotConnected);
        }
        match self.status {
            SubmissionStatus::Submitting => return Err(SubmitError::InFlight),
            SubmissionStatus::Submitted(_) => return Err(SubmitError::AlreadySubmitted),
            SubmissionStatus::NotSubmitted | SubmissionStatus::Failed(_) => {}
        }
        self.status = SubmissionStatus::Submitting;
        Ok(PendingSubmission {
            run: self.run,
            score: state.score,
        })
    }

    /// Record the endpoint's answer. Returns whether the endpoint accepted it.
    ///
    /// An answer for an earlier run leaves the current run's status alone.
    pub fn finish(
        &mut self,
        pending: PendingSubmission,
        result: Result<ScoreSubmission, SubmitError>,
    ) -> bool {
        let current = pending.run == self.run;
        if !current {
            log::warn!("Submission answer for an earlier run (score {})", pending.score);
        }
        match result {
            Ok(submission) => {
                log::info!(
                    "Score {} submitted (receipt {})",
                    submission.score,
                    submission.receipt
                );
                self.last_submission = Some(submission.clone());
                if current {
                    self.status = SubmissionStatus::Submitted(submission);
                }
                true
            }
            Err(e) => {
                log::error!("Failed to submit score: {}", e);
                if current {
                    self.status = SubmissionStatus::Failed(e.to_string());
                }
                false
            }
        }
    }

    /// New run, new submission slot
    pub fn reset(&mut self) {
        self.run = self.run.wrapping_add(1);
        self.status = SubmissionStatus::NotSubmitted;
    }
}

/// Submit a finished run's score. Failures are logged and reported as `false`.
pub async fn submit_score<E: ScoreEndpoint>(
    endpoint: &E,
    tracker: &mut SubmissionTracker,
    state: &SimState,
    player: Option<&str>,
) -> bool {
    let pending = match tracker.begin(state, player) {
        Ok(pending) => pending,
        Err(e) => {
            log::warn!("Score submission refused: {}", e);
            return false;
        }
    };
    let result = endpoint.submit(player.unwrap_or_default(), pending.score).await;
    tracker.finish(pending, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;
    use std::pin::pin;
    use std::task::{Context, Poll, Waker};

    /// The mock resolves immediately, so one poll is enough
    fn block_on<F: Future>(fut: F) -> F::Output {
        let mut fut = pin!(fut);
        let mut cx = Context::from_waker(Waker::noop());
        match fut.as_mut().poll(&mut cx) {
            Poll::Ready(v) => v,
            Poll::Pending => panic!("mock endpoint future was not ready"),
        }
    }

    fn finished_run(score: u64) -> SimState {
        let mut state = SimState::new(&Tuning::default());
        state.phase = Phase::GameOver;
        state.score = score;
        state.high_score = score;
        state
    }

    #[test]
    fn test_submit_records_entry() {
        let endpoint = MockEndpoint::new(Leaderboard::new());
        let mut tracker = SubmissionTracker::default();
        let state = finished_run(27);

        assert!(block_on(submit_score(&endpoint, &mut tracker, &state, Some("0xabc"))));
        assert_eq!(endpoint.submitted(), 1);
        let board = block_on(endpoint.leaderboard());
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].player, "0xabc");
        assert_eq!(board[0].score, 27);

        let Some(last) = &tracker.last_submission else {
            panic!("expected a recorded submission");
        };
        assert!(last.receipt.starts_with("0x"));
        assert_eq!(last.receipt.len(), 34);
    }

    #[test]
    fn test_submit_requires_player() {
        let endpoint = MockEndpoint::new(Leaderboard::new());
        let mut tracker = SubmissionTracker::default();
        let state = finished_run(10);
        assert!(!block_on(submit_score(&endpoint, &mut tracker, &state, None)));
        assert!(!block_on(submit_score(&endpoint, &mut tracker, &state, Some(""))));
        assert_eq!(endpoint.submitted(), 0);
    }

    #[test]
    fn test_submit_requires_game_over() {
        let mut tracker = SubmissionTracker::default();
        let mut state = finished_run(10);
        state.phase = Phase::Playing;
        assert_eq!(tracker.begin(&state, Some("p")), Err(SubmitError::RunNotFinished));
    }

    #[test]
    fn test_only_once_per_run() {
        let endpoint = MockEndpoint::new(Leaderboard::new());
        let mut tracker = SubmissionTracker::default();
        let state = finished_run(10);
        assert!(block_on(submit_score(&endpoint, &mut tracker, &state, Some("p"))));
        assert!(!block_on(submit_score(&endpoint, &mut tracker, &state, Some("p"))));
        assert_eq!(endpoint.submitted(), 1);

        tracker.reset();
        assert!(block_on(submit_score(&endpoint, &mut tracker, &state, Some("p"))));
    }

    #[test]
    fn test_in_flight_blocks_second_begin() {
        let mut tracker = SubmissionTracker::default();
        let state = finished_run(10);
        assert_eq!(tracker.begin(&state, Some("p")).map(|p| p.score), Ok(10));
        assert!(tracker.is_submitting());
        assert_eq!(tracker.begin(&state, Some("p")), Err(SubmitError::InFlight));
    }

    #[test]
    fn test_failure_reported_and_retryable() {
        let endpoint = MockEndpoint::failing("out of gas");
        let mut tracker = SubmissionTracker::default();
        let state = finished_run(10);
        let before = state.clone();

        assert!(!block_on(submit_score(&endpoint, &mut tracker, &state, Some("p"))));
        assert_eq!(
            tracker.status,
            SubmissionStatus::Failed("submission rejected: out of gas".to_string())
        );
        // Simulation state untouched, retry allowed
        assert_eq!(state, before);
        assert_eq!(tracker.begin(&state, Some("p")).map(|p| p.score), Ok(10));
    }

    #[test]
    fn test_late_answer_does_not_land_in_next_run() {
        let endpoint = MockEndpoint::new(Leaderboard::new());
        let mut tracker = SubmissionTracker::default();
        let state = finished_run(12);

        let pending = tracker.begin(&state, Some("p")).unwrap();
        // Play again before the endpoint answers
        tracker.reset();
        let answer = block_on(endpoint.submit("p", pending.score));
        assert!(tracker.finish(pending, answer));

        assert_eq!(tracker.status, SubmissionStatus::NotSubmitted);
        assert_eq!(tracker.last_submission.as_ref().map(|s| s.score), Some(12));
        // The new run can still submit its own score
        let next = finished_run(3);
        assert_eq!(tracker.begin(&next, Some("p")).map(|p| p.score), Ok(3));
    }

    #[test]
    fn test_late_failure_keeps_new_run_status() {
        let endpoint = MockEndpoint::failing("timeout");
        let mut tracker = SubmissionTracker::default();
        let pending = tracker.begin(&finished_run(8), Some("p")).unwrap();
        tracker.reset();
        let answer = block_on(endpoint.submit("p", pending.score));
        assert!(!tracker.finish(pending, answer));
        assert_eq!(tracker.status, SubmissionStatus::NotSubmitted);
    }

    #[test]
    fn test_receipts_differ_between_endpoints() {
        let a = MockEndpoint::with_receipt_seed(Leaderboard::new(), 1);
        let b = MockEndpoint::with_receipt_seed(Leaderboard::new(), 2);
        let ra = block_on(a.submit("p", 1)).map(|s| s.receipt);
        let rb = block_on(b.submit("p", 1)).map(|s| s.receipt);
        assert!(ra.is_ok());
        assert_ne!(ra, rb);
    }
}

//! Leaderboard of submitted scores
//!
//! Used by the mock submission endpoint and persisted to LocalStorage on the
//! web build. Tracks the top 10 entries, best first.

use serde::{Deserialize, Serialize};

/// Maximum number of leaderboard entries to keep
pub const MAX_LEADERBOARD_ENTRIES: usize = 10;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Player identifier (wallet address)
    pub player: String,
    pub score: u64,
    /// Unix timestamp (ms) when submitted
    pub timestamp: f64,
}

/// Ordered leaderboard, highest score first
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "flappy_arcade_leaderboard";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_LEADERBOARD_ENTRIES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert an entry if it qualifies.
    /// Returns the rank achieved (1-indexed). Ties rank below earlier entries.
    pub fn add_entry(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }

        let pos = self.entries.iter().position(|e| entry.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_LEADERBOARD_ENTRIES);

        Some(rank)
    }

    /// Best score recorded for one player
    pub fn best_for(&self, player: &str) -> Option<u64> {
        self.entries
            .iter()
            .filter(|e| e.player == player)
            .map(|e| e.score)
            .max()
    }

    /// Sample board shown before any real submissions exist
    pub fn sample(now_ms: f64) -> Self {
        const HOUR_MS: f64 = 3_600_000.0;
        let rows = [
            ("0x1234000000000000000000000000000000005678", 42),
            ("0x8765000000000000000000000000000000004321", 38),
            ("0x1111000000000000000000000000000000002222", 35),
            ("0x3333000000000000000000000000000000004444", 31),
            ("0x5555000000000000000000000000000000006666", 28),
        ];
        Self {
            entries: rows
                .iter()
                .enumerate()
                .map(|(i, &(player, score))| LeaderboardEntry {
                    player: player.to_string(),
                    score,
                    timestamp: now_ms - (i as f64 + 1.0) * HOUR_MS,
                })
                .collect(),
        }
    }

    /// Load leaderboard from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<Leaderboard>(&json) {
                    Ok(board) => {
                        log::info!("Loaded {} leaderboard entries", board.entries.len());
                        return board;
                    }
                    Err(e) => log::warn!("Discarding corrupt leaderboard: {}", e),
                }
            }
        }

        log::info!("No leaderboard found, using sample board");
        Self::sample(js_sys::Date::now())
    }

    /// Save leaderboard to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Leaderboard saved ({} entries)", self.entries.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

/// Format how long ago a timestamp was, relative to `now_ms`
pub fn format_age(now_ms: f64, timestamp: f64) -> String {
    const MIN_MS: f64 = 60_000.0;
    const HOUR_MS: f64 = 60.0 * MIN_MS;
    const DAY_MS: f64 = 24.0 * HOUR_MS;

    let diff = (now_ms - timestamp).max(0.0);
    if diff < MIN_MS {
        "Just now".to_string()
    } else if diff < HOUR_MS {
        format!("{} min ago", (diff / MIN_MS).floor() as u64)
    } else if diff < DAY_MS {
        format!("{} hours ago", (diff / HOUR_MS).floor() as u64)
    } else {
        format!("{} days ago", (diff / DAY_MS).floor() as u64)
    }
}

/// Shorten a wallet address to `0x1234...abcd`
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Medal or `#n` label for a rank (1-indexed)
pub fn rank_label(rank: usize) -> String {
    match rank {
        1 => "\u{1F947}".to_string(),
        2 => "\u{1F948}".to_string(),
        3 => "\u{1F949}".to_string(),
        n => format!("#{}", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(player: &str, score: u64) -> LeaderboardEntry {
        LeaderboardEntry {
            player: player.to_string(),
            score,
            timestamp: 0.0,
        }
    }

    #[test]
    fn test_zero_never_qualifies() {
        assert!(!Leaderboard::new().qualifies(0));
    }

    #[test]
    fn test_add_keeps_descending_order() {
        let mut board = Leaderboard::new();
        assert_eq!(board.add_entry(entry("a", 10)), Some(1));
        assert_eq!(board.add_entry(entry("b", 30)), Some(1));
        assert_eq!(board.add_entry(entry("c", 20)), Some(2));
        // Tie goes below the existing entry
        assert_eq!(board.add_entry(entry("d", 20)), Some(3));
        let scores: Vec<u64> = board.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![30, 20, 20, 10]);
    }

    #[test]
    fn test_full_board_truncates() {
        let mut board = Leaderboard::new();
        for s in 1..=10 {
            board.add_entry(entry("p", s * 10));
        }
        assert!(!board.qualifies(10));
        assert_eq!(board.potential_rank(55), Some(6));
        assert_eq!(board.add_entry(entry("q", 55)), Some(6));
        assert_eq!(board.entries.len(), MAX_LEADERBOARD_ENTRIES);
        assert_eq!(board.entries.last().map(|e| e.score), Some(20));
    }

    #[test]
    fn test_best_for_player() {
        let mut board = Leaderboard::new();
        board.add_entry(entry("a", 10));
        board.add_entry(entry("b", 30));
        board.add_entry(entry("a", 25));
        assert_eq!(board.best_for("a"), Some(25));
        assert_eq!(board.best_for("z"), None);
    }

    #[test]
    fn test_sample_board_sorted() {
        let board = Leaderboard::sample(100_000_000.0);
        assert_eq!(board.entries.len(), 5);
        assert!(board.entries.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(board.entries.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
    }

    #[test]
    fn test_format_age() {
        let now = 1_000_000_000.0;
        assert_eq!(format_age(now, now - 5_000.0), "Just now");
        assert_eq!(format_age(now, now - 5.0 * 60_000.0), "5 min ago");
        assert_eq!(format_age(now, now - 3.0 * 3_600_000.0), "3 hours ago");
        assert_eq!(format_age(now, now - 2.0 * 86_400_000.0), "2 days ago");
        // Clock skew never reads as the future
        assert_eq!(format_age(now, now + 10_000.0), "Just now");
    }

    #[test]
    fn test_short_address() {
        assert_eq!(
            short_address("0x1234000000000000000000000000000000005678"),
            "0x1234...5678"
        );
        assert_eq!(short_address("0xabc"), "0xabc");
    }

    #[test]
    fn test_rank_label() {
        assert_eq!(rank_label(4), "#4");
        assert_ne!(rank_label(1), rank_label(2));
    }
}

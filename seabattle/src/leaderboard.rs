//! Win counters keyed by player name.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One row of the leaderboard.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct WinnerEntry {
    /// Display name of the player.
    pub name: String,
    /// Games won so far.
    pub wins: u32,
}

/// Win counts of every registered player, keyed by display name.
#[derive(Debug, Default)]
pub struct Leaderboard {
    wins: HashMap<String, u32>,
}

impl Leaderboard {
    /// Construct an empty leaderboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `name` has a row, starting at zero wins.
    pub fn enroll(&mut self, name: &str) {
        self.wins.entry(name.to_owned()).or_insert(0);
    }

    /// Count a win for `name` and return the new total.
    pub fn record_win(&mut self, name: &str) -> u32 {
        let wins = self.wins.entry(name.to_owned()).or_insert(0);
        *wins += 1;
        *wins
    }

    /// Get the number of wins recorded for `name`, if it is on the board.
    pub fn wins(&self, name: &str) -> Option<u32> {
        self.wins.get(name).copied()
    }

    /// All rows, most wins first, ties broken by name.
    pub fn snapshot(&self) -> Vec<WinnerEntry> {
        let mut rows: Vec<WinnerEntry> = self
            .wins
            .iter()
            .map(|(name, &wins)| WinnerEntry {
                name: name.clone(),
                wins,
            })
            .collect();
        rows.sort_by(|a, b| b.wins.cmp(&a.wins).then_with(|| a.name.cmp(&b.name)));
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_winner_moves() {
        let mut board = Leaderboard::new();
        board.enroll("ann");
        board.enroll("bob");
        assert_eq!(board.record_win("bob"), 1);
        assert_eq!(board.wins("ann"), Some(0));
        assert_eq!(board.wins("bob"), Some(1));
        assert_eq!(board.wins("cid"), None);
    }

    #[test]
    fn enroll_keeps_existing_count() {
        let mut board = Leaderboard::new();
        board.record_win("ann");
        board.enroll("ann");
        assert_eq!(board.wins("ann"), Some(1));
    }

    #[test]
    fn snapshot_is_ranked() {
        let mut board = Leaderboard::new();
        board.enroll("cid");
        board.enroll("bob");
        board.record_win("ann");
        assert_eq!(
            board.snapshot(),
            vec![
                WinnerEntry {
                    name: "ann".into(),
                    wins: 1
                },
                WinnerEntry {
                    name: "bob".into(),
                    wins: 0
                },
                WinnerEntry {
                    name: "cid".into(),
                    wins: 0
                },
            ]
        );
    }
}

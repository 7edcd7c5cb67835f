//! Achievement predicates over the fixed player-stats schema.
//!
//! Deliberately a closed set of typed predicates: the broader system once
//! evaluated stored condition strings as code, which is an injection
//! hazard. Conditions here can only read numeric stat fields.

use crate::domain::state::PlayerStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Achievement {
    FirstWin,
    GamesPlayed(u32),
    GamesWon(u32),
    WinStreak(u32),
    /// Single-match winnings at or above the threshold (minor units).
    BigWin(u64),
}

impl Achievement {
    /// Stable key for logs and event payloads.
    pub fn key(&self) -> String {
        match self {
            Achievement::FirstWin => "first_win".into(),
            Achievement::GamesPlayed(n) => format!("games_played_{n}"),
            Achievement::GamesWon(n) => format!("games_won_{n}"),
            Achievement::WinStreak(n) => format!("win_streak_{n}"),
            Achievement::BigWin(amount) => format!("big_win_{amount}"),
        }
    }

    pub fn unlocked_by(&self, stats: &PlayerStats) -> bool {
        match *self {
            Achievement::FirstWin => stats.games_won >= 1,
            Achievement::GamesPlayed(n) => stats.games_played >= n,
            Achievement::GamesWon(n) => stats.games_won >= n,
            Achievement::WinStreak(n) => stats.best_streak >= n,
            Achievement::BigWin(amount) => stats.biggest_win >= amount,
        }
    }
}

/// The set evaluated after every finished match.
pub fn standard_set() -> Vec<Achievement> {
    vec![
        Achievement::FirstWin,
        Achievement::GamesPlayed(10),
        Achievement::GamesPlayed(100),
        Achievement::GamesWon(10),
        Achievement::GamesWon(50),
        Achievement::WinStreak(3),
        Achievement::WinStreak(10),
        Achievement::BigWin(10_000),
    ]
}

/// Achievements newly satisfied by the stats transition of one match.
pub fn newly_unlocked(before: &PlayerStats, after: &PlayerStats) -> Vec<Achievement> {
    standard_set()
        .into_iter()
        .filter(|a| !a.unlocked_by(before) && a.unlocked_by(after))
        .collect()
}

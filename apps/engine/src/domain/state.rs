//! Match, Round and Move containers, plus turn-order math.
//!
//! These are plain values: no storage or side effects are hidden in them.
//! Rounds are produced by the `dealing` factory and mutated only through
//! the transition functions in `domain::rounds`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::domain::cards::Card;
use crate::errors::domain::{DomainError, NotFoundKind};

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub i64);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MatchId(pub i64);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RoundId(pub i64);

/// Public join code identifying a match towards players and tooling.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchCode(String);

impl MatchCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MatchCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Waiting,
    Ready,
    Playing,
    Finished,
    Cancelled,
}

impl MatchStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchStatus::Finished | MatchStatus::Cancelled)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RoundStatus {
    InProgress,
    Completed,
    Abandoned,
}

impl RoundStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RoundStatus::Completed | RoundStatus::Abandoned)
    }
}

/// Bot difficulty tiers; also drive the scheduler's thinking delay.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BotDifficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PlayerKind {
    Human,
    Bot(BotDifficulty),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatedPlayer {
    pub id: PlayerId,
    pub display_name: String,
    pub kind: PlayerKind,
}

impl SeatedPlayer {
    pub fn is_bot(&self) -> bool {
        matches!(self.kind, PlayerKind::Bot(_))
    }

    pub fn difficulty(&self) -> Option<BotDifficulty> {
        match self.kind {
            PlayerKind::Bot(d) => Some(d),
            PlayerKind::Human => None,
        }
    }
}

/// Overarching contest: seated players, stakes, rounds-to-win target.
///
/// Money fields are minor units (e.g. cents). `commission_amount` is
/// reserved at formation; settlement pays `pot_amount - commission_amount`.
#[derive(Debug, Clone)]
pub struct Match {
    pub id: MatchId,
    pub code: MatchCode,
    pub bet_amount: u64,
    pub pot_amount: u64,
    pub commission_amount: u64,
    pub rounds_to_win: u32,
    pub max_players: usize,
    pub status: MatchStatus,
    /// Seat order; fixed once the match starts.
    pub players: Vec<SeatedPlayer>,
    pub winner: Option<PlayerId>,
    /// No stakes, settlement or refunds; stats still tracked.
    pub is_exhibition: bool,
    /// Base seed; per-round dealing seeds are derived from it.
    pub rng_seed: u64,
    pub time_limit: Option<Duration>,
    pub started_at: Option<OffsetDateTime>,
    pub finished_at: Option<OffsetDateTime>,
    /// Optimistic-lock version, bumped by the store on every update.
    pub version: i32,
}

impl Match {
    pub fn player(&self, id: PlayerId) -> Option<&SeatedPlayer> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Wall-clock time remaining, if a limit is configured and the match is
    /// live. Saturates at zero.
    pub fn time_remaining(&self, now: OffsetDateTime) -> Option<Duration> {
        let limit = self.time_limit?;
        if self.status != MatchStatus::Playing {
            return None;
        }
        let started = self.started_at?;
        let remaining = limit - (now - started);
        Some(remaining.max(Duration::ZERO))
    }

    pub fn timed_out(&self, now: OffsetDateTime) -> bool {
        self.time_remaining(now) == Some(Duration::ZERO)
    }
}

/// One card on the table pile, tagged with who played it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TablePlay {
    pub player: PlayerId,
    pub card: Card,
}

/// One deal-to-empty-hand sub-game within a match.
#[derive(Debug, Clone)]
pub struct Round {
    pub id: RoundId,
    pub match_id: MatchId,
    /// 1-based, strictly increasing per match.
    pub round_no: u32,
    pub status: RoundStatus,
    /// Fixed turn order for the round; never inferred from `hands` iteration.
    pub player_order: Vec<PlayerId>,
    pub hands: BTreeMap<PlayerId, Vec<Card>>,
    pub table_pile: Vec<TablePlay>,
    pub current_player: PlayerId,
    pub consecutive_passes: u8,
    pub winner: Option<PlayerId>,
    /// Count of recorded moves; the next MoveRecord gets move_count + 1.
    pub move_count: u32,
    /// Cards currently live in hands + table pile. Starts at the dealt
    /// total and drops only when an unresolved pile is discarded after an
    /// all-pass; every observed state must sum back to this.
    pub cards_in_play: usize,
    pub started_at: OffsetDateTime,
    pub ended_at: Option<OffsetDateTime>,
    /// Optimistic-lock version, bumped by the store on every commit.
    pub version: i32,
}

impl Round {
    pub fn hand(&self, player: PlayerId) -> Result<&[Card], DomainError> {
        self.hands
            .get(&player)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                DomainError::not_found(
                    NotFoundKind::Player,
                    format!("player {} has no hand in round {}", player.0, self.round_no),
                )
            })
    }

    pub fn top_card(&self) -> Option<Card> {
        self.table_pile.last().map(|p| p.card)
    }

    pub fn active_players(&self) -> usize {
        self.player_order.len()
    }

    /// Deterministic circular successor of `current_player` in
    /// `player_order`. An unknown current player is an invariant violation
    /// and fails loudly rather than picking an arbitrary seat.
    pub fn next_player(&self) -> Result<PlayerId, DomainError> {
        let idx = self
            .player_order
            .iter()
            .position(|&p| p == self.current_player)
            .ok_or_else(|| {
                DomainError::corruption(format!(
                    "current player {} not in player_order of round {}",
                    self.current_player.0, self.round_no
                ))
            })?;
        Ok(self.player_order[(idx + 1) % self.player_order.len()])
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    PlayCard,
    Pass,
}

/// Compact round snapshot captured before and after each move, for
/// audit/replay and duration analytics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub current_player: PlayerId,
    pub consecutive_passes: u8,
    pub table_len: usize,
    pub hand_counts: Vec<(PlayerId, usize)>,
}

/// Append-only log entry per round. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub round_id: RoundId,
    /// Strictly increasing per round, no gaps.
    pub move_no: u32,
    pub actor: PlayerId,
    pub kind: MoveKind,
    pub card: Option<Card>,
    pub before: RoundSnapshot,
    pub after: RoundSnapshot,
    pub at: OffsetDateTime,
}

/// Durable per-player statistics, updated when a match finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerStats {
    pub games_played: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub rounds_won: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    pub total_bet: u64,
    pub total_won: u64,
    pub total_lost: u64,
    pub biggest_win: u64,
}

/// Money movement attached to one finished match, from this player's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoneyOutcome {
    pub bet: u64,
    pub winnings: u64,
}

impl PlayerStats {
    /// Fold one finished match into the stats. `money` is None for
    /// exhibition matches.
    pub fn apply_match_result(&mut self, won: bool, rounds_won: u32, money: Option<MoneyOutcome>) {
        self.games_played += 1;
        self.rounds_won += rounds_won;
        if won {
            self.games_won += 1;
            self.current_streak += 1;
            self.best_streak = self.best_streak.max(self.current_streak);
            if let Some(m) = money {
                self.total_won += m.winnings;
                self.biggest_win = self.biggest_win.max(m.winnings);
            }
        } else {
            self.games_lost += 1;
            self.current_streak = 0;
            if let Some(m) = money {
                self.total_lost += m.bet;
            }
        }
        if let Some(m) = money {
            self.total_bet += m.bet;
        }
    }
}

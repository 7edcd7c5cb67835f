//! In-memory adapters: the default store for embedding and tests, a
//! wallet that records its instructions, and an event sink that collects.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use time::OffsetDateTime;

use crate::domain::scoring::{self, Tallies};
use crate::domain::state::{
    Match, MatchCode, MatchId, MoveRecord, PlayerId, PlayerStats, Round, RoundId, RoundStatus,
};
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::events::{EventSink, MatchEvent};
use crate::repos::{GameStore, WalletPort};

#[derive(Default)]
struct StoreInner {
    matches: HashMap<i64, Match>,
    code_index: HashMap<MatchCode, MatchId>,
    rounds: HashMap<i64, Round>,
    rounds_by_match: HashMap<i64, Vec<RoundId>>,
    moves: HashMap<i64, Vec<MoveRecord>>,
    stats: HashMap<i64, PlayerStats>,
    next_match_id: i64,
    next_round_id: i64,
}

/// Single-process [`GameStore`]. All mutations happen under one write
/// lock, which makes every operation atomic the way a SQL transaction
/// would be.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<StoreInner>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

fn cas_check(entity: &str, actual: i32, expected: i32) -> Result<(), DomainError> {
    if actual != expected {
        return Err(DomainError::concurrent_modification(format!(
            "{entity} version {actual}, caller expected {expected}"
        )));
    }
    Ok(())
}

#[async_trait]
impl GameStore for InMemoryStore {
    async fn create_match(&self, mut game: Match) -> Result<Match, DomainError> {
        let mut inner = self.inner.write();
        inner.next_match_id += 1;
        game.id = MatchId(inner.next_match_id);
        game.version = 0;
        inner.code_index.insert(game.code.clone(), game.id);
        inner.matches.insert(game.id.0, game.clone());
        Ok(game)
    }

    async fn find_match(&self, id: MatchId) -> Result<Match, DomainError> {
        self.inner
            .read()
            .matches
            .get(&id.0)
            .cloned()
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Match, format!("match {}", id.0)))
    }

    async fn find_match_by_code(&self, code: &MatchCode) -> Result<Match, DomainError> {
        let inner = self.inner.read();
        let id = inner.code_index.get(code).ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Match, format!("match code {code}"))
        })?;
        Ok(inner.matches[&id.0].clone())
    }

    async fn update_match(
        &self,
        game: &Match,
        expected_version: i32,
    ) -> Result<Match, DomainError> {
        let mut inner = self.inner.write();
        let stored = inner.matches.get_mut(&game.id.0).ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Match, format!("match {}", game.id.0))
        })?;
        cas_check("match", stored.version, expected_version)?;
        let mut updated = game.clone();
        updated.version = expected_version + 1;
        *stored = updated.clone();
        Ok(updated)
    }

    async fn create_round(&self, mut round: Round) -> Result<Round, DomainError> {
        let mut inner = self.inner.write();
        inner.next_round_id += 1;
        round.id = RoundId(inner.next_round_id);
        round.version = 0;
        inner
            .rounds_by_match
            .entry(round.match_id.0)
            .or_default()
            .push(round.id);
        inner.moves.entry(round.id.0).or_default();
        inner.rounds.insert(round.id.0, round.clone());
        Ok(round)
    }

    async fn find_round(&self, id: RoundId) -> Result<Round, DomainError> {
        self.inner
            .read()
            .rounds
            .get(&id.0)
            .cloned()
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Round, format!("round {}", id.0)))
    }

    async fn current_round(&self, match_id: MatchId) -> Result<Option<Round>, DomainError> {
        let inner = self.inner.read();
        Ok(inner
            .rounds_by_match
            .get(&match_id.0)
            .and_then(|ids| ids.last())
            .map(|id| inner.rounds[&id.0].clone()))
    }

    async fn commit_move(
        &self,
        round: &Round,
        record: &MoveRecord,
        expected_version: i32,
    ) -> Result<Round, DomainError> {
        let mut inner = self.inner.write();
        let stored = inner.rounds.get_mut(&round.id.0).ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Round, format!("round {}", round.id.0))
        })?;
        cas_check("round", stored.version, expected_version)?;

        let mut updated = round.clone();
        updated.version = expected_version + 1;
        *stored = updated.clone();

        let log = inner.moves.entry(round.id.0).or_default();
        let expected_no = log.len() as u32 + 1;
        if record.move_no != expected_no {
            return Err(DomainError::corruption(format!(
                "move_no {} for round {}, log expects {}",
                record.move_no, round.id.0, expected_no
            )));
        }
        log.push(record.clone());
        Ok(updated)
    }

    async fn abandon_round(&self, id: RoundId, now: OffsetDateTime) -> Result<Round, DomainError> {
        let mut inner = self.inner.write();
        let stored = inner
            .rounds
            .get_mut(&id.0)
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Round, format!("round {}", id.0)))?;
        if stored.status.is_terminal() {
            return Err(DomainError::round_not_active(format!(
                "round {} already {:?}",
                id.0, stored.status
            )));
        }
        stored.status = RoundStatus::Abandoned;
        stored.ended_at = Some(now);
        stored.version += 1;
        Ok(stored.clone())
    }

    async fn moves(&self, round_id: RoundId) -> Result<Vec<MoveRecord>, DomainError> {
        Ok(self
            .inner
            .read()
            .moves
            .get(&round_id.0)
            .cloned()
            .unwrap_or_default())
    }

    async fn rounds_won(&self, match_id: MatchId) -> Result<Tallies, DomainError> {
        let inner = self.inner.read();
        let mut tallies = Tallies::new();
        if let Some(ids) = inner.rounds_by_match.get(&match_id.0) {
            for id in ids {
                let round = &inner.rounds[&id.0];
                if round.status == RoundStatus::Completed {
                    let winner = round.winner.ok_or_else(|| {
                        DomainError::corruption(format!("completed round {} has no winner", id.0))
                    })?;
                    scoring::bump(&mut tallies, winner);
                }
            }
        }
        Ok(tallies)
    }

    async fn player_stats(&self, player: PlayerId) -> Result<PlayerStats, DomainError> {
        Ok(self
            .inner
            .read()
            .stats
            .get(&player.0)
            .cloned()
            .unwrap_or_default())
    }

    async fn finish_match(
        &self,
        game: &Match,
        expected_version: i32,
        stats: &[(PlayerId, PlayerStats)],
    ) -> Result<Match, DomainError> {
        let mut inner = self.inner.write();
        let stored = inner.matches.get_mut(&game.id.0).ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Match, format!("match {}", game.id.0))
        })?;
        cas_check("match", stored.version, expected_version)?;
        let mut updated = game.clone();
        updated.version = expected_version + 1;
        *stored = updated.clone();
        for (player, s) in stats {
            inner.stats.insert(player.0, s.clone());
        }
        Ok(updated)
    }
}

/// What the wallet was told to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletOp {
    LockStake { player: PlayerId, amount: u64 },
    SettlePot { winner: PlayerId, amount: u64 },
    Refund { player: PlayerId, amount: u64 },
}

/// Wallet adapter that records instructions instead of moving money.
#[derive(Default)]
pub struct RecordingWallet {
    ops: Mutex<Vec<WalletOp>>,
}

impl RecordingWallet {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn ops(&self) -> Vec<WalletOp> {
        self.ops.lock().clone()
    }
}

#[async_trait]
impl WalletPort for RecordingWallet {
    async fn lock_stake(
        &self,
        player: PlayerId,
        _code: &MatchCode,
        amount: u64,
    ) -> Result<(), DomainError> {
        self.ops.lock().push(WalletOp::LockStake { player, amount });
        Ok(())
    }

    async fn settle_pot(
        &self,
        winner: PlayerId,
        _code: &MatchCode,
        amount: u64,
    ) -> Result<(), DomainError> {
        self.ops.lock().push(WalletOp::SettlePot { winner, amount });
        Ok(())
    }

    async fn refund(
        &self,
        player: PlayerId,
        _code: &MatchCode,
        amount: u64,
    ) -> Result<(), DomainError> {
        self.ops.lock().push(WalletOp::Refund { player, amount });
        Ok(())
    }
}

/// Event sink that keeps everything published, for assertions.
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<MatchEvent>>,
}

impl CollectingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<MatchEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl EventSink for CollectingSink {
    async fn publish(&self, event: MatchEvent) -> Result<(), DomainError> {
        self.events.lock().push(event);
        Ok(())
    }
}

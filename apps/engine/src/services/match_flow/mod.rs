//! Match flow service: the single write path for everything that changes
//! a match. Split by concern:
//!
//! * `player_actions` — submitting plays and passes,
//! * `orchestration` — match formation, round transitions, forced ends.
//!
//! Concurrency discipline: a per-round async mutex serializes moves on
//! one round inside this process, and the store's optimistic versions
//! catch anything that slips past it (other processes, stale bot jobs).

mod orchestration;
mod player_actions;

use std::sync::{Arc, Weak};

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::warn;

use crate::config::EngineConfig;
use crate::domain::scoring::Tallies;
use crate::domain::state::{Match, MatchId, MatchStatus, PlayerId, RoundId};
use crate::errors::domain::DomainError;
use crate::events::{EventSink, MatchEvent, TransitionType};
use crate::repos::{GameStore, WalletPort};
use crate::services::bot_scheduler::BotScheduler;
use crate::services::score_cache::ScoreCache;

pub use orchestration::{MatchSetup, PlayerView, TransitionState};

/// What a successful mutation did to the match as a whole.
#[derive(Debug, Clone)]
pub enum TransitionResult {
    /// The move landed; the same round carries on.
    RoundContinues,
    /// The round completed and the next one was dealt.
    NextRound { round_no: u32 },
    /// Somebody reached the rounds-to-win target.
    MatchEnded {
        winner: PlayerId,
        final_tallies: Tallies,
        /// Amount paid out (zero for exhibitions).
        winnings: u64,
    },
    /// Forced end without a strict leader; stakes were returned.
    MatchCancelled {
        reason: String,
        /// Total amount refunded across all players.
        refunded: u64,
    },
}

pub struct MatchFlowService {
    pub(crate) store: Arc<dyn GameStore>,
    pub(crate) wallet: Arc<dyn WalletPort>,
    pub(crate) events: Arc<dyn EventSink>,
    pub(crate) scores: ScoreCache,
    pub(crate) config: EngineConfig,
    round_locks: DashMap<i64, Arc<Mutex<()>>>,
    /// Back-reference to the bot scheduler, set when one is attached.
    /// Weak because the scheduler owns the flow service, not vice versa.
    scheduler: OnceCell<Weak<BotScheduler>>,
}

impl MatchFlowService {
    pub fn new(
        store: Arc<dyn GameStore>,
        wallet: Arc<dyn WalletPort>,
        events: Arc<dyn EventSink>,
        config: EngineConfig,
    ) -> Arc<Self> {
        let scores = ScoreCache::new(Arc::clone(&store), config.score_cache_ttl);
        Arc::new(Self {
            store,
            wallet,
            events,
            scores,
            config,
            round_locks: DashMap::new(),
            scheduler: OnceCell::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Called by [`BotScheduler::new`] so the flow service can queue bot
    /// moves whenever a committed transition leaves a bot on turn. A
    /// second attach is ignored.
    pub(crate) fn attach_scheduler(&self, scheduler: &Arc<BotScheduler>) {
        let _ = self.scheduler.set(Arc::downgrade(scheduler));
    }

    /// Queues a bot job if the match's current player is a bot. No-op
    /// when no scheduler is attached or it has been dropped; scheduling
    /// failures are logged, never surfaced through the committed move.
    pub(crate) async fn notify_bot_turn(&self, match_id: MatchId) {
        let Some(scheduler) = self.scheduler.get().and_then(Weak::upgrade) else {
            return;
        };
        if let Err(err) = scheduler.schedule_if_bot_turn(match_id).await {
            warn!(match_id = match_id.0, %err, "bot turn scheduling failed");
        }
    }

    /// Serializes in-process mutations of one round.
    pub(crate) async fn lock_round(&self, round_id: RoundId) -> OwnedMutexGuard<()> {
        let lock = self
            .round_locks
            .entry(round_id.0)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Drops lock entries for a terminal round. Safe to call repeatedly.
    pub(crate) fn release_round(&self, round_id: RoundId) {
        self.round_locks.remove(&round_id.0);
    }

    /// State changes are durable before emission, so a sink failure is
    /// logged and swallowed rather than unwinding a committed move.
    pub(crate) async fn emit(&self, game: &Match, transition: TransitionType, payload: serde_json::Value) {
        let event = MatchEvent::new(game.code.clone(), transition, payload);
        if let Err(err) = self.events.publish(event).await {
            warn!(code = %game.code, ?transition, %err, "event emission failed");
        }
    }

    pub(crate) fn ensure_playing(game: &Match) -> Result<(), DomainError> {
        if game.status != MatchStatus::Playing {
            return Err(DomainError::match_not_ready(format!(
                "match {} is {:?}, not Playing",
                game.code, game.status
            )));
        }
        Ok(())
    }
}

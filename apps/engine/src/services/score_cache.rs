//! TTL cache over per-match round tallies.
//!
//! The cache is an optimization only: completed rounds in the store are
//! the source of truth, and a miss (cold start, TTL expiry, eviction)
//! recomputes from them. A stale or lost entry can therefore never change
//! who wins.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::domain::scoring::{self, Tallies};
use crate::domain::state::{MatchId, PlayerId};
use crate::errors::domain::DomainError;
use crate::repos::GameStore;

pub struct ScoreCache {
    cache: Cache<i64, Tallies>,
    store: Arc<dyn GameStore>,
}

impl ScoreCache {
    pub fn new(store: Arc<dyn GameStore>, ttl: Duration) -> Self {
        Self {
            cache: Cache::builder().time_to_live(ttl).build(),
            store,
        }
    }

    /// Current tallies, recomputing from round history on a miss.
    pub async fn tallies(&self, match_id: MatchId) -> Result<Tallies, DomainError> {
        if let Some(tallies) = self.cache.get(&match_id.0).await {
            return Ok(tallies);
        }
        let tallies = self.store.rounds_won(match_id).await?;
        self.cache.insert(match_id.0, tallies.clone()).await;
        Ok(tallies)
    }

    /// Credits one round win and returns the updated tallies.
    pub async fn record_round_win(
        &self,
        match_id: MatchId,
        winner: PlayerId,
    ) -> Result<Tallies, DomainError> {
        // The winning round is already durable, so recomputing on a miss
        // includes it; only bump a cache hit.
        let tallies = match self.cache.get(&match_id.0).await {
            Some(mut tallies) => {
                scoring::bump(&mut tallies, winner);
                tallies
            }
            None => self.store.rounds_won(match_id).await?,
        };
        self.cache.insert(match_id.0, tallies.clone()).await;
        Ok(tallies)
    }

    /// Drops the entry once a match is terminal.
    pub async fn forget(&self, match_id: MatchId) {
        self.cache.invalidate(&match_id.0).await;
    }
}

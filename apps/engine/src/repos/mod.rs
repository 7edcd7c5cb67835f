//! Persistence and money ports. The engine's services speak only these
//! traits; adapters (in-memory for tests and embedding, SQL in a host
//! application) live behind them.

pub mod memory;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::domain::scoring::Tallies;
use crate::domain::state::{
    Match, MatchCode, MatchId, MoveRecord, PlayerId, PlayerStats, Round, RoundId,
};
use crate::errors::domain::DomainError;

/// Durable match/round/move storage.
///
/// Version discipline: every write that takes an `expected_version` is a
/// compare-and-swap against the stored row. On mismatch the store returns
/// `Conflict(ConcurrentModification)` and changes nothing; the stored row
/// comes back with its version bumped on success.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Persists a new match, assigning its id. The caller-supplied id is
    /// ignored.
    async fn create_match(&self, game: Match) -> Result<Match, DomainError>;

    async fn find_match(&self, id: MatchId) -> Result<Match, DomainError>;

    async fn find_match_by_code(&self, code: &MatchCode) -> Result<Match, DomainError>;

    /// CAS update of the match row (status, winner, pot, timestamps).
    async fn update_match(&self, game: &Match, expected_version: i32)
        -> Result<Match, DomainError>;

    /// Persists a new round, assigning its id.
    async fn create_round(&self, round: Round) -> Result<Round, DomainError>;

    async fn find_round(&self, id: RoundId) -> Result<Round, DomainError>;

    /// Latest round of the match, if any round was ever dealt.
    async fn current_round(&self, match_id: MatchId) -> Result<Option<Round>, DomainError>;

    /// Atomically persists the post-move round state and appends its move
    /// record. CAS on the round version; move numbers must stay gapless.
    async fn commit_move(
        &self,
        round: &Round,
        record: &MoveRecord,
        expected_version: i32,
    ) -> Result<Round, DomainError>;

    /// Marks an in-progress round Abandoned (forced match end). No-op
    /// error if the round is already terminal.
    async fn abandon_round(&self, id: RoundId, now: OffsetDateTime) -> Result<Round, DomainError>;

    /// Full move log of a round in commit order.
    async fn moves(&self, round_id: RoundId) -> Result<Vec<MoveRecord>, DomainError>;

    /// Rounds won per player, recomputed from completed rounds. This is
    /// the durable source of truth behind the score cache.
    async fn rounds_won(&self, match_id: MatchId) -> Result<Tallies, DomainError>;

    async fn player_stats(&self, player: PlayerId) -> Result<PlayerStats, DomainError>;

    /// CAS-finishes a match and writes the updated per-player statistics
    /// in the same transaction.
    async fn finish_match(
        &self,
        game: &Match,
        expected_version: i32,
        stats: &[(PlayerId, PlayerStats)],
    ) -> Result<Match, DomainError>;
}

/// Money movements, in minor currency units. The wallet is external; the
/// engine only instructs it and records that it did.
#[async_trait]
pub trait WalletPort: Send + Sync {
    /// Reserves a player's stake when the match starts.
    async fn lock_stake(
        &self,
        player: PlayerId,
        code: &MatchCode,
        amount: u64,
    ) -> Result<(), DomainError>;

    /// Pays the settled pot (commission already deducted) to the winner.
    async fn settle_pot(
        &self,
        winner: PlayerId,
        code: &MatchCode,
        amount: u64,
    ) -> Result<(), DomainError>;

    /// Returns a player's full stake after a cancellation.
    async fn refund(
        &self,
        player: PlayerId,
        code: &MatchCode,
        amount: u64,
    ) -> Result<(), DomainError>;
}

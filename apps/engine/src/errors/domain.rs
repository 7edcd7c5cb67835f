//! Domain-level error type used across domain, services and adapters.
//!
//! This error type is transport- and storage-agnostic. Outer layers (HTTP
//! handlers, CLI tooling) are expected to map `DomainError` onto their own
//! response types; the engine itself only ever speaks this taxonomy.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Why a play/pass attempt was rejected without mutating the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidMoveKind {
    /// Actor is not the round's current player.
    OutOfTurn,
    /// Actor does not hold the card they tried to play.
    CardNotHeld,
    /// Card does not beat the top of the table pile (suit/rank rule).
    RuleViolation,
}

/// Semantic conflict kinds (extend as needed)
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    /// Optimistic-lock precondition no longer held at commit time.
    ConcurrentModification,
    /// Scheduled bot job preconditions no longer hold at execution time.
    SchedulingStale,
    Other(String),
}

/// Domain-level not found entities (minimal set; extend as needed)
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Match,
    Round,
    Player,
    Other(String),
}

/// Infra error kinds to distinguish operational failures
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    Storage,
    Wallet,
    Events,
    /// Invariant violation (card-count mismatch, unknown player in turn
    /// order). Always aborts the operation; never self-heals.
    DataCorruption,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Move rejected by the round rules; no mutation occurred.
    InvalidMove(InvalidMoveKind, String),
    /// Mutation attempted on a Completed/Abandoned round.
    RoundNotActive(String),
    /// Transition requested in a state that does not allow it.
    MatchNotReady(String),
    /// Semantic conflict (CAS failure, stale bot job).
    Conflict(ConflictKind, String),
    /// Match wall-clock limit has elapsed; resolve via force_end_game.
    TimeoutExpired(String),
    /// Missing resource in domain terms.
    NotFound(NotFoundKind, String),
    /// Infrastructure/operational failures.
    Infra(InfraErrorKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::InvalidMove(kind, d) => write!(f, "invalid move {kind:?}: {d}"),
            DomainError::RoundNotActive(d) => write!(f, "round not active: {d}"),
            DomainError::MatchNotReady(d) => write!(f, "match not ready: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::TimeoutExpired(d) => write!(f, "timeout expired: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Infra(kind, d) => write!(f, "infra {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn invalid_move(kind: InvalidMoveKind, detail: impl Into<String>) -> Self {
        Self::InvalidMove(kind, detail.into())
    }
    pub fn round_not_active(detail: impl Into<String>) -> Self {
        Self::RoundNotActive(detail.into())
    }
    pub fn match_not_ready(detail: impl Into<String>) -> Self {
        Self::MatchNotReady(detail.into())
    }
    pub fn concurrent_modification(detail: impl Into<String>) -> Self {
        Self::Conflict(ConflictKind::ConcurrentModification, detail.into())
    }
    pub fn scheduling_stale(detail: impl Into<String>) -> Self {
        Self::Conflict(ConflictKind::SchedulingStale, detail.into())
    }
    pub fn timeout_expired(detail: impl Into<String>) -> Self {
        Self::TimeoutExpired(detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }
    pub fn corruption(detail: impl Into<String>) -> Self {
        Self::Infra(InfraErrorKind::DataCorruption, detail.into())
    }

    /// True when the error stems from a lost optimistic-lock race.
    pub fn is_concurrent_modification(&self) -> bool {
        matches!(
            self,
            DomainError::Conflict(ConflictKind::ConcurrentModification, _)
        )
    }
}

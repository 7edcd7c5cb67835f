//! Outbound event surface. The engine emits one [`MatchEvent`] per state
//! transition; transports (websocket broker, queue, test collector) get
//! them through the [`EventSink`] port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::domain::state::MatchCode;
use crate::errors::domain::DomainError;

/// Every state transition the engine can announce. Serialized names are
/// part of the wire contract; do not rename without versioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionType {
    MatchStarted,
    CardPlayed,
    PlayerPassed,
    PileCleared,
    RoundCompleted,
    NextRoundStarted,
    MatchEnded,
    MatchCancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchEvent {
    pub match_code: MatchCode,
    pub transition_type: TransitionType,
    /// Transition-specific details (actor, card, tallies...). Kept loose
    /// on purpose; consumers switch on `transition_type` first.
    pub payload: Value,
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
}

impl MatchEvent {
    pub fn new(match_code: MatchCode, transition_type: TransitionType, payload: Value) -> Self {
        Self {
            match_code,
            transition_type,
            payload,
            at: OffsetDateTime::now_utc(),
        }
    }
}

/// Delivery port. Emission happens after the state change is durable, so
/// a sink failure must never roll back a move; callers log and continue.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: MatchEvent) -> Result<(), DomainError>;
}

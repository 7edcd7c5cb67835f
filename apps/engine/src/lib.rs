#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod ai;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod repos;
pub mod services;
pub mod util;

// Kept outside cfg(test) so integration tests share the same bootstrap.
pub mod test_bootstrap;

// Re-exports for public API
pub use ai::{strategy_for, BotAction, BotDecision, BotStrategy, RoundView};
pub use config::EngineConfig;
pub use domain::{
    BotDifficulty, Card, Match, MatchCode, MatchId, MatchStatus, PlayerId, PlayerKind, Rank,
    Round, RoundId, RoundStatus, SeatedPlayer, Suit,
};
pub use errors::DomainError;
pub use events::{EventSink, MatchEvent, TransitionType};
pub use repos::{GameStore, WalletPort};
pub use services::bot_scheduler::{BotScheduler, JobOutcome};
pub use services::match_flow::{
    MatchFlowService, MatchSetup, PlayerView, TransitionResult, TransitionState,
};

#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}

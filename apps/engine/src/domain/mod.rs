//! Pure game logic: no IO, no clocks beyond passed-in timestamps, no
//! storage. Everything here is deterministic and unit-testable.

pub mod achievements;
pub mod cards;
pub mod dealing;
pub mod rounds;
pub mod rules;
pub mod scoring;
pub mod state;

#[cfg(test)]
pub mod test_fixtures;
#[cfg(test)]
mod tests_props;
#[cfg(test)]
mod tests_rounds;

pub use cards::{Card, Rank, Suit};
pub use state::{
    BotDifficulty, Match, MatchCode, MatchId, MatchStatus, MoveKind, MoveRecord, PlayerId,
    PlayerKind, PlayerStats, Round, RoundId, RoundSnapshot, RoundStatus, SeatedPlayer, TablePlay,
};

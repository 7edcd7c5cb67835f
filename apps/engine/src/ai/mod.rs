//! Bot decision engine. One strategy per difficulty tier, all behind the
//! [`BotStrategy`] trait so the scheduler never cares which tier it drives.

pub mod easy;
pub mod hard;
pub mod medium;
pub mod registry;
pub mod trait_def;

pub use registry::strategy_for;
pub use trait_def::{BotAction, BotDecision, BotStrategy, RoundView};

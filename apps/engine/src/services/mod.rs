//! Stateful orchestration on top of the pure domain: match flow, cached
//! tallies, and the bot move scheduler.

pub mod bot_scheduler;
pub mod match_flow;
pub mod score_cache;

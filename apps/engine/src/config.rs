//! Engine configuration. Defaults match production behavior; everything
//! is overridable through `LAMAP_*` environment variables or directly by
//! the embedding application.

use std::env;
use std::ops::RangeInclusive;
use std::time::Duration;

use thiserror::Error;

use crate::domain::state::BotDifficulty;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} ({reason})")]
    InvalidVar {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Inclusive seconds range a bot "thinks" before acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min_secs: u64,
    pub max_secs: u64,
}

impl DelayRange {
    pub const fn new(min_secs: u64, max_secs: u64) -> Self {
        Self { min_secs, max_secs }
    }

    pub fn as_secs_range(&self) -> RangeInclusive<u64> {
        self.min_secs..=self.max_secs
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// TTL of the cached per-match tallies; expiry falls back to a
    /// recompute from round history.
    pub score_cache_ttl: Duration,
    pub easy_delay: DelayRange,
    pub medium_delay: DelayRange,
    pub hard_delay: DelayRange,
    /// Collapses every bot delay to zero. Meant for tests and simulations.
    pub disable_bot_delay: bool,
    /// How long the scheduler remembers a bot job's outcome per round.
    pub job_outcome_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            score_cache_ttl: Duration::from_secs(300),
            easy_delay: DelayRange::new(2, 4),
            medium_delay: DelayRange::new(3, 6),
            hard_delay: DelayRange::new(4, 8),
            disable_bot_delay: false,
            job_outcome_ttl: Duration::from_secs(3_600),
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with `LAMAP_SCORE_CACHE_TTL_SECS` and
    /// `LAMAP_DISABLE_BOT_DELAY` when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = Self::default();

        if let Ok(raw) = env::var("LAMAP_SCORE_CACHE_TTL_SECS") {
            let secs: u64 = raw.parse().map_err(|e| ConfigError::InvalidVar {
                var: "LAMAP_SCORE_CACHE_TTL_SECS",
                value: raw.clone(),
                reason: format!("{e}"),
            })?;
            cfg.score_cache_ttl = Duration::from_secs(secs);
        }

        if let Ok(raw) = env::var("LAMAP_DISABLE_BOT_DELAY") {
            cfg.disable_bot_delay = match raw.as_str() {
                "1" | "true" => true,
                "0" | "false" => false,
                _ => {
                    return Err(ConfigError::InvalidVar {
                        var: "LAMAP_DISABLE_BOT_DELAY",
                        value: raw,
                        reason: "expected 1/0/true/false".into(),
                    })
                }
            };
        }

        Ok(cfg)
    }

    pub fn delay_for(&self, difficulty: BotDifficulty) -> DelayRange {
        match difficulty {
            BotDifficulty::Easy => self.easy_delay,
            BotDifficulty::Medium => self.medium_delay,
            BotDifficulty::Hard => self.hard_delay,
        }
    }

    /// Test-friendly preset: no delays, short cache TTL.
    pub fn for_tests() -> Self {
        Self {
            disable_bot_delay: true,
            score_cache_ttl: Duration::from_secs(5),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harder_tiers_think_longer() {
        let cfg = EngineConfig::default();
        assert!(cfg.easy_delay.max_secs <= cfg.medium_delay.max_secs);
        assert!(cfg.medium_delay.max_secs <= cfg.hard_delay.max_secs);
        assert_eq!(cfg.delay_for(BotDifficulty::Hard), DelayRange::new(4, 8));
    }

    #[test]
    fn delay_range_is_inclusive() {
        let range = DelayRange::new(2, 4).as_secs_range();
        assert!(range.contains(&2) && range.contains(&4));
    }
}

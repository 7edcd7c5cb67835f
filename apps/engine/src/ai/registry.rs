//! Maps a difficulty tier to its strategy instance. Strategies are
//! stateless, so a single static per tier is shared by every match.

use super::easy::EasyStrategy;
use super::hard::HardStrategy;
use super::medium::MediumStrategy;
use super::trait_def::BotStrategy;
use crate::domain::state::BotDifficulty;

static EASY: EasyStrategy = EasyStrategy;
static MEDIUM: MediumStrategy = MediumStrategy;
static HARD: HardStrategy = HardStrategy;

pub fn strategy_for(difficulty: BotDifficulty) -> &'static dyn BotStrategy {
    match difficulty {
        BotDifficulty::Easy => &EASY,
        BotDifficulty::Medium => &MEDIUM,
        BotDifficulty::Hard => &HARD,
    }
}

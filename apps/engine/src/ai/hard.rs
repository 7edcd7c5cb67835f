//! Hard tier: scores every legal card and plays the best one.
//!
//! Scoring blends three pressures:
//!   * prefer low ranks (keep ammunition for later tricks),
//!   * unless the round is ending, where high ranks must go now,
//!   * and spend strong cards (rank >= 8) when the table has stalled
//!     (two or more consecutive passes) to claim the pile cheaply.

use super::trait_def::{BotDecision, BotStrategy, RoundView};
use crate::domain::cards::Card;

pub struct HardStrategy;

impl BotStrategy for HardStrategy {
    fn name(&self) -> &'static str {
        "hard"
    }

    fn decide(&self, view: &RoundView) -> BotDecision {
        let legal = view.legal_cards();
        if legal.is_empty() {
            return BotDecision::pass("no legal card");
        }

        let mut best = legal[0];
        let mut best_score = score_card(best, view);
        for card in &legal[1..] {
            let score = score_card(*card, view);
            if score > best_score {
                best = *card;
                best_score = score;
            }
        }
        BotDecision::play(best, "highest scored card")
    }
}

fn score_card(card: Card, view: &RoundView) -> i32 {
    let rank = i32::from(card.rank.value());
    let mut score = (11 - rank) * 2;
    if view.is_endgame() {
        score += rank * 3;
    }
    if rank >= 8 {
        score += 15;
    }
    if view.consecutive_passes >= 2 {
        score += rank * 2;
    }
    score
}

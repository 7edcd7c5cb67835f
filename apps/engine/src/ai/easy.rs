//! Easy tier: plays the first legal card in hand order, no lookahead.

use super::trait_def::{BotDecision, BotStrategy, RoundView};

pub struct EasyStrategy;

impl BotStrategy for EasyStrategy {
    fn name(&self) -> &'static str {
        "easy"
    }

    fn decide(&self, view: &RoundView) -> BotDecision {
        match view.legal_cards().first() {
            Some(card) => BotDecision::play(*card, "first legal card"),
            None => BotDecision::pass("no legal card"),
        }
    }
}

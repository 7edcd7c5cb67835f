//! Strategy seam between the scheduler and the per-tier decision logic.

use crate::domain::cards::Card;
use crate::domain::rules::legal_cards;
use crate::domain::state::{PlayerId, Round};
use crate::errors::domain::DomainError;

/// Read-only view of a round from one player's seat. Strategies see only
/// what a human in that seat would: their own hand, the table, and how many
/// cards everyone else holds.
#[derive(Debug, Clone)]
pub struct RoundView {
    pub player: PlayerId,
    pub hand: Vec<Card>,
    pub top_card: Option<Card>,
    pub consecutive_passes: u8,
    pub hand_counts: Vec<(PlayerId, usize)>,
}

impl RoundView {
    pub fn for_player(round: &Round, player: PlayerId) -> Result<Self, DomainError> {
        let hand = round.hand(player)?.to_vec();
        Ok(Self {
            player,
            hand,
            top_card: round.top_card(),
            consecutive_passes: round.consecutive_passes,
            hand_counts: round
                .player_order
                .iter()
                .map(|p| (*p, round.hand(*p).map(<[Card]>::len).unwrap_or(0)))
                .collect(),
        })
    }

    /// Playable cards in hand order.
    pub fn legal_cards(&self) -> Vec<Card> {
        legal_cards(&self.hand, self.top_card)
    }

    /// The round is nearly over: somebody (possibly us) is down to two
    /// cards or fewer. Tiers above Easy switch to dumping high cards here.
    pub fn is_endgame(&self) -> bool {
        self.hand_counts.iter().any(|(_, n)| *n <= 2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotAction {
    Play(Card),
    Pass,
}

/// What the bot chose and a short human-readable why, surfaced in logs.
#[derive(Debug, Clone)]
pub struct BotDecision {
    pub action: BotAction,
    pub rationale: &'static str,
}

impl BotDecision {
    pub fn play(card: Card, rationale: &'static str) -> Self {
        Self {
            action: BotAction::Play(card),
            rationale,
        }
    }

    pub fn pass(rationale: &'static str) -> Self {
        Self {
            action: BotAction::Pass,
            rationale,
        }
    }
}

/// A difficulty tier. Implementations must be pure: same view, same
/// decision. Randomness lives in the scheduler's delay, not here.
pub trait BotStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn decide(&self, view: &RoundView) -> BotDecision;
}

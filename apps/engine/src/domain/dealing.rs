//! Deterministic deck building, shuffling and round dealing.
//!
//! `deal_round` is an explicit factory: it returns a fully-populated Round
//! value and never persists anything. This variant has no draw pile, so the
//! undealt remainder is discarded at deal time.

use std::collections::BTreeMap;

use time::OffsetDateTime;

use crate::domain::cards::{Card, Rank, Suit};
use crate::domain::rules::{DECK_SIZE, HAND_SIZE, MAX_PLAYERS, MIN_PLAYERS};
use crate::domain::state::{Match, Round, RoundId, RoundStatus};
use crate::errors::domain::DomainError;

/// Generate the full 36-card deck in standard order.
pub fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            deck.push(Card { suit, rank });
        }
    }
    deck
}

/// Simple deterministic RNG for shuffling.
///
/// SplitMix64-style generator: good statistical properties while remaining
/// fast and deterministic given a seed.
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E3779B97F4A7C15);
        let mut z = self.state;
        z ^= z >> 30;
        z = z.wrapping_mul(0xBF58476D1CE4E5B9);
        z ^= z >> 27;
        z = z.wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }

    fn next_range(&mut self, max: usize) -> usize {
        let m = max as u64;
        // Rejection sampling below `limit` avoids modulo bias.
        let limit = u64::MAX - (u64::MAX % m);
        loop {
            let x = self.next();
            if x < limit {
                return (x % m) as usize;
            }
        }
    }
}

/// Fisher-Yates shuffle using the deterministic RNG.
pub fn shuffle_with_seed(deck: &mut [Card], seed: u64) {
    let mut rng = SplitMix64::new(seed);
    for i in (1..deck.len()).rev() {
        let j = rng.next_range(i + 1);
        deck.swap(i, j);
    }
}

/// Derive the dealing seed for a round from the match's base seed.
/// Unique per (match, round), stable across re-deals of the same round.
pub fn derive_dealing_seed(match_seed: u64, round_no: u32) -> u64 {
    match_seed
        .wrapping_add((round_no as u64).wrapping_mul(1_000_000))
        .wrapping_add(2)
}

/// Deal a new round for the match: shuffled deck, 5 cards per seat in seat
/// order, first seat to act. The returned Round carries a placeholder id;
/// the store assigns the real one on create.
pub fn deal_round(
    mat: &Match,
    round_no: u32,
    now: OffsetDateTime,
) -> Result<Round, DomainError> {
    let player_count = mat.players.len();
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count) {
        return Err(DomainError::match_not_ready(format!(
            "cannot deal for {player_count} players (need {MIN_PLAYERS}..={MAX_PLAYERS})"
        )));
    }
    if round_no == 0 {
        return Err(DomainError::match_not_ready(
            "round numbers are 1-based",
        ));
    }

    let mut deck = full_deck();
    shuffle_with_seed(&mut deck, derive_dealing_seed(mat.rng_seed, round_no));

    let player_order: Vec<_> = mat.players.iter().map(|p| p.id).collect();
    let mut hands = BTreeMap::new();
    for (seat, &player) in player_order.iter().enumerate() {
        let start = seat * HAND_SIZE;
        hands.insert(player, deck[start..start + HAND_SIZE].to_vec());
    }

    Ok(Round {
        id: RoundId(0),
        match_id: mat.id,
        round_no,
        status: RoundStatus::InProgress,
        current_player: player_order[0],
        player_order,
        hands,
        table_pile: Vec::new(),
        consecutive_passes: 0,
        winner: None,
        move_count: 0,
        cards_in_play: player_count * HAND_SIZE,
        started_at: now,
        ended_at: None,
        version: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_fixtures::match_with_players;

    #[test]
    fn full_deck_has_36_unique_cards() {
        let deck = full_deck();
        assert_eq!(deck.len(), DECK_SIZE);
        for i in 0..deck.len() {
            for j in (i + 1)..deck.len() {
                assert_ne!(deck[i], deck[j], "duplicate card in deck");
            }
        }
    }

    #[test]
    fn dealing_is_deterministic_per_round() {
        let mat = match_with_players(3);
        let r1 = deal_round(&mat, 1, OffsetDateTime::now_utc()).unwrap();
        let r2 = deal_round(&mat, 1, OffsetDateTime::now_utc()).unwrap();
        assert_eq!(r1.hands, r2.hands);

        let r3 = deal_round(&mat, 2, OffsetDateTime::now_utc()).unwrap();
        assert_ne!(r1.hands, r3.hands, "different rounds get different deals");
    }

    #[test]
    fn deal_gives_each_seat_five_cards_and_no_duplicates() {
        let mat = match_with_players(4);
        let round = deal_round(&mat, 1, OffsetDateTime::now_utc()).unwrap();
        assert_eq!(round.cards_in_play, 20);

        let mut all: Vec<Card> = Vec::new();
        for hand in round.hands.values() {
            assert_eq!(hand.len(), HAND_SIZE);
            all.extend(hand.iter().copied());
        }
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 20, "dealt cards must be unique");
    }

    #[test]
    fn first_seat_starts_and_order_matches_seating() {
        let mat = match_with_players(2);
        let round = deal_round(&mat, 1, OffsetDateTime::now_utc()).unwrap();
        assert_eq!(round.current_player, mat.players[0].id);
        assert_eq!(
            round.player_order,
            mat.players.iter().map(|p| p.id).collect::<Vec<_>>()
        );
    }

    #[test]
    fn rejects_invalid_player_counts() {
        let mat = match_with_players(1);
        assert!(deal_round(&mat, 1, OffsetDateTime::now_utc()).is_err());
    }
}

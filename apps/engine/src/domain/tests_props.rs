use std::collections::BTreeSet;

use proptest::prelude::*;
use time::OffsetDateTime;

use crate::domain::dealing::{deal_round, full_deck, shuffle_with_seed};
use crate::domain::rounds::{pass, play_card, verify_invariants};
use crate::domain::rules::{legal_cards, HAND_SIZE};
use crate::domain::state::RoundStatus;
use crate::domain::test_fixtures::match_with_players;

proptest! {
    #[test]
    fn shuffle_is_a_deterministic_permutation(seed in any::<u64>()) {
        let mut a = full_deck();
        let mut b = full_deck();
        shuffle_with_seed(&mut a, seed);
        shuffle_with_seed(&mut b, seed);
        prop_assert_eq!(&a, &b);

        let distinct: BTreeSet<_> = a.iter().copied().collect();
        prop_assert_eq!(distinct.len(), a.len());
        prop_assert_eq!(a.len(), full_deck().len());
    }

    #[test]
    fn dealt_hands_are_disjoint_deck_subsets(
        seed in any::<u64>(),
        n in 2usize..=4,
        round_no in 1u32..=50,
    ) {
        let mut m = match_with_players(n);
        m.rng_seed = seed;
        let round = deal_round(&m, round_no, OffsetDateTime::now_utc()).unwrap();

        let deck: BTreeSet<_> = full_deck().into_iter().collect();
        let mut seen = BTreeSet::new();
        for hand in round.hands.values() {
            prop_assert_eq!(hand.len(), HAND_SIZE);
            for card in hand {
                prop_assert!(deck.contains(card));
                prop_assert!(seen.insert(*card), "card dealt twice: {}", card);
            }
        }
        prop_assert_eq!(round.cards_in_play, n * HAND_SIZE);
        verify_invariants(&round).unwrap();
    }

    #[test]
    fn same_seed_same_round_deals_identically(seed in any::<u64>(), n in 2usize..=4) {
        let mut m = match_with_players(n);
        m.rng_seed = seed;
        let a = deal_round(&m, 3, OffsetDateTime::now_utc()).unwrap();
        let b = deal_round(&m, 3, OffsetDateTime::now_utc()).unwrap();
        prop_assert_eq!(a.hands, b.hands);
    }

    // Drive a dealt round with an arbitrary actor policy: whoever is current
    // plays their first legal card when `choices` says play (and one exists),
    // otherwise passes. The state machine must uphold its invariants at every
    // step and either finish or stay live.
    #[test]
    fn random_play_preserves_round_invariants(
        seed in any::<u64>(),
        n in 2usize..=4,
        choices in proptest::collection::vec(any::<bool>(), 0..120),
    ) {
        let mut m = match_with_players(n);
        m.rng_seed = seed;
        let mut round = deal_round(&m, 1, OffsetDateTime::now_utc()).unwrap();
        let now = OffsetDateTime::now_utc();
        let mut expected_move_no = 0u32;

        for prefer_play in choices {
            if round.status != RoundStatus::InProgress {
                break;
            }
            let actor = round.current_player;
            let legal = legal_cards(round.hand(actor).unwrap(), round.top_card());
            let record = if prefer_play && !legal.is_empty() {
                play_card(&mut round, actor, legal[0], now).unwrap().record
            } else {
                pass(&mut round, actor, now).unwrap().record
            };

            expected_move_no += 1;
            prop_assert_eq!(record.move_no, expected_move_no);
            prop_assert!(round.player_order.contains(&round.current_player));
            prop_assert!((round.consecutive_passes as usize) < round.player_order.len());
            verify_invariants(&round).unwrap();
        }

        if round.status == RoundStatus::Completed {
            let winner = round.winner.expect("completed round has a winner");
            prop_assert!(round.hand(winner).unwrap().is_empty());
        } else {
            prop_assert!(round.winner.is_none());
        }
    }
}

use time::OffsetDateTime;

use crate::domain::cards::Card;
use crate::domain::rounds::{pass, play_card, verify_invariants};
use crate::domain::state::{MoveKind, PlayerId, RoundStatus};
use crate::domain::test_fixtures::{parse_cards, round_with_hands};
use crate::errors::domain::{DomainError, InvalidMoveKind};

fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

fn card(token: &str) -> Card {
    token.parse().expect("hardcoded valid card token")
}

#[test]
fn play_onto_empty_pile_accepts_any_held_card() {
    let mut round = round_with_hands(vec![
        (1, parse_cards(&["3S", "9H"])),
        (2, parse_cards(&["5C", "7D"])),
    ]);
    let outcome = play_card(&mut round, PlayerId(1), card("9H"), now()).unwrap();
    assert!(!outcome.round_completed);
    assert_eq!(round.top_card(), Some(card("9H")));
    assert_eq!(round.current_player, PlayerId(2));
    assert_eq!(outcome.record.move_no, 1);
    assert_eq!(outcome.record.kind, MoveKind::PlayCard);
}

#[test]
fn out_of_turn_and_unheld_cards_are_rejected_without_mutation() {
    let mut round = round_with_hands(vec![
        (1, parse_cards(&["3S", "9H"])),
        (2, parse_cards(&["5C", "7D"])),
    ]);
    let before = round.clone();

    let err = play_card(&mut round, PlayerId(2), card("5C"), now()).unwrap_err();
    assert!(matches!(
        err,
        DomainError::InvalidMove(InvalidMoveKind::OutOfTurn, _)
    ));

    let err = play_card(&mut round, PlayerId(1), card("TC"), now()).unwrap_err();
    assert!(matches!(
        err,
        DomainError::InvalidMove(InvalidMoveKind::CardNotHeld, _)
    ));

    assert_eq!(round.hands, before.hands);
    assert_eq!(round.table_pile, before.table_pile);
    assert_eq!(round.move_count, 0);
}

#[test]
fn illegal_cards_rejected_but_pass_succeeds() {
    // Table top 7H; hand has wrong-rank heart and wrong-suit nine.
    let mut round = round_with_hands(vec![
        (1, parse_cards(&["7H", "2S"])),
        (2, parse_cards(&["5H", "9S", "3C"])),
    ]);
    play_card(&mut round, PlayerId(1), card("7H"), now()).unwrap();

    for token in ["5H", "9S"] {
        let err = play_card(&mut round, PlayerId(2), card(token), now()).unwrap_err();
        assert!(
            matches!(
                err,
                DomainError::InvalidMove(InvalidMoveKind::RuleViolation, _)
            ),
            "{token} should violate the suit/rank rule"
        );
    }

    let outcome = pass(&mut round, PlayerId(2), now()).unwrap();
    assert!(!outcome.pile_cleared);
    assert_eq!(round.consecutive_passes, 1);
    assert_eq!(round.current_player, PlayerId(1));
}

#[test]
fn emptying_the_hand_completes_the_round() {
    let mut round = round_with_hands(vec![
        (1, parse_cards(&["4D"])),
        (2, parse_cards(&["5C", "7D"])),
    ]);
    let outcome = play_card(&mut round, PlayerId(1), card("4D"), now()).unwrap();
    assert!(outcome.round_completed);
    assert_eq!(outcome.winner, Some(PlayerId(1)));
    assert_eq!(round.status, RoundStatus::Completed);
    assert_eq!(round.winner, Some(PlayerId(1)));
    assert!(round.ended_at.is_some());
    // current_player does not advance past the winner.
    assert_eq!(round.current_player, PlayerId(1));
}

#[test]
fn terminal_rounds_reject_all_mutation() {
    let mut round = round_with_hands(vec![
        (1, parse_cards(&["4D"])),
        (2, parse_cards(&["5C"])),
    ]);
    play_card(&mut round, PlayerId(1), card("4D"), now()).unwrap();

    assert!(matches!(
        play_card(&mut round, PlayerId(2), card("5C"), now()).unwrap_err(),
        DomainError::RoundNotActive(_)
    ));
    assert!(matches!(
        pass(&mut round, PlayerId(2), now()).unwrap_err(),
        DomainError::RoundNotActive(_)
    ));
}

#[test]
fn all_pass_clears_pile_and_resets_counter() {
    let mut round = round_with_hands(vec![
        (1, parse_cards(&["TH", "2C"])),
        (2, parse_cards(&["3C", "4C"])),
        (3, parse_cards(&["5D", "6D"])),
    ]);
    // 1 plays the ten of hearts; nobody can beat it.
    play_card(&mut round, PlayerId(1), card("TH"), now()).unwrap();
    pass(&mut round, PlayerId(2), now()).unwrap();
    pass(&mut round, PlayerId(3), now()).unwrap();
    let outcome = pass(&mut round, PlayerId(1), now()).unwrap();

    assert!(outcome.pile_cleared);
    assert!(round.table_pile.is_empty());
    assert_eq!(round.consecutive_passes, 0);
    assert_eq!(round.current_player, PlayerId(2));
    // The discarded card left play; invariants still hold.
    verify_invariants(&round).unwrap();
    assert_eq!(round.cards_in_play, 5);
}

#[test]
fn successful_play_resets_pass_counter() {
    let mut round = round_with_hands(vec![
        (1, parse_cards(&["4H", "2C"])),
        (2, parse_cards(&["6H", "4C"])),
        (3, parse_cards(&["5D", "6D"])),
    ]);
    play_card(&mut round, PlayerId(1), card("4H"), now()).unwrap();
    pass(&mut round, PlayerId(2), now()).unwrap();
    assert_eq!(round.consecutive_passes, 1);
    pass(&mut round, PlayerId(3), now()).unwrap();
    assert_eq!(round.consecutive_passes, 2);

    // 1 beats their own card; the counter resets before reaching 3.
    // (1's 4H is topped by... nothing; 1 has 2C which is illegal. So pass.)
    let outcome = pass(&mut round, PlayerId(1), now()).unwrap();
    assert!(outcome.pile_cleared);

    // Fresh pile: 2 plays, counter stays at zero afterwards.
    play_card(&mut round, PlayerId(2), card("4C"), now()).unwrap();
    assert_eq!(round.consecutive_passes, 0);
}

#[test]
fn move_numbers_are_gapless_across_plays_and_passes() {
    let mut round = round_with_hands(vec![
        (1, parse_cards(&["4H", "2C"])),
        (2, parse_cards(&["6H", "4C"])),
    ]);
    let m1 = play_card(&mut round, PlayerId(1), card("4H"), now()).unwrap();
    let m2 = play_card(&mut round, PlayerId(2), card("6H"), now()).unwrap();
    let m3 = pass(&mut round, PlayerId(1), now()).unwrap();
    assert_eq!(
        (m1.record.move_no, m2.record.move_no, m3.record.move_no),
        (1, 2, 3)
    );
}

#[test]
fn corrupted_rounds_fail_loudly() {
    let mut round = round_with_hands(vec![
        (1, parse_cards(&["4H"])),
        (2, parse_cards(&["6H"])),
    ]);
    round.current_player = PlayerId(99); // not seated
    let err = pass(&mut round, PlayerId(99), now()).unwrap_err();
    assert!(matches!(err, DomainError::Infra(_, _)), "got {err}");

    let mut round = round_with_hands(vec![
        (1, parse_cards(&["4H"])),
        (2, parse_cards(&["6H"])),
    ]);
    round.cards_in_play = 10; // card-count mismatch
    let err = play_card(&mut round, PlayerId(1), card("4H"), now()).unwrap_err();
    assert!(matches!(err, DomainError::Infra(_, _)), "got {err}");
}

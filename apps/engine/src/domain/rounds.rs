//! Round state machine: play_card and pass transitions.
//!
//! Both entry points verify the round's structural invariants before doing
//! anything. A violated invariant means corrupted state; we abort loudly
//! instead of patching around it. On any error the round is untouched.

use time::OffsetDateTime;

use crate::domain::cards::Card;
use crate::domain::rules::is_legal_play;
use crate::domain::state::{
    MoveKind, MoveRecord, PlayerId, Round, RoundSnapshot, RoundStatus, TablePlay,
};
use crate::errors::domain::{DomainError, InvalidMoveKind};

/// Result of a successful play, describing what changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayOutcome {
    /// The actor emptied their hand; the round is now Completed.
    pub round_completed: bool,
    pub winner: Option<PlayerId>,
    pub record: MoveRecord,
}

/// Result of a successful pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassOutcome {
    /// Every active player passed in a row; the pile was discarded.
    pub pile_cleared: bool,
    pub record: MoveRecord,
}

fn snapshot(round: &Round) -> RoundSnapshot {
    RoundSnapshot {
        current_player: round.current_player,
        consecutive_passes: round.consecutive_passes,
        table_len: round.table_pile.len(),
        hand_counts: round
            .player_order
            .iter()
            .map(|&p| (p, round.hands.get(&p).map_or(0, Vec::len)))
            .collect(),
    }
}

fn ensure_active(round: &Round) -> Result<(), DomainError> {
    if round.status.is_terminal() {
        return Err(DomainError::round_not_active(format!(
            "round {} is {:?}",
            round.round_no, round.status
        )));
    }
    Ok(())
}

/// Structural invariants that must hold for every observed InProgress round.
pub fn verify_invariants(round: &Round) -> Result<(), DomainError> {
    let in_hands: usize = round.hands.values().map(Vec::len).sum();
    let observed = in_hands + round.table_pile.len();
    if observed != round.cards_in_play {
        return Err(DomainError::corruption(format!(
            "card count mismatch in round {}: hands+pile={} expected={}",
            round.round_no, observed, round.cards_in_play
        )));
    }
    if !round.player_order.contains(&round.current_player) {
        return Err(DomainError::corruption(format!(
            "current player {} not in player_order of round {}",
            round.current_player.0, round.round_no
        )));
    }
    for &p in &round.player_order {
        if !round.hands.contains_key(&p) {
            return Err(DomainError::corruption(format!(
                "player {} in turn order has no hand in round {}",
                p.0, round.round_no
            )));
        }
    }
    Ok(())
}

/// Play a card onto the table pile, enforcing turn, possession and the
/// same-suit/higher-rank rule. Emptying the hand completes the round.
pub fn play_card(
    round: &mut Round,
    actor: PlayerId,
    card: Card,
    now: OffsetDateTime,
) -> Result<PlayOutcome, DomainError> {
    ensure_active(round)?;
    verify_invariants(round)?;

    if actor != round.current_player {
        return Err(DomainError::invalid_move(
            InvalidMoveKind::OutOfTurn,
            format!("player {} acted on {}'s turn", actor.0, round.current_player.0),
        ));
    }

    let hand = round.hand(actor)?;
    let Some(pos) = hand.iter().position(|&c| c == card) else {
        return Err(DomainError::invalid_move(
            InvalidMoveKind::CardNotHeld,
            format!("player {} does not hold {card}", actor.0),
        ));
    };

    if !is_legal_play(card, round.top_card()) {
        let top = round
            .top_card()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "empty pile".into());
        return Err(DomainError::invalid_move(
            InvalidMoveKind::RuleViolation,
            format!("{card} does not beat {top} (need same suit, higher rank)"),
        ));
    }

    let before = snapshot(round);

    // All checks passed; mutate.
    let removed = {
        let hand_mut = round
            .hands
            .get_mut(&actor)
            .ok_or_else(|| DomainError::corruption("hand vanished mid-move"))?;
        hand_mut.remove(pos)
    };
    round.table_pile.push(TablePlay {
        player: actor,
        card: removed,
    });
    round.consecutive_passes = 0;
    round.move_count += 1;

    let hand_emptied = round
        .hands
        .get(&actor)
        .map_or(false, Vec::is_empty);

    if hand_emptied {
        round.status = RoundStatus::Completed;
        round.winner = Some(actor);
        round.ended_at = Some(now);
    } else {
        round.current_player = round.next_player()?;
    }

    let record = MoveRecord {
        round_id: round.id,
        move_no: round.move_count,
        actor,
        kind: MoveKind::PlayCard,
        card: Some(card),
        before,
        after: snapshot(round),
        at: now,
    };

    Ok(PlayOutcome {
        round_completed: hand_emptied,
        winner: round.winner,
        record,
    })
}

/// Pass the turn. Always legal for the acting player, even when a playable
/// card exists. When every active player has passed in a row, the pile is
/// discarded uncredited.
pub fn pass(
    round: &mut Round,
    actor: PlayerId,
    now: OffsetDateTime,
) -> Result<PassOutcome, DomainError> {
    ensure_active(round)?;
    verify_invariants(round)?;

    if actor != round.current_player {
        return Err(DomainError::invalid_move(
            InvalidMoveKind::OutOfTurn,
            format!("player {} acted on {}'s turn", actor.0, round.current_player.0),
        ));
    }

    let before = snapshot(round);

    round.consecutive_passes += 1;
    let pile_cleared = round.consecutive_passes as usize >= round.active_players();
    if pile_cleared {
        // Discarded, not awarded: the unresolved trick credits nobody.
        let discarded: usize = round.table_pile.len();
        round.cards_in_play -= discarded;
        round.table_pile.clear();
        round.consecutive_passes = 0;
    }
    round.current_player = round.next_player()?;
    round.move_count += 1;

    let record = MoveRecord {
        round_id: round.id,
        move_no: round.move_count,
        actor,
        kind: MoveKind::Pass,
        card: None,
        before,
        after: snapshot(round),
        at: now,
    };

    Ok(PassOutcome {
        pile_cleared,
        record,
    })
}

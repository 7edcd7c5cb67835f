//! Match-level score tallies and win detection.
//!
//! Tallies are rounds won per player. The authoritative source is the
//! completed-round history in the store; the cached copy in
//! `services::score_cache` is an optimization only.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::state::{Match, PlayerId};

pub type Tallies = HashMap<PlayerId, u32>;

/// Credit one round win to the player.
pub fn bump(tallies: &mut Tallies, winner: PlayerId) {
    *tallies.entry(winner).or_insert(0) += 1;
}

/// A player wins the match iff their tally reached the target.
pub fn match_winner(tallies: &Tallies, rounds_to_win: u32) -> Option<PlayerId> {
    tallies
        .iter()
        .find(|(_, &score)| score >= rounds_to_win)
        .map(|(&player, _)| player)
}

/// The player with the strictly highest positive tally, or None on a tie or
/// when nobody has won a round. Used by forced termination: a forced end
/// never picks an arbitrary winner.
pub fn strict_leader(tallies: &Tallies) -> Option<PlayerId> {
    let best = tallies.values().copied().max()?;
    if best == 0 {
        return None;
    }
    let mut at_best = tallies.iter().filter(|(_, &s)| s == best);
    let (&leader, _) = at_best.next()?;
    if at_best.next().is_some() {
        return None; // tied
    }
    Some(leader)
}

/// One row of the per-player standings view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub player: PlayerId,
    pub display_name: String,
    pub is_bot: bool,
    pub score: u32,
    pub needed_to_win: u32,
}

/// Standings for every seated player, in seat order.
pub fn standings(mat: &Match, tallies: &Tallies) -> Vec<Standing> {
    mat.players
        .iter()
        .map(|p| {
            let score = tallies.get(&p.id).copied().unwrap_or(0);
            Standing {
                player: p.id,
                display_name: p.display_name.clone(),
                is_bot: p.is_bot(),
                score,
                needed_to_win: mat.rounds_to_win.saturating_sub(score),
            }
        })
        .collect()
}

#![cfg(test)]

//! Shared builders for domain unit tests.

use std::collections::BTreeMap;

use time::OffsetDateTime;

use crate::domain::cards::{try_parse_cards, Card};
use crate::domain::state::{
    Match, MatchCode, MatchId, MatchStatus, PlayerId, PlayerKind, Round, RoundId, RoundStatus,
    SeatedPlayer,
};

pub fn seated_player(id: i64, kind: PlayerKind) -> SeatedPlayer {
    SeatedPlayer {
        id: PlayerId(id),
        display_name: format!("player-{id}"),
        kind,
    }
}

/// A Playing match with `n` humans seated, ids 1..=n.
pub fn match_with_players(n: usize) -> Match {
    let players = (1..=n as i64)
        .map(|id| seated_player(id, PlayerKind::Human))
        .collect();
    Match {
        id: MatchId(1),
        code: MatchCode::new("TESTCODE01"),
        bet_amount: 500,
        pot_amount: 500 * n as u64,
        commission_amount: 500 * n as u64 / 10,
        rounds_to_win: 3,
        max_players: n.max(2),
        status: MatchStatus::Playing,
        players,
        winner: None,
        is_exhibition: false,
        rng_seed: 12345,
        time_limit: None,
        started_at: Some(OffsetDateTime::now_utc()),
        finished_at: None,
        version: 1,
    }
}

pub fn parse_cards(tokens: &[&str]) -> Vec<Card> {
    try_parse_cards(tokens).expect("hardcoded valid card tokens")
}

/// A hand-built round with explicit hands, first listed player to act.
pub fn round_with_hands(hands: Vec<(i64, Vec<Card>)>) -> Round {
    let player_order: Vec<PlayerId> = hands.iter().map(|(id, _)| PlayerId(*id)).collect();
    let cards_in_play = hands.iter().map(|(_, h)| h.len()).sum();
    let hands: BTreeMap<PlayerId, Vec<Card>> = hands
        .into_iter()
        .map(|(id, h)| (PlayerId(id), h))
        .collect();
    Round {
        id: RoundId(7),
        match_id: MatchId(1),
        round_no: 1,
        status: RoundStatus::InProgress,
        current_player: player_order[0],
        player_order,
        hands,
        table_pile: Vec::new(),
        consecutive_passes: 0,
        winner: None,
        move_count: 0,
        cards_in_play,
        started_at: OffsetDateTime::now_utc(),
        ended_at: None,
        version: 0,
    }
}

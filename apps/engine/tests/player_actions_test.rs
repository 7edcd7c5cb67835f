mod common;

use common::{current_round, harness, human, setup, started_match, started_match_with};
use lamap_engine::domain::rounds;
use lamap_engine::domain::rules::legal_cards;
use lamap_engine::domain::state::{PlayerId, RoundStatus};
use lamap_engine::errors::domain::{DomainError, InvalidMoveKind};
use lamap_engine::repos::GameStore;
use time::{Duration, OffsetDateTime};

#[tokio::test]
async fn out_of_turn_submission_is_rejected() {
    let h = harness();
    let players = [human(1), human(2)];
    let (game, round) = started_match(&h, &players, 3, 42).await;

    let waiting = round
        .player_order
        .iter()
        .copied()
        .find(|p| *p != round.current_player)
        .unwrap();
    let card = round.hand(waiting).unwrap()[0];

    let err = h.flow.submit_play(game.id, waiting, card).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::InvalidMove(InvalidMoveKind::OutOfTurn, _)
    ));

    // Nothing moved.
    let after = current_round(&h, game.id).await;
    assert_eq!(after.move_count, 0);
    assert_eq!(after.version, round.version);
}

#[tokio::test]
async fn unheld_card_is_rejected() {
    let h = harness();
    let players = [human(1), human(2)];
    let (game, round) = started_match(&h, &players, 3, 42).await;

    let actor = round.current_player;
    let other = round.player_order.iter().copied().find(|p| *p != actor).unwrap();
    let foreign = round.hand(other).unwrap()[0];

    let err = h.flow.submit_play(game.id, actor, foreign).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::InvalidMove(InvalidMoveKind::CardNotHeld, _)
    ));
}

#[tokio::test]
async fn pass_is_always_available_on_your_turn() {
    let h = harness();
    let players = [human(1), human(2)];
    let (game, round) = started_match(&h, &players, 3, 42).await;

    let actor = round.current_player;
    // Legal cards exist (empty table), yet passing still succeeds.
    assert!(!legal_cards(round.hand(actor).unwrap(), round.top_card()).is_empty());
    h.flow.submit_pass(game.id, actor).await.unwrap();

    let after = current_round(&h, game.id).await;
    assert_eq!(after.consecutive_passes, 1);
    assert_ne!(after.current_player, actor);
}

#[tokio::test]
async fn expired_time_limit_blocks_moves() {
    let h = harness();
    let players = [human(1), human(2)];
    let mut s = setup(&players, 3, 42);
    s.time_limit = Some(Duration::ZERO);
    let (game, round) = started_match_with(&h, s, &players).await;

    let actor = round.current_player;
    let card = round.hand(actor).unwrap()[0];
    let err = h.flow.submit_play(game.id, actor, card).await.unwrap_err();
    assert!(matches!(err, DomainError::TimeoutExpired(_)));
    let err = h.flow.submit_pass(game.id, actor).await.unwrap_err();
    assert!(matches!(err, DomainError::TimeoutExpired(_)));
}

#[tokio::test]
async fn expire_resolves_a_timed_out_match() {
    let h = harness();
    let players = [human(1), human(2)];
    let mut s = setup(&players, 3, 42);
    s.time_limit = Some(Duration::ZERO);
    let (game, _) = started_match_with(&h, s, &players).await;

    let now = OffsetDateTime::now_utc();
    let resolved = h.flow.expire_if_timed_out(game.id, now).await.unwrap();
    assert!(resolved.is_some());

    // Second call is a clean no-op: the match is no longer Playing.
    let again = h.flow.expire_if_timed_out(game.id, now).await.unwrap();
    assert!(again.is_none());
}

#[tokio::test]
async fn stale_version_commit_is_a_conflict() {
    let h = harness();
    let players = [human(1), human(2)];
    let (game, _) = started_match(&h, &players, 3, 42).await;

    // Land one real move, then replay its commit with the old version.
    let round = current_round(&h, game.id).await;
    let actor = round.current_player;
    let mut fork = round.clone();
    let outcome = rounds::play_card(
        &mut fork,
        actor,
        round.hand(actor).unwrap()[0],
        OffsetDateTime::now_utc(),
    )
    .unwrap();
    h.store
        .commit_move(&fork, &outcome.record, round.version)
        .await
        .unwrap();

    let err = h
        .store
        .commit_move(&fork, &outcome.record, round.version)
        .await
        .unwrap_err();
    assert!(err.is_concurrent_modification());

    // The flow path recovers: it re-reads and the round is still live.
    let live = current_round(&h, game.id).await;
    assert_eq!(live.status, RoundStatus::InProgress);
    assert_eq!(live.move_count, 1);
}

#[tokio::test]
async fn moves_on_unknown_match_are_not_found() {
    let h = harness();
    let err = h
        .flow
        .submit_pass(lamap_engine::MatchId(777), PlayerId(1))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_, _)));
}

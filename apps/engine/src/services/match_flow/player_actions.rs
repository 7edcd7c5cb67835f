//! Play/pass submission: validation, commit, events, round chaining.

use serde_json::json;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::domain::cards::Card;
use crate::domain::rounds::{self, PassOutcome, PlayOutcome};
use crate::domain::state::{Match, MatchId, PlayerId, Round};
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::events::TransitionType;
use crate::services::match_flow::{MatchFlowService, TransitionResult};

impl MatchFlowService {
    /// Plays `card` for `actor` in the match's current round.
    pub async fn submit_play(
        &self,
        match_id: MatchId,
        actor: PlayerId,
        card: Card,
    ) -> Result<TransitionResult, DomainError> {
        let now = OffsetDateTime::now_utc();
        let (game, stale) = self.live_round(match_id, now).await?;

        let _guard = self.lock_round(stale.id).await;
        // Re-read under the lock; another in-process move may have landed
        // between the lookup and the acquisition.
        let mut round = self.store.find_round(stale.id).await?;
        let expected_version = round.version;

        let outcome: PlayOutcome = rounds::play_card(&mut round, actor, card, now)?;
        let round = self
            .store
            .commit_move(&round, &outcome.record, expected_version)
            .await?;

        debug!(code = %game.code, actor = actor.0, %card, move_no = outcome.record.move_no, "card played");
        self.emit(
            &game,
            TransitionType::CardPlayed,
            json!({
                "actor": actor,
                "card": card.to_string(),
                "round_no": round.round_no,
                "move_no": outcome.record.move_no,
            }),
        )
        .await;

        if outcome.round_completed {
            self.complete_round(&game, &round, now).await
        } else {
            self.notify_bot_turn(match_id).await;
            Ok(TransitionResult::RoundContinues)
        }
    }

    /// Records a pass for `actor`. Passing is always allowed on your turn,
    /// legal cards in hand or not.
    pub async fn submit_pass(
        &self,
        match_id: MatchId,
        actor: PlayerId,
    ) -> Result<TransitionResult, DomainError> {
        let now = OffsetDateTime::now_utc();
        let (game, stale) = self.live_round(match_id, now).await?;

        let _guard = self.lock_round(stale.id).await;
        let mut round = self.store.find_round(stale.id).await?;
        let expected_version = round.version;

        let outcome: PassOutcome = rounds::pass(&mut round, actor, now)?;
        let round = self
            .store
            .commit_move(&round, &outcome.record, expected_version)
            .await?;

        debug!(code = %game.code, actor = actor.0, move_no = outcome.record.move_no, "pass recorded");
        self.emit(
            &game,
            TransitionType::PlayerPassed,
            json!({
                "actor": actor,
                "round_no": round.round_no,
                "move_no": outcome.record.move_no,
            }),
        )
        .await;

        if outcome.pile_cleared {
            info!(code = %game.code, round_no = round.round_no, "table pile discarded after all-pass");
            self.emit(
                &game,
                TransitionType::PileCleared,
                json!({ "round_no": round.round_no }),
            )
            .await;
        }

        self.notify_bot_turn(match_id).await;
        Ok(TransitionResult::RoundContinues)
    }

    /// Match + current-round lookup shared by both submission paths.
    async fn live_round(
        &self,
        match_id: MatchId,
        now: OffsetDateTime,
    ) -> Result<(Match, Round), DomainError> {
        let game = self.store.find_match(match_id).await?;
        Self::ensure_playing(&game)?;
        if game.timed_out(now) {
            return Err(DomainError::timeout_expired(format!(
                "match {} exceeded its time limit; awaiting forced resolution",
                game.code
            )));
        }
        let round = self.store.current_round(match_id).await?.ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Round,
                format!("match {} has no dealt round", game.code),
            )
        })?;
        Ok((game, round))
    }

    /// Round just completed: credit the win, announce it, and hand over to
    /// the transition orchestrator.
    async fn complete_round(
        &self,
        game: &Match,
        round: &Round,
        now: OffsetDateTime,
    ) -> Result<TransitionResult, DomainError> {
        let winner = round.winner.ok_or_else(|| {
            DomainError::corruption(format!("completed round {} has no winner", round.id.0))
        })?;
        self.release_round(round.id);

        let tallies = self.scores.record_round_win(game.id, winner).await?;
        info!(code = %game.code, round_no = round.round_no, winner = winner.0, "round completed");
        self.emit(
            game,
            TransitionType::RoundCompleted,
            json!({
                "round_no": round.round_no,
                "winner": winner,
                "tallies": tallies,
            }),
        )
        .await;

        self.handle_round_end(game.id, round.round_no, tallies, now)
            .await
    }
}

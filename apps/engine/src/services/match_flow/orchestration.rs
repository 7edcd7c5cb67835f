//! Match formation, round chaining, and forced termination.

use serde_json::json;
use time::{Duration, OffsetDateTime};
use tracing::{info, warn};

use crate::domain::achievements;
use crate::domain::cards::Card;
use crate::domain::dealing::deal_round;
use crate::domain::rules::{MAX_PLAYERS, MIN_PLAYERS};
use crate::domain::scoring::{self, Standing, Tallies};
use crate::domain::state::{
    Match, MatchCode, MatchId, MatchStatus, MoneyOutcome, PlayerId, PlayerStats, Round,
    RoundStatus, SeatedPlayer,
};
use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::events::TransitionType;
use crate::services::match_flow::{MatchFlowService, TransitionResult};
use crate::util::join_code::generate_match_code;

/// Parameters for forming a new match.
#[derive(Debug, Clone)]
pub struct MatchSetup {
    pub creator: SeatedPlayer,
    pub bet_amount: u64,
    pub rounds_to_win: u32,
    pub max_players: usize,
    pub is_exhibition: bool,
    pub time_limit: Option<Duration>,
    /// Explicit seed for reproducible deals; random when absent.
    pub rng_seed: Option<u64>,
}

/// What one player is allowed to see of a live match.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PlayerView {
    pub code: String,
    pub status: MatchStatus,
    pub pot: u64,
    pub round_no: Option<u32>,
    pub your_hand: Vec<String>,
    pub top_card: Option<String>,
    pub current_player: Option<PlayerId>,
    pub your_turn: bool,
    pub hand_counts: Vec<(PlayerId, usize)>,
    pub standings: Vec<Standing>,
    pub time_remaining_secs: Option<i64>,
}

/// Player-agnostic snapshot of a match, keyed by its join code. Carries
/// no hands; safe to hand to spectators and operational tooling.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TransitionState {
    pub code: String,
    pub status: MatchStatus,
    pub pot: u64,
    pub round_no: Option<u32>,
    pub current_player: Option<PlayerId>,
    pub standings: Vec<Standing>,
    pub winner: Option<PlayerId>,
    pub time_remaining_secs: Option<i64>,
}

impl MatchFlowService {
    /// Creates a match in Waiting with the creator seated. Flips to Ready
    /// the moment the table fills (see [`Self::join_match`]).
    pub async fn create_match(&self, setup: MatchSetup) -> Result<Match, DomainError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&setup.max_players) {
            return Err(DomainError::match_not_ready(format!(
                "max_players {} outside {MIN_PLAYERS}..={MAX_PLAYERS}",
                setup.max_players
            )));
        }
        if setup.rounds_to_win == 0 {
            return Err(DomainError::match_not_ready("rounds_to_win must be positive"));
        }
        if setup.bet_amount == 0 && !setup.is_exhibition {
            return Err(DomainError::match_not_ready(
                "staked match requires a positive bet",
            ));
        }
        if setup.is_exhibition && setup.bet_amount != 0 {
            return Err(DomainError::match_not_ready(
                "exhibition match cannot carry a bet",
            ));
        }

        let pot_amount = setup.bet_amount * setup.max_players as u64;
        let game = Match {
            id: MatchId(0), // store assigns
            code: generate_match_code(),
            bet_amount: setup.bet_amount,
            pot_amount,
            commission_amount: pot_amount / 10,
            rounds_to_win: setup.rounds_to_win,
            max_players: setup.max_players,
            status: MatchStatus::Waiting,
            players: vec![setup.creator],
            winner: None,
            is_exhibition: setup.is_exhibition,
            rng_seed: setup.rng_seed.unwrap_or_else(rand::random),
            time_limit: setup.time_limit,
            started_at: None,
            finished_at: None,
            version: 0,
        };
        let game = self.store.create_match(game).await?;
        info!(code = %game.code, max_players = game.max_players, "match created");
        Ok(game)
    }

    /// Seats one more player. The last seat flips the match to Ready.
    pub async fn join_match(
        &self,
        match_id: MatchId,
        player: SeatedPlayer,
    ) -> Result<Match, DomainError> {
        let mut game = self.store.find_match(match_id).await?;
        if game.status != MatchStatus::Waiting {
            return Err(DomainError::match_not_ready(format!(
                "match {} is {:?}, not joinable",
                game.code, game.status
            )));
        }
        if game.player(player.id).is_some() {
            return Err(DomainError::match_not_ready(format!(
                "player {} already seated in {}",
                player.id.0, game.code
            )));
        }
        game.players.push(player);
        if game.players.len() == game.max_players {
            game.status = MatchStatus::Ready;
        }
        let version = game.version;
        self.store.update_match(&game, version).await
    }

    /// Starts a Ready match: stakes are locked, the first round is dealt,
    /// and the match goes to Playing.
    pub async fn start_match(&self, match_id: MatchId) -> Result<(Match, Round), DomainError> {
        let mut game = self.store.find_match(match_id).await?;
        if game.status != MatchStatus::Ready {
            return Err(DomainError::match_not_ready(format!(
                "match {} is {:?}, not Ready",
                game.code, game.status
            )));
        }

        if !game.is_exhibition {
            for player in &game.players {
                self.wallet
                    .lock_stake(player.id, &game.code, game.bet_amount)
                    .await?;
            }
        }

        let now = OffsetDateTime::now_utc();
        game.status = MatchStatus::Playing;
        game.started_at = Some(now);
        let version = game.version;
        let game = self.store.update_match(&game, version).await?;

        let round = deal_round(&game, 1, now)?;
        let round = self.store.create_round(round).await?;

        info!(code = %game.code, players = game.players.len(), "match started");
        self.emit(
            &game,
            TransitionType::MatchStarted,
            json!({
                "round_no": round.round_no,
                "players": game.players.iter().map(|p| p.id).collect::<Vec<_>>(),
                "pot": game.pot_amount,
            }),
        )
        .await;
        // First to act may well be a bot; get it thinking straight away.
        self.notify_bot_turn(game.id).await;

        Ok((game, round))
    }

    /// Round transition: either deals the next round or finishes the match
    /// when somebody reached the rounds-to-win target.
    pub(crate) async fn handle_round_end(
        &self,
        match_id: MatchId,
        ended_round_no: u32,
        tallies: Tallies,
        now: OffsetDateTime,
    ) -> Result<TransitionResult, DomainError> {
        let game = self.store.find_match(match_id).await?;
        Self::ensure_playing(&game)?;

        if let Some(winner) = scoring::match_winner(&tallies, game.rounds_to_win) {
            return self.finish_with_winner(game, winner, tallies, now).await;
        }

        let round = deal_round(&game, ended_round_no + 1, now)?;
        let round = self.store.create_round(round).await?;
        info!(code = %game.code, round_no = round.round_no, "next round dealt");
        self.emit(
            &game,
            TransitionType::NextRoundStarted,
            json!({ "round_no": round.round_no }),
        )
        .await;
        self.notify_bot_turn(game.id).await;
        Ok(TransitionResult::NextRound {
            round_no: round.round_no,
        })
    }

    /// Forced termination: abandon the live round, then settle to the
    /// strict leader if there is one, otherwise cancel and refund every
    /// stake in full.
    pub async fn force_end_game(
        &self,
        match_id: MatchId,
        reason: &str,
    ) -> Result<TransitionResult, DomainError> {
        let game = self.store.find_match(match_id).await?;
        Self::ensure_playing(&game)?;
        let now = OffsetDateTime::now_utc();

        if let Some(round) = self.store.current_round(match_id).await? {
            if round.status == RoundStatus::InProgress {
                self.store.abandon_round(round.id, now).await?;
                self.release_round(round.id);
            }
        }

        // Durable history only; a TTL-expired cache must not decide money.
        let tallies = self.store.rounds_won(match_id).await?;

        if let Some(leader) = scoring::strict_leader(&tallies) {
            info!(code = %game.code, leader = leader.0, reason, "forced end, settling to leader");
            return self.finish_with_winner(game, leader, tallies, now).await;
        }

        let refunded = self.cancel_with_refunds(game, reason, now).await?;
        Ok(TransitionResult::MatchCancelled {
            reason: reason.to_string(),
            refunded,
        })
    }

    /// Cancels a Playing match and returns every stake in full. The
    /// reserved commission is not kept on cancellation.
    async fn cancel_with_refunds(
        &self,
        mut game: Match,
        reason: &str,
        now: OffsetDateTime,
    ) -> Result<u64, DomainError> {
        game.status = MatchStatus::Cancelled;
        game.finished_at = Some(now);
        let version = game.version;
        let game = self.store.update_match(&game, version).await?;

        let mut refunded = 0u64;
        if !game.is_exhibition {
            for player in &game.players {
                self.wallet
                    .refund(player.id, &game.code, game.bet_amount)
                    .await?;
                refunded += game.bet_amount;
            }
        }

        warn!(code = %game.code, reason, refunded, "match cancelled");
        self.emit(
            &game,
            TransitionType::MatchCancelled,
            json!({ "reason": reason, "refunded": refunded }),
        )
        .await;
        self.scores.forget(game.id).await;
        Ok(refunded)
    }

    async fn finish_with_winner(
        &self,
        mut game: Match,
        winner: PlayerId,
        tallies: Tallies,
        now: OffsetDateTime,
    ) -> Result<TransitionResult, DomainError> {
        if game.player(winner).is_none() {
            return Err(DomainError::corruption(format!(
                "winner {} is not seated in match {}",
                winner.0, game.code
            )));
        }
        let winnings = if game.is_exhibition {
            0
        } else {
            game.pot_amount - game.commission_amount
        };

        game.status = MatchStatus::Finished;
        game.winner = Some(winner);
        game.finished_at = Some(now);

        let mut stats = Vec::with_capacity(game.players.len());
        let mut unlocked = Vec::new();
        for player in &game.players {
            let won = player.id == winner;
            let money = (!game.is_exhibition).then_some(MoneyOutcome {
                bet: game.bet_amount,
                winnings: if won { winnings } else { 0 },
            });
            let before: PlayerStats = self.store.player_stats(player.id).await?;
            let mut after = before.clone();
            after.apply_match_result(won, tallies.get(&player.id).copied().unwrap_or(0), money);
            for achievement in achievements::newly_unlocked(&before, &after) {
                info!(code = %game.code, player = player.id.0, achievement = %achievement.key(), "achievement unlocked");
                unlocked.push((player.id, achievement.key()));
            }
            stats.push((player.id, after));
        }

        let version = game.version;
        let game = self.store.finish_match(&game, version, &stats).await?;

        if !game.is_exhibition {
            self.wallet
                .settle_pot(winner, &game.code, winnings)
                .await
                .map_err(|err| {
                    DomainError::infra(
                        InfraErrorKind::Wallet,
                        format!("settlement of {} failed after finish: {err}", game.code),
                    )
                })?;
        }

        info!(code = %game.code, winner = winner.0, winnings, "match ended");
        self.emit(
            &game,
            TransitionType::MatchEnded,
            json!({
                "winner": winner,
                "tallies": tallies,
                "winnings": winnings,
                "achievements": unlocked,
            }),
        )
        .await;
        self.scores.forget(game.id).await;

        Ok(TransitionResult::MatchEnded {
            winner,
            final_tallies: tallies,
            winnings,
        })
    }

    /// Resolves a match whose wall clock ran out. No-op when the limit
    /// has not elapsed (or none is configured).
    pub async fn expire_if_timed_out(
        &self,
        match_id: MatchId,
        now: OffsetDateTime,
    ) -> Result<Option<TransitionResult>, DomainError> {
        let game = self.store.find_match(match_id).await?;
        if game.status != MatchStatus::Playing || !game.timed_out(now) {
            return Ok(None);
        }
        self.force_end_game(match_id, "time limit elapsed")
            .await
            .map(Some)
    }

    /// Post-terminal housekeeping: cache entry and lock table slots for
    /// the match are dropped. Safe to call any number of times.
    pub async fn cleanup_transition(&self, match_id: MatchId) -> Result<(), DomainError> {
        let game = self.store.find_match(match_id).await?;
        if game.status == MatchStatus::Playing {
            return Err(DomainError::match_not_ready(format!(
                "match {} is still Playing",
                game.code
            )));
        }
        if let Some(round) = self.store.current_round(match_id).await? {
            self.release_round(round.id);
        }
        self.scores.forget(match_id).await;
        Ok(())
    }

    /// Where the match stands, looked up by join code. Reads through the
    /// score cache for tallies; nothing player-private is included.
    pub async fn transition_state(&self, code: &MatchCode) -> Result<TransitionState, DomainError> {
        let game = self.store.find_match_by_code(code).await?;
        let tallies = self.scores.tallies(game.id).await?;
        let standings = scoring::standings(&game, &tallies);

        let round = self
            .store
            .current_round(game.id)
            .await?
            .filter(|r| r.status == RoundStatus::InProgress);

        let now = OffsetDateTime::now_utc();
        Ok(TransitionState {
            code: game.code.as_str().to_string(),
            status: game.status,
            pot: game.pot_amount,
            round_no: round.as_ref().map(|r| r.round_no),
            current_player: round.as_ref().map(|r| r.current_player),
            standings,
            winner: game.winner,
            time_remaining_secs: game.time_remaining(now).map(|d| d.whole_seconds()),
        })
    }

    /// What `player` may see: their own hand, everyone's card counts, the
    /// table top, standings, and the clock. Other hands stay hidden.
    pub async fn player_view(
        &self,
        match_id: MatchId,
        player: PlayerId,
    ) -> Result<PlayerView, DomainError> {
        let game = self.store.find_match(match_id).await?;
        if game.player(player).is_none() {
            return Err(DomainError::not_found(
                crate::errors::domain::NotFoundKind::Player,
                format!("player {} not seated in {}", player.0, game.code),
            ));
        }
        let tallies = self.scores.tallies(game.id).await?;
        let standings = scoring::standings(&game, &tallies);

        let round = self
            .store
            .current_round(match_id)
            .await?
            .filter(|r| r.status == RoundStatus::InProgress);

        let (round_no, your_hand, top_card, current_player, hand_counts) = match &round {
            Some(r) => (
                Some(r.round_no),
                r.hand(player)?.iter().map(Card::to_string).collect(),
                r.top_card().map(|c| c.to_string()),
                Some(r.current_player),
                r.player_order
                    .iter()
                    .map(|p| (*p, r.hand(*p).map(<[Card]>::len).unwrap_or(0)))
                    .collect(),
            ),
            None => (None, Vec::new(), None, None, Vec::new()),
        };

        let now = OffsetDateTime::now_utc();
        Ok(PlayerView {
            code: game.code.as_str().to_string(),
            status: game.status,
            pot: game.pot_amount,
            round_no,
            your_hand,
            top_card,
            current_player,
            your_turn: current_player == Some(player),
            hand_counts,
            standings,
            time_remaining_secs: game.time_remaining(now).map(|d| d.whole_seconds()),
        })
    }
}

//! Bot move scheduler: waits a difficulty-scaled "thinking" delay, then
//! re-validates and submits the move through the normal flow service.
//!
//! Jobs are fire-and-forget. A job whose preconditions no longer hold at
//! execution time (round over, somebody else to act, lost CAS race) is a
//! silent no-op recorded as Skipped; it is never retried.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::ai::{strategy_for, BotAction, RoundView};
use crate::domain::state::{BotDifficulty, MatchId, PlayerId, RoundId, RoundStatus};
use crate::errors::domain::DomainError;
use crate::services::match_flow::MatchFlowService;

/// Terminal state of one scheduled bot job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// The move was decided and committed.
    Completed,
    /// Preconditions no longer held; nothing was done.
    Skipped,
    /// Submission failed for a non-staleness reason.
    Failed,
}

/// Hard cap on retained job outcomes; old entries also age out on the
/// configured TTL so long-lived processes don't accumulate them.
const OUTCOME_CAPACITY: u64 = 4_096;

pub struct BotScheduler {
    flow: Arc<MatchFlowService>,
    /// Last job outcome per round, for observability and tests.
    outcomes: Cache<i64, JobOutcome>,
}

impl BotScheduler {
    /// Builds the scheduler and attaches it to the flow service, which
    /// from then on queues bot jobs after every committed transition
    /// that leaves a bot on turn.
    pub fn new(flow: Arc<MatchFlowService>) -> Arc<Self> {
        let outcomes = Cache::builder()
            .max_capacity(OUTCOME_CAPACITY)
            .time_to_live(flow.config().job_outcome_ttl)
            .build();
        let this = Arc::new(Self { flow, outcomes });
        this.flow.attach_scheduler(&this);
        this
    }

    pub fn last_outcome(&self, round_id: RoundId) -> Option<JobOutcome> {
        self.outcomes.get(&round_id.0)
    }

    /// Queues one bot move after the tier's thinking delay. The spawned
    /// job holds its own handles on the flow and outcome log, so it
    /// outlives any borrow of the scheduler.
    pub fn schedule(
        &self,
        match_id: MatchId,
        round_id: RoundId,
        bot: PlayerId,
        difficulty: BotDifficulty,
    ) {
        let delay = self.thinking_delay(difficulty);
        let flow = Arc::clone(&self.flow);
        let outcomes = self.outcomes.clone();
        tokio::spawn(async move {
            sleep(delay).await;
            let outcome = Self::execute(&flow, match_id, round_id, bot, difficulty).await;
            outcomes.insert(round_id.0, outcome);
        });
    }

    /// Looks at the current round and, when it is a bot's turn, schedules
    /// that bot. Called after every committed transition.
    pub async fn schedule_if_bot_turn(&self, match_id: MatchId) -> Result<(), DomainError> {
        let Some(round) = self.flow.store.current_round(match_id).await? else {
            return Ok(());
        };
        if round.status != RoundStatus::InProgress {
            return Ok(());
        }
        let game = self.flow.store.find_match(match_id).await?;
        let difficulty = game
            .player(round.current_player)
            .and_then(|p| p.difficulty());
        if let Some(difficulty) = difficulty {
            self.schedule(match_id, round.id, round.current_player, difficulty);
        }
        Ok(())
    }

    /// The due job body, separated so tests can drive it without waiting
    /// out the delay.
    pub async fn run_due_move(
        &self,
        match_id: MatchId,
        round_id: RoundId,
        bot: PlayerId,
        difficulty: BotDifficulty,
    ) -> JobOutcome {
        Self::execute(&self.flow, match_id, round_id, bot, difficulty).await
    }

    async fn execute(
        flow: &MatchFlowService,
        match_id: MatchId,
        round_id: RoundId,
        bot: PlayerId,
        difficulty: BotDifficulty,
    ) -> JobOutcome {
        match Self::try_move(flow, match_id, round_id, bot, difficulty).await {
            Ok(outcome) => outcome,
            Err(err)
                if matches!(
                    err,
                    DomainError::Conflict(_, _) | DomainError::TimeoutExpired(_)
                ) =>
            {
                debug!(round = round_id.0, bot = bot.0, %err, "bot job lost the race, skipping");
                JobOutcome::Skipped
            }
            Err(err) => {
                warn!(round = round_id.0, bot = bot.0, %err, "bot job failed");
                JobOutcome::Failed
            }
        }
    }

    async fn try_move(
        flow: &MatchFlowService,
        match_id: MatchId,
        round_id: RoundId,
        bot: PlayerId,
        difficulty: BotDifficulty,
    ) -> Result<JobOutcome, DomainError> {
        // Revalidate against current state; the world may have moved on
        // while the job slept.
        let round = flow.store.find_round(round_id).await?;
        if round.status != RoundStatus::InProgress || round.current_player != bot {
            debug!(round = round_id.0, bot = bot.0, "bot job stale, skipping");
            return Ok(JobOutcome::Skipped);
        }

        let view = RoundView::for_player(&round, bot)?;
        let strategy = strategy_for(difficulty);
        let decision = strategy.decide(&view);
        debug!(
            round = round_id.0,
            bot = bot.0,
            strategy = strategy.name(),
            rationale = decision.rationale,
            "bot decided"
        );

        // The flow service schedules the next bot (if any) as part of
        // committing this move, so the job itself does not chain.
        match decision.action {
            BotAction::Play(card) => flow.submit_play(match_id, bot, card).await?,
            BotAction::Pass => flow.submit_pass(match_id, bot).await?,
        };
        Ok(JobOutcome::Completed)
    }

    fn thinking_delay(&self, difficulty: BotDifficulty) -> Duration {
        if self.flow.config().disable_bot_delay {
            return Duration::ZERO;
        }
        let range = self.flow.config().delay_for(difficulty).as_secs_range();
        Duration::from_secs(rand::rng().random_range(range))
    }
}

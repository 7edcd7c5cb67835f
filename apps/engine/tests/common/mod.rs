#![allow(dead_code)]

// tests/common/mod.rs
use std::sync::Arc;

use lamap_engine::config::EngineConfig;
use lamap_engine::domain::state::{
    BotDifficulty, Match, MatchId, PlayerId, PlayerKind, Round, SeatedPlayer,
};
use lamap_engine::repos::memory::{CollectingSink, InMemoryStore, RecordingWallet};
use lamap_engine::services::bot_scheduler::BotScheduler;
use lamap_engine::services::match_flow::{MatchFlowService, MatchSetup};

// Logging is auto-installed for most test binaries
#[ctor::ctor]
fn init_logging() {
    lamap_engine::test_bootstrap::logging::init();
}

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub wallet: Arc<RecordingWallet>,
    pub sink: Arc<CollectingSink>,
    pub flow: Arc<MatchFlowService>,
    pub scheduler: Arc<BotScheduler>,
}

pub fn harness() -> Harness {
    harness_with(EngineConfig::for_tests())
}

pub fn harness_with(config: EngineConfig) -> Harness {
    let store = InMemoryStore::new();
    let wallet = RecordingWallet::new();
    let sink = CollectingSink::new();
    let flow = MatchFlowService::new(store.clone(), wallet.clone(), sink.clone(), config);
    let scheduler = BotScheduler::new(flow.clone());
    Harness {
        store,
        wallet,
        sink,
        flow,
        scheduler,
    }
}

pub fn human(id: i64) -> SeatedPlayer {
    SeatedPlayer {
        id: PlayerId(id),
        display_name: format!("player-{id}"),
        kind: PlayerKind::Human,
    }
}

pub fn bot(id: i64, difficulty: BotDifficulty) -> SeatedPlayer {
    SeatedPlayer {
        id: PlayerId(id),
        display_name: format!("bot-{id}"),
        kind: PlayerKind::Bot(difficulty),
    }
}

pub fn setup(players: &[SeatedPlayer], rounds_to_win: u32, seed: u64) -> MatchSetup {
    MatchSetup {
        creator: players[0].clone(),
        bet_amount: 500,
        rounds_to_win,
        max_players: players.len(),
        is_exhibition: false,
        time_limit: None,
        rng_seed: Some(seed),
    }
}

/// Creates, fills and starts a match; returns it with its first round.
pub async fn started_match(
    harness: &Harness,
    players: &[SeatedPlayer],
    rounds_to_win: u32,
    seed: u64,
) -> (Match, Round) {
    started_match_with(harness, setup(players, rounds_to_win, seed), players).await
}

pub async fn started_match_with(
    harness: &Harness,
    setup: MatchSetup,
    players: &[SeatedPlayer],
) -> (Match, Round) {
    let game = harness.flow.create_match(setup).await.unwrap();
    for player in &players[1..] {
        harness
            .flow
            .join_match(game.id, player.clone())
            .await
            .unwrap();
    }
    harness.flow.start_match(game.id).await.unwrap()
}

/// Current round id of a match, for lock/job bookkeeping in tests.
pub async fn current_round(harness: &Harness, match_id: MatchId) -> Round {
    use lamap_engine::repos::GameStore;
    harness
        .store
        .current_round(match_id)
        .await
        .unwrap()
        .expect("match has a round")
}

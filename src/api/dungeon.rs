//! DungeonService — dungeon maps, quests, and key-gated crates
//!
//! Endpoints:
//! - POST /arcane.DungeonService/GetAllDungeonMaps
//! - POST /arcane.DungeonService/GetAllDungeons   (alias; both interface
//!   generations of the client are served)
//! - POST /arcane.DungeonService/StartQuest
//! - POST /arcane.DungeonService/CompleteQuest
//! - POST /arcane.DungeonService/UnlockCrate
//!
//! Quest completion and crate unlock are idempotent: a repeat call is a
//! benign no-op success, never a double credit. The dungeon catalog itself
//! is immutable and shared; per-caller progress lives on the profile.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use std::sync::atomic::Ordering;
use tracing::info;

use super::{ApiState, CallerId};
use crate::catalog::Dungeon;
use crate::error::GameError;
use crate::profile::PlayerProfile;

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route(
            "/arcane.DungeonService/GetAllDungeonMaps",
            post(get_all_dungeons),
        )
        .route("/arcane.DungeonService/GetAllDungeons", post(get_all_dungeons))
        .route("/arcane.DungeonService/StartQuest", post(start_quest))
        .route("/arcane.DungeonService/CompleteQuest", post(complete_quest))
        .route("/arcane.DungeonService/UnlockCrate", post(unlock_crate))
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestRequest {
    pub quest_id: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrateRequest {
    pub crate_id: u64,
}

// ============================================================================
// Handlers
// ============================================================================

async fn get_all_dungeons(State(state): State<ApiState>) -> Result<Json<Vec<Dungeon>>, GameError> {
    Ok(Json(state.catalog.all_dungeons()?))
}

/// Advisory: records which dungeon the caller is working through. No
/// server-side gating — completion does not require a prior start.
async fn start_quest(
    State(state): State<ApiState>,
    caller: CallerId,
    Json(req): Json<QuestRequest>,
) -> Result<Json<PlayerProfile>, GameError> {
    let lock = state.locks.for_caller(caller.as_str());
    let _guard = lock.lock();

    let mut profile = state.load_profile(caller.as_str())?;
    let (dungeon, _) = state
        .catalog
        .find_quest(req.quest_id)?
        .ok_or(GameError::NotFound("quest"))?;
    profile.active_dungeon = Some(dungeon.id);
    state.profiles.put_profile(caller.as_str(), &profile)?;
    Ok(Json(profile))
}

/// Exactly-once completion: the first call credits the reward currency
/// (and reward key, if the quest grants one); repeats are no-ops.
async fn complete_quest(
    State(state): State<ApiState>,
    caller: CallerId,
    Json(req): Json<QuestRequest>,
) -> Result<Json<PlayerProfile>, GameError> {
    let lock = state.locks.for_caller(caller.as_str());
    let _guard = lock.lock();

    let mut profile = state.load_profile(caller.as_str())?;
    let (_, quest) = state
        .catalog
        .find_quest(req.quest_id)?
        .ok_or(GameError::NotFound("quest"))?;

    if profile.completed_quests.contains(&quest.id) {
        return Ok(Json(profile));
    }

    profile.completed_quests.insert(quest.id);
    profile.currency += quest.reward_currency;
    if let Some(key) = &quest.reward_key {
        profile.collected_keys.insert(key.clone());
    }
    state.profiles.put_profile(caller.as_str(), &profile)?;
    state.metrics.quests_completed.fetch_add(1, Ordering::Relaxed);
    info!(
        "caller {} completed quest {} (+{} currency)",
        caller.as_str(),
        quest.name,
        quest.reward_currency
    );
    Ok(Json(profile))
}

/// Key-gated, exactly-once crate unlock. Without the required key the call
/// fails and mutates nothing; a repeat unlock is a no-op.
async fn unlock_crate(
    State(state): State<ApiState>,
    caller: CallerId,
    Json(req): Json<CrateRequest>,
) -> Result<Json<PlayerProfile>, GameError> {
    let lock = state.locks.for_caller(caller.as_str());
    let _guard = lock.lock();

    let mut profile = state.load_profile(caller.as_str())?;
    let (_, crate_def) = state
        .catalog
        .find_crate(req.crate_id)?
        .ok_or(GameError::NotFound("crate"))?;

    if profile.opened_crates.contains(&crate_def.id) {
        return Ok(Json(profile));
    }
    if !profile.collected_keys.contains(&crate_def.required_key) {
        return Err(GameError::KeyRequired(crate_def.required_key));
    }

    profile.opened_crates.insert(crate_def.id);
    profile.currency += crate_def.reward;
    state.profiles.put_profile(caller.as_str(), &profile)?;
    state.metrics.crates_opened.fetch_add(1, Ordering::Relaxed);
    info!(
        "caller {} opened crate {} (+{} currency)",
        caller.as_str(),
        crate_def.name,
        crate_def.reward
    );
    Ok(Json(profile))
}

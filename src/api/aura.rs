//! AuraService — incremental clicker endpoints
//!
//! Endpoints:
//! - POST /arcane.AuraService/ClickAura
//! - POST /arcane.AuraService/Rebirth

use axum::{extract::State, routing::post, Json, Router};
use std::sync::atomic::Ordering;
use tracing::info;

use super::{ApiState, CallerId};
use crate::aura;
use crate::error::GameError;
use crate::profile::PlayerProfile;

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/arcane.AuraService/ClickAura", post(click_aura))
        .route("/arcane.AuraService/Rebirth", post(rebirth))
}

async fn click_aura(
    State(state): State<ApiState>,
    caller: CallerId,
) -> Result<Json<PlayerProfile>, GameError> {
    let lock = state.locks.for_caller(caller.as_str());
    let _guard = lock.lock();

    let mut profile = state.load_profile(caller.as_str())?;
    aura::click(&mut profile);
    state.profiles.put_profile(caller.as_str(), &profile)?;
    Ok(Json(profile))
}

async fn rebirth(
    State(state): State<ApiState>,
    caller: CallerId,
) -> Result<Json<PlayerProfile>, GameError> {
    let lock = state.locks.for_caller(caller.as_str());
    let _guard = lock.lock();

    let mut profile = state.load_profile(caller.as_str())?;
    aura::rebirth(&mut profile)?;
    state.profiles.put_profile(caller.as_str(), &profile)?;
    state.metrics.rebirths.fetch_add(1, Ordering::Relaxed);
    info!(
        "caller {} rebirthed (count {}, multiplier {})",
        caller.as_str(),
        profile.rebirth_count,
        profile.rebirth_multiplier
    );
    Ok(Json(profile))
}

//! ProfileService — profile lifecycle, survivors, equipment, killers
//!
//! Endpoints:
//! - POST /arcane.ProfileService/CreatePlayerProfile
//! - POST /arcane.ProfileService/GetCallerUserProfile
//! - POST /arcane.ProfileService/CreateSurvivor
//! - POST /arcane.ProfileService/SetActiveSurvivor
//! - POST /arcane.ProfileService/EquipWeapon
//! - POST /arcane.ProfileService/EquipPet
//! - POST /arcane.ProfileService/EarnCurrency
//! - POST /arcane.ProfileService/UnlockNextKiller
//!
//! Every mutation returns the updated profile; the client drops its cached
//! copy and renders the response.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use tracing::info;

use super::{ApiState, CallerId};
use crate::error::GameError;
use crate::profile::{PlayerProfile, Survivor};
use crate::stats::StatBlock;

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route(
            "/arcane.ProfileService/CreatePlayerProfile",
            post(create_player_profile),
        )
        .route(
            "/arcane.ProfileService/GetCallerUserProfile",
            post(get_caller_user_profile),
        )
        .route("/arcane.ProfileService/CreateSurvivor", post(create_survivor))
        .route(
            "/arcane.ProfileService/SetActiveSurvivor",
            post(set_active_survivor),
        )
        .route("/arcane.ProfileService/EquipWeapon", post(equip_weapon))
        .route("/arcane.ProfileService/EquipPet", post(equip_pet))
        .route("/arcane.ProfileService/EarnCurrency", post(earn_currency))
        .route(
            "/arcane.ProfileService/UnlockNextKiller",
            post(unlock_next_killer),
        )
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSurvivorRequest {
    pub name: String,
    pub stats: BaseStats,
}

/// Client-supplied base stats; level is always reset to 1 server-side.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseStats {
    pub health: u64,
    pub attack: u64,
    pub defense: u64,
    pub speed: u64,
    pub magic: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameRequest {
    pub name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountRequest {
    pub amount: u64,
}

// ============================================================================
// Handlers
// ============================================================================

/// Create the caller's profile, seeding the killer roster from the catalog.
/// Idempotent: an existing profile is returned untouched.
async fn create_player_profile(
    State(state): State<ApiState>,
    caller: CallerId,
) -> Result<Json<PlayerProfile>, GameError> {
    let lock = state.locks.for_caller(caller.as_str());
    let _guard = lock.lock();

    if let Some(existing) = state.profiles.get_profile(caller.as_str())? {
        return Ok(Json(existing));
    }

    let profile = PlayerProfile::new(state.catalog.all_killers()?);
    state.profiles.put_profile(caller.as_str(), &profile)?;
    info!("created profile for caller {}", caller.as_str());
    Ok(Json(profile))
}

/// The caller's profile, or `null` before creation.
async fn get_caller_user_profile(
    State(state): State<ApiState>,
    caller: CallerId,
) -> Result<Json<Option<PlayerProfile>>, GameError> {
    Ok(Json(state.profiles.get_profile(caller.as_str())?))
}

async fn create_survivor(
    State(state): State<ApiState>,
    caller: CallerId,
    Json(req): Json<CreateSurvivorRequest>,
) -> Result<Json<PlayerProfile>, GameError> {
    if req.name.trim().is_empty() {
        return Err(GameError::InvalidInput("survivor name is empty".into()));
    }

    let lock = state.locks.for_caller(caller.as_str());
    let _guard = lock.lock();

    let mut profile = state.load_profile(caller.as_str())?;
    if profile.survivor(&req.name).is_some() {
        return Err(GameError::DuplicateName("survivor", req.name));
    }

    profile.survivors.push(Survivor::new(
        req.name,
        StatBlock {
            health: req.stats.health,
            attack: req.stats.attack,
            defense: req.stats.defense,
            speed: req.stats.speed,
            magic: req.stats.magic,
            level: 1,
        },
    ));
    state.profiles.put_profile(caller.as_str(), &profile)?;
    Ok(Json(profile))
}

async fn set_active_survivor(
    State(state): State<ApiState>,
    caller: CallerId,
    Json(req): Json<NameRequest>,
) -> Result<Json<PlayerProfile>, GameError> {
    let lock = state.locks.for_caller(caller.as_str());
    let _guard = lock.lock();

    let mut profile = state.load_profile(caller.as_str())?;
    if profile.survivor(&req.name).is_none() {
        return Err(GameError::NotFound("survivor"));
    }
    profile.active_survivor = Some(req.name);
    state.profiles.put_profile(caller.as_str(), &profile)?;
    Ok(Json(profile))
}

async fn equip_weapon(
    State(state): State<ApiState>,
    caller: CallerId,
    Json(req): Json<NameRequest>,
) -> Result<Json<PlayerProfile>, GameError> {
    let lock = state.locks.for_caller(caller.as_str());
    let _guard = lock.lock();

    let mut profile = state.load_profile(caller.as_str())?;
    if profile.weapon(&req.name).is_none() {
        return Err(GameError::NotFound("weapon"));
    }
    profile.equipped_weapon = Some(req.name);
    state.profiles.put_profile(caller.as_str(), &profile)?;
    Ok(Json(profile))
}

async fn equip_pet(
    State(state): State<ApiState>,
    caller: CallerId,
    Json(req): Json<NameRequest>,
) -> Result<Json<PlayerProfile>, GameError> {
    let lock = state.locks.for_caller(caller.as_str());
    let _guard = lock.lock();

    let mut profile = state.load_profile(caller.as_str())?;
    if profile.pet(&req.name).is_none() {
        return Err(GameError::NotFound("pet"));
    }
    profile.equipped_pet = Some(req.name);
    state.profiles.put_profile(caller.as_str(), &profile)?;
    Ok(Json(profile))
}

/// Additive currency credit. The amount is unsigned by construction; a
/// negative JSON value is rejected at deserialization.
async fn earn_currency(
    State(state): State<ApiState>,
    caller: CallerId,
    Json(req): Json<AmountRequest>,
) -> Result<Json<PlayerProfile>, GameError> {
    let lock = state.locks.for_caller(caller.as_str());
    let _guard = lock.lock();

    let mut profile = state.load_profile(caller.as_str())?;
    profile.currency += req.amount;
    state.profiles.put_profile(caller.as_str(), &profile)?;
    Ok(Json(profile))
}

/// Unlock the lowest-id locked killer. The catalog's unlock-criteria
/// thresholds are informational and not re-validated here (observed
/// contract).
async fn unlock_next_killer(
    State(state): State<ApiState>,
    caller: CallerId,
) -> Result<Json<PlayerProfile>, GameError> {
    let lock = state.locks.for_caller(caller.as_str());
    let _guard = lock.lock();

    let mut profile = state.load_profile(caller.as_str())?;
    let next = profile
        .killers
        .iter_mut()
        .filter(|k| !k.unlocked)
        .min_by_key(|k| k.id)
        .ok_or(GameError::AllUnlocked)?;
    next.unlocked = true;
    info!("caller {} unlocked killer {}", caller.as_str(), next.name);
    state.profiles.put_profile(caller.as_str(), &profile)?;
    Ok(Json(profile))
}

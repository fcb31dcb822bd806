//! ClanService — recruitment listings and clan membership
//!
//! Endpoints:
//! - POST /arcane.ClanService/AddWhyDontYouJoin
//! - POST /arcane.ClanService/GetActiveWhyDontYouJoins
//! - POST /arcane.ClanService/CreateClanFromListing
//! - POST /arcane.ClanService/JoinExistingClan
//! - POST /arcane.ClanService/JoinRandomClan
//! - POST /arcane.ClanService/GetClanMarketplace
//!
//! Clans and listings are cross-caller records, so mutations serialize on
//! a single clan lock rather than a per-caller one. The random join uses a
//! thread-local RNG the caller can neither control nor predict.

use axum::{extract::State, routing::post, Json, Router};
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::sync::atomic::Ordering;
use tracing::info;

use super::{ApiState, CallerId};
use crate::clan::{self, Clan, JoinListing};
use crate::error::GameError;

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route(
            "/arcane.ClanService/AddWhyDontYouJoin",
            post(add_why_dont_you_join),
        )
        .route(
            "/arcane.ClanService/GetActiveWhyDontYouJoins",
            post(get_active_why_dont_you_joins),
        )
        .route(
            "/arcane.ClanService/CreateClanFromListing",
            post(create_clan_from_listing),
        )
        .route("/arcane.ClanService/JoinExistingClan", post(join_existing_clan))
        .route("/arcane.ClanService/JoinRandomClan", post(join_random_clan))
        .route("/arcane.ClanService/GetClanMarketplace", post(get_clan_marketplace))
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddListingRequest {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClanRequest {
    /// The listing being claimed. One client generation sends `whyJoinId`.
    #[serde(alias = "whyJoinId")]
    pub listing_id: u64,
    /// Caller-chosen clan name; empty falls back to the listing's name.
    #[serde(default)]
    pub clan_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinClanRequest {
    pub clan_id: u64,
}

// ============================================================================
// Handlers
// ============================================================================

async fn add_why_dont_you_join(
    State(state): State<ApiState>,
    caller: CallerId,
    Json(req): Json<AddListingRequest>,
) -> Result<Json<JoinListing>, GameError> {
    if req.name.trim().is_empty() {
        return Err(GameError::InvalidInput("listing name is empty".into()));
    }

    let _guard = state.clan_lock.lock();
    let listing = state.profiles.insert_listing(JoinListing {
        id: 0, // assigned by the store
        name: req.name,
        description: req.description,
        image_url: req.image_url,
        leader: caller.as_str().to_string(),
        active: true,
        member_count: 1,
    })?;
    info!(
        "caller {} posted join listing '{}' ({})",
        caller.as_str(),
        listing.name,
        listing.id
    );
    Ok(Json(listing))
}

async fn get_active_why_dont_you_joins(
    State(state): State<ApiState>,
) -> Result<Json<Vec<JoinListing>>, GameError> {
    Ok(Json(state.profiles.active_listings()?))
}

/// Claim a listing and found the clan. The listing is single-use: it goes
/// inactive in the same transaction that creates the clan. The listing's
/// own leader cannot claim it.
async fn create_clan_from_listing(
    State(state): State<ApiState>,
    caller: CallerId,
    Json(req): Json<CreateClanRequest>,
) -> Result<Json<Clan>, GameError> {
    let _guard = state.clan_lock.lock();

    let listing = state.profiles.get_listing(req.listing_id)?;
    let listing = clan::validate_conversion(listing, caller.as_str())?;

    let name = if req.clan_name.trim().is_empty() {
        listing.name.clone()
    } else {
        req.clan_name
    };

    let clan = state.profiles.create_clan_from_listing(listing, name)?;
    state.metrics.clans_formed.fetch_add(1, Ordering::Relaxed);
    info!(
        "clan '{}' ({}) founded by {} from listing {}",
        clan.name,
        clan.id,
        clan.founder,
        req.listing_id
    );
    Ok(Json(clan))
}

async fn join_existing_clan(
    State(state): State<ApiState>,
    caller: CallerId,
    Json(req): Json<JoinClanRequest>,
) -> Result<Json<Clan>, GameError> {
    let _guard = state.clan_lock.lock();

    clan::ensure_not_member(&state.profiles.all_clans()?, caller.as_str())?;
    let mut target = state
        .profiles
        .get_clan(req.clan_id)?
        .ok_or(GameError::NotFound("clan"))?;
    target.add_member(caller.as_str());
    state.profiles.put_clan(&target)?;
    info!("caller {} joined clan {}", caller.as_str(), target.name);
    Ok(Json(target))
}

/// Join a uniformly random clan the caller is not already in.
async fn join_random_clan(
    State(state): State<ApiState>,
    caller: CallerId,
) -> Result<Json<Clan>, GameError> {
    let _guard = state.clan_lock.lock();

    let clans = state.profiles.all_clans()?;
    if clans.is_empty() {
        return Err(GameError::NoClansAvailable);
    }
    clan::ensure_not_member(&clans, caller.as_str())?;

    let mut target = clans
        .choose(&mut rand::thread_rng())
        .cloned()
        .ok_or(GameError::NoClansAvailable)?;
    target.add_member(caller.as_str());
    state.profiles.put_clan(&target)?;
    info!(
        "caller {} joined random clan {}",
        caller.as_str(),
        target.name
    );
    Ok(Json(target))
}

async fn get_clan_marketplace(State(state): State<ApiState>) -> Result<Json<Vec<Clan>>, GameError> {
    Ok(Json(state.profiles.all_clans()?))
}

//! AdminService — panel purchase, self-grants, roles, events, shop
//!
//! Endpoints:
//! - POST /arcane.AdminService/PurchaseAdminPanel
//! - POST /arcane.AdminService/AdminGrantCurrency
//! - POST /arcane.AdminService/AdminSetLevel
//! - POST /arcane.AdminService/AdminUnlockKiller
//! - POST /arcane.AdminService/AddWeapon
//! - POST /arcane.AdminService/AddPet
//! - POST /arcane.AdminService/AssignCallerUserRole
//! - POST /arcane.AdminService/GetCallerUserRole
//! - POST /arcane.AdminService/CreateAdminPanelEvent
//! - POST /arcane.AdminService/GetAdminPanelEventsForCaller
//! - POST /arcane.AdminService/GetAllShopItems
//!
//! Two gates, both verified server-side. Operations on the caller's own
//! record require the purchased admin-panel flag; role assignment requires
//! the `admin` role. A client-supplied admin indication is never trusted.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use tracing::info;

use super::{ApiState, CallerId};
use crate::catalog::ShopItem;
use crate::error::GameError;
use crate::profile::{AdminPanelEvent, Pet, PlayerProfile, UserRole, Weapon};
use crate::progression;

/// Fallback panel price if the shop catalog has no admin-panel entry.
const DEFAULT_ADMIN_PANEL_PRICE: u64 = 10_000;

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route(
            "/arcane.AdminService/PurchaseAdminPanel",
            post(purchase_admin_panel),
        )
        .route(
            "/arcane.AdminService/AdminGrantCurrency",
            post(admin_grant_currency),
        )
        .route("/arcane.AdminService/AdminSetLevel", post(admin_set_level))
        .route(
            "/arcane.AdminService/AdminUnlockKiller",
            post(admin_unlock_killer),
        )
        .route("/arcane.AdminService/AddWeapon", post(add_weapon))
        .route("/arcane.AdminService/AddPet", post(add_pet))
        .route(
            "/arcane.AdminService/AssignCallerUserRole",
            post(assign_caller_user_role),
        )
        .route(
            "/arcane.AdminService/GetCallerUserRole",
            post(get_caller_user_role),
        )
        .route(
            "/arcane.AdminService/CreateAdminPanelEvent",
            post(create_admin_panel_event),
        )
        .route(
            "/arcane.AdminService/GetAdminPanelEventsForCaller",
            post(get_admin_panel_events),
        )
        .route("/arcane.AdminService/GetAllShopItems", post(get_all_shop_items))
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountRequest {
    pub amount: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLevelRequest {
    pub survivor_name: String,
    pub level: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KillerRequest {
    pub killer_id: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRoleRequest {
    pub user: String,
    pub role: UserRole,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub event_name: String,
    pub description: String,
    pub timestamp: u64,
}

// ============================================================================
// Gates
// ============================================================================

fn require_admin_panel(profile: &PlayerProfile) -> Result<(), GameError> {
    if !profile.has_admin_panel {
        return Err(GameError::Unauthorized("admin panel required"));
    }
    Ok(())
}

fn require_admin_role(state: &ApiState, caller: &CallerId) -> Result<(), GameError> {
    match state.profiles.get_role(caller.as_str())? {
        UserRole::Admin => Ok(()),
        UserRole::User | UserRole::Guest => Err(GameError::Unauthorized("admin role required")),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Buy the admin panel at the shop catalog price. Idempotent: the flag is
/// checked before the deduction, so a repeat purchase is a no-op success
/// rather than a double charge.
async fn purchase_admin_panel(
    State(state): State<ApiState>,
    caller: CallerId,
) -> Result<Json<PlayerProfile>, GameError> {
    let lock = state.locks.for_caller(caller.as_str());
    let _guard = lock.lock();

    let mut profile = state.load_profile(caller.as_str())?;
    if profile.has_admin_panel {
        return Ok(Json(profile));
    }

    let price = state
        .catalog
        .admin_panel_price()?
        .unwrap_or(DEFAULT_ADMIN_PANEL_PRICE);
    progression::debit(&mut profile.currency, price)?;
    profile.has_admin_panel = true;
    state.profiles.put_profile(caller.as_str(), &profile)?;
    info!("caller {} purchased the admin panel", caller.as_str());
    Ok(Json(profile))
}

async fn admin_grant_currency(
    State(state): State<ApiState>,
    caller: CallerId,
    Json(req): Json<AmountRequest>,
) -> Result<Json<PlayerProfile>, GameError> {
    let lock = state.locks.for_caller(caller.as_str());
    let _guard = lock.lock();

    let mut profile = state.load_profile(caller.as_str())?;
    require_admin_panel(&profile)?;
    profile.currency += req.amount;
    state.profiles.put_profile(caller.as_str(), &profile)?;
    Ok(Json(profile))
}

/// Set a survivor's level directly, clamped to [1, 2400]. An admin
/// override, not a progression event: within-level experience is left
/// untouched.
async fn admin_set_level(
    State(state): State<ApiState>,
    caller: CallerId,
    Json(req): Json<SetLevelRequest>,
) -> Result<Json<PlayerProfile>, GameError> {
    let lock = state.locks.for_caller(caller.as_str());
    let _guard = lock.lock();

    let mut profile = state.load_profile(caller.as_str())?;
    require_admin_panel(&profile)?;

    let level = progression::clamp_level(req.level);
    let survivor = profile
        .survivor_mut(&req.survivor_name)
        .ok_or(GameError::NotFound("survivor"))?;
    survivor.level = level;
    survivor.stats.level = level;
    state.profiles.put_profile(caller.as_str(), &profile)?;
    Ok(Json(profile))
}

/// Unlock a specific killer by id, skipping the unlock order.
async fn admin_unlock_killer(
    State(state): State<ApiState>,
    caller: CallerId,
    Json(req): Json<KillerRequest>,
) -> Result<Json<PlayerProfile>, GameError> {
    let lock = state.locks.for_caller(caller.as_str());
    let _guard = lock.lock();

    let mut profile = state.load_profile(caller.as_str())?;
    require_admin_panel(&profile)?;

    let killer = profile
        .killers
        .iter_mut()
        .find(|k| k.id == req.killer_id)
        .ok_or(GameError::NotFound("killer"))?;
    killer.unlocked = true;
    state.profiles.put_profile(caller.as_str(), &profile)?;
    Ok(Json(profile))
}

async fn add_weapon(
    State(state): State<ApiState>,
    caller: CallerId,
    Json(weapon): Json<Weapon>,
) -> Result<Json<PlayerProfile>, GameError> {
    if weapon.name.trim().is_empty() {
        return Err(GameError::InvalidInput("weapon name is empty".into()));
    }

    let lock = state.locks.for_caller(caller.as_str());
    let _guard = lock.lock();

    let mut profile = state.load_profile(caller.as_str())?;
    require_admin_panel(&profile)?;
    if profile.weapon(&weapon.name).is_some() {
        return Err(GameError::DuplicateName("weapon", weapon.name));
    }
    profile.weapons.push(weapon);
    state.profiles.put_profile(caller.as_str(), &profile)?;
    Ok(Json(profile))
}

async fn add_pet(
    State(state): State<ApiState>,
    caller: CallerId,
    Json(pet): Json<Pet>,
) -> Result<Json<PlayerProfile>, GameError> {
    if pet.name.trim().is_empty() {
        return Err(GameError::InvalidInput("pet name is empty".into()));
    }

    let lock = state.locks.for_caller(caller.as_str());
    let _guard = lock.lock();

    let mut profile = state.load_profile(caller.as_str())?;
    require_admin_panel(&profile)?;
    if profile.pet(&pet.name).is_some() {
        return Err(GameError::DuplicateName("pet", pet.name));
    }
    profile.pets.push(pet);
    state.profiles.put_profile(caller.as_str(), &profile)?;
    Ok(Json(profile))
}

/// Assign a role to any caller identity. Requires the admin role, which is
/// bootstrapped from `ADMIN_CALLERS` at startup.
async fn assign_caller_user_role(
    State(state): State<ApiState>,
    caller: CallerId,
    Json(req): Json<AssignRoleRequest>,
) -> Result<Json<UserRole>, GameError> {
    require_admin_role(&state, &caller)?;
    state.profiles.put_role(&req.user, req.role)?;
    info!(
        "caller {} assigned role {:?} to {}",
        caller.as_str(),
        req.role,
        req.user
    );
    Ok(Json(req.role))
}

async fn get_caller_user_role(
    State(state): State<ApiState>,
    caller: CallerId,
) -> Result<Json<UserRole>, GameError> {
    Ok(Json(state.profiles.get_role(caller.as_str())?))
}

async fn create_admin_panel_event(
    State(state): State<ApiState>,
    caller: CallerId,
    Json(req): Json<CreateEventRequest>,
) -> Result<Json<AdminPanelEvent>, GameError> {
    let lock = state.locks.for_caller(caller.as_str());
    let _guard = lock.lock();

    let profile = state.load_profile(caller.as_str())?;
    require_admin_panel(&profile)?;

    let event = state.profiles.append_event(
        caller.as_str(),
        AdminPanelEvent {
            id: 0, // assigned by the store
            event_name: req.event_name,
            description: req.description,
            timestamp: req.timestamp,
        },
    )?;
    Ok(Json(event))
}

async fn get_admin_panel_events(
    State(state): State<ApiState>,
    caller: CallerId,
) -> Result<Json<Vec<AdminPanelEvent>>, GameError> {
    Ok(Json(state.profiles.events_for(caller.as_str())?))
}

async fn get_all_shop_items(State(state): State<ApiState>) -> Result<Json<Vec<ShopItem>>, GameError> {
    Ok(Json(state.catalog.all_shop_items()?))
}

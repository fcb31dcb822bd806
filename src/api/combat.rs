//! CombatService — turn-based combat endpoints
//!
//! Endpoints:
//! - POST /arcane.CombatService/StartCombat
//! - POST /arcane.CombatService/PerformAttack
//! - POST /arcane.CombatService/PerformMagicAttack
//! - POST /arcane.CombatService/GetCombatStatus
//! - POST /arcane.CombatService/GetAllBots
//! - POST /arcane.CombatService/StartBotCombat
//! - POST /arcane.CombatService/AttackBot
//! - POST /arcane.CombatService/GetBotCombatStatus
//!
//! Attack calls carry no payload: the server-owned session snapshot is
//! authoritative, so there is nothing the client could legitimately send.
//! Bot combat runs the same state machine as enemy combat but is resolved
//! against a server-side catalog entry and polled through a status query.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;
use tracing::info;

use super::{ApiState, CallerId};
use crate::catalog::Bot;
use crate::combat::{self, AttackKind, Winner};
use crate::error::GameError;
use crate::profile::{CombatSession, EnemyDef, Opponent, PlayerProfile, Survivor};
use crate::progression;

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/arcane.CombatService/StartCombat", post(start_combat))
        .route("/arcane.CombatService/PerformAttack", post(perform_attack))
        .route(
            "/arcane.CombatService/PerformMagicAttack",
            post(perform_magic_attack),
        )
        .route("/arcane.CombatService/GetCombatStatus", post(get_combat_status))
        .route("/arcane.CombatService/GetAllBots", post(get_all_bots))
        .route("/arcane.CombatService/StartBotCombat", post(start_bot_combat))
        .route("/arcane.CombatService/AttackBot", post(attack_bot))
        .route(
            "/arcane.CombatService/GetBotCombatStatus",
            post(get_bot_combat_status),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartBotCombatRequest {
    pub bot_id: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatResult {
    pub winner: Winner,
}

/// Full combat detail returned by enemy-combat calls.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatDetails {
    pub combat_ongoing: bool,
    pub enemy_name: String,
    pub enemy_health: u64,
    pub player_health: u64,
    pub player_max_health: u64,
    pub result: Option<CombatResult>,
    pub rewarded_currency: u64,
    pub rewarded_exp: u64,
}

/// Poll response for bot combat.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BotCombatStatus {
    pub combat_ongoing: bool,
    pub bot_name: String,
    pub bot_health: u64,
    pub player_health: u64,
    pub player_active_survivor: Survivor,
    pub result: Option<CombatResult>,
    pub rewarded_currency: u64,
    pub rewarded_exp: u64,
}

/// What an attack call settled, alongside the session it left behind.
struct Settled {
    session: CombatSession,
    winner: Option<Winner>,
    rewarded_currency: u64,
    rewarded_exp: u64,
}

// ============================================================================
// Handlers — enemy combat
// ============================================================================

async fn start_combat(
    State(state): State<ApiState>,
    caller: CallerId,
    Json(enemy): Json<EnemyDef>,
) -> Result<Json<CombatDetails>, GameError> {
    let lock = state.locks.for_caller(caller.as_str());
    let _guard = lock.lock();

    let mut profile = state.load_profile(caller.as_str())?;
    let session = combat::start_enemy_combat(&profile, enemy)?;
    let details = details_for(&session, None, 0, 0);
    profile.combat = Some(session);
    state.profiles.put_profile(caller.as_str(), &profile)?;
    Ok(Json(details))
}

async fn perform_attack(
    State(state): State<ApiState>,
    caller: CallerId,
) -> Result<Json<CombatDetails>, GameError> {
    enemy_attack(state, caller, AttackKind::Physical)
}

async fn perform_magic_attack(
    State(state): State<ApiState>,
    caller: CallerId,
) -> Result<Json<CombatDetails>, GameError> {
    enemy_attack(state, caller, AttackKind::Magic)
}

fn enemy_attack(
    state: ApiState,
    caller: CallerId,
    kind: AttackKind,
) -> Result<Json<CombatDetails>, GameError> {
    let lock = state.locks.for_caller(caller.as_str());
    let _guard = lock.lock();

    let mut profile = state.load_profile(caller.as_str())?;
    let settled = resolve_one_attack(&state, &mut profile, kind, OpponentKind::Enemy)?;
    let details = details_for(
        &settled.session,
        settled.winner,
        settled.rewarded_currency,
        settled.rewarded_exp,
    );
    state.profiles.put_profile(caller.as_str(), &profile)?;
    Ok(Json(details))
}

/// Current enemy-combat detail without mutating anything.
async fn get_combat_status(
    State(state): State<ApiState>,
    caller: CallerId,
) -> Result<Json<CombatDetails>, GameError> {
    let profile = state.load_profile(caller.as_str())?;
    match profile.combat.as_ref() {
        Some(session) if matches!(session.opponent, Opponent::Enemy(_)) => {
            Ok(Json(details_for(session, None, 0, 0)))
        }
        _ => Err(GameError::NoActiveCombat),
    }
}

// ============================================================================
// Handlers — bot combat
// ============================================================================

async fn get_all_bots(State(state): State<ApiState>) -> Result<Json<Vec<Bot>>, GameError> {
    Ok(Json(state.catalog.all_bots()?))
}

async fn start_bot_combat(
    State(state): State<ApiState>,
    caller: CallerId,
    Json(req): Json<StartBotCombatRequest>,
) -> Result<Json<BotCombatStatus>, GameError> {
    let lock = state.locks.for_caller(caller.as_str());
    let _guard = lock.lock();

    let mut profile = state.load_profile(caller.as_str())?;
    let bot = state
        .catalog
        .get_bot(req.bot_id)?
        .ok_or(GameError::NotFound("bot"))?;
    let session = combat::start_bot_combat(&profile, &bot)?;
    let status = bot_status_for(&profile, &session, None, 0, 0)?;
    profile.combat = Some(session);
    state.profiles.put_profile(caller.as_str(), &profile)?;
    info!("caller {} challenged bot {}", caller.as_str(), bot.name);
    Ok(Json(status))
}

async fn attack_bot(
    State(state): State<ApiState>,
    caller: CallerId,
) -> Result<Json<BotCombatStatus>, GameError> {
    let lock = state.locks.for_caller(caller.as_str());
    let _guard = lock.lock();

    let mut profile = state.load_profile(caller.as_str())?;
    let settled = resolve_one_attack(&state, &mut profile, AttackKind::Physical, OpponentKind::Bot)?;
    let status = bot_status_for(
        &profile,
        &settled.session,
        settled.winner,
        settled.rewarded_currency,
        settled.rewarded_exp,
    )?;
    state.profiles.put_profile(caller.as_str(), &profile)?;
    Ok(Json(status))
}

async fn get_bot_combat_status(
    State(state): State<ApiState>,
    caller: CallerId,
) -> Result<Json<Option<BotCombatStatus>>, GameError> {
    let profile = state.load_profile(caller.as_str())?;
    match profile.combat.as_ref() {
        Some(session) if matches!(session.opponent, Opponent::Bot { .. }) => Ok(Json(Some(
            bot_status_for(&profile, session, None, 0, 0)?,
        ))),
        _ => Ok(Json(None)),
    }
}

// ============================================================================
// Shared resolution
// ============================================================================

#[derive(PartialEq, Eq)]
enum OpponentKind {
    Enemy,
    Bot,
}

fn matches_kind(opponent: &Opponent, kind: &OpponentKind) -> bool {
    match opponent {
        Opponent::Enemy(_) => *kind == OpponentKind::Enemy,
        Opponent::Bot { .. } => *kind == OpponentKind::Bot,
    }
}

/// Apply one attack to the profile's session, settling rewards on a win
/// and clearing the session on either outcome. The profile is mutated but
/// not persisted; the caller writes it back.
fn resolve_one_attack(
    state: &ApiState,
    profile: &mut PlayerProfile,
    kind: AttackKind,
    expected: OpponentKind,
) -> Result<Settled, GameError> {
    let player = combat::attacking_player_stats(profile)?;

    let mut session = match profile.combat.take() {
        Some(s) if s.ongoing && matches_kind(&s.opponent, &expected) => s,
        other => {
            // Not this endpoint's fight (or no fight at all): put it back.
            profile.combat = other;
            return Err(GameError::NoActiveCombat);
        }
    };

    let outcome = combat::resolve_attack(&mut session, &player, kind);

    let (mut rewarded_currency, mut rewarded_exp) = (0, 0);
    match outcome.winner {
        Some(Winner::Player) => {
            let (base_currency, base_exp) = combat::opponent_rewards(&session.opponent);
            let (currency, exp) =
                progression::scaled_rewards(base_currency, base_exp, profile.equipped_pet());
            rewarded_currency = currency;
            rewarded_exp = exp;

            profile.currency += currency;
            let name = profile
                .active_survivor
                .clone()
                .ok_or(GameError::NoActiveSurvivor)?;
            if let Some(survivor) = profile.survivor_mut(&name) {
                let gained = progression::apply_experience(survivor, exp);
                if gained > 0 {
                    info!("survivor {} reached level {}", name, survivor.level);
                }
            }
            state.metrics.combats_resolved.fetch_add(1, Ordering::Relaxed);
        }
        Some(Winner::Enemy) => {
            // Loss: session clears, nothing is credited, and survivor
            // health is untouched (combat-local quantity).
            state.metrics.combats_resolved.fetch_add(1, Ordering::Relaxed);
        }
        None => {
            profile.combat = Some(session.clone());
        }
    }

    Ok(Settled {
        session,
        winner: outcome.winner,
        rewarded_currency,
        rewarded_exp,
    })
}

fn details_for(
    session: &CombatSession,
    winner: Option<Winner>,
    rewarded_currency: u64,
    rewarded_exp: u64,
) -> CombatDetails {
    CombatDetails {
        combat_ongoing: session.ongoing,
        enemy_name: combat::opponent_name(&session.opponent).to_string(),
        enemy_health: session.enemy_health,
        player_health: session.player_health,
        player_max_health: session.player_max_health,
        result: winner.map(|w| CombatResult { winner: w }),
        rewarded_currency,
        rewarded_exp,
    }
}

fn bot_status_for(
    profile: &PlayerProfile,
    session: &CombatSession,
    winner: Option<Winner>,
    rewarded_currency: u64,
    rewarded_exp: u64,
) -> Result<BotCombatStatus, GameError> {
    let survivor = profile
        .active_survivor()
        .ok_or(GameError::NoActiveSurvivor)?
        .clone();
    Ok(BotCombatStatus {
        combat_ongoing: session.ongoing,
        bot_name: combat::opponent_name(&session.opponent).to_string(),
        bot_health: session.enemy_health,
        player_health: session.player_health,
        player_active_survivor: survivor,
        result: winner.map(|w| CombatResult { winner: w }),
        rewarded_currency,
        rewarded_exp,
    })
}

//! SocialService — follow graph between caller identities
//!
//! Endpoints:
//! - POST /arcane.SocialService/FollowUser
//! - POST /arcane.SocialService/UnfollowUser
//! - POST /arcane.SocialService/GetWhoCallerFollowing
//! - POST /arcane.SocialService/GetWhoIsFollowingCaller
//!
//! Follow edges are stored on both profiles (following on one side,
//! followers on the other), so a follow mutates two records: both profile
//! locks are taken in sorted key order and the writes commit in one
//! transaction. Repeat follows and unfollows are no-ops.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use super::{ApiState, CallerId};
use crate::error::GameError;

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/arcane.SocialService/FollowUser", post(follow_user))
        .route("/arcane.SocialService/UnfollowUser", post(unfollow_user))
        .route(
            "/arcane.SocialService/GetWhoCallerFollowing",
            post(get_following),
        )
        .route(
            "/arcane.SocialService/GetWhoIsFollowingCaller",
            post(get_followers),
        )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRequest {
    pub target: String,
}

async fn follow_user(
    State(state): State<ApiState>,
    caller: CallerId,
    Json(req): Json<TargetRequest>,
) -> Result<Json<Vec<String>>, GameError> {
    update_edge(&state, &caller, &req.target, true)
}

async fn unfollow_user(
    State(state): State<ApiState>,
    caller: CallerId,
    Json(req): Json<TargetRequest>,
) -> Result<Json<Vec<String>>, GameError> {
    update_edge(&state, &caller, &req.target, false)
}

/// Add or remove the caller→target edge on both profiles. Returns the
/// caller's updated following list.
fn update_edge(
    state: &ApiState,
    caller: &CallerId,
    target: &str,
    follow: bool,
) -> Result<Json<Vec<String>>, GameError> {
    if target == caller.as_str() {
        return Err(GameError::InvalidInput("cannot follow yourself".into()));
    }

    let (first, second) = state.locks.for_pair(caller.as_str(), target);
    let _g1 = first.lock();
    let _g2 = second.lock();

    let mut me = state.load_profile(caller.as_str())?;
    let mut other = state
        .profiles
        .get_profile(target)?
        .ok_or(GameError::NotFound("user"))?;

    if follow {
        me.following.insert(target.to_string());
        other.followers.insert(caller.as_str().to_string());
    } else {
        me.following.remove(target);
        other.followers.remove(caller.as_str());
    }

    state
        .profiles
        .put_profile_pair((caller.as_str(), &me), (target, &other))?;
    Ok(Json(me.following.into_iter().collect()))
}

async fn get_following(
    State(state): State<ApiState>,
    caller: CallerId,
) -> Result<Json<Vec<String>>, GameError> {
    let profile = state.load_profile(caller.as_str())?;
    Ok(Json(profile.following.into_iter().collect()))
}

async fn get_followers(
    State(state): State<ApiState>,
    caller: CallerId,
) -> Result<Json<Vec<String>>, GameError> {
    let profile = state.load_profile(caller.as_str())?;
    Ok(Json(profile.followers.into_iter().collect()))
}

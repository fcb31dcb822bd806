//! HTTP/JSON API Layer
//!
//! One remote call per game operation. The web client calls these endpoints
//! via JSON-over-HTTP transport.
//!
//! ## Architecture
//! ```text
//! Web client (JSON mode)
//!       ↓ HTTP POST, JSON body, x-caller-id header
//! Axum Router (port 8750)
//!       ↓
//! Service Handlers (profile, combat, aura, dungeon, clan, admin, social)
//!       ↓ ProfileLocks — serialized read–mutate–write per caller
//! ProfileStore + CatalogStore (LMDB)
//! ```
//!
//! ## Endpoint Convention
//! All operations follow the gRPC path pattern:
//! `POST /arcane.<Service>/<Method>`, e.g.
//! `POST /arcane.CombatService/PerformAttack`. Read-only queries use the
//! same shape for a uniform client.
//!
//! The caller identity arrives in the `x-caller-id` header, injected by the
//! out-of-scope identity layer. Admin checks run server-side against stored
//! state; no client-supplied admin indication is ever trusted.

pub mod admin;
pub mod aura;
pub mod clan;
pub mod combat;
pub mod dungeon;
pub mod profile;
pub mod social;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::{middleware, routing::get, Json, Router};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::error::GameError;
use crate::metrics::ServerMetrics;
use crate::profile::PlayerProfile;
use crate::storage::catalog_store::CatalogStore;
use crate::storage::profile_store::ProfileStore;
use crate::storage::ProfileLocks;

/// Shared state available to all API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub profiles: Arc<ProfileStore>,
    pub catalog: Arc<CatalogStore>,
    /// Per-caller locks serializing profile mutations.
    pub locks: Arc<ProfileLocks>,
    /// Global lock for clan/listing mutations (cross-caller records).
    pub clan_lock: Arc<Mutex<()>>,
    /// Server-wide metrics (lock-free atomics).
    pub metrics: Arc<ServerMetrics>,
}

impl ApiState {
    /// The caller's profile, or `ProfileNotFound`.
    pub fn load_profile(&self, caller: &str) -> Result<PlayerProfile, GameError> {
        self.profiles
            .get_profile(caller)?
            .ok_or(GameError::ProfileNotFound)
    }
}

/// Caller identity extracted from the `x-caller-id` header.
///
/// The identity layer in front of this engine authenticates the user and
/// injects the header; a request without it never belongs to a real caller.
#[derive(Debug, Clone)]
pub struct CallerId(pub String);

impl CallerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = GameError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get("x-caller-id")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| GameError::InvalidInput("missing x-caller-id header".into()))?;
        Ok(CallerId(value.to_string()))
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the full API router with all service endpoints.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(crate::metrics::prometheus_handler))
        .route("/metrics/json", get(crate::metrics::json_metrics_handler))
        .merge(profile::routes())
        .merge(combat::routes())
        .merge(aura::routes())
        .merge(dungeon::routes())
        .merge(clan::routes())
        .merge(admin::routes())
        .merge(social::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::metrics::metrics_middleware,
        ))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::cors::CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP API server on the given port.
pub async fn start_api_server(
    profiles: Arc<ProfileStore>,
    catalog: Arc<CatalogStore>,
    port: u16,
) -> anyhow::Result<()> {
    let state = ApiState {
        profiles,
        catalog,
        locks: Arc::new(ProfileLocks::new()),
        clan_lock: Arc::new(Mutex::new(())),
        metrics: ServerMetrics::new(),
    };
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

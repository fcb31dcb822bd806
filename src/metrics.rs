//! Server Metrics — request and game counters with Prometheus + JSON export
//!
//! Uses lock-free atomics for all counters. No external metrics crate
//! needed.
//!
//! ## Endpoints
//! - `GET /metrics` — Prometheus text format
//! - `GET /metrics/json` — JSON format (for dashboards and stress clients)

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::api::ApiState;

/// Shared metrics state (all lock-free atomics).
#[derive(Debug)]
pub struct ServerMetrics {
    /// Total HTTP requests served
    pub total_requests: AtomicU64,
    /// Total request errors (4xx + 5xx)
    pub total_errors: AtomicU64,
    /// Cumulative request duration in microseconds (for computing average)
    pub total_duration_us: AtomicU64,
    /// Combat sessions resolved (wins + losses)
    pub combats_resolved: AtomicU64,
    /// Quests completed (first completions only)
    pub quests_completed: AtomicU64,
    /// Crates opened (first unlocks only)
    pub crates_opened: AtomicU64,
    /// Aura rebirths performed
    pub rebirths: AtomicU64,
    /// Clans formed from listings
    pub clans_formed: AtomicU64,
    /// Server start time (for uptime calculation)
    pub start_time: Instant,
}

impl Default for ServerMetrics {
    fn default() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            total_errors: AtomicU64::new(0),
            total_duration_us: AtomicU64::new(0),
            combats_resolved: AtomicU64::new(0),
            quests_completed: AtomicU64::new(0),
            crates_opened: AtomicU64::new(0),
            rebirths: AtomicU64::new(0),
            clans_formed: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }
}

impl ServerMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_request(&self, duration_us: u64, is_error: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_duration_us
            .fetch_add(duration_us, Ordering::Relaxed);
        if is_error {
            self.total_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn uptime_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    pub fn avg_duration_ms(&self) -> f64 {
        let total = self.total_requests.load(Ordering::Relaxed);
        let dur_us = self.total_duration_us.load(Ordering::Relaxed);
        if total > 0 {
            (dur_us as f64 / total as f64) / 1000.0
        } else {
            0.0
        }
    }
}

// ============================================================================
// Axum Middleware — automatic request tracking
// ============================================================================

/// Records request count and duration for every HTTP request.
pub async fn metrics_middleware(
    State(state): State<ApiState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let resp = next.run(req).await;
    let duration_us = start.elapsed().as_micros() as u64;
    let is_error = resp.status().is_client_error() || resp.status().is_server_error();

    state.metrics.record_request(duration_us, is_error);
    resp
}

// ============================================================================
// GET /metrics — Prometheus text exposition format
// ============================================================================

pub async fn prometheus_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let m = &state.metrics;
    let total_requests = m.total_requests.load(Ordering::Relaxed);
    let total_errors = m.total_errors.load(Ordering::Relaxed);
    let total_dur_us = m.total_duration_us.load(Ordering::Relaxed);
    let uptime = m.uptime_secs();

    let profile_count = state.profiles.profile_count().unwrap_or(0);
    let clan_count = state.profiles.clan_count().unwrap_or(0);

    let avg_req_duration_s = if total_requests > 0 {
        (total_dur_us as f64 / total_requests as f64) / 1_000_000.0
    } else {
        0.0
    };

    let body = format!(
        "# HELP arcane_requests_total Total HTTP requests served\n\
         # TYPE arcane_requests_total counter\n\
         arcane_requests_total {total_requests}\n\
         \n\
         # HELP arcane_request_errors_total Total HTTP request errors (4xx/5xx)\n\
         # TYPE arcane_request_errors_total counter\n\
         arcane_request_errors_total {total_errors}\n\
         \n\
         # HELP arcane_request_duration_seconds Average request duration\n\
         # TYPE arcane_request_duration_seconds gauge\n\
         arcane_request_duration_seconds {avg_req_duration_s:.6}\n\
         \n\
         # HELP arcane_profiles Total player profiles\n\
         # TYPE arcane_profiles gauge\n\
         arcane_profiles {profile_count}\n\
         \n\
         # HELP arcane_clans Total clans formed\n\
         # TYPE arcane_clans gauge\n\
         arcane_clans {clan_count}\n\
         \n\
         # HELP arcane_combats_resolved_total Combat sessions resolved\n\
         # TYPE arcane_combats_resolved_total counter\n\
         arcane_combats_resolved_total {combats}\n\
         \n\
         # HELP arcane_quests_completed_total Quests completed\n\
         # TYPE arcane_quests_completed_total counter\n\
         arcane_quests_completed_total {quests}\n\
         \n\
         # HELP arcane_crates_opened_total Crates opened\n\
         # TYPE arcane_crates_opened_total counter\n\
         arcane_crates_opened_total {crates}\n\
         \n\
         # HELP arcane_rebirths_total Aura rebirths performed\n\
         # TYPE arcane_rebirths_total counter\n\
         arcane_rebirths_total {rebirths}\n\
         \n\
         # HELP arcane_uptime_seconds Server uptime\n\
         # TYPE arcane_uptime_seconds gauge\n\
         arcane_uptime_seconds {uptime:.2}\n",
        combats = m.combats_resolved.load(Ordering::Relaxed),
        quests = m.quests_completed.load(Ordering::Relaxed),
        crates = m.crates_opened.load(Ordering::Relaxed),
        rebirths = m.rebirths.load(Ordering::Relaxed),
    );

    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        body,
    )
}

// ============================================================================
// GET /metrics/json
// ============================================================================

#[derive(Serialize)]
pub struct JsonMetrics {
    pub uptime_secs: f64,
    pub profile_count: usize,
    pub clan_count: usize,
    pub total_requests: u64,
    pub total_errors: u64,
    pub avg_request_duration_ms: f64,
    pub combats_resolved: u64,
    pub quests_completed: u64,
    pub crates_opened: u64,
    pub rebirths: u64,
    pub clans_formed: u64,
}

pub async fn json_metrics_handler(State(state): State<ApiState>) -> Json<JsonMetrics> {
    let m = &state.metrics;

    Json(JsonMetrics {
        uptime_secs: m.uptime_secs(),
        profile_count: state.profiles.profile_count().unwrap_or(0),
        clan_count: state.profiles.clan_count().unwrap_or(0),
        total_requests: m.total_requests.load(Ordering::Relaxed),
        total_errors: m.total_errors.load(Ordering::Relaxed),
        avg_request_duration_ms: m.avg_duration_ms(),
        combats_resolved: m.combats_resolved.load(Ordering::Relaxed),
        quests_completed: m.quests_completed.load(Ordering::Relaxed),
        crates_opened: m.crates_opened.load(Ordering::Relaxed),
        rebirths: m.rebirths.load(Ordering::Relaxed),
        clans_formed: m.clans_formed.load(Ordering::Relaxed),
    })
}

// ============================================================================
// Tests
// ============================================================================

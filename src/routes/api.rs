// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Group command routes.
//!
//! The member middleware is applied in routes/mod.rs, so every handler here
//! receives an `Invoker` extension.

use crate::error::{AppError, Result};
use crate::input::{parse_distance_km, parse_duration_secs};
use crate::middleware::Invoker;
use crate::models::{
    HistoryItem, LeaderboardEntry, ReminderOutcome, SessionSummary, StatsSummary,
};
use crate::services::tracker::{DEFAULT_HISTORY_LIMIT, DEFAULT_LEADERBOARD_LIMIT, MAX_LIMIT};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Group routes (require member identification).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/groups/{group_id}/runs", post(log_run))
        .route("/api/groups/{group_id}/stats", get(get_stats))
        .route("/api/groups/{group_id}/history", get(get_history))
        .route("/api/groups/{group_id}/leaderboard", get(get_leaderboard))
        .route("/api/groups/{group_id}/reminder", get(get_reminder))
}

// ─── Log Run ─────────────────────────────────────────────────

/// A token typed by the member. Bridges may forward it verbatim or as a
/// JSON number.
#[derive(Deserialize)]
#[serde(untagged)]
enum Token {
    Number(f64),
    Text(String),
}

impl Token {
    fn as_text(&self) -> String {
        match self {
            Token::Number(n) => n.to_string(),
            Token::Text(s) => s.clone(),
        }
    }
}

#[derive(Deserialize)]
struct LogRunRequest {
    /// Kilometers, e.g. `5.6` or `"5,6"`
    distance: Token,
    /// `"27:30"`, `"22.4"` (minutes) or `30` (minutes)
    duration: Token,
}

/// Log a run for the invoking member.
async fn log_run(
    State(state): State<Arc<AppState>>,
    Extension(invoker): Extension<Invoker>,
    Json(body): Json<LogRunRequest>,
) -> Result<(StatusCode, Json<SessionSummary>)> {
    let distance_km = parse_distance_km(&body.distance.as_text())?;
    let duration_sec = parse_duration_secs(&body.duration.as_text())?;

    let summary = state
        .tracker
        .log_session(
            invoker.group_id,
            invoker.user_id,
            &invoker.display_name,
            distance_km,
            duration_sec,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(summary)))
}

// ─── Stats ───────────────────────────────────────────────────

/// Stats for the invoking member in this group.
async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(invoker): Extension<Invoker>,
) -> Result<Json<StatsSummary>> {
    state
        .tracker
        .user_stats(invoker.group_id, invoker.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No runs in this group yet".to_string()))
}

// ─── History & Leaderboard ───────────────────────────────────

#[derive(Deserialize)]
struct LimitQuery {
    limit: Option<u32>,
}

impl LimitQuery {
    fn resolve(&self, default: u32) -> Result<u32> {
        match self.limit {
            Some(0) => Err(AppError::BadRequest(
                "limit must be greater than 0".to_string(),
            )),
            Some(limit) => Ok(limit.min(MAX_LIMIT)),
            None => Ok(default),
        }
    }
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub display_name: String,
    pub runs: Vec<HistoryItem>,
}

/// Latest runs of the invoking member.
async fn get_history(
    State(state): State<Arc<AppState>>,
    Extension(invoker): Extension<Invoker>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<HistoryResponse>> {
    let limit = params.resolve(DEFAULT_HISTORY_LIMIT)?;
    let runs = state
        .tracker
        .user_history(invoker.group_id, invoker.user_id, limit)
        .await?;

    Ok(Json(HistoryResponse {
        display_name: invoker.display_name,
        runs,
    }))
}

#[derive(Serialize)]
pub struct LeaderboardResponse {
    pub entries: Vec<LeaderboardEntry>,
}

/// Group ranking by total distance.
async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Extension(invoker): Extension<Invoker>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<LeaderboardResponse>> {
    let limit = params.resolve(DEFAULT_LEADERBOARD_LIMIT)?;
    let entries = state.tracker.leaderboard(invoker.group_id, limit).await?;

    tracing::debug!(
        group_id = %invoker.group_id,
        entries = entries.len(),
        "Leaderboard served"
    );

    Ok(Json(LeaderboardResponse { entries }))
}

// ─── Reminder Preview ────────────────────────────────────────

/// Who in this group has not logged a run today.
async fn get_reminder(
    State(state): State<Arc<AppState>>,
    Extension(invoker): Extension<Invoker>,
) -> Result<Json<ReminderOutcome>> {
    let today = state.scheduler.clock().now().date();
    let outcome = state
        .scheduler
        .on_reminder_due(invoker.group_id, today)
        .await?;
    Ok(Json(outcome))
}

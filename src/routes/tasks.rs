// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Task routes for operators and external cron.
//!
//! The background scheduler fires the daily sweep on its own; this endpoint
//! runs the same sweep on demand. Guarded by `require_tasks_auth`.

use crate::services::SweepReport;
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use std::sync::Arc;

/// Task routes (operator only).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/tasks/reminders", post(run_reminders))
}

/// Run the reminder sweep for every active group now.
async fn run_reminders(State(state): State<Arc<AppState>>) -> Json<SweepReport> {
    tracing::info!(
        groups = state.registry.len(),
        "Reminder sweep requested"
    );

    let report = state.scheduler.sweep_now().await;

    if !report.failed.is_empty() {
        tracing::warn!(
            failed = ?report.failed,
            "Reminder sweep finished with failures"
        );
    }

    Json(report)
}

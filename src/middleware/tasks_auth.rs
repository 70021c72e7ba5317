// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared-secret authentication for operator task routes.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

pub const TASKS_TOKEN_HEADER: &str = "x-tasks-token";

/// Require `X-Tasks-Token` to match the configured secret for `/tasks/*` routes.
///
/// With no secret configured the routes are closed.
pub async fn require_tasks_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = state.config.tasks_token.as_deref() else {
        tracing::warn!("Blocked tasks request: TASKS_TOKEN is not configured");
        return Err(StatusCode::FORBIDDEN);
    };

    if !token_matches(request.headers(), expected) {
        tracing::warn!("Blocked tasks request with missing or invalid token");
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(request).await)
}

fn token_matches(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(TASKS_TOKEN_HEADER)
        .map(|given| bool::from(given.as_bytes().ct_eq(expected.as_bytes())))
        .unwrap_or(false)
}

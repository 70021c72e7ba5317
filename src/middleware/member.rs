// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identification of the member issuing a group command.
//!
//! The chat bridge passes the sender in headers:
//! - `X-User-Id`: numeric user id (required)
//! - `X-Display-Name`: UTF-8 display name (optional, may be empty)
//!
//! Every identified command marks the group active for reminders and records
//! the member in the group.

use crate::error::AppError;
use crate::models::{GroupId, UserId};
use crate::AppState;
use axum::{
    extract::{Path, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const DISPLAY_NAME_HEADER: &str = "x-display-name";

const MAX_DISPLAY_NAME_LEN: usize = 128;

/// Member on whose behalf a command runs.
#[derive(Debug, Clone)]
pub struct Invoker {
    pub group_id: GroupId,
    pub user_id: UserId,
    pub display_name: String,
}

#[derive(Deserialize)]
pub struct GroupPath {
    pub group_id: i64,
}

/// Middleware that identifies the invoking member of a group route.
pub async fn identify_member(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GroupPath>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let group_id = GroupId(path.group_id);
    let (user_id, display_name) = read_identity(request.headers())?;

    state.registry.mark_active(group_id);
    state
        .tracker
        .record_member(group_id, user_id, &display_name)
        .await?;

    request.extensions_mut().insert(Invoker {
        group_id,
        user_id,
        display_name,
    });

    Ok(next.run(request).await)
}

fn read_identity(headers: &HeaderMap) -> Result<(UserId, String), AppError> {
    let user_id = headers
        .get(USER_ID_HEADER)
        .ok_or_else(|| AppError::BadRequest("Missing X-User-Id header".to_string()))?
        .to_str()
        .ok()
        .and_then(|raw| raw.parse::<UserId>().ok())
        .ok_or_else(|| AppError::BadRequest("Invalid X-User-Id header".to_string()))?;

    // Header values are raw bytes; names are routinely non-ASCII.
    let display_name = match headers.get(DISPLAY_NAME_HEADER) {
        Some(value) => std::str::from_utf8(value.as_bytes())
            .map_err(|_| AppError::BadRequest("X-Display-Name must be UTF-8".to_string()))?
            .trim()
            .to_string(),
        None => String::new(),
    };

    if display_name.chars().count() > MAX_DISPLAY_NAME_LEN {
        return Err(AppError::BadRequest(format!(
            "X-Display-Name longer than {} characters",
            MAX_DISPLAY_NAME_LEN
        )));
    }

    Ok((user_id, display_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_read_identity() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("12345"));
        headers.insert(
            DISPLAY_NAME_HEADER,
            HeaderValue::from_bytes("Дима".as_bytes()).unwrap(),
        );

        let (user_id, name) = read_identity(&headers).unwrap();
        assert_eq!(user_id, UserId(12345));
        assert_eq!(name, "Дима");
    }

    #[test]
    fn test_display_name_is_optional() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("7"));

        let (_, name) = read_identity(&headers).unwrap();
        assert_eq!(name, "");
    }

    #[test]
    fn test_missing_or_bad_user_id() {
        let headers = HeaderMap::new();
        assert!(matches!(
            read_identity(&headers),
            Err(AppError::BadRequest(_))
        ));

        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("abc"));
        assert!(matches!(
            read_identity(&headers),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_overlong_display_name() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("7"));
        headers.insert(
            DISPLAY_NAME_HEADER,
            HeaderValue::from_str(&"x".repeat(MAX_DISPLAY_NAME_LEN + 1)).unwrap(),
        );
        assert!(matches!(
            read_identity(&headers),
            Err(AppError::BadRequest(_))
        ));
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderValue, Request, StatusCode};
use axum::Router;
use chrono::{NaiveDate, NaiveDateTime};
use group_run_tracker::config::Config;
use group_run_tracker::db::RunStore;
use group_run_tracker::error::{AppError, Result};
use group_run_tracker::models::{GroupId, ReminderEvent};
use group_run_tracker::routes::create_router;
use group_run_tracker::services::{ManualClock, NotificationSink};
use group_run_tracker::AppState;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Sink that keeps every delivered event, optionally failing one group.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<ReminderEvent>>,
    pub fail_for: Option<GroupId>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn failing_for(group_id: GroupId) -> Self {
        Self {
            fail_for: Some(group_id),
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<ReminderEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(&self, event: &ReminderEvent) -> Result<()> {
        if self.fail_for == Some(event.group_id) {
            return Err(AppError::Delivery("bridge offline".to_string()));
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Test app with an in-memory store and a hand-driven clock.
#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub clock: Arc<ManualClock>,
    pub sink: Arc<RecordingSink>,
}

/// Local time used as "now" unless a test moves the clock.
#[allow(dead_code)]
pub fn at(month: u32, day: u32, hour: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, month, day)
        .unwrap()
        .and_hms_opt(hour, min, 0)
        .unwrap()
}

/// Create a test app starting at 2024-05-31 12:00 local.
#[allow(dead_code)]
pub async fn create_test_app() -> TestApp {
    create_test_app_with_sink(RecordingSink::default()).await
}

#[allow(dead_code)]
pub async fn create_test_app_with_sink(sink: RecordingSink) -> TestApp {
    create_test_app_with(Config::test_default(), sink).await
}

#[allow(dead_code)]
pub async fn create_test_app_with(config: Config, sink: RecordingSink) -> TestApp {
    let store = RunStore::in_memory()
        .await
        .expect("Failed to open in-memory store");
    let clock = Arc::new(ManualClock::new(at(5, 31, 12, 0)));
    let sink = Arc::new(sink);

    let state = Arc::new(AppState::new(
        config,
        store,
        sink.clone(),
        clock.clone(),
    ));

    TestApp {
        router: create_router(state.clone()),
        state,
        clock,
        sink,
    }
}

/// Build a request as the chat bridge would send it for one member.
#[allow(dead_code)]
pub fn member_request(
    method: &str,
    uri: &str,
    user_id: i64,
    display_name: &str,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("X-User-Id", user_id.to_string())
        .header(
            "X-Display-Name",
            HeaderValue::from_bytes(display_name.as_bytes()).unwrap(),
        );

    match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request and decode the JSON body (`Null` when empty).
#[allow(dead_code)]
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

/// Log a run through the API and assert it was accepted.
#[allow(dead_code)]
pub async fn log_run(
    app: &Router,
    group_id: i64,
    user_id: i64,
    display_name: &str,
    distance: &str,
    duration: &str,
) -> serde_json::Value {
    let (status, json) = send(
        app,
        member_request(
            "POST",
            &format!("/api/groups/{}/runs", group_id),
            user_id,
            display_name,
            Some(serde_json::json!({ "distance": distance, "duration": duration })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", json);
    json
}

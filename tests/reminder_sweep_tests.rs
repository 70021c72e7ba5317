// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reminder preview and sweep through the HTTP surface.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::Duration;
use group_run_tracker::config::Config;
use group_run_tracker::models::{GroupId, UserId};
use group_run_tracker::services::SchedulerState;

mod common;
use common::{at, log_run, member_request, send, RecordingSink};

fn sweep_request() -> Request<Body> {
    sweep_request_with_token(Some("test-tasks-token"))
}

fn sweep_request_with_token(token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/tasks/reminders");
    if let Some(token) = token {
        builder = builder.header("X-Tasks-Token", token);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_reminder_preview_lists_members_without_runs_today() {
    let app = common::create_test_app().await;

    // Yesterday's run does not count for today
    app.clock.set(at(5, 30, 8, 0));
    log_run(&app.router, -1, 1, "Anna", "5", "25").await;

    app.clock.set(at(5, 31, 8, 0));
    log_run(&app.router, -1, 2, "Boris", "5", "25").await;

    let (status, json) = send(
        &app.router,
        member_request("GET", "/api/groups/-1/reminder", 2, "Boris", None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["all_compliant"], false);
    let pending = json["non_compliant_users"].as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["id"], 1);
    assert_eq!(pending[0]["display_name"], "Anna");
}

#[tokio::test]
async fn test_sweep_requires_tasks_token() {
    let app = common::create_test_app().await;
    log_run(&app.router, -1, 1, "Anna", "5", "25").await;

    for token in [None, Some("wrong-token")] {
        let (status, _) = send(&app.router, sweep_request_with_token(token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "token {:?}", token);
    }
    assert!(app.sink.events().is_empty());
}

#[tokio::test]
async fn test_sweep_closed_without_configured_token() {
    let config = Config {
        tasks_token: None,
        ..Config::test_default()
    };
    let app = common::create_test_app_with(config, RecordingSink::default()).await;
    log_run(&app.router, -1, 1, "Anna", "5", "25").await;

    let (status, _) = send(&app.router, sweep_request()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(app.sink.events().is_empty());
}

#[tokio::test]
async fn test_sweep_with_no_groups() {
    let app = common::create_test_app().await;

    let (status, json) = send(&app.router, sweep_request()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["groups"], 0);
    assert!(app.sink.events().is_empty());
}

#[tokio::test]
async fn test_sweep_delivers_one_event_per_group() {
    let app = common::create_test_app().await;

    log_run(&app.router, -1, 1, "Anna", "5", "25").await;
    log_run(&app.router, -2, 2, "Boris", "5", "25").await;
    // Seen in group -2 but never ran
    send(
        &app.router,
        member_request("GET", "/api/groups/-2/leaderboard", 3, "Vera", None),
    )
    .await;

    app.clock.set(at(5, 31, 19, 0));
    let (status, json) = send(&app.router, sweep_request()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["groups"], 2);
    assert_eq!(json["reminded"], 1);
    assert_eq!(json["all_compliant"], 1);
    assert!(json["failed"].as_array().unwrap().is_empty());

    let mut events = app.sink.events();
    events.sort_by_key(|e| e.group_id);
    assert_eq!(events.len(), 2);

    assert_eq!(events[0].group_id, GroupId(-2));
    assert!(!events[0].outcome.all_compliant);
    assert_eq!(events[0].outcome.non_compliant_users.len(), 1);
    assert_eq!(events[0].outcome.non_compliant_users[0].id, UserId(3));
    assert_eq!(events[0].fired_at, at(5, 31, 19, 0));

    assert_eq!(events[1].group_id, GroupId(-1));
    assert!(events[1].outcome.all_compliant);
    assert!(events[1].outcome.non_compliant_users.is_empty());
}

#[tokio::test]
async fn test_sweep_contains_delivery_failure() {
    let app = common::create_test_app_with_sink(RecordingSink::failing_for(GroupId(-1))).await;

    log_run(&app.router, -1, 1, "Anna", "5", "25").await;
    log_run(&app.router, -2, 2, "Boris", "5", "25").await;

    let (status, json) = send(&app.router, sweep_request()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["groups"], 2);
    assert_eq!(json["failed"], serde_json::json!([-1]));

    let events = app.sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].group_id, GroupId(-2));
}

#[tokio::test]
async fn test_scheduler_cycle_crosses_month_end() {
    let app = common::create_test_app().await;
    let scheduler = app.state.scheduler.clone();

    log_run(&app.router, -1, 1, "Anna", "5", "25").await;

    // 12:00 on May 31: today's cutoff is still ahead
    let state = scheduler.initial_state();
    assert_eq!(
        state,
        SchedulerState::Waiting {
            next_trigger: at(5, 31, 19, 0)
        }
    );

    let state = scheduler.advance(state).await;
    assert_eq!(
        state,
        SchedulerState::Sweeping {
            fired_at: at(5, 31, 19, 0)
        }
    );

    // The sweep itself takes a while; the next trigger is still one day on
    app.clock.advance(Duration::minutes(3));
    let state = scheduler.advance(state).await;
    assert_eq!(
        state,
        SchedulerState::Waiting {
            next_trigger: at(6, 1, 19, 0)
        }
    );

    let events = app.sink.events();
    assert_eq!(events.len(), 1);
    assert!(events[0].outcome.all_compliant);
}

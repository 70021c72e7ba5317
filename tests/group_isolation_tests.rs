// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data from one group must never show up in another.

use axum::http::StatusCode;
use group_run_tracker::models::GroupId;

mod common;
use common::{log_run, member_request, send};

#[tokio::test]
async fn test_stats_are_scoped_to_group() {
    let app = common::create_test_app().await;

    log_run(&app.router, -1, 42, "Ivan", "10", "50").await;
    log_run(&app.router, -2, 42, "Ivan", "3", "15").await;

    let (_, json) = send(
        &app.router,
        member_request("GET", "/api/groups/-2/stats", 42, "Ivan", None),
    )
    .await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["total_distance_km"], 3.0);

    let (status, _) = send(
        &app.router,
        member_request("GET", "/api/groups/-3/stats", 42, "Ivan", None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_leaderboard_is_scoped_to_group() {
    let app = common::create_test_app().await;

    log_run(&app.router, -1, 1, "Anna", "10", "50").await;
    log_run(&app.router, -2, 2, "Boris", "3", "15").await;

    let (_, json) = send(
        &app.router,
        member_request("GET", "/api/groups/-2/leaderboard", 2, "Boris", None),
    )
    .await;

    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["display_name"], "Boris");
}

#[tokio::test]
async fn test_membership_is_per_group() {
    let app = common::create_test_app().await;

    log_run(&app.router, -1, 1, "Anna", "5", "25").await;
    send(
        &app.router,
        member_request("GET", "/api/groups/-2/leaderboard", 2, "Boris", None),
    )
    .await;

    let store = app.state.tracker.store();
    let first = store.group_members(GroupId(-1)).await.unwrap();
    let second = store.group_members(GroupId(-2)).await.unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(first[0].display_name, "Anna");
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].display_name, "Boris");

    assert_eq!(app.state.registry.list_active(), vec![GroupId(-2), GroupId(-1)]);
}

#[tokio::test]
async fn test_display_name_fixed_at_first_sighting() {
    let app = common::create_test_app().await;

    log_run(&app.router, -1, 1, "Anna", "5", "25").await;
    log_run(&app.router, -1, 1, "Anna K.", "5", "25").await;

    let members = app
        .state
        .tracker
        .store()
        .group_members(GroupId(-1))
        .await
        .unwrap();
    assert_eq!(members[0].display_name, "Anna");

    // The leaderboard shows the name from the latest run
    let (_, json) = send(
        &app.router,
        member_request("GET", "/api/groups/-1/leaderboard", 1, "Anna K.", None),
    )
    .await;
    assert_eq!(json["entries"][0]["display_name"], "Anna K.");
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Group Run Tracker: log runs in chat groups, rank members, nag the lazy.
//!
//! This crate provides the tracking engine (per-group run log, stats,
//! leaderboard), the daily reminder scheduler, and a small HTTP API that a
//! chat bridge calls for each group command.

pub mod config;
pub mod db;
pub mod error;
pub mod input;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use std::sync::Arc;

use config::Config;
use db::RunStore;
use services::{Clock, GroupRegistry, NotificationSink, ReminderScheduler, RunTracker};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub tracker: RunTracker,
    pub registry: GroupRegistry,
    pub scheduler: Arc<ReminderScheduler>,
}

impl AppState {
    /// Wire the tracker, registry and scheduler around one store and clock.
    pub fn new(
        config: Config,
        store: RunStore,
        sink: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let registry = GroupRegistry::new();
        let tracker = RunTracker::new(store.clone(), clock.clone());
        let scheduler = Arc::new(ReminderScheduler::new(
            store,
            registry.clone(),
            sink,
            clock,
            config.reminder_time,
        ));

        Self {
            config,
            tracker,
            registry,
            scheduler,
        }
    }
}

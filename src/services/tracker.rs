// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run tracking service.
//!
//! Handles the group commands:
//! 1. Log a run (validate, record member, append run)
//! 2. Member stats (totals and average pace)
//! 3. Member history (latest runs)
//! 4. Group leaderboard (total distance ranking)

use std::sync::Arc;

use chrono::Timelike;

use crate::db::RunStore;
use crate::error::Result;
use crate::models::{
    GroupId, HistoryItem, LeaderboardEntry, NewRun, SessionSummary, StatsSummary, UserId,
};
use crate::services::scheduler::Clock;

pub const DEFAULT_HISTORY_LIMIT: u32 = 5;
pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 10;
/// Upper bound for limits supplied over HTTP.
pub const MAX_LIMIT: u32 = 50;

/// Aggregation layer over the run store.
#[derive(Clone)]
pub struct RunTracker {
    store: RunStore,
    clock: Arc<dyn Clock>,
}

impl RunTracker {
    pub fn new(store: RunStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &RunStore {
        &self.store
    }

    /// Record a member on first sighting in a group.
    pub async fn record_member(
        &self,
        group_id: GroupId,
        user_id: UserId,
        display_name: &str,
    ) -> Result<()> {
        self.store
            .upsert_member(group_id, user_id, display_name, self.now())
            .await
    }

    /// Log a run and summarize it.
    pub async fn log_session(
        &self,
        group_id: GroupId,
        user_id: UserId,
        display_name: &str,
        distance_km: f64,
        duration_sec: i64,
    ) -> Result<SessionSummary> {
        let run = NewRun {
            group_id,
            user_id,
            display_name: display_name.to_string(),
            distance_km,
            duration_sec,
            logged_at: self.now(),
        };

        let stored = self.store.log_run(&run).await?;
        let summary = SessionSummary::from(&stored);

        tracing::info!(
            group_id = %group_id,
            user_id = %user_id,
            run_id = stored.id,
            distance_km,
            duration = %summary.duration,
            pace = %summary.pace,
            "Run logged"
        );

        Ok(summary)
    }

    /// Stats for one member, `None` when they have no runs in the group.
    pub async fn user_stats(
        &self,
        group_id: GroupId,
        user_id: UserId,
    ) -> Result<Option<StatsSummary>> {
        let totals = self.store.user_totals(group_id, user_id).await?;
        Ok(totals.map(StatsSummary::from))
    }

    /// Latest runs of one member, newest first.
    pub async fn user_history(
        &self,
        group_id: GroupId,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<HistoryItem>> {
        let entries = self
            .store
            .user_history(group_id, user_id, limit)
            .await?;
        Ok(entries.into_iter().map(HistoryItem::from).collect())
    }

    /// Group ranking by total distance.
    pub async fn leaderboard(
        &self,
        group_id: GroupId,
        limit: u32,
    ) -> Result<Vec<LeaderboardEntry>> {
        let rows = self.store.leaderboard(group_id, limit).await?;
        Ok(LeaderboardEntry::rank_rows(rows))
    }

    /// Current local time, truncated to whole seconds.
    fn now(&self) -> chrono::NaiveDateTime {
        let now = self.clock.now();
        now.with_nanosecond(0).unwrap_or(now)
    }
}

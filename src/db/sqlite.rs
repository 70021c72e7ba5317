// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite store with typed, group-scoped operations.
//!
//! Provides high-level operations for:
//! - Members (per-group user records)
//! - Runs (append-only run log)
//! - Aggregates (totals, history, leaderboard, daily activity)
//!
//! Every query filters on `group_id`; nothing here ever reads across groups.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};

use crate::error::{AppError, Result};
use crate::models::{
    GroupId, GroupMember, HistoryEntry, LeaderboardRow, NewRun, Run, RunTotals, UserId,
};
use crate::time_utils::day_bounds;

const MAX_CONNECTIONS: u32 = 8;

/// SQLite-backed run store.
#[derive(Clone)]
pub struct RunStore {
    pool: SqlitePool,
}

impl RunStore {
    /// Open (creating if needed) a database and run migrations.
    pub async fn connect(database_url: &str) -> Result<Self> {
        if is_memory_url(database_url) {
            return Self::in_memory().await;
        }

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {}", e)))?;

        sqlx::migrate!().run(&pool).await?;

        tracing::info!(url = database_url, "Connected to SQLite");

        Ok(Self { pool })
    }

    /// Create a private in-memory database.
    ///
    /// Every SQLite connection to `:memory:` is a separate database, so the
    /// pool holds exactly one connection and never recycles it.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open in-memory database: {}", e)))?;

        sqlx::migrate!().run(&pool).await?;

        tracing::debug!("Using in-memory SQLite database");

        Ok(Self { pool })
    }

    // ─── Member Operations ───────────────────────────────────────

    /// Record a member on first sighting.
    ///
    /// An existing row is left untouched: the display name stays the one seen
    /// first.
    pub async fn upsert_member(
        &self,
        group_id: GroupId,
        user_id: UserId,
        display_name: &str,
        seen_at: NaiveDateTime,
    ) -> Result<()> {
        insert_member(&self.pool, group_id, user_id, display_name, seen_at).await
    }

    /// All members of a group, ordered by user id.
    pub async fn group_members(&self, group_id: GroupId) -> Result<Vec<GroupMember>> {
        let members = sqlx::query_as::<_, GroupMember>(
            "SELECT user_id, group_id, display_name, created_at
             FROM members
             WHERE group_id = ?
             ORDER BY user_id",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    // ─── Run Operations ──────────────────────────────────────────

    /// Append a run. Invalid distance or duration is rejected before any write.
    pub async fn record_run(&self, run: &NewRun) -> Result<Run> {
        run.validate()?;
        insert_run(&self.pool, run).await
    }

    /// Record the member (if new) and append the run in one transaction.
    pub async fn log_run(&self, run: &NewRun) -> Result<Run> {
        run.validate()?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        insert_member(
            &mut *tx,
            run.group_id,
            run.user_id,
            &run.display_name,
            run.logged_at,
        )
        .await?;
        let stored = insert_run(&mut *tx, run).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit run: {}", e)))?;

        Ok(stored)
    }

    // ─── Aggregate Queries ───────────────────────────────────────

    /// Totals for one member. `None` when they have no runs in the group.
    pub async fn user_totals(
        &self,
        group_id: GroupId,
        user_id: UserId,
    ) -> Result<Option<RunTotals>> {
        let (count, total_distance_km, total_duration_sec): (i64, Option<f64>, Option<i64>) =
            sqlx::query_as(
                "SELECT COUNT(*), SUM(distance_km), SUM(duration_sec)
                 FROM runs
                 WHERE group_id = ? AND user_id = ?",
            )
            .bind(group_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        if count == 0 {
            return Ok(None);
        }

        Ok(Some(RunTotals {
            count,
            total_distance_km: total_distance_km.unwrap_or(0.0),
            total_duration_sec: total_duration_sec.unwrap_or(0),
        }))
    }

    /// A member's most recent runs, newest first.
    ///
    /// Runs logged within the same second are ordered by insertion.
    pub async fn user_history(
        &self,
        group_id: GroupId,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<HistoryEntry>> {
        let entries = sqlx::query_as::<_, HistoryEntry>(
            "SELECT distance_km, duration_sec, logged_at
             FROM runs
             WHERE group_id = ? AND user_id = ?
             ORDER BY logged_at DESC, id DESC
             LIMIT ?",
        )
        .bind(group_id)
        .bind(user_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    /// Total distance per member, highest first.
    ///
    /// Ties are broken by user id ascending. The name shown is the snapshot
    /// from the member's most recent run.
    pub async fn leaderboard(
        &self,
        group_id: GroupId,
        limit: u32,
    ) -> Result<Vec<LeaderboardRow>> {
        let rows = sqlx::query_as::<_, LeaderboardRow>(
            "SELECT totals.user_id, latest.display_name, totals.total_distance_km
             FROM (
                 SELECT user_id, SUM(distance_km) AS total_distance_km, MAX(id) AS latest_id
                 FROM runs
                 WHERE group_id = ?
                 GROUP BY user_id
             ) AS totals
             JOIN runs AS latest ON latest.id = totals.latest_id
             ORDER BY totals.total_distance_km DESC, totals.user_id ASC
             LIMIT ?",
        )
        .bind(group_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Members with at least one run logged on `date` (local calendar day).
    pub async fn users_active_on(
        &self,
        group_id: GroupId,
        date: NaiveDate,
    ) -> Result<HashSet<UserId>> {
        let (start, end) = day_bounds(date);
        let rows: Vec<(UserId,)> = sqlx::query_as(
            "SELECT DISTINCT user_id
             FROM runs
             WHERE group_id = ? AND logged_at >= ? AND logged_at < ?",
        )
        .bind(group_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(user_id,)| user_id).collect())
    }
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.contains(":memory:")
}

async fn insert_member(
    db: impl sqlx::Executor<'_, Database = Sqlite>,
    group_id: GroupId,
    user_id: UserId,
    display_name: &str,
    seen_at: NaiveDateTime,
) -> Result<()> {
    sqlx::query(
        "INSERT OR IGNORE INTO members (user_id, group_id, display_name, created_at)
         VALUES (?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(group_id)
    .bind(display_name)
    .bind(seen_at)
    .execute(db)
    .await?;
    Ok(())
}

async fn insert_run(db: impl sqlx::Executor<'_, Database = Sqlite>, run: &NewRun) -> Result<Run> {
    let stored = sqlx::query_as::<_, Run>(
        "INSERT INTO runs (group_id, user_id, display_name, distance_km, duration_sec, logged_at)
         VALUES (?, ?, ?, ?, ?, ?)
         RETURNING id, group_id, user_id, display_name, distance_km, duration_sec, logged_at",
    )
    .bind(run.group_id)
    .bind(run.user_id)
    .bind(&run.display_name)
    .bind(run.distance_km)
    .bind(run.duration_sec)
    .bind(run.logged_at)
    .fetch_one(db)
    .await?;
    Ok(stored)
}

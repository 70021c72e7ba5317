//! Per-member aggregates and their display forms.
//!
//! Pace is always derived from summed totals (or a single run's own values),
//! never averaged from per-run paces.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{HistoryEntry, Run, UserId};
use crate::time_utils::{format_min_sec, format_pace};

/// Raw aggregate of a member's runs in one group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunTotals {
    pub count: i64,
    pub total_distance_km: f64,
    pub total_duration_sec: i64,
}

impl RunTotals {
    /// Average pace in seconds per kilometer.
    ///
    /// `None` when no distance has been logged.
    pub fn avg_pace_secs_per_km(&self) -> Option<f64> {
        pace_secs_per_km(self.total_duration_sec, self.total_distance_km)
    }
}

/// Seconds per kilometer for a duration over a distance.
pub fn pace_secs_per_km(duration_sec: i64, distance_km: f64) -> Option<f64> {
    if distance_km > 0.0 && distance_km.is_finite() {
        Some(duration_sec as f64 / distance_km)
    } else {
        None
    }
}

/// Round to one decimal place for display.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Confirmation returned after logging a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub run_id: i64,
    pub display_name: String,
    pub distance_km: f64,
    /// `M:SS`
    pub duration: String,
    /// `M:SS` per kilometer
    pub pace: String,
}

impl From<&Run> for SessionSummary {
    fn from(run: &Run) -> Self {
        let pace = pace_secs_per_km(run.duration_sec, run.distance_km)
            .map(format_pace)
            .unwrap_or_else(|| format_pace(0.0));
        Self {
            run_id: run.id,
            display_name: run.display_name.clone(),
            distance_km: run.distance_km,
            duration: format_min_sec(run.duration_sec),
            pace,
        }
    }
}

/// A member's statistics in one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub count: i64,
    /// Rounded to one decimal
    pub total_distance_km: f64,
    pub total_duration_sec: i64,
    /// `M:SS` per kilometer, absent when no distance is recorded
    pub avg_pace: Option<String>,
}

impl From<RunTotals> for StatsSummary {
    fn from(totals: RunTotals) -> Self {
        Self {
            count: totals.count,
            total_distance_km: round_one_decimal(totals.total_distance_km),
            total_duration_sec: totals.total_duration_sec,
            avg_pace: totals.avg_pace_secs_per_km().map(format_pace),
        }
    }
}

/// History entry as shown to the group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryItem {
    pub date: NaiveDate,
    pub distance_km: f64,
    /// `M:SS`
    pub duration: String,
}

impl From<HistoryEntry> for HistoryItem {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            date: entry.logged_at.date(),
            distance_km: entry.distance_km,
            duration: format_min_sec(entry.duration_sec),
        }
    }
}

/// Leaderboard row as returned by the store, in rank order.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct LeaderboardRow {
    pub user_id: UserId,
    pub display_name: String,
    pub total_distance_km: f64,
}

/// Ranked leaderboard entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    /// 1-based position
    pub rank: u32,
    pub user_id: UserId,
    pub display_name: String,
    /// Rounded to one decimal
    pub total_distance_km: f64,
}

impl LeaderboardEntry {
    /// Assign ranks from sequence order.
    pub fn rank_rows(rows: Vec<LeaderboardRow>) -> Vec<Self> {
        rows.into_iter()
            .zip(1u32..)
            .map(|(row, rank)| Self {
                rank,
                user_id: row.user_id,
                display_name: row.display_name,
                total_distance_km: round_one_decimal(row.total_distance_km),
            })
            .collect()
    }
}

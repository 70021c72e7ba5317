// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod member;
pub mod reminder;
pub mod run;
pub mod stats;

pub use member::{GroupId, GroupMember, UserId};
pub use reminder::{NonCompliantUser, ReminderEvent, ReminderOutcome};
pub use run::{HistoryEntry, NewRun, Run};
pub use stats::{
    HistoryItem, LeaderboardEntry, LeaderboardRow, RunTotals, SessionSummary, StatsSummary,
};

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for durations, pace and daily trigger arithmetic.
//!
//! All wall-clock values are naive local times: the service runs in a single
//! timezone and never converts between zones.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

/// Format whole seconds as `M:SS` (minutes are not wrapped into hours).
pub fn format_min_sec(total_secs: i64) -> String {
    let total_secs = total_secs.max(0);
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Format a seconds-per-kilometer value as `M:SS`, flooring both parts.
pub fn format_pace(secs_per_km: f64) -> String {
    if !secs_per_km.is_finite() || secs_per_km < 0.0 {
        return "0:00".to_string();
    }
    let minutes = (secs_per_km / 60.0).floor() as i64;
    let seconds = (secs_per_km % 60.0).floor() as i64;
    format!("{}:{:02}", minutes, seconds)
}

/// First trigger instant at or after `now` for a daily cutoff.
///
/// Today's cutoff is used unless it has already passed.
pub fn first_trigger(now: NaiveDateTime, cutoff: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(cutoff);
    if now > today {
        following_trigger(today)
    } else {
        today
    }
}

/// Trigger instant one calendar day after `fired`, at the same local time.
///
/// Uses calendar arithmetic so month and year ends roll over correctly.
pub fn following_trigger(fired: NaiveDateTime) -> NaiveDateTime {
    fired
        .checked_add_days(Days::new(1))
        .unwrap_or(NaiveDateTime::MAX)
}

/// Half-open `[start, end)` bounds covering one calendar day.
pub fn day_bounds(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(NaiveTime::MIN);
    (start, following_trigger(start))
}

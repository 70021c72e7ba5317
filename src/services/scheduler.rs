// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily reminder scheduler.
//!
//! A two-state machine driven by a `Clock`:
//! - `Waiting { next_trigger }`: suspended until the trigger instant
//! - `Sweeping { fired_at }`: evaluating every active group and delivering
//!   one event per group
//!
//! After a sweep the next trigger is the fired instant plus one calendar day,
//! independent of how long the sweep took.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use futures_util::{stream, StreamExt};
use serde::Serialize;
use tokio::sync::watch;

use crate::db::RunStore;
use crate::error::Result;
use crate::models::{GroupId, NonCompliantUser, ReminderEvent, ReminderOutcome};
use crate::services::notifier::NotificationSink;
use crate::services::registry::GroupRegistry;
use crate::time_utils::{first_trigger, following_trigger};

const MAX_CONCURRENT_GROUPS: usize = 16;
/// Longest single timer sleep before the wall clock is re-read.
const MAX_SLEEP_SLICE: Duration = Duration::from_secs(60);
/// Upper bound on one group's delivery; past it the group counts as failed.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of local wall-clock time and timed suspension.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current local wall-clock time.
    fn now(&self) -> NaiveDateTime;

    /// Suspend until `deadline` (local). Returns immediately if it has passed.
    async fn sleep_until(&self, deadline: NaiveDateTime);
}

/// Real clock: `chrono::Local` plus `tokio::time::sleep`.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    async fn sleep_until(&self, deadline: NaiveDateTime) {
        sleep_until_wall_clock(|| self.now(), deadline, MAX_SLEEP_SLICE).await;
    }
}

/// Sleep until `now()` reads at or past `deadline`.
///
/// The tokio timer is monotonic while the local wall clock is not (DST
/// shifts, host suspend, NTP steps), so sleep in slices of at most
/// `max_slice` and re-read the wall clock after each one.
pub async fn sleep_until_wall_clock<F>(now: F, deadline: NaiveDateTime, max_slice: Duration)
where
    F: Fn() -> NaiveDateTime,
{
    loop {
        let remaining = match (deadline - now()).to_std() {
            Ok(remaining) if !remaining.is_zero() => remaining,
            _ => return,
        };
        tokio::time::sleep(remaining.min(max_slice)).await;
    }
}

/// Clock whose time only moves when told to. Sleeping jumps straight to the
/// deadline.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn sleep_until(&self, deadline: NaiveDateTime) {
        {
            let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
            if *now < deadline {
                *now = deadline;
            }
        }
        tokio::task::yield_now().await;
    }
}

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Waiting { next_trigger: NaiveDateTime },
    Sweeping { fired_at: NaiveDateTime },
}

/// Result of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SweepReport {
    /// Groups in the snapshot
    pub groups: usize,
    /// Groups that received a reminder listing members
    pub reminded: usize,
    /// Groups where everyone had logged a run
    pub all_compliant: usize,
    /// Groups whose evaluation or delivery failed
    pub failed: Vec<GroupId>,
}

/// Outcome of processing a single group during a sweep.
enum GroupResult {
    Reminded,
    AllCompliant,
    Failed(GroupId),
}

/// Daily reminder sweep over all active groups.
pub struct ReminderScheduler {
    store: RunStore,
    registry: GroupRegistry,
    sink: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
    cutoff: NaiveTime,
    delivery_timeout: Duration,
}

impl ReminderScheduler {
    pub fn new(
        store: RunStore,
        registry: GroupRegistry,
        sink: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
        cutoff: NaiveTime,
    ) -> Self {
        Self {
            store,
            registry,
            sink,
            clock,
            cutoff,
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
        }
    }

    /// Override the per-group delivery timeout.
    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    /// Starting state: today's cutoff unless already passed, else tomorrow's.
    pub fn initial_state(&self) -> SchedulerState {
        SchedulerState::Waiting {
            next_trigger: first_trigger(self.clock.now(), self.cutoff),
        }
    }

    /// Perform one state transition.
    pub async fn advance(&self, state: SchedulerState) -> SchedulerState {
        match state {
            SchedulerState::Waiting { next_trigger } => {
                tracing::debug!(next_trigger = %next_trigger, "Waiting for reminder cutoff");
                self.clock.sleep_until(next_trigger).await;
                SchedulerState::Sweeping {
                    fired_at: next_trigger,
                }
            }
            SchedulerState::Sweeping { fired_at } => {
                let report = self.sweep(fired_at).await;
                tracing::info!(
                    fired_at = %fired_at,
                    groups = report.groups,
                    reminded = report.reminded,
                    all_compliant = report.all_compliant,
                    failed = report.failed.len(),
                    "Reminder sweep complete"
                );

                SchedulerState::Waiting {
                    next_trigger: self.next_trigger_after(fired_at),
                }
            }
        }
    }

    /// Next trigger after a sweep fired at `fired_at`.
    ///
    /// Normally exactly one calendar day later. Days that are already in the
    /// past (the host was suspended, say) are skipped rather than replayed.
    pub fn next_trigger_after(&self, fired_at: NaiveDateTime) -> NaiveDateTime {
        let now = self.clock.now();
        let mut next = following_trigger(fired_at);
        while next < now {
            tracing::warn!(skipped = %next, "Skipping missed reminder cutoff");
            next = following_trigger(next);
        }
        next
    }

    /// Run the wait/sweep loop until `shutdown` turns true.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut state = self.initial_state();
        tracing::info!(cutoff = %self.cutoff, state = ?state, "Reminder scheduler started");

        loop {
            tokio::select! {
                next = self.advance(state) => state = next,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("Reminder scheduler stopping");
                        return;
                    }
                }
            }
        }
    }

    /// Sweep immediately for the current time, outside the daily cycle.
    pub async fn sweep_now(&self) -> SweepReport {
        let fired_at = self.clock.now();
        tracing::info!(fired_at = %fired_at, "Manual reminder sweep");
        self.sweep(fired_at).await
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Sweep every group in the registry snapshot for the date of `fired_at`.
    ///
    /// Failures are contained per group and never abort the sweep.
    pub async fn sweep(&self, fired_at: NaiveDateTime) -> SweepReport {
        let groups = self.registry.list_active();
        let mut report = SweepReport {
            groups: groups.len(),
            ..SweepReport::default()
        };

        let results: Vec<GroupResult> = stream::iter(groups)
            .map(|group_id| self.sweep_group(group_id, fired_at))
            .buffer_unordered(MAX_CONCURRENT_GROUPS)
            .collect()
            .await;

        for result in results {
            match result {
                GroupResult::Reminded => report.reminded += 1,
                GroupResult::AllCompliant => report.all_compliant += 1,
                GroupResult::Failed(group_id) => report.failed.push(group_id),
            }
        }
        report.failed.sort_unstable();
        report
    }

    async fn sweep_group(&self, group_id: GroupId, fired_at: NaiveDateTime) -> GroupResult {
        let outcome = match self.on_reminder_due(group_id, fired_at.date()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(group_id = %group_id, error = %e, "Failed to evaluate group");
                return GroupResult::Failed(group_id);
            }
        };

        let all_compliant = outcome.all_compliant;
        let event = ReminderEvent {
            group_id,
            fired_at,
            outcome,
        };

        match tokio::time::timeout(self.delivery_timeout, self.sink.deliver(&event)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(group_id = %group_id, error = %e, "Failed to deliver reminder");
                return GroupResult::Failed(group_id);
            }
            Err(_) => {
                tracing::warn!(
                    group_id = %group_id,
                    timeout_ms = self.delivery_timeout.as_millis() as u64,
                    "Reminder delivery timed out"
                );
                return GroupResult::Failed(group_id);
            }
        }

        if all_compliant {
            GroupResult::AllCompliant
        } else {
            GroupResult::Reminded
        }
    }

    /// Members of `group_id` who have not logged a run on `date`.
    pub async fn on_reminder_due(
        &self,
        group_id: GroupId,
        date: NaiveDate,
    ) -> Result<ReminderOutcome> {
        evaluate_group(&self.store, group_id, date).await
    }
}

/// Compute compliance of one group on one date.
pub async fn evaluate_group(
    store: &RunStore,
    group_id: GroupId,
    date: NaiveDate,
) -> Result<ReminderOutcome> {
    let members = store.group_members(group_id).await?;
    let active: HashSet<_> = store.users_active_on(group_id, date).await?;

    let pending: Vec<NonCompliantUser> = members
        .into_iter()
        .filter(|m| !active.contains(&m.user_id))
        .map(|m| NonCompliantUser {
            id: m.user_id,
            display_name: m.display_name,
        })
        .collect();

    Ok(ReminderOutcome::from_non_compliant(pending))
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod notifier;
pub mod registry;
pub mod scheduler;
pub mod tracker;

pub use notifier::{LogNotifier, NotificationSink, WebhookNotifier};
pub use registry::GroupRegistry;
pub use scheduler::{
    Clock, ManualClock, ReminderScheduler, SchedulerState, SweepReport, SystemClock,
};
pub use tracker::RunTracker;

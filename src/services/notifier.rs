// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Delivery of reminder events to the chat transport.
//!
//! The scheduler only knows the `NotificationSink` trait. Two sinks ship:
//! - `LogNotifier`: structured log line per event (default, local dev)
//! - `WebhookNotifier`: JSON POST to a bridge that talks to the chat platform

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::ReminderEvent;

/// Receiver of per-group reminder events.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, event: &ReminderEvent) -> Result<()>;
}

/// Sink that only logs events.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn deliver(&self, event: &ReminderEvent) -> Result<()> {
        let pending: Vec<i64> = event
            .outcome
            .non_compliant_users
            .iter()
            .map(|u| u.id.0)
            .collect();

        tracing::info!(
            group_id = %event.group_id,
            fired_at = %event.fired_at,
            all_compliant = event.outcome.all_compliant,
            pending = ?pending,
            "Reminder event"
        );
        Ok(())
    }
}

/// Sink that POSTs each event as JSON to a fixed URL.
#[derive(Clone)]
pub struct WebhookNotifier {
    http: reqwest::Client,
    url: String,
}

/// Upper bound on one webhook request, connect included.
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_WEBHOOK_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed building webhook HTTP client")?;

        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

#[async_trait]
impl NotificationSink for WebhookNotifier {
    async fn deliver(&self, event: &ReminderEvent) -> Result<()> {
        let response = self
            .http
            .post(&self.url)
            .json(event)
            .send()
            .await
            .map_err(|e| AppError::Delivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Delivery(format!(
                "webhook returned {}: {}",
                status, body
            )));
        }

        tracing::debug!(group_id = %event.group_id, "Reminder delivered to webhook");
        Ok(())
    }
}

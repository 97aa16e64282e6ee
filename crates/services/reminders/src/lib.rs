//! # Day Planner Reminders
//!
//! Scans the CMS for events whose reminder time has passed and emails the
//! owner. A reminder is flagged as sent only after the mail transport
//! accepted it, so failed deliveries are picked up again on the next pass.

mod scheduler;

pub use scheduler::ReminderScheduler;

use chrono::{DateTime, Utc};
use dayplanner_core::error::PlannerResult;
use dayplanner_core::mail;
use dayplanner_core::traits::{ContentSource, Mailer};
use dayplanner_core::types::PlannerEvent;
use std::sync::Arc;
use std::time::Duration;

/// Default time between two passes.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Reminder job configuration.
#[derive(Debug, Clone)]
pub struct ReminderConfig {
    /// Application name used in the reminder mail.
    pub app_name: String,
    /// Time between two passes.
    pub interval: Duration,
    /// When false the scheduler never runs.
    pub enabled: bool,
}

impl ReminderConfig {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            ..Self::default()
        }
    }

    /// Sets the pass interval.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Enables or disables the scheduler.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            app_name: "Day Planner".to_string(),
            interval: DEFAULT_INTERVAL,
            enabled: true,
        }
    }
}

/// Counters for one dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Events returned by the CMS.
    pub scanned: usize,
    /// Reminders mailed and flagged.
    pub sent: usize,
    /// Reminders whose delivery or flagging failed.
    pub failed: usize,
    /// Events that turned out not to need a reminder.
    pub skipped: usize,
}

enum Outcome {
    Sent,
    Skipped,
}

/// Runs reminder passes against a [`ContentSource`] and a [`Mailer`].
pub struct ReminderDispatcher {
    content: Arc<dyn ContentSource>,
    mailer: Arc<dyn Mailer>,
    config: ReminderConfig,
}

impl ReminderDispatcher {
    pub fn new(
        content: Arc<dyn ContentSource>,
        mailer: Arc<dyn Mailer>,
        config: ReminderConfig,
    ) -> Self {
        Self {
            content,
            mailer,
            config,
        }
    }

    pub fn config(&self) -> &ReminderConfig {
        &self.config
    }

    /// Runs a single sequential pass.
    ///
    /// Only a failure to fetch the due list fails the pass; per-event errors
    /// are logged and counted.
    pub async fn run_once(&self, now: DateTime<Utc>) -> PlannerResult<DispatchReport> {
        let events = self.content.due_reminders(now).await?;
        let mut report = DispatchReport {
            scanned: events.len(),
            ..DispatchReport::default()
        };

        for event in &events {
            match self.dispatch(event, now).await {
                Ok(Outcome::Sent) => report.sent += 1,
                Ok(Outcome::Skipped) => report.skipped += 1,
                Err(err) => {
                    tracing::error!(event_id = %event.id, error = %err, "Reminder dispatch failed");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    async fn dispatch(&self, event: &PlannerEvent, now: DateTime<Utc>) -> PlannerResult<Outcome> {
        if !event.is_reminder_due(now) {
            tracing::debug!(event_id = %event.id, "Reminder not due, skipping");
            return Ok(Outcome::Skipped);
        }
        if event.user_email.trim().is_empty() {
            tracing::warn!(event_id = %event.id, "Event has no recipient, skipping");
            return Ok(Outcome::Skipped);
        }

        let message = mail::reminder_email(&self.config.app_name, event);
        self.mailer.send(&message).await?;
        self.content.mark_reminder_sent(&event.id).await?;

        tracing::info!(event_id = %event.id, email = %event.user_email, "Reminder sent");
        Ok(Outcome::Sent)
    }
}

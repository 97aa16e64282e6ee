//! Interval driver for the reminder dispatcher.

use crate::ReminderDispatcher;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Runs [`ReminderDispatcher::run_once`] on a fixed interval.
pub struct ReminderScheduler;

impl ReminderScheduler {
    /// Spawns the job. It stops once `shutdown` turns `true` or its sender is dropped.
    ///
    /// The first pass runs immediately.
    pub fn spawn(
        dispatcher: Arc<ReminderDispatcher>,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let config = dispatcher.config();
            if !config.enabled {
                tracing::info!("Reminder job disabled");
                return;
            }

            let mut ticker = interval(config.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            tracing::info!(interval_secs = config.interval.as_secs(), "Reminder job started");

            loop {
                if *shutdown.borrow() {
                    break;
                }

                tokio::select! {
                    _ = ticker.tick() => {
                        match dispatcher.run_once(Utc::now()).await {
                            Ok(report) if report.scanned > 0 => tracing::info!(
                                scanned = report.scanned,
                                sent = report.sent,
                                failed = report.failed,
                                skipped = report.skipped,
                                "Reminder pass finished"
                            ),
                            Ok(_) => tracing::debug!("No reminders due"),
                            Err(err) => tracing::error!(error = %err, "Reminder pass failed"),
                        }
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }

            tracing::info!("Reminder job stopped");
        })
    }
}

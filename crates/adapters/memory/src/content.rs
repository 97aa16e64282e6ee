//! In-memory stand-in for the headless CMS.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dayplanner_core::error::{PlannerError, PlannerResult};
use dayplanner_core::traits::ContentSource;
use dayplanner_core::types::PlannerEvent;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A seedable event list implementing [`ContentSource`].
#[derive(Debug, Clone, Default)]
pub struct MemoryContentSource {
    events: Arc<RwLock<Vec<PlannerEvent>>>,
}

impl MemoryContentSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source pre-populated with `events`.
    pub fn with_events(events: impl IntoIterator<Item = PlannerEvent>) -> Self {
        Self {
            events: Arc::new(RwLock::new(events.into_iter().collect())),
        }
    }

    /// Adds an event.
    pub async fn seed(&self, event: PlannerEvent) {
        self.events.write().await.push(event);
    }

    /// Snapshot of every stored event.
    pub async fn events(&self) -> Vec<PlannerEvent> {
        self.events.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<PlannerEvent> {
        self.events.read().await.iter().find(|e| e.id == id).cloned()
    }
}

#[async_trait]
impl ContentSource for MemoryContentSource {
    async fn due_reminders(&self, now: DateTime<Utc>) -> PlannerResult<Vec<PlannerEvent>> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .filter(|e| e.is_reminder_due(now))
            .cloned()
            .collect())
    }

    async fn mark_reminder_sent(&self, event_id: &str) -> PlannerResult<()> {
        let mut events = self.events.write().await;
        let event = events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or_else(|| PlannerError::not_found("event", "id", event_id))?;
        event.reminder_sent = true;
        Ok(())
    }
}

//! Recording mailer for tests and local development.

use async_trait::async_trait;
use dayplanner_core::error::{PlannerError, PlannerResult};
use dayplanner_core::traits::Mailer;
use dayplanner_core::types::EmailMessage;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A [`Mailer`] that keeps every delivered message in an outbox.
///
/// Recipients registered with [`MemoryMailer::fail_for`] are rejected with a
/// `MailError`, which lets callers exercise delivery failures.
#[derive(Debug, Clone, Default)]
pub struct MemoryMailer {
    outbox: Arc<RwLock<Vec<EmailMessage>>>,
    failing: Arc<RwLock<HashSet<String>>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every future send to `recipient` fail.
    pub async fn fail_for(&self, recipient: impl Into<String>) {
        self.failing.write().await.insert(recipient.into());
    }

    /// Messages delivered so far, oldest first.
    pub async fn sent(&self) -> Vec<EmailMessage> {
        self.outbox.read().await.clone()
    }

    /// The most recent message sent to `recipient`.
    pub async fn last_to(&self, recipient: &str) -> Option<EmailMessage> {
        self.outbox
            .read()
            .await
            .iter()
            .rev()
            .find(|m| m.to == recipient)
            .cloned()
    }

    pub async fn clear(&self) {
        self.outbox.write().await.clear();
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, message: &EmailMessage) -> PlannerResult<()> {
        if self.failing.read().await.contains(&message.to) {
            return Err(PlannerError::mail(format!(
                "recipient {} rejected",
                message.to
            )));
        }

        tracing::debug!(to = %message.to, subject = %message.subject, "Recorded outgoing email");
        self.outbox.write().await.push(message.clone());
        Ok(())
    }
}

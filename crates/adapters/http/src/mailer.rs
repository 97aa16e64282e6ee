//! Postmark-style mail transport.

use crate::{build_client, describe, join};
use async_trait::async_trait;
use dayplanner_core::error::{PlannerError, PlannerResult};
use dayplanner_core::traits::Mailer;
use dayplanner_core::types::EmailMessage;
use serde::Serialize;
use std::time::Duration;

const TOKEN_HEADER: &str = "X-Postmark-Server-Token";

/// Settings for [`HttpMailer`].
#[derive(Clone)]
pub struct HttpMailerConfig {
    pub base_url: String,
    pub api_token: String,
    /// `From` address on every message.
    pub sender: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for HttpMailerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMailerConfig")
            .field("base_url", &self.base_url)
            .field("sender", &self.sender)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct OutboundEmail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
    message_stream: &'static str,
}

impl<'a> OutboundEmail<'a> {
    fn new(sender: &'a str, message: &'a EmailMessage) -> Self {
        Self {
            from: sender,
            to: &message.to,
            subject: &message.subject,
            html_body: &message.html_body,
            text_body: &message.text_body,
            message_stream: "outbound",
        }
    }
}

/// [`Mailer`] posting JSON to a transactional mail API.
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    config: HttpMailerConfig,
}

impl HttpMailer {
    pub fn new(config: HttpMailerConfig) -> PlannerResult<Self> {
        Ok(Self {
            client: build_client(config.timeout)?,
            config,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> PlannerResult<()> {
        let response = self
            .client
            .post(join(&self.config.base_url, "email"))
            .header(TOKEN_HEADER, &self.config.api_token)
            .header("Accept", "application/json")
            .json(&OutboundEmail::new(&self.config.sender, message))
            .send()
            .await
            .map_err(|e| PlannerError::mail(describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlannerError::mail(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        tracing::debug!(to = %message.to, "Email accepted by mail API");
        Ok(())
    }
}

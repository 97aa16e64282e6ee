//! Strapi-style CMS client.

use crate::{build_client, describe, join};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use dayplanner_core::error::{PlannerError, PlannerResult};
use dayplanner_core::traits::ContentSource;
use dayplanner_core::types::PlannerEvent;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

/// Entries requested per page.
const PAGE_SIZE: u32 = 100;
/// Pages read in one pass before giving up on the rest.
const MAX_PAGES: u32 = 50;

/// Connection settings for [`CmsClient`].
#[derive(Clone)]
pub struct CmsConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

impl CmsConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: None,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for CmsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CmsConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct Listing {
    #[serde(default)]
    data: Vec<serde_json::Value>,
    #[serde(default)]
    meta: Meta,
}

#[derive(Debug, Default, Deserialize)]
struct Meta {
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pagination {
    page: u32,
    page_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EntryId {
    Number(u64),
    Text(String),
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryId::Number(n) => write!(f, "{n}"),
            EntryId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Entry {
    id: EntryId,
    attributes: Attributes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Attributes {
    title: String,
    description: Option<String>,
    location: Option<String>,
    starts_at: DateTime<Utc>,
    reminder_at: Option<DateTime<Utc>>,
    #[serde(default)]
    reminder_sent: bool,
    user_email: Option<String>,
    user_name: Option<String>,
}

/// One page of a listing.
#[derive(Debug)]
struct Page {
    events: Vec<PlannerEvent>,
    /// Next page to request, if any.
    next: Option<u32>,
}

/// Parses a listing body. Entries that cannot be reminded are logged and dropped;
/// only an unreadable body fails.
fn parse_page(body: &str) -> PlannerResult<Page> {
    let listing: Listing = serde_json::from_str(body)
        .map_err(|e| PlannerError::cms(format!("unexpected event listing: {e}")))?;

    let events = listing.data.into_iter().filter_map(parse_entry).collect();
    let next = listing
        .meta
        .pagination
        .filter(|p| p.page < p.page_count)
        .map(|p| p.page + 1);

    Ok(Page { events, next })
}

fn parse_entry(value: serde_json::Value) -> Option<PlannerEvent> {
    let raw_id = value.get("id").cloned();
    let entry: Entry = match serde_json::from_value(value) {
        Ok(entry) => entry,
        Err(e) => {
            tracing::warn!(event_id = ?raw_id, error = %e, "Malformed event entry, ignoring");
            return None;
        }
    };

    let id = entry.id.to_string();
    let attrs = entry.attributes;
    let (Some(reminder_at), Some(user_email)) = (attrs.reminder_at, attrs.user_email) else {
        tracing::warn!(event_id = %id, "Event lacks reminder time or recipient, ignoring");
        return None;
    };

    Some(PlannerEvent {
        id,
        title: attrs.title,
        description: attrs.description,
        location: attrs.location,
        starts_at: attrs.starts_at,
        reminder_at,
        reminder_sent: attrs.reminder_sent,
        user_email,
        user_name: attrs.user_name,
    })
}

/// Reads pages from `fetch` until the listing says there are no more.
async fn collect_pages<F, Fut>(mut fetch: F) -> PlannerResult<Vec<PlannerEvent>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = PlannerResult<String>>,
{
    let mut events = Vec::new();
    let mut page = 1;

    loop {
        let parsed = parse_page(&fetch(page).await?)?;
        events.extend(parsed.events);

        match parsed.next {
            Some(next) if next <= MAX_PAGES => page = next,
            Some(_) => {
                tracing::warn!(pages = MAX_PAGES, "Due reminder listing truncated");
                break;
            }
            None => break,
        }
    }

    Ok(events)
}

/// Query string selecting page `page` of unsent reminders due at `now`, oldest first.
fn due_query(now: DateTime<Utc>, page: u32) -> Vec<(&'static str, String)> {
    vec![
        ("filters[reminderSent][$eq]", "false".to_string()),
        (
            "filters[reminderAt][$lte]",
            now.to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
        ("sort[0]", "reminderAt:asc".to_string()),
        ("pagination[page]", page.to_string()),
        ("pagination[pageSize]", PAGE_SIZE.to_string()),
    ]
}

/// [`ContentSource`] over the CMS REST API.
#[derive(Debug, Clone)]
pub struct CmsClient {
    client: reqwest::Client,
    config: CmsConfig,
}

impl CmsClient {
    pub fn new(config: CmsConfig) -> PlannerResult<Self> {
        Ok(Self {
            client: build_client(config.timeout)?,
            config,
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let request = self
            .client
            .request(method, join(&self.config.base_url, path));
        match &self.config.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn fetch_page(&self, now: DateTime<Utc>, page: u32) -> PlannerResult<String> {
        let response = self
            .request(reqwest::Method::GET, "api/events")
            .query(&due_query(now, page))
            .send()
            .await
            .map_err(|e| PlannerError::cms(describe(&e)))?;

        Self::expect_success(response)
            .await?
            .text()
            .await
            .map_err(|e| PlannerError::cms(describe(&e)))
    }

    async fn expect_success(response: reqwest::Response) -> PlannerResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(PlannerError::cms(format!("HTTP {}: {}", status.as_u16(), body)))
    }
}

#[async_trait]
impl ContentSource for CmsClient {
    async fn due_reminders(&self, now: DateTime<Utc>) -> PlannerResult<Vec<PlannerEvent>> {
        let events = collect_pages(|page| self.fetch_page(now, page)).await?;
        tracing::debug!(count = events.len(), "Fetched due reminders");
        Ok(events)
    }

    async fn mark_reminder_sent(&self, event_id: &str) -> PlannerResult<()> {
        let response = self
            .request(reqwest::Method::PUT, &format!("api/events/{event_id}"))
            .json(&serde_json::json!({ "data": { "reminderSent": true } }))
            .send()
            .await
            .map_err(|e| PlannerError::cms(describe(&e)))?;

        Self::expect_success(response).await?;
        Ok(())
    }
}

//! Schedule feed clients
//!
//! Website: Event Organiser full-calendar endpoint of the WordPress site.
//! Automation: LibreTime `live-info-v2`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use raster_common::{AutomationSchedule, WebsiteEvent};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

/// Upper bound on shows requested from LibreTime; effectively "all of them"
const LIBRETIME_MAX_SHOWS: u64 = 600_000_000;

const USER_AGENT: &str = concat!("raster-check/", env!("CARGO_PKG_VERSION"));

/// Error pages (e.g. a WordPress 500) are cut to this many characters
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Feed retrieval errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} returned {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("Parse error in response from {url}: {message}")]
    Parse { url: String, message: String },
}

/// Source of both schedules.
///
/// Implemented over HTTP by [`HttpFeeds`]; tests substitute in-memory data.
#[async_trait]
pub trait ScheduleFeeds: Send + Sync {
    /// Website events between `from` and `to` (inclusive dates)
    async fn website_events(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<WebsiteEvent>, FetchError>;

    /// Automation schedule for the next `days` days
    async fn automation_schedule(&self, days: u32) -> Result<AutomationSchedule, FetchError>;
}

/// Calendar feed URL for a date range
pub fn website_feed_url(base_url: &str, from: NaiveDate, to: NaiveDate) -> String {
    format!(
        "{}/wp-admin/admin-ajax.php?action=eventorganiser-fullcal&start={}&end={}&timeformat=G%3Ai",
        base_url,
        from.format("%Y-%m-%d"),
        to.format("%Y-%m-%d"),
    )
}

/// Live-info feed URL. One extra day is requested so shows running past the
/// end of the website window are still paired.
pub fn automation_feed_url(base_url: &str, days: u32) -> String {
    format!(
        "{}/api/live-info-v2?days={}&shows={}",
        base_url,
        days.saturating_add(1),
        LIBRETIME_MAX_SHOWS
    )
}

/// HTTP implementation of [`ScheduleFeeds`]
pub struct HttpFeeds {
    http_client: reqwest::Client,
    website_url: String,
    libretime_url: String,
}

impl HttpFeeds {
    /// Create a client; `timeout` bounds each request end to end.
    pub fn new(website_url: String, libretime_url: String, timeout: Duration) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            website_url,
            libretime_url,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        debug!(url = %url, "Fetching feed");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: truncate_body(body),
            });
        }

        let body = response.text().await.map_err(|e| request_error(url, e))?;
        parse_body(url, &body)
    }
}

#[async_trait]
impl ScheduleFeeds for HttpFeeds {
    async fn website_events(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<WebsiteEvent>, FetchError> {
        let url = website_feed_url(&self.website_url, from, to);
        let events: Vec<WebsiteEvent> = self.get_json(&url).await?;
        info!(count = events.len(), "Fetched website events");
        Ok(events)
    }

    async fn automation_schedule(&self, days: u32) -> Result<AutomationSchedule, FetchError> {
        let url = automation_feed_url(&self.libretime_url, days);
        let schedule: AutomationSchedule = self.get_json(&url).await?;
        info!(
            count = schedule.shows.next.len(),
            current = schedule.shows.current.is_some(),
            "Fetched automation schedule"
        );
        Ok(schedule)
    }
}

fn request_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Network(e.to_string())
    }
}

fn truncate_body(mut body: String) -> String {
    if let Some((cut, _)) = body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        body.truncate(cut);
        body.push_str("...");
    }
    body
}

fn parse_body<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Parse {
        url: url.to_string(),
        message: e.to_string(),
    })
}

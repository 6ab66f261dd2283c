//! HTTP schedule feed.
//!
//! This is the only place that interprets status codes and bodies. The
//! session counts as expired on 401/403 or when the feed answers with an
//! HTML page (the portal redirects to its login form).

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use crewline_core::ports::{RecordSource, SourceError};
use crewline_core::RawRecord;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, USER_AGENT};
use reqwest::StatusCode;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::SourceConfig;

const USER_AGENT_VALUE: &str = concat!("crewline/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct HttpRecordSource {
    client: reqwest::Client,
    config: SourceConfig,
    time_zone: String,
    cookie: Option<String>,
}

impl HttpRecordSource {
    /// `time_zone` is forwarded to the feed so all-day entries line up with
    /// the watcher's notion of "today".
    pub fn new(
        config: SourceConfig,
        time_zone: impl Into<String>,
        cookie: Option<String>,
    ) -> Result<Self, SourceError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| SourceError::Transport {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            config,
            time_zone: time_zone.into(),
            cookie,
        })
    }

    /// Feed URL for the window `[now, now + window_days]`.
    pub fn request_url(&self, now: DateTime<Utc>) -> Result<Url, SourceError> {
        let end = chrono::Duration::try_days(i64::from(self.config.window_days))
            .and_then(|window| now.checked_add_signed(window))
            .ok_or_else(|| SourceError::Transport {
                message: format!("window of {} days is out of range", self.config.window_days),
            })?;
        let mut url = Url::parse(&self.config.url).map_err(|e| SourceError::Transport {
            message: format!("invalid feed url: {}", e),
        })?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("start", &now.to_rfc3339_opts(SecondsFormat::Secs, true))
                .append_pair("end", &end.to_rfc3339_opts(SecondsFormat::Secs, true))
                .append_pair("time_zone", &self.time_zone)
                .append_pair("view", &self.config.view);
            for uuid in &self.config.aircraft_uuids {
                query.append_pair("uuid[]", uuid);
            }
            query.append_pair("parallel_load", "true");
        }

        Ok(url)
    }

    async fn fetch_once(&self, url: &Url) -> Result<Vec<RawRecord>, SourceError> {
        let mut request = self.client.get(url.clone());
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, format!("{}={}", self.config.cookie_name, cookie));
        }

        let response = request.send().await.map_err(|e| SourceError::Transport {
            message: e.to_string(),
        })?;
        let status = response.status();

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(SourceError::AuthExpired {
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let body = response.text().await.map_err(|e| SourceError::Transport {
            message: format!("failed to read response body: {}", e),
        })?;

        if !status.is_success() {
            return Err(SourceError::Transport {
                message: format!("HTTP {}: {}", status.as_u16(), excerpt(&body)),
            });
        }

        if looks_like_html(&body) {
            return Err(SourceError::AuthExpired {
                message: "feed returned an HTML page".to_string(),
            });
        }

        serde_json::from_str::<Vec<RawRecord>>(&body).map_err(|e| SourceError::Parse {
            message: format!("expected a JSON array of events: {}", e),
        })
    }
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    async fn fetch(&self) -> Result<Vec<RawRecord>, SourceError> {
        let url = self.request_url(Utc::now())?;
        let max_attempts = self.config.max_attempts.max(1);
        let delay = Duration::from_millis(self.config.retry_delay_ms);
        let mut attempt = 1;

        loop {
            debug!(attempt, url = %url.path(), "fetching schedule");
            match self.fetch_once(&url).await {
                Ok(records) => {
                    info!(attempt, records = records.len(), "schedule fetched");
                    return Ok(records);
                }
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    warn!(
                        error = %e,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis(),
                        "retrying fetch"
                    );
                    attempt += 1;
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn looks_like_html(body: &str) -> bool {
    let head: String = body.trim_start().chars().take(64).collect();
    let head = head.to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html") || body.contains("<!DOCTYPE html>")
}

fn excerpt(body: &str) -> String {
    body.chars().take(200).collect()
}

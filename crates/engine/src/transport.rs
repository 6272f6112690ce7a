// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Retry-wrapped transport against the remote tender API.
//!
//! GETs retry indefinitely on transport-level failure with a fixed
//! backoff (the remote API's availability is assumed to recover); a
//! non-success GET status abandons the current cycle instead. PATCH is
//! attempted once per resync; a failed write-back is absorbed by
//! forcing a short re-check, not by retrying in place.

use crate::error::EngineError;
use async_trait::async_trait;
use chronograph_domain::{Tender, TenderPatch};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// How often and how long to keep retrying a failing operation.
///
/// The production default is unbounded: availability is traded for the
/// guarantee that a fetch or a reservation is never silently dropped.
/// Tests inject a bounded policy to short-circuit the loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Pause between attempts.
    pub backoff: std::time::Duration,
    /// Maximum number of attempts; `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// Retries forever with the given backoff.
    #[must_use]
    pub const fn unbounded(backoff: std::time::Duration) -> Self {
        Self {
            backoff,
            max_attempts: None,
        }
    }

    /// Gives up after `max_attempts` attempts.
    #[must_use]
    pub const fn limited(max_attempts: u32, backoff: std::time::Duration) -> Self {
        Self {
            backoff,
            max_attempts: Some(max_attempts),
        }
    }

    /// Whether `attempts` tries have used up this policy.
    #[must_use]
    pub fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}

/// One page of the tender change feed.
#[derive(Debug, Clone, Deserialize)]
pub struct TenderPage {
    /// Tenders changed since the cursor.
    #[serde(default)]
    pub data: Vec<Tender>,
    /// Cursor to the next page, if the feed provided one.
    #[serde(default)]
    pub next_page: Option<PageRef>,
}

/// An opaque pagination cursor.
#[derive(Debug, Clone, Deserialize)]
pub struct PageRef {
    /// The URL of the next page, carried as-is.
    pub uri: String,
}

#[derive(Debug, Deserialize)]
struct TenderEnvelope {
    data: Tender,
}

#[derive(Debug, Serialize)]
struct PatchEnvelope<'a> {
    data: &'a TenderPatch,
}

/// The remote tender API as the engine sees it.
///
/// The trait exists so the resync orchestration can be exercised with an
/// in-memory fake; [`HttpTenderApi`] is the production implementation.
#[async_trait]
pub trait TenderApi: Send + Sync {
    /// Fetches one tender snapshot. `None` means the API answered with a
    /// non-success status and this cycle should be abandoned.
    ///
    /// # Errors
    ///
    /// Returns an error when a bounded retry policy runs out or the
    /// response body cannot be decoded.
    async fn fetch_tender(&self, tender_id: &str) -> Result<Option<Tender>, EngineError>;

    /// PATCHes a decided change back. Returns whether the write-back
    /// succeeded; failure detail is logged here, where the url and
    /// payload are known.
    async fn patch_tender(&self, tender_id: &str, patch: &TenderPatch) -> bool;

    /// Fetches one page of the change feed. `None` means a non-success
    /// status ended the walk.
    ///
    /// # Errors
    ///
    /// Returns an error when a bounded retry policy runs out or the
    /// response body cannot be decoded.
    async fn fetch_page(&self, uri: &str) -> Result<Option<TenderPage>, EngineError>;
}

/// reqwest-backed [`TenderApi`] with basic-auth token and GET retry.
#[derive(Debug, Clone)]
pub struct HttpTenderApi {
    http: reqwest::Client,
    api_url: String,
    api_token: String,
    get_retry: RetryPolicy,
}

impl HttpTenderApi {
    /// Creates a transport against `api_url` (the tender collection
    /// endpoint) using the default unbounded 60-second GET retry.
    #[must_use]
    pub fn new(http: reqwest::Client, api_url: &str, api_token: String) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_token,
            get_retry: RetryPolicy::unbounded(std::time::Duration::from_secs(60)),
        }
    }

    /// Replaces the GET retry policy.
    #[must_use]
    pub const fn with_get_retry(mut self, policy: RetryPolicy) -> Self {
        self.get_retry = policy;
        self
    }

    fn tender_url(&self, tender_id: &str) -> String {
        format!("{}/{tender_id}", self.api_url)
    }

    /// GET with the configured retry on transport-level failure. Any
    /// HTTP response, success or not, ends the loop.
    async fn get_with_retry(&self, url: &str) -> Result<reqwest::Response, EngineError> {
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            match self
                .http
                .get(url)
                .basic_auth(&self.api_token, Some(""))
                .send()
                .await
            {
                Ok(response) => return Ok(response),
                Err(err) => {
                    warn!(url = %url, error = %err, "GET failed, backing off");
                    if self.get_retry.exhausted(attempts) {
                        return Err(EngineError::RetriesExhausted {
                            url: url.to_string(),
                        });
                    }
                    tokio::time::sleep(self.get_retry.backoff).await;
                }
            }
        }
    }
}

#[async_trait]
impl TenderApi for HttpTenderApi {
    async fn fetch_tender(&self, tender_id: &str) -> Result<Option<Tender>, EngineError> {
        let url = self.tender_url(tender_id);
        let response = self.get_with_retry(&url).await?;
        if !response.status().is_success() {
            warn!(
                url = %url,
                status = %response.status(),
                "Tender fetch answered non-success, abandoning this cycle"
            );
            return Ok(None);
        }
        let envelope: TenderEnvelope = response.json().await?;
        Ok(Some(envelope.data))
    }

    async fn patch_tender(&self, tender_id: &str, patch: &TenderPatch) -> bool {
        let url = self.tender_url(tender_id);
        let payload = serde_json::to_string(&PatchEnvelope { data: patch }).unwrap_or_default();
        let result = self
            .http
            .patch(&url)
            .basic_auth(&self.api_token, Some(""))
            .header("Content-Type", "application/json")
            .body(payload.clone())
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                error!(
                    status = %status,
                    url = %url,
                    payload = %payload,
                    body = %body,
                    "Error updating tender"
                );
                false
            }
            Err(err) => {
                error!(url = %url, payload = %payload, error = %err, "Error updating tender");
                false
            }
        }
    }

    async fn fetch_page(&self, uri: &str) -> Result<Option<TenderPage>, EngineError> {
        let response = self.get_with_retry(uri).await?;
        if !response.status().is_success() {
            warn!(url = %uri, status = %response.status(), "Feed page answered non-success");
            return Ok(None);
        }
        let page: TenderPage = response.json().await?;
        Ok(Some(page))
    }
}

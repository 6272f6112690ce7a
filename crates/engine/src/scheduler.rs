// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Deferred callback delivery.
//!
//! Jobs are keyed: submitting a job with an id that already has a
//! pending instance replaces it, so at most one callback per tender is
//! ever pending. A job that wakes past its misfire grace window is
//! discarded rather than delivered late. Delivery is an HTTP GET to the
//! callback url, retried on non-success with a fixed backoff. The
//! chronograph's own server answers these pushes on its
//! `/resync/{tender_id}` and `/resync_all` routes.

use crate::transport::RetryPolicy;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Job id of the self-re-arming full resync sweep.
pub const RESYNC_ALL_JOB_ID: &str = "resync_all";

/// A deferred callback: at `run_at`, GET `url` with `params`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackJob {
    /// Dedup key; one pending job per id.
    pub id: String,
    /// When the callback is due.
    pub run_at: DateTime<Tz>,
    /// The callback url to push.
    pub url: String,
    /// Query parameters appended to the push.
    pub params: Vec<(String, String)>,
}

impl CallbackJob {
    /// Creates a job without query parameters.
    #[must_use]
    pub fn new(id: impl Into<String>, run_at: DateTime<Tz>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            run_at,
            url: url.into(),
            params: Vec::new(),
        }
    }

    /// Appends one query parameter.
    #[must_use]
    pub fn with_param(mut self, key: &str, value: String) -> Self {
        self.params.push((key.to_string(), value));
        self
    }
}

/// Deferred job submission with replace-on-id semantics.
pub trait JobScheduler: Send + Sync {
    /// Submits `job`, replacing any pending job with the same id.
    fn add_job(&self, job: CallbackJob);
}

/// Tokio-timer [`JobScheduler`].
///
/// Must be used from within a tokio runtime; each job is a spawned task
/// that sleeps until due. Replacing a job aborts the previous task;
/// in-flight delivery is never aborted retroactively, only pending
/// sleeps are.
#[derive(Debug)]
pub struct TokioJobScheduler {
    http: reqwest::Client,
    misfire_grace: Duration,
    push_retry: RetryPolicy,
    jobs: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl TokioJobScheduler {
    /// Creates a scheduler delivering over `http`.
    #[must_use]
    pub fn new(http: reqwest::Client, misfire_grace: Duration, push_retry: RetryPolicy) -> Self {
        Self {
            http,
            misfire_grace,
            push_retry,
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Number of jobs currently pending (not yet finished).
    #[must_use]
    pub fn pending_jobs(&self) -> usize {
        let jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        jobs.values().filter(|handle| !handle.is_finished()).count()
    }
}

impl JobScheduler for TokioJobScheduler {
    fn add_job(&self, job: CallbackJob) {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        jobs.retain(|_, handle| !handle.is_finished());

        if let Some(previous) = jobs.remove(&job.id) {
            debug!(job_id = %job.id, "Replacing pending callback");
            previous.abort();
        }

        let http = self.http.clone();
        let grace = self.misfire_grace;
        let retry = self.push_retry;
        let id = job.id.clone();
        let handle = tokio::spawn(run_job(http, job, grace, retry));
        jobs.insert(id, handle);
    }
}

/// Whether a callback that should have run at `run_at` is now too late
/// to deliver.
#[must_use]
pub(crate) fn misfired(run_at: DateTime<Tz>, now: DateTime<Utc>, grace: Duration) -> bool {
    now - run_at.with_timezone(&Utc) > grace
}

async fn run_job(http: reqwest::Client, job: CallbackJob, grace: Duration, retry: RetryPolicy) {
    let delay = (job.run_at.with_timezone(&Utc) - Utc::now())
        .to_std()
        .unwrap_or_default();
    tokio::time::sleep(delay).await;

    if misfired(job.run_at, Utc::now(), grace) {
        warn!(
            job_id = %job.id,
            run_at = %job.run_at,
            "Callback missed its misfire grace window, discarding"
        );
        return;
    }

    push(&http, &job, retry).await;
}

/// Delivers the callback, retrying non-success pushes with a fixed
/// backoff.
async fn push(http: &reqwest::Client, job: &CallbackJob, retry: RetryPolicy) {
    let mut attempts: u32 = 0;
    loop {
        attempts += 1;
        let delivered = match http.get(&job.url).query(&job.params).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!(
                    job_id = %job.id,
                    url = %job.url,
                    status = %response.status(),
                    "Callback push answered non-success"
                );
                false
            }
            Err(err) => {
                warn!(job_id = %job.id, url = %job.url, error = %err, "Callback push failed");
                false
            }
        };

        if delivered {
            return;
        }
        if retry.exhausted(attempts) {
            warn!(job_id = %job.id, url = %job.url, "Giving up on callback delivery");
            return;
        }
        tokio::time::sleep(retry.backoff).await;
    }
}

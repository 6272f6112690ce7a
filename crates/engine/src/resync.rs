// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The resync loop: fetch a snapshot, run the state machine, write back
//! the patch, re-arm the next callback.

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::planner::StorePlanner;
use crate::scheduler::{CallbackJob, JobScheduler, RESYNC_ALL_JOB_ID};
use crate::transport::{RetryPolicy, TenderApi};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use chronograph::check_tender;
use chronograph_domain::PlanningConfig;
use chronograph_persistence::CalendarStore;
use std::sync::Arc;
use tracing::{info, warn};

/// What one tender resync decided and did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResyncOutcome {
    /// Whether a patch was written back successfully.
    pub patched: bool,
    /// The re-armed evaluation instant, if any.
    pub next_check: Option<DateTime<Tz>>,
}

/// The resync engine: transport, store, scheduler, and policy wired
/// together behind the server's callback endpoints.
pub struct Engine {
    api: Arc<dyn TenderApi>,
    store: Arc<dyn CalendarStore>,
    scheduler: Arc<dyn JobScheduler>,
    planning: PlanningConfig,
    config: EngineConfig,
    callback_url: String,
    feed_url: String,
    conflict_retry: RetryPolicy,
}

impl Engine {
    /// Wires an engine together.
    ///
    /// `callback_url` is this server's own base url (the scheduler
    /// pushes back into it); `feed_url` is where a sweep starts when no
    /// cursor has been carried forward yet.
    #[must_use]
    pub fn new(
        api: Arc<dyn TenderApi>,
        store: Arc<dyn CalendarStore>,
        scheduler: Arc<dyn JobScheduler>,
        planning: PlanningConfig,
        config: EngineConfig,
        callback_url: &str,
        feed_url: String,
    ) -> Self {
        Self {
            api,
            store,
            scheduler,
            planning,
            config,
            callback_url: callback_url.trim_end_matches('/').to_string(),
            feed_url,
            conflict_retry: RetryPolicy::unbounded(std::time::Duration::ZERO),
        }
    }

    /// Replaces the calendar conflict retry policy (tests).
    #[must_use]
    pub const fn with_conflict_retry(mut self, policy: RetryPolicy) -> Self {
        self.conflict_retry = policy;
        self
    }

    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.planning.tz)
    }

    fn resync_url(&self, tender_id: &str) -> String {
        format!("{}/resync/{tender_id}", self.callback_url)
    }

    /// Arms the first full-sweep callback so the feed walk self-starts.
    pub fn arm_initial_sweep(&self) {
        self.scheduler.add_job(
            CallbackJob::new(
                RESYNC_ALL_JOB_ID,
                self.now(),
                format!("{}/resync_all", self.callback_url),
            )
            .with_param("url", self.feed_url.clone()),
        );
    }

    /// Re-evaluates one tender: GET the snapshot, run the state
    /// machine, PATCH any resulting change, and re-arm the per-tender
    /// callback.
    ///
    /// Returns `None` when the API answered the GET with a non-success
    /// status and the cycle was abandoned.
    ///
    /// # Errors
    ///
    /// Returns an error when a bounded retry policy gives out or the
    /// slot reservation fails outright. A failed PATCH is not an error:
    /// it forces a short re-check instead.
    pub async fn resync_tender(&self, tender_id: &str) -> Result<Option<ResyncOutcome>, EngineError> {
        let Some(tender) = self.api.fetch_tender(tender_id).await? else {
            return Ok(None);
        };

        let now = self.now();
        let planner = StorePlanner::new(Arc::clone(&self.store), self.planning.clone())
            .with_conflict_retry(self.conflict_retry);
        let decision = check_tender(&tender, now, &planner, &self.planning)?;

        let mut next_check = decision.next_check;
        let mut patched = false;
        if let Some(patch) = &decision.patch {
            patched = self.api.patch_tender(&tender.id, patch).await;
            if patched {
                info!(tender_id = %tender.id, patch = ?patch, "Tender updated");
            } else {
                // Self-heal from a transient write failure: check again
                // shortly, whatever the state machine computed.
                next_check = Some(self.now() + self.config.recheck_delay);
            }
        }

        if let Some(at) = next_check {
            self.scheduler.add_job(CallbackJob::new(
                tender.id.clone(),
                at,
                self.resync_url(&tender.id),
            ));
        }

        Ok(Some(ResyncOutcome { patched, next_check }))
    }

    /// Walks the change feed from `cursor` (or the configured feed
    /// start), arming an immediate per-tender callback for everything
    /// seen, then re-arms itself carrying the last-seen cursor forward.
    ///
    /// The walk stops on a transport failure, a non-success page, a
    /// page without a continuation cursor, or an empty page; the sweep
    /// always re-arms regardless.
    pub async fn resync_tenders(&self, cursor: Option<&str>) -> String {
        let mut next_url = cursor.unwrap_or(&self.feed_url).to_string();

        loop {
            match self.api.fetch_page(&next_url).await {
                Ok(Some(page)) => {
                    let Some(next) = page.next_page else {
                        break;
                    };
                    next_url = next.uri;
                    if page.data.is_empty() {
                        break;
                    }
                    let now = self.now();
                    for tender in &page.data {
                        self.scheduler.add_job(CallbackJob::new(
                            tender.id.clone(),
                            now,
                            self.resync_url(&tender.id),
                        ));
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    warn!(url = %next_url, error = %err, "Feed walk stopped");
                    break;
                }
            }
        }

        self.scheduler.add_job(
            CallbackJob::new(
                RESYNC_ALL_JOB_ID,
                self.now() + self.config.sweep_rearm_delay,
                format!("{}/resync_all", self.callback_url),
            )
            .with_param("url", next_url.clone()),
        );
        next_url
    }
}

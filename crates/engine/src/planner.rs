// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The slot allocator: pure placement run inside a compare-and-swap loop
//! over the calendar store.
//!
//! A save conflict means another allocation consumed calendar room after
//! our read, so the whole search restarts against a freshly read plan.
//! The stale result is never forced. With the default unbounded policy
//! the loop either succeeds or keeps retrying; bounded policies exist
//! for tests.

use chrono::DateTime;
use chrono_tz::Tz;
use chronograph::{AuctionPlanner, CoreError, place_auction};
use chronograph_domain::{PlanningConfig, Tender, plan_id_for};
use chronograph_persistence::CalendarStore;
use std::sync::Arc;
use tracing::{debug, info};

use crate::transport::RetryPolicy;

/// [`AuctionPlanner`] over a [`CalendarStore`].
pub struct StorePlanner {
    store: Arc<dyn CalendarStore>,
    cfg: PlanningConfig,
    conflict_retry: RetryPolicy,
}

impl StorePlanner {
    /// Creates a planner that retries save conflicts indefinitely.
    #[must_use]
    pub fn new(store: Arc<dyn CalendarStore>, cfg: PlanningConfig) -> Self {
        Self {
            store,
            cfg,
            conflict_retry: RetryPolicy::unbounded(std::time::Duration::ZERO),
        }
    }

    /// Replaces the conflict retry policy. The backoff is unused here:
    /// a conflicted save re-reads immediately.
    #[must_use]
    pub const fn with_conflict_retry(mut self, policy: RetryPolicy) -> Self {
        self.conflict_retry = policy;
        self
    }
}

impl AuctionPlanner for StorePlanner {
    fn plan_auction(
        &self,
        tender: &Tender,
        earliest_start: DateTime<Tz>,
    ) -> Result<DateTime<Tz>, CoreError> {
        let plan_id = plan_id_for(tender.cpv_code());
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            let mut doc = self
                .store
                .get(&plan_id)
                .map_err(|err| CoreError::Planning(err.to_string()))?;
            let start = place_auction(&mut doc.plan, tender.bid_count(), earliest_start, &self.cfg);

            match self.store.save(&doc) {
                Ok(_) => {
                    info!(
                        tender_id = %tender.id,
                        plan_id = %plan_id,
                        start = %start,
                        "Reserved auction slot"
                    );
                    return Ok(start);
                }
                Err(err) if err.is_conflict() => {
                    debug!(
                        plan_id = %plan_id,
                        attempts,
                        "Allocation lost the save race, recomputing from a fresh read"
                    );
                    if self.conflict_retry.exhausted(attempts) {
                        return Err(CoreError::Planning(err.to_string()));
                    }
                }
                Err(err) => return Err(CoreError::Planning(err.to_string())),
            }
        }
    }
}

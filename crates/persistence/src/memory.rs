// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{CalendarStore, PersistenceError, VersionedPlan};
use chronograph_domain::Plan;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// In-memory calendar store with the same compare-and-swap semantics as
/// the durable one. Used by tests and `--database`-less runs.
#[derive(Debug, Default)]
pub struct MemoryCalendarStore {
    plans: Mutex<HashMap<String, (Plan, u64)>>,
}

impl MemoryCalendarStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CalendarStore for MemoryCalendarStore {
    fn get(&self, plan_id: &str) -> Result<VersionedPlan, PersistenceError> {
        let plans = self.plans.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(plans.get(plan_id).map_or_else(
            || VersionedPlan::new(Plan::new(plan_id.to_string())),
            |(plan, version)| VersionedPlan {
                plan: plan.clone(),
                version: *version,
            },
        ))
    }

    fn save(&self, doc: &VersionedPlan) -> Result<u64, PersistenceError> {
        let mut plans = self.plans.lock().unwrap_or_else(PoisonError::into_inner);
        let current = plans.get(&doc.plan.id).map_or(0, |(_, version)| *version);
        if current != doc.version {
            return Err(PersistenceError::Conflict {
                plan_id: doc.plan.id.clone(),
            });
        }
        let next = doc.version + 1;
        plans.insert(doc.plan.id.clone(), (doc.plan.clone(), next));
        Ok(next)
    }
}

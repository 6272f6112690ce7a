// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The calendar plan document.
//!
//! A plan maps each working date to the time of day from which that date is
//! still free. A date absent from the map is free from the working-day
//! start; a date whose free-from time has reached the working-day end is
//! fully booked. Plans are partitioned per commodity group: tenders whose
//! first item carries a CPV classification share the calendar keyed by the
//! code's first three characters, everything else shares the global plan.
//!
//! Plans are mutated only by the slot allocator, under optimistic
//! concurrency in the calendar store.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Document key of the global (unclassified) calendar.
pub const GLOBAL_PLAN_ID: &str = "plan";

/// Returns the plan document key for a tender's CPV code.
///
/// Only the first three characters of the code select the partition, so
/// `"45000000-1"` and `"45100000-8"` share `"plan_450"`. Tenders without a
/// classification use [`GLOBAL_PLAN_ID`].
#[must_use]
pub fn plan_id_for(cpv_code: Option<&str>) -> String {
    cpv_code.map_or_else(
        || GLOBAL_PLAN_ID.to_string(),
        |code| {
            let prefix = code.get(..3).unwrap_or(code);
            format!("plan_{prefix}")
        },
    )
}

/// A working-day calendar for one commodity partition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Document key (`"plan"` or `"plan_<prefix>"`).
    pub id: String,
    /// Date → time of day from which the date is free.
    #[serde(default)]
    pub days: BTreeMap<NaiveDate, NaiveTime>,
}

impl Plan {
    /// Creates an empty plan with the given document key.
    #[must_use]
    pub const fn new(id: String) -> Self {
        Self {
            id,
            days: BTreeMap::new(),
        }
    }

    /// The time of day from which `date` is free.
    ///
    /// Dates with no recorded reservation are free from `day_start`.
    #[must_use]
    pub fn free_from(&self, date: NaiveDate, day_start: NaiveTime) -> NaiveTime {
        self.days.get(&date).copied().unwrap_or(day_start)
    }

    /// Records that `date` is reserved up to `time`.
    pub fn set_free_from(&mut self, date: NaiveDate, time: NaiveTime) {
        self.days.insert(date, time);
    }

    /// Whether `date` has no usable time left before `day_end`.
    #[must_use]
    pub fn is_fully_booked(&self, date: NaiveDate, day_start: NaiveTime, day_end: NaiveTime) -> bool {
        self.free_from(date, day_start) >= day_end
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Planning configuration: the timezone, working hours, and timing
//! constants that every time computation threads through explicitly.
//!
//! The zone is resolved once at process start and passed down; nothing in
//! the workspace reads ambient host time state, so tests can supply a
//! fixed zone and a fixed "now".

use crate::error::DomainError;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;

/// Default start of the auction working day, local wall-clock.
pub const DEFAULT_WORKING_DAY_START: NaiveTime = match NaiveTime::from_hms_opt(11, 0, 0) {
    Some(t) => t,
    None => NaiveTime::MIN,
};

/// Default end of the auction working day, local wall-clock.
pub const DEFAULT_WORKING_DAY_END: NaiveTime = match NaiveTime::from_hms_opt(16, 0, 0) {
    Some(t) => t,
    None => NaiveTime::MIN,
};

/// Timezone, working hours, and auction timing constants.
///
/// All durations are policy, not mechanism; the defaults match the
/// production deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanningConfig {
    /// The single zone all wall-clock arithmetic occurs in.
    pub tz: Tz,
    /// Start of the auction working day.
    pub working_day_start: NaiveTime,
    /// End of the auction working day (exclusive).
    pub working_day_end: NaiveTime,
    /// Auction end times are rounded to this unit, measured from the
    /// working-day start of the end's own date.
    pub rounding: Duration,
    /// Mandatory pause appended after each auction.
    pub min_pause: Duration,
    /// Auction time budgeted per bidder.
    pub bidder_time: Duration,
    /// Fixed service overhead per auction.
    pub service_time: Duration,
    /// Stand-still period after the award period before finalization.
    pub stand_still: Duration,
}

impl PlanningConfig {
    /// Creates a configuration with production defaults in the given zone.
    #[must_use]
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            working_day_start: DEFAULT_WORKING_DAY_START,
            working_day_end: DEFAULT_WORKING_DAY_END,
            rounding: Duration::minutes(15),
            min_pause: Duration::minutes(5),
            bidder_time: Duration::minutes(6),
            service_time: Duration::minutes(9),
            stand_still: Duration::days(10),
        }
    }

    /// Replaces the working-day boundaries.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidWorkingHours`] if `start >= end`.
    pub fn with_working_hours(
        mut self,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<Self, DomainError> {
        if start >= end {
            return Err(DomainError::InvalidWorkingHours { start, end });
        }
        self.working_day_start = start;
        self.working_day_end = end;
        Ok(self)
    }

    /// Converts a wire timestamp into the configured zone.
    #[must_use]
    pub fn localize(&self, instant: DateTime<FixedOffset>) -> DateTime<Tz> {
        instant.with_timezone(&self.tz)
    }

    /// Resolves a local wall-clock date and time in the configured zone.
    ///
    /// Ambiguous local times (DST fall-back) resolve to the earlier
    /// instant; nonexistent local times (DST spring-forward gap) shift
    /// forward until they resolve. Working hours sit well away from
    /// transition hours, so the shift is a safety net, not a code path.
    #[must_use]
    pub fn at(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Tz> {
        let mut naive = date.and_time(time);
        loop {
            if let Some(instant) = self.tz.from_local_datetime(&naive).earliest() {
                return instant;
            }
            naive += Duration::hours(1);
        }
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{AuctionPlanner, CoreError};
use chrono::{DateTime, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use chronograph_domain::{Bid, Period, PlanningConfig, Tender, TenderStatus};
use std::cell::Cell;

pub fn test_config() -> PlanningConfig {
    PlanningConfig::new(chrono_tz::Europe::Kyiv)
}

/// A local wall-clock instant in the test zone.
pub fn local(cfg: &PlanningConfig, y: i32, m: u32, d: u32, hour: u32, minute: u32) -> DateTime<Tz> {
    cfg.at(
        NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap(),
    )
}

pub fn tender_with_status(status: TenderStatus) -> Tender {
    Tender::new(String::from("tender-1"), status)
}

pub fn with_bids(mut tender: Tender, count: usize) -> Tender {
    tender.bids = (0..count)
        .map(|n| Bid {
            id: Some(format!("bid-{n}")),
        })
        .collect();
    tender
}

pub fn period_ending(at: DateTime<Tz>) -> Period {
    Period {
        start_date: None,
        end_date: Some(at.fixed_offset()),
    }
}

pub fn period_starting(at: DateTime<Tz>) -> Period {
    Period::starting_at(at.fixed_offset())
}

/// Planner double returning a fixed start instant and counting calls.
pub struct FixedPlanner {
    pub start: DateTime<Tz>,
    pub calls: Cell<usize>,
}

impl FixedPlanner {
    pub fn new(start: DateTime<Tz>) -> Self {
        Self {
            start,
            calls: Cell::new(0),
        }
    }
}

impl AuctionPlanner for FixedPlanner {
    fn plan_auction(
        &self,
        _tender: &Tender,
        _earliest_start: DateTime<Tz>,
    ) -> Result<DateTime<Tz>, CoreError> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.start)
    }
}

/// Planner double for branches that must not plan.
pub struct UnusedPlanner;

impl AuctionPlanner for UnusedPlanner {
    fn plan_auction(
        &self,
        tender: &Tender,
        _earliest_start: DateTime<Tz>,
    ) -> Result<DateTime<Tz>, CoreError> {
        panic!("planner must not be invoked for tender {}", tender.id);
    }
}

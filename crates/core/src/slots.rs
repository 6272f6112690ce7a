// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Auction slot duration and placement.
//!
//! Auctions occupy a contiguous window on a shared, bounded working-day
//! calendar. The window length is a pure function of the bid count; its
//! end time is rounded to the planning unit so consecutive reservations
//! land on tidy boundaries. Placement walks forward one date at a time
//! until a date with enough free room is found.
//!
//! ## Invariants
//!
//! - Rounding is measured from the working-day start of the end's own
//!   date and is idempotent.
//! - A placed window never overlaps an existing reservation on the same
//!   plan: either it fits before the working-day end, or it starts on an
//!   otherwise empty date (a long auction may overrun the close when
//!   there is nothing to conflict with).
//! - Every date the window passes through is marked fully booked; the
//!   final date records the rounded end as its new free-from time.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use chronograph_domain::{Plan, PlanningConfig};

/// Computes the rounded end time of an auction starting at `start`.
///
/// The raw end is `start + bid_count * bidder_time + service_time +
/// min_pause`; it is then rounded to the nearest rounding unit measured
/// from the working-day start of the raw end's own date (round-half-up:
/// add half the unit, truncate down to the unit).
#[must_use]
pub fn auction_end_time(bid_count: usize, start: DateTime<Tz>, cfg: &PlanningConfig) -> DateTime<Tz> {
    let bids = i32::try_from(bid_count).unwrap_or(i32::MAX);
    let raw_end = start + cfg.bidder_time * bids + cfg.service_time + cfg.min_pause;

    let end_date = raw_end.date_naive();
    let anchor = end_date.and_time(cfg.working_day_start);
    let elapsed = (raw_end.naive_local() - anchor).num_seconds();
    let unit = cfg.rounding.num_seconds().max(1);
    let rounded = (elapsed + unit / 2).div_euclid(unit) * unit;

    cfg.at(end_date, cfg.working_day_start) + Duration::seconds(rounded)
}

/// Reserves the earliest non-overlapping auction window on `plan`.
///
/// The candidate date is `earliest_start`'s own date when its time of day
/// is still before the working-day start, otherwise the next date. Each
/// candidate date is tried in turn:
///
/// - a fully booked date is skipped;
/// - the tentative start is the later of the date's free-from time and
///   the working-day start;
/// - the placement is accepted when the rounded end fits before the
///   working-day end, or when the date was otherwise empty and the
///   auction simply needs longer than a working day.
///
/// On acceptance the plan is updated in place: every date from the start
/// date up to (excluding) the end date becomes fully booked, and the end
/// date's free-from moves to the rounded end time. The caller owns
/// persisting the plan; this function is pure over its inputs.
#[must_use]
pub fn place_auction(
    plan: &mut Plan,
    bid_count: usize,
    earliest_start: DateTime<Tz>,
    cfg: &PlanningConfig,
) -> DateTime<Tz> {
    let mut date = if earliest_start.time() < cfg.working_day_start {
        earliest_start.date_naive()
    } else {
        earliest_start.date_naive() + Duration::days(1)
    };

    loop {
        let free_from = plan.free_from(date, cfg.working_day_start);
        if free_from >= cfg.working_day_end {
            date += Duration::days(1);
            continue;
        }

        let start = cfg.at(date, free_from.max(cfg.working_day_start));
        let end = auction_end_time(bid_count, start, cfg);
        let close = cfg.at(date, cfg.working_day_end);
        let empty_day = free_from == cfg.working_day_start;

        if (empty_day && end > close) || end <= close {
            let mut booked = start.date_naive();
            while booked < end.date_naive() {
                plan.set_free_from(booked, cfg.working_day_end);
                booked += Duration::days(1);
            }
            plan.set_free_from(end.date_naive(), end.time());
            return start;
        }

        date += Duration::days(1);
    }
}

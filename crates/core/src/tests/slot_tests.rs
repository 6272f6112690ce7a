// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Duration, rounding, and placement tests for the slot allocator math.

use super::helpers::{local, test_config};
use crate::{auction_end_time, place_auction};
use chrono::{NaiveDate, NaiveTime};
use chronograph_domain::Plan;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

#[test]
fn test_three_bids_from_day_start_round_down_to_half_hour() {
    let cfg = test_config();
    // 3 * 6min + 9min + 5min = 32min raw, rounded to the nearest 15min
    // boundary from 11:00 => 11:30.
    let start = local(&cfg, 2020, 1, 1, 11, 0);
    let end = auction_end_time(3, start, &cfg);
    assert_eq!(end, local(&cfg, 2020, 1, 1, 11, 30));
}

#[test]
fn test_rounding_tie_at_half_unit_rounds_up() {
    let cfg = test_config();
    // Zero bids from 10:53:30: raw end 11:07:30, exactly half a unit past
    // 11:00, so the half-up rule lands on 11:15.
    let start = cfg.at(date(2020, 1, 1), NaiveTime::from_hms_opt(10, 53, 30).unwrap());
    let end = auction_end_time(0, start, &cfg);
    assert_eq!(end, local(&cfg, 2020, 1, 1, 11, 15));
}

#[test]
fn test_rounding_is_idempotent() {
    let cfg = test_config();
    let start = local(&cfg, 2020, 1, 1, 11, 0);
    let end = auction_end_time(3, start, &cfg);

    // Re-rounding an already-rounded instant must not move it: an end
    // with no auction content (zero duration model) stays put only if we
    // round the same elapsed value, so round the raw value directly.
    let elapsed = end.time().signed_duration_since(cfg.working_day_start);
    let unit = cfg.rounding.num_seconds();
    let seconds = elapsed.num_seconds();
    let rounded = (seconds + unit / 2).div_euclid(unit) * unit;
    assert_eq!(rounded, seconds);
}

#[test]
fn test_placement_starts_next_day_when_earliest_is_within_hours() {
    let cfg = test_config();
    let mut plan = Plan::new(String::from("plan"));
    let earliest = local(&cfg, 2020, 1, 1, 12, 0);

    let start = place_auction(&mut plan, 3, earliest, &cfg);

    assert_eq!(start, local(&cfg, 2020, 1, 2, 11, 0));
    assert_eq!(plan.free_from(date(2020, 1, 2), cfg.working_day_start), time(11, 30));
}

#[test]
fn test_placement_uses_same_day_before_working_hours() {
    let cfg = test_config();
    let mut plan = Plan::new(String::from("plan"));
    let earliest = local(&cfg, 2020, 1, 1, 5, 0);

    let start = place_auction(&mut plan, 3, earliest, &cfg);

    assert_eq!(start, local(&cfg, 2020, 1, 1, 11, 0));
}

#[test]
fn test_back_to_back_placements_are_disjoint() {
    let cfg = test_config();
    let mut plan = Plan::new(String::from("plan"));
    let earliest = local(&cfg, 2020, 1, 1, 12, 0);

    let first_start = place_auction(&mut plan, 3, earliest, &cfg);
    let first_end = auction_end_time(3, first_start, &cfg);
    let second_start = place_auction(&mut plan, 3, earliest, &cfg);

    // The second window begins exactly where the first one ended.
    assert_eq!(second_start, first_end);
    assert_eq!(second_start, local(&cfg, 2020, 1, 2, 11, 30));
}

#[test]
fn test_fully_booked_date_is_skipped() {
    let cfg = test_config();
    let mut plan = Plan::new(String::from("plan"));
    plan.set_free_from(date(2020, 1, 2), cfg.working_day_end);

    let start = place_auction(&mut plan, 3, local(&cfg, 2020, 1, 1, 12, 0), &cfg);

    assert_eq!(start, local(&cfg, 2020, 1, 3, 11, 0));
}

#[test]
fn test_short_remainder_pushes_to_next_date() {
    let cfg = test_config();
    let mut plan = Plan::new(String::from("plan"));
    // Only 15 minutes left on Jan 2; a 3-bid auction needs 30.
    plan.set_free_from(date(2020, 1, 2), time(15, 45));

    let start = place_auction(&mut plan, 3, local(&cfg, 2020, 1, 1, 12, 0), &cfg);

    assert_eq!(start, local(&cfg, 2020, 1, 3, 11, 0));
    // The short remainder on Jan 2 is left as it was.
    assert_eq!(plan.free_from(date(2020, 1, 2), cfg.working_day_start), time(15, 45));
}

#[test]
fn test_window_ending_exactly_at_close_fits() {
    let cfg = test_config();
    let mut plan = Plan::new(String::from("plan"));
    // 30 rounded minutes needed; exactly 30 remain.
    plan.set_free_from(date(2020, 1, 2), time(15, 30));

    let start = place_auction(&mut plan, 3, local(&cfg, 2020, 1, 1, 12, 0), &cfg);

    assert_eq!(start, local(&cfg, 2020, 1, 2, 15, 30));
    assert_eq!(plan.free_from(date(2020, 1, 2), cfg.working_day_start), time(16, 0));
}

#[test]
fn test_long_auction_claims_an_empty_day_past_close() {
    let cfg = test_config();
    let mut plan = Plan::new(String::from("plan"));
    // 60 bidders: 60*6 + 14 = 374min from 11:00, ending past the 16:00
    // close. An empty day may absorb it.
    let start = place_auction(&mut plan, 60, local(&cfg, 2020, 1, 1, 12, 0), &cfg);

    assert_eq!(start, local(&cfg, 2020, 1, 2, 11, 0));
    let end = plan.free_from(date(2020, 1, 2), cfg.working_day_start);
    assert!(end > cfg.working_day_end);
}

#[test]
fn test_long_auction_skips_a_partially_used_day() {
    let cfg = test_config();
    let mut plan = Plan::new(String::from("plan"));
    plan.set_free_from(date(2020, 1, 2), time(11, 30));

    let start = place_auction(&mut plan, 60, local(&cfg, 2020, 1, 1, 12, 0), &cfg);

    // Jan 2 already has a reservation, so the overrun is not allowed
    // there; the auction lands on the first empty date.
    assert_eq!(start, local(&cfg, 2020, 1, 3, 11, 0));
}

#[test]
fn test_multi_day_auction_books_intervening_dates() {
    let cfg = test_config();
    let mut plan = Plan::new(String::from("plan"));
    // 128 bidders: 128*6 + 14 = 782min ≈ 13h from 11:00, crossing
    // midnight into Jan 3.
    let start = place_auction(&mut plan, 128, local(&cfg, 2020, 1, 1, 12, 0), &cfg);

    assert_eq!(start, local(&cfg, 2020, 1, 2, 11, 0));
    assert_eq!(
        plan.free_from(date(2020, 1, 2), cfg.working_day_start),
        cfg.working_day_end
    );
    // The end date records the rounded spill-over as its free-from time.
    assert!(plan.days.contains_key(&date(2020, 1, 3)));
}

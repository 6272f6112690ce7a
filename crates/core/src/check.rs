// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The tender state machine.
//!
//! [`check_tender`] is a pure decision function over an immutable tender
//! snapshot and the current instant. It returns what patch (if any) is due
//! and when the tender must be evaluated next. The only side effect a
//! transition can require, reserving an auction slot, is injected through
//! the [`AuctionPlanner`] capability so the decision logic stays
//! independently testable.
//!
//! ## Invariants
//!
//! - A tender's status only advances forward through the lifecycle.
//! - Absent optional period fields are "not yet constraining", never an
//!   error.
//! - "Has passed" is strict: an event at exactly `now` has not passed.
//! - Statuses outside the transition table fall through to the fallback
//!   next-check rule untouched.

use crate::error::CoreError;
use crate::slots::auction_end_time;
use chrono::DateTime;
use chrono_tz::Tz;
use chronograph_domain::{PlanningConfig, Tender, TenderPatch, TenderStatus};

/// Capability for reserving an auction slot.
///
/// Implemented over the calendar store by the engine; test doubles return
/// a fixed instant.
pub trait AuctionPlanner {
    /// Reserves a slot for `tender` starting no earlier than
    /// `earliest_start` and returns the reserved start instant.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Planning`] when the reservation cannot be
    /// made and retried further.
    fn plan_auction(
        &self,
        tender: &Tender,
        earliest_start: DateTime<Tz>,
    ) -> Result<DateTime<Tz>, CoreError>;
}

/// The outcome of evaluating one tender at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// The patch to write back, if a transition is due.
    pub patch: Option<TenderPatch>,
    /// When the tender must be evaluated next; `None` means quiescent.
    pub next_check: Option<DateTime<Tz>>,
}

impl Decision {
    /// A patch that requires an immediate follow-up evaluation.
    #[must_use]
    pub const fn patch_then_recheck(patch: TenderPatch, at: DateTime<Tz>) -> Self {
        Self {
            patch: Some(patch),
            next_check: Some(at),
        }
    }

    /// A terminal patch: no further evaluation by time alone.
    #[must_use]
    pub const fn terminal(patch: TenderPatch) -> Self {
        Self {
            patch: Some(patch),
            next_check: None,
        }
    }

    /// No patch; re-evaluate at the given instant.
    #[must_use]
    pub const fn recheck_at(at: DateTime<Tz>) -> Self {
        Self {
            patch: None,
            next_check: Some(at),
        }
    }

    /// No patch and no future boundary: the tender is quiescent.
    #[must_use]
    pub const fn quiescent() -> Self {
        Self {
            patch: None,
            next_check: None,
        }
    }
}

/// Evaluates a tender snapshot at `now` and decides the due transition.
///
/// The transition table is evaluated in priority order; when no rule
/// produces a decision, the fallback picks the first still-future period
/// boundary (enquiry end, tender end, award end plus stand-still) as the
/// next check, or declares the tender quiescent.
///
/// # Errors
///
/// Returns [`CoreError::Planning`] only when entering the auction phase
/// requires a slot reservation and the planner fails.
pub fn check_tender(
    tender: &Tender,
    now: DateTime<Tz>,
    planner: &dyn AuctionPlanner,
    cfg: &PlanningConfig,
) -> Result<Decision, CoreError> {
    let enquiry_end = period_end(tender.enquiry_period.as_ref(), cfg);
    let tender_start = period_start(tender.tender_period.as_ref(), cfg);
    let tender_end = period_end(tender.tender_period.as_ref(), cfg);
    let award_end = period_end(tender.award_period.as_ref(), cfg);

    match &tender.status {
        TenderStatus::ActiveEnquiries if enquiries_over(tender_start, enquiry_end, now) => {
            return Ok(Decision::patch_then_recheck(
                TenderPatch::status(TenderStatus::ActiveTendering),
                now,
            ));
        }
        TenderStatus::ActiveTendering if has_passed(tender_end, now) => {
            return Ok(if tender.bids.is_empty() {
                Decision::terminal(TenderPatch::status(TenderStatus::Unsuccessful))
            } else {
                Decision::patch_then_recheck(TenderPatch::status(TenderStatus::ActiveAuction), now)
            });
        }
        TenderStatus::ActiveAuction => {
            // An auctionPeriod without a startDate counts as unplanned.
            let recorded_start = tender
                .auction_period
                .as_ref()
                .and_then(|period| period.start_date)
                .map(|start| cfg.localize(start));
            return match recorded_start {
                None => plan(tender, now, planner),
                Some(start) => {
                    let slot_over = auction_end_time(tender.bid_count(), start, cfg) + cfg.rounding;
                    if slot_over < now {
                        // The planned slot lapsed without an observed
                        // outcome; reserve a fresh one.
                        plan(tender, now, planner)
                    } else {
                        Ok(Decision::recheck_at(slot_over))
                    }
                }
            };
        }
        TenderStatus::ActiveAwarded => {
            let stand_still_over = award_end
                .is_some_and(|end| end + cfg.stand_still < now);
            if stand_still_over && !tender.has_pending_complaints() {
                let status = if tender.has_active_award() {
                    TenderStatus::Complete
                } else {
                    TenderStatus::Unsuccessful
                };
                return Ok(Decision::terminal(TenderPatch::status(status)));
            }
            // Pending complaints keep the tender open; fall through to
            // the boundary-based next check.
        }
        _ => {}
    }

    Ok(next_boundary(enquiry_end, tender_end, award_end, now, cfg))
}

/// Fallback rule: the first still-future period boundary, in priority
/// order, or quiescence when none remains.
fn next_boundary(
    enquiry_end: Option<DateTime<Tz>>,
    tender_end: Option<DateTime<Tz>>,
    award_end: Option<DateTime<Tz>>,
    now: DateTime<Tz>,
    cfg: &PlanningConfig,
) -> Decision {
    if let Some(end) = enquiry_end.filter(|end| *end > now) {
        return Decision::recheck_at(end);
    }
    if let Some(end) = tender_end.filter(|end| *end > now) {
        return Decision::recheck_at(end);
    }
    if let Some(over) = award_end
        .map(|end| end + cfg.stand_still)
        .filter(|over| *over > now)
    {
        return Decision::recheck_at(over);
    }
    Decision::quiescent()
}

fn plan(
    tender: &Tender,
    now: DateTime<Tz>,
    planner: &dyn AuctionPlanner,
) -> Result<Decision, CoreError> {
    let start = planner.plan_auction(tender, now)?;
    Ok(Decision::patch_then_recheck(
        TenderPatch::auction_period(start.fixed_offset()),
        now,
    ))
}

/// The enquiry phase ends when the tender period's declared start has
/// passed, or, with no declared start, when the enquiry period's end has.
fn enquiries_over(
    tender_start: Option<DateTime<Tz>>,
    enquiry_end: Option<DateTime<Tz>>,
    now: DateTime<Tz>,
) -> bool {
    match tender_start {
        Some(start) => start < now,
        None => has_passed(enquiry_end, now),
    }
}

fn has_passed(instant: Option<DateTime<Tz>>, now: DateTime<Tz>) -> bool {
    instant.is_some_and(|instant| instant < now)
}

fn period_start(
    period: Option<&chronograph_domain::Period>,
    cfg: &PlanningConfig,
) -> Option<DateTime<Tz>> {
    period
        .and_then(|period| period.start_date)
        .map(|start| cfg.localize(start))
}

fn period_end(
    period: Option<&chronograph_domain::Period>,
    cfg: &PlanningConfig,
) -> Option<DateTime<Tz>> {
    period
        .and_then(|period| period.end_date)
        .map(|end| cfg.localize(end))
}

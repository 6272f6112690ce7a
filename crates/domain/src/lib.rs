// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod config;
mod error;
mod plan;
mod tender;

// Re-export public types
pub use config::{DEFAULT_WORKING_DAY_END, DEFAULT_WORKING_DAY_START, PlanningConfig};
pub use error::DomainError;
pub use plan::{GLOBAL_PLAN_ID, Plan, plan_id_for};
pub use tender::{
    Award, Bid, Classification, Complaint, Item, Period, Tender, TenderPatch, TenderStatus,
};

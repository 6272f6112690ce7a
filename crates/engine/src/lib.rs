// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Resync orchestration for the Tender Chronograph.
//!
//! This crate wires the pure state machine to the outside world: a
//! retry-wrapped HTTP transport against the remote tender API, a slot
//! planner that runs the compare-and-swap loop over the calendar store,
//! and a deferred job scheduler that delivers per-tender callbacks. The
//! two entry points, [`Engine::resync_tender`] and
//! [`Engine::resync_tenders`], are what the server's callback endpoints
//! invoke.
//!
//! All cross-invocation exclusion lives in the calendar store's
//! optimistic concurrency and in the scheduler's replace-by-id
//! semantics; no in-process locks span tenders.

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
#![allow(clippy::multiple_crate_versions)]

mod config;
mod error;
mod planner;
mod resync;
mod scheduler;
mod transport;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use config::EngineConfig;
pub use error::EngineError;
pub use planner::StorePlanner;
pub use resync::{Engine, ResyncOutcome};
pub use scheduler::{CallbackJob, JobScheduler, RESYNC_ALL_JOB_ID, TokioJobScheduler};
pub use transport::{HttpTenderApi, PageRef, RetryPolicy, TenderApi, TenderPage};

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Calendar plan persistence.
//!
//! Plans are opaque JSON documents keyed by partition id, written under
//! optimistic concurrency: every read carries a version, every save is a
//! compare-and-swap against that version, and a losing writer gets a
//! [`PersistenceError::Conflict`] instead of silently overwriting. The
//! slot allocator is the only writer; its contract is to recompute the
//! allocation from a fresh read whenever a save conflicts.
//!
//! Two stores are provided:
//!
//! - [`MemoryCalendarStore`]: mutex-guarded map, used by tests and
//!   in-memory runs
//! - [`SqliteCalendarStore`]: `SQLite`-backed, version CAS via
//!   `UPDATE ... WHERE version = ?` affected-row checks

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

mod error;
mod memory;
mod sqlite;

#[cfg(test)]
mod tests;

use chronograph_domain::Plan;

// Re-export public types
pub use error::PersistenceError;
pub use memory::MemoryCalendarStore;
pub use sqlite::SqliteCalendarStore;

/// A plan document together with the version it was read at.
///
/// Version `0` means the document has never been persisted; a freshly
/// created plan starts there and the first successful save moves it to
/// version `1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedPlan {
    /// The calendar document.
    pub plan: Plan,
    /// The version observed at read time.
    pub version: u64,
}

impl VersionedPlan {
    /// Wraps a never-persisted plan at version `0`.
    #[must_use]
    pub const fn new(plan: Plan) -> Self {
        Self { plan, version: 0 }
    }
}

/// Key-value calendar storage with optimistic concurrency.
///
/// `get` always succeeds for a well-formed id, returning an empty plan at
/// version `0` when nothing has been stored yet. `save` applies the
/// compare-and-swap discipline described at the crate root.
pub trait CalendarStore: Send + Sync {
    /// Reads the plan for `plan_id`, or an empty one if absent.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying storage fails or holds a
    /// document this version of the code cannot decode.
    fn get(&self, plan_id: &str) -> Result<VersionedPlan, PersistenceError>;

    /// Persists `doc.plan`, expecting the stored version to still equal
    /// `doc.version`. Returns the new version.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Conflict`] when the document changed
    /// since it was read; other variants for storage failures.
    fn save(&self, doc: &VersionedPlan) -> Result<u64, PersistenceError>;
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{CalendarStore, PersistenceError, VersionedPlan};
use chronograph_domain::Plan;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// `SQLite`-backed calendar store.
///
/// One row per plan partition: `(id, version, document)`, the document
/// being the JSON-serialized [`Plan`]. The optimistic-concurrency
/// contract is enforced with version-guarded writes; a write that matches
/// zero rows lost the race and surfaces as a conflict.
#[derive(Debug)]
pub struct SqliteCalendarStore {
    conn: Mutex<Connection>,
}

impl SqliteCalendarStore {
    /// Opens an in-memory database, for development and tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the schema
    /// cannot be created.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| PersistenceError::DatabaseConnectionFailed(e.to_string()))?;
        Self::bootstrap(conn)
    }

    /// Opens (or creates) a file-backed database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the schema
    /// cannot be created.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let conn = Connection::open(path)
            .map_err(|e| PersistenceError::DatabaseConnectionFailed(e.to_string()))?;
        Self::bootstrap(conn)
    }

    fn bootstrap(conn: Connection) -> Result<Self, PersistenceError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS plans (
                id       TEXT PRIMARY KEY,
                version  INTEGER NOT NULL,
                document TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl CalendarStore for SqliteCalendarStore {
    fn get(&self, plan_id: &str) -> Result<VersionedPlan, PersistenceError> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let row: Option<(u64, String)> = conn
            .query_row(
                "SELECT version, document FROM plans WHERE id = ?1",
                params![plan_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            None => Ok(VersionedPlan::new(Plan::new(plan_id.to_string()))),
            Some((version, document)) => {
                let plan: Plan = serde_json::from_str(&document)?;
                Ok(VersionedPlan { plan, version })
            }
        }
    }

    fn save(&self, doc: &VersionedPlan) -> Result<u64, PersistenceError> {
        let document = serde_json::to_string(&doc.plan)?;
        let next = doc.version + 1;
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);

        let affected = if doc.version == 0 {
            // First write: insert unless someone else already has.
            conn.execute(
                "INSERT INTO plans (id, version, document) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO NOTHING",
                params![doc.plan.id, next, document],
            )?
        } else {
            conn.execute(
                "UPDATE plans SET version = ?1, document = ?2
                 WHERE id = ?3 AND version = ?4",
                params![next, document, doc.plan.id, doc.version],
            )?
        };

        if affected == 0 {
            debug!(plan_id = %doc.plan.id, version = doc.version, "Plan save lost the race");
            return Err(PersistenceError::Conflict {
                plan_id: doc.plan.id.clone(),
            });
        }
        Ok(next)
    }
}

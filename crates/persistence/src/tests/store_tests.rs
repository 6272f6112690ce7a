// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Compare-and-swap behavior tests, run against both store backends.

use crate::{CalendarStore, MemoryCalendarStore, PersistenceError, SqliteCalendarStore};
use chrono::{NaiveDate, NaiveTime};

fn stores() -> Vec<Box<dyn CalendarStore>> {
    vec![
        Box::new(MemoryCalendarStore::new()),
        Box::new(SqliteCalendarStore::new_in_memory().unwrap()),
    ]
}

fn sample_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 2).unwrap()
}

fn sample_time() -> NaiveTime {
    NaiveTime::from_hms_opt(11, 30, 0).unwrap()
}

#[test]
fn test_missing_plan_reads_as_empty_at_version_zero() {
    for store in stores() {
        let doc = store.get("plan_450").unwrap();
        assert_eq!(doc.version, 0);
        assert_eq!(doc.plan.id, "plan_450");
        assert!(doc.plan.days.is_empty());
    }
}

#[test]
fn test_save_round_trips_and_bumps_version() {
    for store in stores() {
        let mut doc = store.get("plan").unwrap();
        doc.plan.set_free_from(sample_date(), sample_time());

        let version = store.save(&doc).unwrap();
        assert_eq!(version, 1);

        let read_back = store.get("plan").unwrap();
        assert_eq!(read_back.version, 1);
        assert_eq!(read_back.plan, doc.plan);
    }
}

#[test]
fn test_stale_first_write_conflicts() {
    for store in stores() {
        let first = store.get("plan").unwrap();
        let second = store.get("plan").unwrap();

        store.save(&first).unwrap();

        let result = store.save(&second);
        assert!(matches!(result, Err(PersistenceError::Conflict { .. })));
    }
}

#[test]
fn test_stale_update_conflicts() {
    for store in stores() {
        let initial = store.get("plan").unwrap();
        store.save(&initial).unwrap();

        let mut winner = store.get("plan").unwrap();
        let mut loser = store.get("plan").unwrap();

        winner.plan.set_free_from(sample_date(), sample_time());
        store.save(&winner).unwrap();

        loser
            .plan
            .set_free_from(sample_date(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        let result = store.save(&loser);
        assert!(result.unwrap_err().is_conflict());

        // The losing write must not have clobbered the winner.
        let current = store.get("plan").unwrap();
        assert_eq!(
            current.plan.free_from(sample_date(), NaiveTime::MIN),
            sample_time()
        );
    }
}

#[test]
fn test_retry_after_conflict_succeeds_on_fresh_read() {
    for store in stores() {
        let stale = store.get("plan").unwrap();
        store.save(&stale).unwrap();

        // The loser re-reads and recomputes, then wins.
        let mut fresh = store.get("plan").unwrap();
        fresh.plan.set_free_from(sample_date(), sample_time());
        let version = store.save(&fresh).unwrap();
        assert_eq!(version, 2);
    }
}

#[test]
fn test_partitions_are_independent() {
    for store in stores() {
        let mut global = store.get("plan").unwrap();
        global.plan.set_free_from(sample_date(), sample_time());
        store.save(&global).unwrap();

        let grouped = store.get("plan_450").unwrap();
        assert_eq!(grouped.version, 0);
        assert!(grouped.plan.days.is_empty());
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::EngineError;
use crate::scheduler::{CallbackJob, JobScheduler};
use crate::transport::{TenderApi, TenderPage};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use chronograph_domain::{
    Bid, Classification, Item, Period, PlanningConfig, Tender, TenderPatch, TenderStatus,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub fn test_config() -> PlanningConfig {
    PlanningConfig::new(chrono_tz::Europe::Kyiv)
}

pub fn local(cfg: &PlanningConfig, y: i32, m: u32, d: u32, hour: u32, minute: u32) -> DateTime<Tz> {
    cfg.at(
        NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap(),
    )
}

pub fn tender(id: &str, status: TenderStatus) -> Tender {
    Tender::new(id.to_string(), status)
}

pub fn with_bids(mut t: Tender, count: usize) -> Tender {
    t.bids = (0..count)
        .map(|n| Bid {
            id: Some(format!("bid-{n}")),
        })
        .collect();
    t
}

pub fn with_cpv(mut t: Tender, code: &str) -> Tender {
    t.items = vec![Item {
        classification: Some(Classification {
            id: code.to_string(),
        }),
    }];
    t
}

pub fn ended_tender_period(cfg: &PlanningConfig) -> Period {
    Period {
        start_date: None,
        end_date: Some(local(cfg, 2019, 12, 31, 16, 0).fixed_offset()),
    }
}

/// In-memory [`TenderApi`] double: tenders by id, recorded patches, and
/// a scripted sequence of feed pages.
#[derive(Default)]
pub struct FakeTenderApi {
    tenders: Mutex<HashMap<String, Tender>>,
    patches: Mutex<Vec<(String, TenderPatch)>>,
    pages: Mutex<VecDeque<Result<Option<TenderPage>, EngineError>>>,
    page_requests: Mutex<Vec<String>>,
    fail_patches: AtomicBool,
}

impl FakeTenderApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_tender(&self, t: Tender) {
        self.tenders.lock().unwrap().insert(t.id.clone(), t);
    }

    pub fn fail_patches(&self) {
        self.fail_patches.store(true, Ordering::SeqCst);
    }

    pub fn script_page(&self, page: Result<Option<TenderPage>, EngineError>) {
        self.pages.lock().unwrap().push_back(page);
    }

    pub fn patches(&self) -> Vec<(String, TenderPatch)> {
        self.patches.lock().unwrap().clone()
    }

    pub fn page_requests(&self) -> Vec<String> {
        self.page_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TenderApi for FakeTenderApi {
    async fn fetch_tender(&self, tender_id: &str) -> Result<Option<Tender>, EngineError> {
        Ok(self.tenders.lock().unwrap().get(tender_id).cloned())
    }

    async fn patch_tender(&self, tender_id: &str, patch: &TenderPatch) -> bool {
        if self.fail_patches.load(Ordering::SeqCst) {
            return false;
        }
        self.patches
            .lock()
            .unwrap()
            .push((tender_id.to_string(), patch.clone()));
        true
    }

    async fn fetch_page(&self, uri: &str) -> Result<Option<TenderPage>, EngineError> {
        self.page_requests.lock().unwrap().push(uri.to_string());
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(None))
    }
}

/// [`JobScheduler`] double recording every submission in order.
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    jobs: Mutex<Vec<CallbackJob>>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jobs(&self) -> Vec<CallbackJob> {
        self.jobs.lock().unwrap().clone()
    }
}

impl JobScheduler for RecordingScheduler {
    fn add_job(&self, job: CallbackJob) {
        self.jobs.lock().unwrap().push(job);
    }
}

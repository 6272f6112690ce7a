// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Wire model for tender snapshots and write-back patches.
//!
//! Tenders are owned by the remote procurement API; this crate only reads
//! snapshots and produces narrow patches. Unknown statuses and absent
//! period fields must round-trip untouched, so every field beyond `id` and
//! `status` is optional or defaulted.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a tender.
///
/// The six statuses below drive the state machine; anything else the remote
/// API introduces is carried verbatim in `Other` and passes through
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TenderStatus {
    /// Enquiry period is open.
    ActiveEnquiries,
    /// Bid submission period is open.
    ActiveTendering,
    /// Electronic auction phase.
    ActiveAuction,
    /// An award has been made; stand-still period runs.
    ActiveAwarded,
    /// Terminal: the tender failed (no bids, no active award).
    Unsuccessful,
    /// Terminal: the tender completed successfully.
    Complete,
    /// Any status this system does not act on.
    Other(String),
}

impl TenderStatus {
    /// Returns the wire representation of this status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ActiveEnquiries => "active.enquiries",
            Self::ActiveTendering => "active.tendering",
            Self::ActiveAuction => "active.auction",
            Self::ActiveAwarded => "active.awarded",
            Self::Unsuccessful => "unsuccessful",
            Self::Complete => "complete",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for TenderStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "active.enquiries" => Self::ActiveEnquiries,
            "active.tendering" => Self::ActiveTendering,
            "active.auction" => Self::ActiveAuction,
            "active.awarded" => Self::ActiveAwarded,
            "unsuccessful" => Self::Unsuccessful,
            "complete" => Self::Complete,
            _ => Self::Other(s),
        }
    }
}

impl From<TenderStatus> for String {
    fn from(status: TenderStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for TenderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A time period with optional boundaries.
///
/// Absent boundaries mean "not yet constraining"; the state machine never
/// treats a missing date as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Period {
    /// Period start, RFC 3339 on the wire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<FixedOffset>>,
    /// Period end, RFC 3339 on the wire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<FixedOffset>>,
}

impl Period {
    /// Creates a period with only a start date, the shape used when
    /// planning an auction slot.
    #[must_use]
    pub const fn starting_at(start: DateTime<FixedOffset>) -> Self {
        Self {
            start_date: Some(start),
            end_date: None,
        }
    }
}

/// A submitted bid. Only the presence of bids matters to the chronograph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bid {
    /// Opaque bid identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// A complaint filed against a tender or an award.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Complaint {
    /// Complaint status; `"pending"` blocks completion.
    pub status: String,
}

impl Complaint {
    /// Whether this complaint is still awaiting resolution.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == "pending"
    }
}

/// An award record on a tender.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Award {
    /// Award status; `"active"` marks the winning award.
    pub status: String,
    /// Complaints filed against this award.
    pub complaints: Vec<Complaint>,
}

impl Award {
    /// Whether this award stands as the winning one.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

/// Commodity classification of an item (CPV).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Classification {
    /// The CPV code, e.g. `"45000000-1"`.
    pub id: String,
}

/// A procured item. Only the first item's classification matters here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    /// Commodity classification, if declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
}

/// A tender snapshot as fetched from the remote procurement API.
///
/// Externally owned: this system reads snapshots and writes back narrow
/// patches, never the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tender {
    /// Stable opaque identifier; doubles as the callback dedup key.
    pub id: String,
    /// Current lifecycle status.
    pub status: TenderStatus,
    /// The enquiry period, if declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enquiry_period: Option<Period>,
    /// The bid submission period, if declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tender_period: Option<Period>,
    /// The reserved auction window, once planned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auction_period: Option<Period>,
    /// The award period, if an award has been made.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub award_period: Option<Period>,
    /// Submitted bids; only the count matters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bids: Vec<Bid>,
    /// Award records.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub awards: Vec<Award>,
    /// Tender-level complaints.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub complaints: Vec<Complaint>,
    /// Procured items.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Item>,
}

impl Tender {
    /// Creates a minimal snapshot with the given id and status.
    #[must_use]
    pub const fn new(id: String, status: TenderStatus) -> Self {
        Self {
            id,
            status,
            enquiry_period: None,
            tender_period: None,
            auction_period: None,
            award_period: None,
            bids: Vec::new(),
            awards: Vec::new(),
            complaints: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Number of submitted bids.
    #[must_use]
    pub fn bid_count(&self) -> usize {
        self.bids.len()
    }

    /// The CPV code of the first item, if any item declares one.
    #[must_use]
    pub fn cpv_code(&self) -> Option<&str> {
        self.items
            .first()
            .and_then(|item| item.classification.as_ref())
            .map(|c| c.id.as_str())
    }

    /// Whether any pending complaint exists at the tender level or on any
    /// award.
    #[must_use]
    pub fn has_pending_complaints(&self) -> bool {
        self.complaints.iter().any(Complaint::is_pending)
            || self
                .awards
                .iter()
                .any(|award| award.complaints.iter().any(Complaint::is_pending))
    }

    /// Whether any award stands as active (winning).
    #[must_use]
    pub fn has_active_award(&self) -> bool {
        self.awards.iter().any(Award::is_active)
    }
}

/// The write-back shape PATCHed to the remote API.
///
/// Only the fields the state machine decided on are serialized, so the
/// patch body carries exactly the intended change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TenderPatch {
    /// New lifecycle status, if a transition is due.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TenderStatus>,
    /// Newly planned auction window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auction_period: Option<Period>,
}

impl TenderPatch {
    /// A patch that only changes the status.
    #[must_use]
    pub const fn status(status: TenderStatus) -> Self {
        Self {
            status: Some(status),
            auction_period: None,
        }
    }

    /// A patch that only records a planned auction window.
    #[must_use]
    pub const fn auction_period(start: DateTime<FixedOffset>) -> Self {
        Self {
            status: None,
            auction_period: Some(Period::starting_at(start)),
        }
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::NaiveTime;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Timezone string could not be parsed into an IANA zone.
    InvalidTimezone(String),
    /// Working-day boundaries are inverted or degenerate.
    InvalidWorkingHours {
        /// The configured day start.
        start: NaiveTime,
        /// The configured day end.
        end: NaiveTime,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTimezone(tz) => write!(f, "Invalid timezone: {tz}"),
            Self::InvalidWorkingHours { start, end } => {
                write!(f, "Invalid working hours: [{start}, {end})")
            }
        }
    }
}

impl std::error::Error for DomainError {}

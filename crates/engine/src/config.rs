// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::Duration;

/// Engine timing policy.
///
/// Backoffs feed `tokio::time::sleep` and are `std` durations; delays
/// that enter wall-clock arithmetic are `chrono` durations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Backoff between retries of a failed GET.
    pub get_backoff: std::time::Duration,
    /// Backoff between retries of a failed callback push.
    pub push_backoff: std::time::Duration,
    /// Forced re-check delay after a failed PATCH write-back.
    pub recheck_delay: Duration,
    /// Delay before the full resync sweep re-arms itself.
    pub sweep_rearm_delay: Duration,
    /// How late a missed callback may still fire before being discarded.
    pub misfire_grace: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            get_backoff: std::time::Duration::from_secs(60),
            push_backoff: std::time::Duration::from_secs(10),
            recheck_delay: Duration::seconds(60),
            sweep_rearm_delay: Duration::seconds(60),
            misfire_grace: Duration::hours(1),
        }
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chronograph::CoreError;
use thiserror::Error;

/// Errors surfaced by the resync engine.
///
/// None of these abort the process; the server logs them and the next
/// scheduled sweep re-arms the affected tender.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The HTTP transport failed in a way retry did not absorb.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// A bounded retry policy ran out of attempts.
    #[error("Retries exhausted for {url}")]
    RetriesExhausted {
        /// The request that kept failing.
        url: String,
    },
    /// The state machine could not complete a required slot reservation.
    #[error(transparent)]
    Core(#[from] CoreError),
}

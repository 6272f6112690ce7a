// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur while evaluating a tender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The injected auction planner could not reserve a slot.
    Planning(String),
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Planning(msg) => write!(f, "Auction planning failed: {msg}"),
        }
    }
}

impl std::error::Error for CoreError {}

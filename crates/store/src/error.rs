// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// An optimistic transaction kept conflicting until its attempt bound
    /// ran out. Fatal for the invocation that hit it; the store itself is
    /// unharmed.
    #[error("optimistic transaction gave up after {attempts} conflicting attempts")]
    Conflict {
        /// How many attempts were made before giving up.
        attempts: u32,
    },
    /// A document body could not be serialized or deserialized.
    #[error("document serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

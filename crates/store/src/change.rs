// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::document::DocRef;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// What happened to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// The document did not exist before this write.
    Created,
    /// The document existed and was overwritten.
    Updated,
    /// The document was removed.
    Deleted,
}

/// One committed write, as delivered on the change feed.
///
/// `event_id` is unique per committed write and stable across redeliveries
/// of the same event; handlers that must act exactly once key their output
/// on it.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    /// Unique id of this change.
    pub event_id: String,
    /// What happened.
    pub kind: ChangeKind,
    /// The document that changed.
    pub doc: DocRef,
    /// Document body before the write, when one existed.
    pub before: Option<Value>,
    /// Document body after the write, absent for deletions.
    pub after: Option<Value>,
}

impl ChangeEvent {
    /// Decodes the pre-write body, if present and well-formed.
    #[must_use]
    pub fn before_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.before
            .clone()
            .and_then(|value| serde_json::from_value(value).ok())
    }

    /// Decodes the post-write body, if present and well-formed.
    #[must_use]
    pub fn after_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.after
            .clone()
            .and_then(|value| serde_json::from_value(value).ok())
    }
}

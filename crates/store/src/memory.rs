// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::change::{ChangeEvent, ChangeKind};
use crate::document::DocRef;
use crate::error::StoreError;
use crate::transaction::{StoredDoc, Transaction, TxRecord, Write};
use crate::DocumentStore;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use tokio::sync::broadcast;

/// Default bound on optimistic retries before a transaction gives up.
const DEFAULT_MAX_ATTEMPTS: u32 = 64;

/// Change feed buffer; slow subscribers see `Lagged` past this.
const CHANGE_CHANNEL_CAPACITY: usize = 1024;

/// In-process document store with optimistic transactions and a change
/// feed.
///
/// Commits are serialized through one lock; transaction bodies run off the
/// lock against a snapshot, so concurrent transactions make progress and
/// conflicts surface as re-runs rather than blocking. Every committed write
/// is published on the change feed with a unique event id.
pub struct MemoryStore {
    inner: Mutex<Inner>,
    changes: broadcast::Sender<ChangeEvent>,
    max_attempts: u32,
}

#[derive(Default)]
struct Inner {
    docs: BTreeMap<DocRef, StoredDoc>,
    collection_versions: BTreeMap<String, u64>,
    next_version: u64,
    next_event: u64,
}

impl MemoryStore {
    /// Creates an empty store with the default retry bound.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_attempts(DEFAULT_MAX_ATTEMPTS)
    }

    /// Creates an empty store with a custom retry bound.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Mutex::new(Inner::default()),
            changes,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Reads a document outside any transaction.
    ///
    /// Convenience for assertions and non-atomic lookups; anything that
    /// writes based on what it read belongs in `run_transaction`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` if the document exists but does
    /// not match the expected shape.
    pub fn get<T: DeserializeOwned>(&self, doc: &DocRef) -> Result<Option<T>, StoreError> {
        let body = {
            let inner = self.lock();
            inner.docs.get(doc).map(|stored| stored.body.clone())
        };
        match body {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for MemoryStore {
    fn run_transaction<T, E, F>(&self, mut body: F) -> Result<T, E>
    where
        F: FnMut(&mut Transaction<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;

            let (docs, collection_versions) = {
                let inner = self.lock();
                (inner.docs.clone(), inner.collection_versions.clone())
            };

            let mut transaction = Transaction::new(&docs, &collection_versions);
            let value = body(&mut transaction)?;
            let record = transaction.finish();

            let events = {
                let mut inner = self.lock();
                if !inner.validate(&record) {
                    if attempts >= self.max_attempts {
                        return Err(E::from(StoreError::Conflict { attempts }));
                    }
                    continue;
                }
                inner.apply(record.writes)
            };

            // Send after the lock is released; a feed with no subscribers
            // is not an error.
            for event in events {
                let _ = self.changes.send(event);
            }

            return Ok(value);
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }
}

impl Inner {
    /// Checks that everything the transaction read is still at the version
    /// it observed. Absent documents validate at version zero.
    fn validate(&self, record: &TxRecord) -> bool {
        let docs_unchanged = record.doc_reads.iter().all(|(doc, version)| {
            self.docs.get(doc).map_or(0, |stored| stored.version) == *version
        });

        let collections_unchanged = record.collection_reads.iter().all(|(collection, version)| {
            self.collection_versions
                .get(collection)
                .copied()
                .unwrap_or(0)
                == *version
        });

        docs_unchanged && collections_unchanged
    }

    fn apply(&mut self, writes: Vec<Write>) -> Vec<ChangeEvent> {
        let mut events = Vec::with_capacity(writes.len());

        for write in writes {
            match write {
                Write::Set { doc, value } => {
                    self.next_version += 1;
                    let version = self.next_version;
                    let previous = self.docs.insert(
                        doc.clone(),
                        StoredDoc {
                            version,
                            body: value.clone(),
                        },
                    );
                    self.collection_versions
                        .insert(doc.collection().to_owned(), version);

                    let kind = if previous.is_some() {
                        ChangeKind::Updated
                    } else {
                        ChangeKind::Created
                    };
                    events.push(ChangeEvent {
                        event_id: self.next_event_id(),
                        kind,
                        doc,
                        before: previous.map(|stored| stored.body),
                        after: Some(value),
                    });
                }
                Write::Delete { doc } => {
                    let Some(previous) = self.docs.remove(&doc) else {
                        continue;
                    };
                    self.next_version += 1;
                    self.collection_versions
                        .insert(doc.collection().to_owned(), self.next_version);

                    events.push(ChangeEvent {
                        event_id: self.next_event_id(),
                        kind: ChangeKind::Deleted,
                        doc,
                        before: Some(previous.body),
                        after: None,
                    });
                }
            }
        }

        events
    }

    fn next_event_id(&mut self) -> String {
        self.next_event += 1;
        format!("evt-{:08}", self.next_event)
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::document::DocRef;
use crate::error::StoreError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

/// A document body together with the version counter it was committed at.
#[derive(Debug, Clone)]
pub(crate) struct StoredDoc {
    pub(crate) version: u64,
    pub(crate) body: Value,
}

/// A staged write, applied only if the transaction commits.
#[derive(Debug, Clone)]
pub(crate) enum Write {
    Set { doc: DocRef, value: Value },
    Delete { doc: DocRef },
}

impl Write {
    pub(crate) const fn doc(&self) -> &DocRef {
        match self {
            Self::Set { doc, .. } | Self::Delete { doc } => doc,
        }
    }
}

/// Everything a finished transaction body observed and staged, handed back
/// to the store for validation and commit.
pub(crate) struct TxRecord {
    pub(crate) doc_reads: BTreeMap<DocRef, u64>,
    pub(crate) collection_reads: BTreeMap<String, u64>,
    pub(crate) writes: Vec<Write>,
}

/// An in-flight transaction: snapshot reads plus staged writes.
///
/// Reads observe the snapshot the transaction started from, overlaid with
/// the transaction's own staged writes. Every read is recorded, including
/// reads of documents that turn out to be absent, so the commit can detect
/// any concurrent change to the read set.
pub struct Transaction<'s> {
    docs: &'s BTreeMap<DocRef, StoredDoc>,
    collection_versions: &'s BTreeMap<String, u64>,
    doc_reads: BTreeMap<DocRef, u64>,
    collection_reads: BTreeMap<String, u64>,
    writes: Vec<Write>,
}

impl<'s> Transaction<'s> {
    pub(crate) const fn new(
        docs: &'s BTreeMap<DocRef, StoredDoc>,
        collection_versions: &'s BTreeMap<String, u64>,
    ) -> Self {
        Self {
            docs,
            collection_versions,
            doc_reads: BTreeMap::new(),
            collection_reads: BTreeMap::new(),
            writes: Vec::new(),
        }
    }

    /// Reads a document as a raw JSON body.
    ///
    /// Returns `None` when the document does not exist (or was deleted by
    /// this transaction).
    #[must_use]
    pub fn read_value(&mut self, doc: &DocRef) -> Option<Value> {
        self.record_doc_read(doc);

        for write in self.writes.iter().rev() {
            match write {
                Write::Set { doc: staged, value } if staged == doc => return Some(value.clone()),
                Write::Delete { doc: staged } if staged == doc => return None,
                _ => {}
            }
        }

        self.docs.get(doc).map(|stored| stored.body.clone())
    }

    /// Reads a document as a typed record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` if the document exists but does
    /// not match the expected shape.
    pub fn read<T: DeserializeOwned>(&mut self, doc: &DocRef) -> Result<Option<T>, StoreError> {
        match self.read_value(doc) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Scans a collection as typed records, ordered by document id.
    ///
    /// Malformed documents are skipped with a warning rather than failing
    /// the scan; several collaborators write to the store and a half-written
    /// document must not wedge every sweep that walks past it.
    #[must_use]
    pub fn read_collection<T: DeserializeOwned>(&mut self, collection: &str) -> Vec<(String, T)> {
        self.record_collection_read(collection);

        let mut merged: BTreeMap<String, Value> = self
            .docs
            .iter()
            .filter(|(doc, _)| doc.collection() == collection)
            .map(|(doc, stored)| (doc.id().to_owned(), stored.body.clone()))
            .collect();

        for write in &self.writes {
            match write {
                Write::Set { doc, value } if doc.collection() == collection => {
                    merged.insert(doc.id().to_owned(), value.clone());
                }
                Write::Delete { doc } if doc.collection() == collection => {
                    merged.remove(doc.id());
                }
                _ => {}
            }
        }

        merged
            .into_iter()
            .filter_map(|(id, value)| match serde_json::from_value(value) {
                Ok(typed) => Some((id, typed)),
                Err(err) => {
                    tracing::warn!(collection, id = %id, error = %err, "Skipping malformed document");
                    None
                }
            })
            .collect()
    }

    /// Stages a write of a typed record. A later write to the same document
    /// within this transaction replaces an earlier one.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` if the record cannot be
    /// serialized.
    pub fn set<T: Serialize>(&mut self, doc: &DocRef, value: &T) -> Result<(), StoreError> {
        let body = serde_json::to_value(value)?;
        self.stage(Write::Set {
            doc: doc.clone(),
            value: body,
        });
        Ok(())
    }

    /// Stages a deletion. Deleting an absent document commits as a no-op.
    pub fn delete(&mut self, doc: &DocRef) {
        self.stage(Write::Delete { doc: doc.clone() });
    }

    pub(crate) fn finish(self) -> TxRecord {
        TxRecord {
            doc_reads: self.doc_reads,
            collection_reads: self.collection_reads,
            writes: self.writes,
        }
    }

    fn stage(&mut self, write: Write) {
        let target = write.doc().clone();
        self.writes.retain(|staged| staged.doc() != &target);
        self.writes.push(write);
    }

    fn record_doc_read(&mut self, doc: &DocRef) {
        let version = self.docs.get(doc).map_or(0, |stored| stored.version);
        self.doc_reads.entry(doc.clone()).or_insert(version);
    }

    fn record_collection_read(&mut self, collection: &str) {
        let version = self
            .collection_versions
            .get(collection)
            .copied()
            .unwrap_or(0);
        self.collection_reads
            .entry(collection.to_owned())
            .or_insert(version);
    }
}

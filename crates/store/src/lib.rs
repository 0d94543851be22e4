// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Document store contract for the Lahja core.
//!
//! The production deployment runs against a hosted document database; this
//! crate pins down the part of its contract the core depends on (per-
//! invocation atomic read-modify-write transactions with optimistic
//! conflict retry, collection scans, and an at-least-once change feed)
//! and provides `MemoryStore`, an in-process implementation of that
//! contract used by the server binary's infrastructure-free mode and by
//! every test in the workspace.
//!
//! ## Transaction model
//!
//! A transaction body runs against an immutable snapshot and stages its
//! writes. At commit time every document and collection the body read is
//! revalidated against the live store; if anything moved, the body is run
//! again from scratch on a fresh snapshot, up to a bounded attempt count.
//! Collection scans are validated through per-collection versions, so a
//! scan conflicts with any concurrent write in that collection (the
//! phantom guard the sweeps and redistribution rely on).

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod change;
mod document;
mod error;
mod memory;
mod transaction;

pub use change::{ChangeEvent, ChangeKind};
pub use document::DocRef;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use transaction::Transaction;

use tokio::sync::broadcast;

/// The store contract the core handlers are written against.
///
/// Implementations must provide per-transaction serializability for the
/// documents a transaction reads and writes, and an at-least-once change
/// feed for committed writes.
pub trait DocumentStore {
    /// Runs `body` inside an atomic read-modify-write transaction.
    ///
    /// The body may run several times: each optimistic conflict discards
    /// its staged writes and re-runs it on a fresh snapshot. Bodies must
    /// therefore be free of side effects other than transaction reads and
    /// writes. Returning `Err` aborts the transaction without committing.
    ///
    /// # Errors
    ///
    /// Returns the body's error unchanged, or `StoreError::Conflict`
    /// (converted through `E`) when the attempt bound is exhausted.
    fn run_transaction<T, E, F>(&self, body: F) -> Result<T, E>
    where
        F: FnMut(&mut Transaction<'_>) -> Result<T, E>,
        E: From<StoreError>;

    /// Subscribes to the change feed of committed writes.
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;
}

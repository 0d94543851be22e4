// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The Lahja consistency and assignment engine.
//!
//! Every piece of logic here is a stateless reaction to a store change
//! event or a periodic sweep, executed inside a single optimistic
//! transaction. Handlers never trust the event payload for current state:
//! payloads say which documents to look at, transactions re-read them
//! fresh.

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

mod allocator;
mod appstate;
mod clock;
mod error;
mod lifecycle;
mod messaging;
mod redistribute;
pub mod refs;
mod router;

#[cfg(test)]
mod tests;

pub use allocator::{AllocationOutcome, RESERVATION_PERIOD_MS, allocate};
pub use appstate::apply_app_state;
pub use clock::{Clock, SystemClock};
pub use error::CoreError;
pub use lifecycle::{
    expire_stale_reservations, handle_gift_deleted, normalize_created_gift,
    release_on_terminal_transition,
};
pub use messaging::{
    DeliveryError, MESSAGE_GRACE_MS, MessageKey, SendReport, TextMessageSender,
    enqueue_transition_message, send_pending_messages,
};
pub use redistribute::redistribute;
pub use router::dispatch_event;

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Arbitration of reservation requests against slots.
//!
//! A reservation request is an immutable intent record; this module
//! consumes it inside one atomic transaction over the target slot, the
//! gift, and (when the gift is moving) the previously held slot. Under N
//! concurrent requests for one available slot exactly one transaction
//! observes `available` and wins; every other request is recorded as
//! processed and rejected. The gift's `processedReservationId` makes the
//! whole operation idempotent under at-least-once event delivery.

use crate::clock::Clock;
use crate::error::CoreError;
use crate::refs;
use lahja_domain::{Gift, ReservationId, ReservationRequest, Slot, SlotStatus};
use lahja_store::DocumentStore;

/// How long an unconfirmed hold lasts before the expiry sweep reclaims it.
pub const RESERVATION_PERIOD_MS: i64 = 5 * 60 * 1000;

/// What one reservation request amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationOutcome {
    /// The gift now holds the slot, until the returned deadline.
    Reserved {
        /// New `reservedUntil` deadline in epoch milliseconds.
        reserved_until: i64,
    },
    /// The slot was taken or gone; the request was recorded and dropped.
    Rejected,
    /// This request id was already applied to the gift earlier.
    AlreadyProcessed,
    /// The gift no longer exists; nothing could be recorded.
    GiftMissing,
}

/// Processes one reservation request.
///
/// Safe to invoke concurrently for different requests targeting the same
/// slot, and safe to re-invoke for the same request: re-reserving the slot
/// the gift already holds refreshes the hold deadline, and a request id
/// the gift has already applied is a no-op.
///
/// # Errors
///
/// Returns `CoreError::Store` if the transaction exhausts its optimistic
/// retries or a touched document is malformed.
pub fn allocate(
    store: &impl DocumentStore,
    clock: &impl Clock,
    reservation_id: &ReservationId,
    request: &ReservationRequest,
) -> Result<AllocationOutcome, CoreError> {
    store.run_transaction(|tx| {
        let gift_ref = refs::gift_ref(&request.gift_id);
        let Some(mut gift) = tx.read::<Gift>(&gift_ref)? else {
            tracing::warn!(
                gift_id = %request.gift_id,
                reservation_id = %reservation_id,
                "Reservation request for a missing gift"
            );
            return Ok(AllocationOutcome::GiftMissing);
        };

        if gift.processed_reservation_id.as_ref() == Some(reservation_id) {
            return Ok(AllocationOutcome::AlreadyProcessed);
        }

        let slot_ref = refs::slot_ref(&request.slot_id);
        let already_held = gift.slot_id.as_ref() == Some(&request.slot_id);

        let Some(mut slot) = tx.read::<Slot>(&slot_ref)? else {
            gift.processed_reservation_id = Some(reservation_id.clone());
            tx.set(&gift_ref, &gift)?;
            return Ok(AllocationOutcome::Rejected);
        };

        if slot.status != SlotStatus::Available && !already_held {
            gift.processed_reservation_id = Some(reservation_id.clone());
            tx.set(&gift_ref, &gift)?;
            return Ok(AllocationOutcome::Rejected);
        }

        // Moving gift: the slot held so far goes back into the pool in the
        // same transaction, so no state with two holds is ever visible.
        if let Some(previous_id) = gift.slot_id.clone().filter(|held| held != &request.slot_id)
            && let Some(mut previous) = tx.read::<Slot>(&refs::slot_ref(&previous_id))?
        {
            previous.status = SlotStatus::Available;
            tx.set(&refs::slot_ref(&previous_id), &previous)?;
        }

        let reserved_until = clock.now_ms() + RESERVATION_PERIOD_MS;
        gift.slot_id = Some(request.slot_id.clone());
        gift.reserved_until = Some(reserved_until);
        gift.processed_reservation_id = Some(reservation_id.clone());
        tx.set(&gift_ref, &gift)?;

        slot.status = SlotStatus::Reserved;
        tx.set(&slot_ref, &slot)?;

        Ok(AllocationOutcome::Reserved { reserved_until })
    })
}

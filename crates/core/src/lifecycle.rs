// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Gift lifecycle reactions: creation normalization, slot release on
//! terminal transitions and deletions, and expiry of abandoned holds.
//!
//! Release is guarded: a slot goes back to `available` only when, at the
//! moment of the transaction, no non-terminal gift claims it. The guard is
//! what keeps a stale delete or expiry of an old gift from releasing a
//! slot another gift has since legitimately reserved.

use crate::clock::Clock;
use crate::error::CoreError;
use crate::refs::{self, collections};
use lahja_domain::{Gift, GiftId, GiftStatus, Slot, SlotId, SlotStatus};
use lahja_store::{ChangeEvent, DocumentStore, Transaction};

/// Forces a freshly created gift into `creating` status.
///
/// Callers cannot be trusted to supply the initial status; whatever they
/// wrote, the lifecycle starts at `creating`. Returns whether a rewrite
/// was needed.
///
/// # Errors
///
/// Returns `CoreError::Store` on transaction failure.
pub fn normalize_created_gift(
    store: &impl DocumentStore,
    gift_id: &GiftId,
) -> Result<bool, CoreError> {
    store.run_transaction(|tx| {
        let gift_ref = refs::gift_ref(gift_id);
        let Some(mut gift) = tx.read::<Gift>(&gift_ref)? else {
            return Ok(false);
        };
        if gift.status == GiftStatus::Creating {
            return Ok(false);
        }

        tracing::warn!(
            gift_id = %gift_id,
            status = %gift.status,
            "Normalizing freshly created gift to creating status"
        );
        gift.status = GiftStatus::Creating;
        tx.set(&gift_ref, &gift)?;
        Ok(true)
    })
}

/// Reacts to a gift update that moved it into a terminal status while it
/// still held a slot: clears the hold and releases the slot.
///
/// Returns whether a slot was released.
///
/// # Errors
///
/// Returns `CoreError::Store` on transaction failure.
pub fn release_on_terminal_transition(
    store: &impl DocumentStore,
    event: &ChangeEvent,
) -> Result<bool, CoreError> {
    let Some(after) = event.after_as::<Gift>() else {
        return Ok(false);
    };
    if !after.status.is_terminal() || after.slot_id.is_none() {
        return Ok(false);
    }

    let gift_id = GiftId::new(event.doc.id());
    store.run_transaction(|tx| {
        let gift_ref = refs::gift_ref(&gift_id);
        let Some(mut gift) = tx.read::<Gift>(&gift_ref)? else {
            return Ok(false);
        };
        // The payload is a snapshot; only fresh state decides.
        let Some(slot_id) = gift.slot_id.clone() else {
            return Ok(false);
        };
        if !gift.status.is_terminal() {
            return Ok(false);
        }

        gift.slot_id = None;
        gift.reserved_until = None;
        tx.set(&gift_ref, &gift)?;

        release_slot_if_unclaimed(tx, &slot_id)
    })
}

/// Reacts to a gift deletion: releases the slot the deleted gift held,
/// unless another gift has since claimed it.
///
/// Returns whether a slot was released.
///
/// # Errors
///
/// Returns `CoreError::Store` on transaction failure.
pub fn handle_gift_deleted(
    store: &impl DocumentStore,
    event: &ChangeEvent,
) -> Result<bool, CoreError> {
    let Some(deleted) = event.before_as::<Gift>() else {
        return Ok(false);
    };
    let Some(slot_id) = deleted.slot_id else {
        return Ok(false);
    };

    store.run_transaction(|tx| release_slot_if_unclaimed(tx, &slot_id))
}

/// Reclaims abandoned in-progress reservations.
///
/// A gift still in `creating` whose `reservedUntil` deadline has passed
/// loses its hold: the gift's `slotId` is cleared and the slot released.
/// Each expiry is its own transaction that re-reads the gift, so a hold
/// refreshed or submitted between the scan and the expiry survives.
/// Gifts in `pending` or `confirmed` are exempt even if a stale deadline
/// lingers.
///
/// Returns how many holds were reclaimed.
///
/// # Errors
///
/// Returns `CoreError::Store` on transaction failure.
pub fn expire_stale_reservations(
    store: &impl DocumentStore,
    clock: &impl Clock,
) -> Result<usize, CoreError> {
    let now = clock.now_ms();

    let candidates: Vec<String> = store.run_transaction(|tx| {
        Ok::<_, CoreError>(
            tx.read_collection::<Gift>(collections::GIFTS)
                .into_iter()
                .filter(|(_, gift)| is_expired_hold(gift, now))
                .map(|(id, _)| id)
                .collect(),
        )
    })?;

    let mut reclaimed = 0;
    for id in candidates {
        let gift_id = GiftId::new(&id);
        if expire_one(store, &gift_id, now)? {
            reclaimed += 1;
        }
    }

    if reclaimed > 0 {
        tracing::info!(reclaimed, "Expired abandoned reservations");
    }
    Ok(reclaimed)
}

fn expire_one(
    store: &impl DocumentStore,
    gift_id: &GiftId,
    now: i64,
) -> Result<bool, CoreError> {
    store.run_transaction(|tx| {
        let gift_ref = refs::gift_ref(gift_id);
        let Some(mut gift) = tx.read::<Gift>(&gift_ref)? else {
            return Ok(false);
        };
        if !is_expired_hold(&gift, now) {
            return Ok(false);
        }
        let Some(slot_id) = gift.slot_id.clone() else {
            return Ok(false);
        };

        gift.slot_id = None;
        gift.reserved_until = None;
        tx.set(&gift_ref, &gift)?;

        release_slot_if_unclaimed(tx, &slot_id)?;
        Ok(true)
    })
}

const fn is_expired_hold(gift: &Gift, now: i64) -> bool {
    matches!(gift.status, GiftStatus::Creating)
        && gift.slot_id.is_some()
        && matches!(gift.reserved_until, Some(deadline) if deadline < now)
}

/// Releases a reserved slot back to `available`, unless some non-terminal
/// gift still claims it.
///
/// Works on fresh in-transaction state, including the transaction's own
/// staged writes: a gift whose hold was cleared earlier in the same
/// transaction no longer counts as a claimant.
fn release_slot_if_unclaimed(
    tx: &mut Transaction<'_>,
    slot_id: &SlotId,
) -> Result<bool, CoreError> {
    let still_claimed = tx
        .read_collection::<Gift>(collections::GIFTS)
        .into_iter()
        .any(|(_, gift)| gift.claims(slot_id));
    if still_claimed {
        return Ok(false);
    }

    let slot_ref = refs::slot_ref(slot_id);
    let Some(mut slot) = tx.read::<Slot>(&slot_ref)? else {
        return Ok(false);
    };
    if slot.status != SlotStatus::Reserved {
        return Ok(false);
    }

    slot.status = SlotStatus::Available;
    tx.set(&slot_ref, &slot)?;
    Ok(true)
}

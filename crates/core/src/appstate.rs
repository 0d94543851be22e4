// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bulk slot availability driven by the global campaign phase.

use crate::error::CoreError;
use crate::refs::{self, collections};
use lahja_domain::{AppStateRecord, Slot, SlotId, SlotStatus};
use lahja_store::DocumentStore;

/// Applies the current campaign phase to every slot in one transaction.
///
/// `open` makes `notAvailable` slots `available`; every other phase does
/// the reverse. Slots in `reserved` are never touched; a hold survives a
/// pause. Returns how many slots changed.
///
/// # Errors
///
/// Returns `CoreError::Store` on transaction failure.
pub fn apply_app_state(store: &impl DocumentStore) -> Result<usize, CoreError> {
    let changed = store.run_transaction(|tx| {
        let Some(record) = tx.read::<AppStateRecord>(&refs::app_state_ref())? else {
            return Ok::<usize, CoreError>(0);
        };
        let target = record.state.slot_availability();

        let mut changed = 0;
        for (id, mut slot) in tx.read_collection::<Slot>(collections::SLOTS) {
            if slot.status == SlotStatus::Reserved || slot.status == target {
                continue;
            }
            slot.status = target;
            tx.set(&refs::slot_ref(&SlotId::new(&id)), &slot)?;
            changed += 1;
        }
        Ok(changed)
    })?;

    if changed > 0 {
        tracing::info!(changed, "Applied campaign phase to slot availability");
    }
    Ok(changed)
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Transactional wrapper around the itinerary planner.
//!
//! Assignments are a pure function of current slots, gifts and itinerary
//! windows, so every trigger recomputes the affected region from scratch
//! and overwrites the artist documents. No incremental patching: the
//! derived data is disposable by design, which makes manual edits to any
//! input self-healing on the next pass.

use crate::error::CoreError;
use crate::refs::{self, collections};
use lahja_domain::{
    Artist, ArtistId, AssignmentSummary, CandidateStop, Gift, GiftId, GiftStatus, Region, Slot,
    SlotId, SlotStatus, plan_itineraries,
};
use lahja_store::DocumentStore;
use std::collections::BTreeMap;

/// Recomputes itinerary assignments for one region.
///
/// Candidates are the region's `reserved` slots whose holding gift is
/// deliverable (status `confirmed`); gifts still being created, pending
/// confirmation, or in a terminal status keep their slot out of every
/// itinerary. The whole recompute (scan, plan, write-back of every artist
/// document) happens in one transaction, so two concurrent triggers for
/// the same region serialize by optimistic retry.
///
/// # Errors
///
/// Returns `CoreError::Store` if the transaction exhausts its optimistic
/// retries.
pub fn redistribute(
    store: &impl DocumentStore,
    region: &Region,
) -> Result<AssignmentSummary, CoreError> {
    let summary = store.run_transaction(|tx| {
        let mut holders: BTreeMap<SlotId, (GiftId, GiftStatus)> = BTreeMap::new();
        for (id, gift) in tx.read_collection::<Gift>(collections::GIFTS) {
            if gift.status.is_terminal() {
                continue;
            }
            if let Some(slot_id) = gift.slot_id {
                holders
                    .entry(slot_id)
                    .or_insert_with(|| (GiftId::new(&id), gift.status));
            }
        }

        let mut candidates: Vec<CandidateStop> = Vec::new();
        for (id, slot) in tx.read_collection::<Slot>(collections::SLOTS) {
            if slot.region != *region || slot.status != SlotStatus::Reserved {
                continue;
            }
            let slot_id = SlotId::new(&id);
            let Some((gift_id, status)) = holders.get(&slot_id) else {
                continue;
            };
            if !status.is_deliverable() {
                continue;
            }
            candidates.push(CandidateStop {
                slot_id,
                gift_id: gift_id.clone(),
                at: slot.schedule_point(),
            });
        }

        let (ids, mut artists): (Vec<String>, Vec<Artist>) = tx
            .read_collection::<Artist>(collections::ARTISTS)
            .into_iter()
            .unzip();

        let summary = plan_itineraries(region, &candidates, &mut artists);

        for (id, artist) in ids.iter().zip(artists.iter()) {
            tx.set(&refs::artist_ref(&ArtistId::new(id)), artist)?;
        }

        Ok::<AssignmentSummary, CoreError>(summary)
    })?;

    tracing::debug!(
        region = %region,
        assigned = summary.assigned,
        unassigned = summary.unassigned,
        "Recomputed itinerary assignments"
    );
    Ok(summary)
}

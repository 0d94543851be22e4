// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Change-feed dispatch: maps one committed write to the reactions it
//! triggers.
//!
//! The feed is at-least-once, so everything dispatched from here is
//! idempotent: allocation through `processedReservationId`, messaging
//! through event-id-keyed documents, redistribution by being a full
//! recompute. Artist writes only retrigger redistribution when a window's
//! `(region, from, to)` tuple changed; assignment-only rewrites are the
//! engine's own output and must not feed back.

use crate::allocator::allocate;
use crate::appstate::apply_app_state;
use crate::clock::Clock;
use crate::error::CoreError;
use crate::lifecycle::{
    handle_gift_deleted, normalize_created_gift, release_on_terminal_transition,
};
use crate::messaging::enqueue_transition_message;
use crate::redistribute::redistribute;
use crate::refs::{self, collections};
use lahja_domain::{
    Artist, Gift, GiftId, Region, ReservationId, ReservationRequest, SchedulePoint, Slot,
};
use lahja_store::{ChangeEvent, ChangeKind, DocumentStore};
use std::collections::{BTreeMap, BTreeSet};

/// Dispatches one change event to the handlers it triggers.
///
/// One event is one unit of work: an error aborts this event's reactions
/// only and the caller decides whether to log or crash.
///
/// # Errors
///
/// Propagates the first handler error.
pub fn dispatch_event(
    store: &impl DocumentStore,
    clock: &impl Clock,
    event: &ChangeEvent,
) -> Result<(), CoreError> {
    match event.doc.collection() {
        collections::RESERVATIONS => dispatch_reservation(store, clock, event),
        collections::GIFTS => dispatch_gift(store, clock, event),
        collections::SLOTS => {
            for region in slot_regions(event) {
                redistribute(store, &region)?;
            }
            Ok(())
        }
        collections::ARTISTS => {
            for region in changed_window_regions(event) {
                redistribute(store, &region)?;
            }
            Ok(())
        }
        collections::APP_STATES => {
            apply_app_state(store)?;
            Ok(())
        }
        _ => Ok(()),
    }
}

fn dispatch_reservation(
    store: &impl DocumentStore,
    clock: &impl Clock,
    event: &ChangeEvent,
) -> Result<(), CoreError> {
    // Reservation records are write-once; only creations carry intent.
    if event.kind != ChangeKind::Created {
        return Ok(());
    }
    let Some(request) = event.after_as::<ReservationRequest>() else {
        tracing::warn!(doc = %event.doc, "Malformed reservation request; ignored");
        return Ok(());
    };

    let reservation_id = ReservationId::new(event.doc.id());
    let outcome = allocate(store, clock, &reservation_id, &request)?;
    tracing::debug!(
        reservation_id = %reservation_id,
        gift_id = %request.gift_id,
        slot_id = %request.slot_id,
        ?outcome,
        "Processed reservation request"
    );
    Ok(())
}

fn dispatch_gift(
    store: &impl DocumentStore,
    clock: &impl Clock,
    event: &ChangeEvent,
) -> Result<(), CoreError> {
    match event.kind {
        ChangeKind::Created => {
            normalize_created_gift(store, &GiftId::new(event.doc.id()))?;
            Ok(())
        }
        ChangeKind::Deleted => {
            // The release writes the slot, and the slot's own change event
            // takes care of redistribution.
            handle_gift_deleted(store, event)?;
            Ok(())
        }
        ChangeKind::Updated => {
            release_on_terminal_transition(store, event)?;
            enqueue_transition_message(store, clock, event)?;
            for region in gift_affected_regions(store, event)? {
                redistribute(store, &region)?;
            }
            Ok(())
        }
    }
}

/// Regions a slot write touches: the slot's region before and after.
fn slot_regions(event: &ChangeEvent) -> BTreeSet<Region> {
    let mut regions = BTreeSet::new();
    if let Some(slot) = event.before_as::<Slot>() {
        regions.insert(slot.region);
    }
    if let Some(slot) = event.after_as::<Slot>() {
        regions.insert(slot.region);
    }
    regions
}

/// Regions whose hand-edited windows differ between the two sides of an
/// artist write. Empty for assignment-only rewrites.
fn changed_window_regions(event: &ChangeEvent) -> BTreeSet<Region> {
    let before = window_map(event.before_as::<Artist>());
    let after = window_map(event.after_as::<Artist>());

    let mut regions = BTreeSet::new();
    for region in before.keys().chain(after.keys()) {
        if before.get(region) != after.get(region) {
            regions.insert(region.clone());
        }
    }
    regions
}

fn window_map(artist: Option<Artist>) -> BTreeMap<Region, Vec<(SchedulePoint, SchedulePoint)>> {
    let mut map: BTreeMap<Region, Vec<(SchedulePoint, SchedulePoint)>> = BTreeMap::new();
    if let Some(artist) = artist {
        for itinerary in artist.itineraries {
            map.entry(itinerary.region)
                .or_default()
                .push((itinerary.from, itinerary.to));
        }
    }
    for windows in map.values_mut() {
        windows.sort_unstable();
    }
    map
}

/// Regions a gift write affects, resolved through the slots it references.
///
/// Only changes to the `(status, slotId)` pair matter for assignment;
/// profile edits do not trigger a recompute.
fn gift_affected_regions(
    store: &impl DocumentStore,
    event: &ChangeEvent,
) -> Result<BTreeSet<Region>, CoreError> {
    let before = event.before_as::<Gift>();
    let after = event.after_as::<Gift>();

    let assignment_relevant_change = match (&before, &after) {
        (Some(b), Some(a)) => (b.status, &b.slot_id) != (a.status, &a.slot_id),
        _ => true,
    };
    if !assignment_relevant_change {
        return Ok(BTreeSet::new());
    }

    let mut slot_ids = BTreeSet::new();
    if let Some(slot_id) = before.and_then(|gift| gift.slot_id) {
        slot_ids.insert(slot_id);
    }
    if let Some(slot_id) = after.and_then(|gift| gift.slot_id) {
        slot_ids.insert(slot_id);
    }

    let mut regions = BTreeSet::new();
    for slot_id in slot_ids {
        let slot = store.run_transaction(|tx| tx.read::<Slot>(&refs::slot_ref(&slot_id)))?;
        if let Some(slot) = slot {
            regions.insert(slot.region);
        }
    }
    Ok(regions)
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{put, slot};
use crate::appstate::apply_app_state;
use crate::refs;
use lahja_domain::{AppState, AppStateRecord, Slot, SlotId, SlotStatus};
use lahja_store::MemoryStore;

fn seed_slots(store: &MemoryStore) {
    put(
        store,
        &refs::slot_ref(&SlotId::new("slot-closed")),
        &slot("kallio", "20261224", "12:00", SlotStatus::NotAvailable),
    );
    put(
        store,
        &refs::slot_ref(&SlotId::new("slot-open")),
        &slot("kallio", "20261224", "13:00", SlotStatus::Available),
    );
    put(
        store,
        &refs::slot_ref(&SlotId::new("slot-held")),
        &slot("kallio", "20261224", "14:00", SlotStatus::Reserved),
    );
}

fn status_of(store: &MemoryStore, id: &str) -> SlotStatus {
    let stored: Slot = store
        .get(&refs::slot_ref(&SlotId::new(id)))
        .unwrap()
        .unwrap();
    stored.status
}

#[test]
fn test_open_phase_releases_closed_slots() {
    let store = MemoryStore::new();
    seed_slots(&store);
    put(
        &store,
        &refs::app_state_ref(),
        &AppStateRecord {
            state: AppState::Open,
        },
    );

    let changed = apply_app_state(&store).unwrap();

    assert_eq!(changed, 1);
    assert_eq!(status_of(&store, "slot-closed"), SlotStatus::Available);
    assert_eq!(status_of(&store, "slot-open"), SlotStatus::Available);
    assert_eq!(status_of(&store, "slot-held"), SlotStatus::Reserved);
}

#[test]
fn test_pause_withdraws_available_slots_but_keeps_holds() {
    let store = MemoryStore::new();
    seed_slots(&store);
    put(
        &store,
        &refs::app_state_ref(),
        &AppStateRecord {
            state: AppState::Paused,
        },
    );

    let changed = apply_app_state(&store).unwrap();

    assert_eq!(changed, 1);
    assert_eq!(status_of(&store, "slot-closed"), SlotStatus::NotAvailable);
    assert_eq!(status_of(&store, "slot-open"), SlotStatus::NotAvailable);
    assert_eq!(status_of(&store, "slot-held"), SlotStatus::Reserved);
}

#[test]
fn test_missing_phase_document_changes_nothing() {
    let store = MemoryStore::new();
    seed_slots(&store);

    assert_eq!(apply_app_state(&store).unwrap(), 0);
    assert_eq!(status_of(&store, "slot-open"), SlotStatus::Available);
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! End-to-end flows through the change feed: external collaborators write
//! documents, the dispatcher reacts, and reactions cascade until the feed
//! is quiet.

use super::helpers::{T0, TestClock, artist, drain, gift, put, slot, window};
use crate::refs;
use lahja_domain::{
    AppState, AppStateRecord, Artist, ArtistId, Gift, GiftId, GiftStatus, OutboundMessage,
    ReservationId, ReservationRequest, Slot, SlotId, SlotStatus,
};
use lahja_store::{DocumentStore, MemoryStore, StoreError};

fn queued_messages(store: &MemoryStore) -> Vec<OutboundMessage> {
    store
        .run_transaction(|tx| {
            Ok::<_, StoreError>(tx.read_collection::<OutboundMessage>(refs::collections::MESSAGES))
        })
        .unwrap()
        .into_iter()
        .map(|(_, message)| message)
        .collect()
}

fn stored_artist(store: &MemoryStore, id: &str) -> Artist {
    store
        .get(&refs::artist_ref(&ArtistId::new(id)))
        .unwrap()
        .unwrap()
}

#[test]
fn test_reservation_request_flows_through_the_feed() {
    let store = MemoryStore::new();
    let clock = TestClock::new(T0);
    let slot_id = SlotId::new("slot-1");
    put(
        &store,
        &refs::slot_ref(&slot_id),
        &slot("kallio", "20261224", "12:00", SlotStatus::Available),
    );
    put(
        &store,
        &refs::gift_ref(&GiftId::new("gift-1")),
        &gift(GiftStatus::Creating, None),
    );

    let mut feed = store.subscribe();
    // The giver's client appends an immutable intent record.
    put(
        &store,
        &refs::reservation_ref(&ReservationId::new("res-1")),
        &ReservationRequest {
            gift_id: GiftId::new("gift-1"),
            slot_id: slot_id.clone(),
        },
    );
    drain(&store, &clock, &mut feed);

    let stored_gift: Gift = store
        .get(&refs::gift_ref(&GiftId::new("gift-1")))
        .unwrap()
        .unwrap();
    assert_eq!(stored_gift.slot_id, Some(slot_id.clone()));
    assert_eq!(
        stored_gift.processed_reservation_id,
        Some(ReservationId::new("res-1"))
    );
    let stored_slot: Slot = store.get(&refs::slot_ref(&slot_id)).unwrap().unwrap();
    assert_eq!(stored_slot.status, SlotStatus::Reserved);
}

#[test]
fn test_created_gift_is_normalized_through_the_feed() {
    let store = MemoryStore::new();
    let clock = TestClock::new(T0);

    let mut feed = store.subscribe();
    // A caller tries to create a gift born confirmed.
    put(
        &store,
        &refs::gift_ref(&GiftId::new("gift-1")),
        &gift(GiftStatus::Confirmed, None),
    );
    drain(&store, &clock, &mut feed);

    let stored: Gift = store
        .get(&refs::gift_ref(&GiftId::new("gift-1")))
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, GiftStatus::Creating);
}

#[test]
fn test_confirmation_assigns_gift_and_queues_message() {
    let store = MemoryStore::new();
    let clock = TestClock::new(T0);
    let slot_id = SlotId::new("slot-1");
    put(
        &store,
        &refs::slot_ref(&slot_id),
        &slot("kallio", "20261224", "12:00", SlotStatus::Reserved),
    );
    put(
        &store,
        &refs::gift_ref(&GiftId::new("gift-1")),
        &gift(GiftStatus::Pending, Some(&slot_id)),
    );
    put(
        &store,
        &refs::artist_ref(&ArtistId::new("artist-a")),
        &artist("a", vec![window("kallio", "20261224", "10:00", "20:00")]),
    );

    // Pending gifts are never assigned, even on a reserved slot.
    crate::redistribute::redistribute(&store, &lahja_domain::Region::new("kallio")).unwrap();
    assert!(stored_artist(&store, "artist-a").itineraries[0]
        .assignments
        .is_empty());

    let mut feed = store.subscribe();
    // An admin confirms the gift.
    put(
        &store,
        &refs::gift_ref(&GiftId::new("gift-1")),
        &gift(GiftStatus::Confirmed, Some(&slot_id)),
    );
    drain(&store, &clock, &mut feed);

    let assigned = stored_artist(&store, "artist-a");
    assert_eq!(assigned.itineraries[0].assignments.len(), 1);
    assert_eq!(
        assigned.itineraries[0].assignments[0].gift_id,
        GiftId::new("gift-1")
    );

    let messages = queued_messages(&store);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].message_key, "gift-confirmed");
}

#[test]
fn test_cancellation_releases_slot_and_unassigns_through_the_feed() {
    let store = MemoryStore::new();
    let clock = TestClock::new(T0);
    let slot_id = SlotId::new("slot-1");
    put(
        &store,
        &refs::slot_ref(&slot_id),
        &slot("kallio", "20261224", "12:00", SlotStatus::Reserved),
    );
    put(
        &store,
        &refs::gift_ref(&GiftId::new("gift-1")),
        &gift(GiftStatus::Confirmed, Some(&slot_id)),
    );
    put(
        &store,
        &refs::artist_ref(&ArtistId::new("artist-a")),
        &artist("a", vec![window("kallio", "20261224", "10:00", "20:00")]),
    );
    crate::redistribute::redistribute(&store, &lahja_domain::Region::new("kallio")).unwrap();
    assert_eq!(
        stored_artist(&store, "artist-a").itineraries[0]
            .assignments
            .len(),
        1
    );

    let mut feed = store.subscribe();
    put(
        &store,
        &refs::gift_ref(&GiftId::new("gift-1")),
        &gift(GiftStatus::Cancelled, Some(&slot_id)),
    );
    drain(&store, &clock, &mut feed);

    let released: Slot = store.get(&refs::slot_ref(&slot_id)).unwrap().unwrap();
    assert_eq!(released.status, SlotStatus::Available);
    let stored: Gift = store
        .get(&refs::gift_ref(&GiftId::new("gift-1")))
        .unwrap()
        .unwrap();
    assert!(stored.slot_id.is_none());
    assert!(stored_artist(&store, "artist-a").itineraries[0]
        .assignments
        .is_empty());
}

#[test]
fn test_window_edit_triggers_recompute_but_assignment_writes_do_not() {
    let store = MemoryStore::new();
    let clock = TestClock::new(T0);
    let slot_id = SlotId::new("slot-1");
    put(
        &store,
        &refs::slot_ref(&slot_id),
        &slot("kallio", "20261224", "12:00", SlotStatus::Reserved),
    );
    put(
        &store,
        &refs::gift_ref(&GiftId::new("gift-1")),
        &gift(GiftStatus::Confirmed, Some(&slot_id)),
    );
    put(
        &store,
        &refs::artist_ref(&ArtistId::new("artist-a")),
        &artist("a", vec![window("toolo", "20261224", "10:00", "20:00")]),
    );

    let mut feed = store.subscribe();
    // Admin moves the artist's window into the region with the gift.
    put(
        &store,
        &refs::artist_ref(&ArtistId::new("artist-a")),
        &artist("a", vec![window("kallio", "20261224", "10:00", "20:00")]),
    );
    drain(&store, &clock, &mut feed);

    assert_eq!(
        stored_artist(&store, "artist-a").itineraries[0]
            .assignments
            .len(),
        1
    );

    // An assignment-only write is the engine's own output shape; it must
    // not feed back into a recompute that would undo the edit below.
    let mut rewritten = stored_artist(&store, "artist-a");
    rewritten.itineraries[0].assignments.clear();
    put(
        &store,
        &refs::artist_ref(&ArtistId::new("artist-a")),
        &rewritten,
    );
    drain(&store, &clock, &mut feed);

    assert!(stored_artist(&store, "artist-a").itineraries[0]
        .assignments
        .is_empty());
}

#[test]
fn test_campaign_phase_write_fans_out_through_the_feed() {
    let store = MemoryStore::new();
    let clock = TestClock::new(T0);
    put(
        &store,
        &refs::slot_ref(&SlotId::new("slot-closed")),
        &slot("kallio", "20261224", "12:00", SlotStatus::NotAvailable),
    );
    put(
        &store,
        &refs::slot_ref(&SlotId::new("slot-held")),
        &slot("kallio", "20261224", "13:00", SlotStatus::Reserved),
    );

    let mut feed = store.subscribe();
    put(
        &store,
        &refs::app_state_ref(),
        &AppStateRecord {
            state: AppState::Open,
        },
    );
    drain(&store, &clock, &mut feed);

    let opened: Slot = store
        .get(&refs::slot_ref(&SlotId::new("slot-closed")))
        .unwrap()
        .unwrap();
    assert_eq!(opened.status, SlotStatus::Available);
    let held: Slot = store
        .get(&refs::slot_ref(&SlotId::new("slot-held")))
        .unwrap()
        .unwrap();
    assert_eq!(held.status, SlotStatus::Reserved);
}

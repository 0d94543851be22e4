// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::clock::Clock;
use crate::messaging::{DeliveryError, TextMessageSender};
use crate::router::dispatch_event;
use lahja_domain::{
    Artist, Gift, GiftStatus, Itinerary, Region, SchedulePoint, Slot, SlotDate, SlotId, SlotStatus,
    SlotTime,
};
use lahja_store::{ChangeEvent, DocRef, DocumentStore, MemoryStore, StoreError};
use serde::Serialize;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

/// An arbitrary campaign-time base, 2026-12-18T00:00:00Z-ish.
pub const T0: i64 = 1_797_000_000_000;

/// Deterministic, manually advanced clock.
pub struct TestClock {
    now: AtomicI64,
}

impl TestClock {
    pub const fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for TestClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Transport double that records sends and can be told to fail.
#[derive(Default)]
pub struct RecordingSender {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: AtomicBool,
}

impl TextMessageSender for RecordingSender {
    fn send_text_message(&self, body: &str, to_number: &str) -> Result<(), DeliveryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DeliveryError::new("gateway unreachable"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((body.to_owned(), to_number.to_owned()));
        Ok(())
    }
}

pub fn put<T: Serialize>(store: &MemoryStore, doc: &DocRef, value: &T) {
    store
        .run_transaction(|tx| {
            tx.set(doc, value)?;
            Ok::<(), StoreError>(())
        })
        .unwrap();
}

pub fn remove(store: &MemoryStore, doc: &DocRef) {
    store
        .run_transaction(|tx| {
            tx.delete(doc);
            Ok::<(), StoreError>(())
        })
        .unwrap();
}

pub fn point(date: &str, time: &str) -> SchedulePoint {
    SchedulePoint::new(
        SlotDate::parse(date).unwrap(),
        SlotTime::parse(time).unwrap(),
    )
}

pub fn slot(region: &str, date: &str, time: &str, status: SlotStatus) -> Slot {
    Slot {
        region: Region::new(region),
        date: SlotDate::parse(date).unwrap(),
        time: SlotTime::parse(time).unwrap(),
        status,
    }
}

pub fn gift(status: GiftStatus, slot_id: Option<&SlotId>) -> Gift {
    Gift {
        status,
        slot_id: slot_id.cloned(),
        from_name: Some(String::from("Testi Antaja")),
        from_phone_number: Some(String::from("0401234567")),
        to_name: Some(String::from("Testi Saaja")),
        to_address: Some(String::from("Esimerkkikatu 1, Helsinki")),
        message: Some(String::from("Hyvää joulua!")),
        ..Gift::default()
    }
}

pub fn window(region: &str, date: &str, from: &str, to: &str) -> Itinerary {
    Itinerary {
        region: Region::new(region),
        from: point(date, from),
        to: point(date, to),
        assignments: Vec::new(),
    }
}

pub fn artist(name: &str, itineraries: Vec<Itinerary>) -> Artist {
    Artist {
        name: String::from(name),
        phone_number: None,
        itineraries,
    }
}

/// Builds a change event by hand, for handlers that take the event itself.
pub fn event(
    kind: lahja_store::ChangeKind,
    doc: DocRef,
    before: Option<serde_json::Value>,
    after: Option<serde_json::Value>,
) -> ChangeEvent {
    ChangeEvent {
        event_id: format!("evt-test-{}", doc.id()),
        kind,
        doc,
        before,
        after,
    }
}

/// Dispatches every queued change event, including those produced by the
/// dispatched handlers, until the feed is quiet.
pub fn drain(
    store: &MemoryStore,
    clock: &impl Clock,
    feed: &mut broadcast::Receiver<ChangeEvent>,
) {
    loop {
        match feed.try_recv() {
            Ok(change) => dispatch_event(store, clock, &change).unwrap(),
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            Err(TryRecvError::Lagged(skipped)) => {
                panic!("test change feed lagged by {skipped} events")
            }
        }
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use lahja_domain::{ArtistId, GiftId, ReservationId, SlotId};
use lahja_store::DocRef;

/// Collection names shared with the external UI layers.
pub mod collections {
    /// Bookable slots.
    pub const SLOTS: &str = "slots";
    /// Gifts.
    pub const GIFTS: &str = "gifts";
    /// Write-once reservation requests.
    pub const RESERVATIONS: &str = "reservations";
    /// Artists and their itineraries.
    pub const ARTISTS: &str = "artists";
    /// The singleton campaign phase.
    pub const APP_STATES: &str = "appstates";
    /// Outbound SMS queue.
    pub const MESSAGES: &str = "messages";
}

/// Id of the singleton app-state document.
pub const APP_STATE_SINGLETON: &str = "singleton";

/// Returns the reference to a slot document.
#[must_use]
pub fn slot_ref(id: &SlotId) -> DocRef {
    DocRef::new(collections::SLOTS, id.value())
}

/// Returns the reference to a gift document.
#[must_use]
pub fn gift_ref(id: &GiftId) -> DocRef {
    DocRef::new(collections::GIFTS, id.value())
}

/// Returns the reference to a reservation request document.
#[must_use]
pub fn reservation_ref(id: &ReservationId) -> DocRef {
    DocRef::new(collections::RESERVATIONS, id.value())
}

/// Returns the reference to an artist document.
#[must_use]
pub fn artist_ref(id: &ArtistId) -> DocRef {
    DocRef::new(collections::ARTISTS, id.value())
}

/// Returns the reference to the singleton app-state document.
#[must_use]
pub fn app_state_ref() -> DocRef {
    DocRef::new(collections::APP_STATES, APP_STATE_SINGLETON)
}

/// Returns the reference to an outbound message document.
///
/// Messages are keyed by the change event that produced them, which is
/// what makes their creation idempotent under redelivery.
#[must_use]
pub fn message_ref(event_id: &str) -> DocRef {
    DocRef::new(collections::MESSAGES, event_id)
}

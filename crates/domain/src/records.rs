// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Record types mirroring the document-store schema.
//!
//! These are the wire shapes the core shares with the external UI layers;
//! field names serialize in `camelCase` and optional fields are omitted
//! when absent so hand-written documents stay readable. Optional fields also
//! default on deserialization, because partially-written documents are a
//! reality of a store that several collaborators write to.

use crate::types::{
    AppState, GiftId, GiftStatus, Language, Region, ReservationId, SchedulePoint, SlotDate, SlotId,
    SlotStatus, SlotTime,
};
use serde::{Deserialize, Serialize};

/// A bookable unit of artist availability: one region, one day, one time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    /// The delivery zone this slot belongs to.
    pub region: Region,
    /// The calendar day.
    pub date: SlotDate,
    /// The time of day.
    pub time: SlotTime,
    /// Current availability.
    #[serde(default)]
    pub status: SlotStatus,
}

impl Slot {
    /// Returns the slot's position on the campaign calendar.
    #[must_use]
    pub const fn schedule_point(&self) -> SchedulePoint {
        SchedulePoint::new(self.date, self.time)
    }
}

/// A performance request tied to a slot, with giver and recipient details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Gift {
    /// Lifecycle status.
    #[serde(default)]
    pub status: GiftStatus,
    /// The slot this gift currently holds, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_id: Option<SlotId>,
    /// Deadline (epoch milliseconds) for an unconfirmed hold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved_until: Option<i64>,
    /// Id of the last reservation request applied to this gift.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_reservation_id: Option<ReservationId>,
    /// Giver's name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_name: Option<String>,
    /// Giver's phone number as entered (normalized only at send time).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_phone_number: Option<String>,
    /// Giver's preferred language for outbound messages.
    #[serde(default)]
    pub from_language: Language,
    /// Recipient's name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_name: Option<String>,
    /// Free-form delivery location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_address: Option<String>,
    /// Greeting from the giver to the recipient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Gift {
    /// Returns whether this gift currently claims the given slot.
    ///
    /// Terminal gifts never claim a slot even if a stale `slotId` lingers.
    #[must_use]
    pub fn claims(&self, slot_id: &SlotId) -> bool {
        !self.status.is_terminal() && self.slot_id.as_ref() == Some(slot_id)
    }
}

/// An immutable reservation intent record, written once and never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    /// The gift attempting to claim a slot.
    pub gift_id: GiftId,
    /// The slot being claimed.
    pub slot_id: SlotId,
}

/// One delivery stop inside an itinerary: a slot and the gift on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    /// The assigned slot.
    pub slot_id: SlotId,
    /// The gift delivered at that slot.
    pub gift_id: GiftId,
}

/// An artist's availability window within one region.
///
/// Window bounds are hand-edited by admins; `assignments` is derived and
/// overwritten wholesale by redistribution, never patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    /// The region this window covers.
    pub region: Region,
    /// Window start, inclusive.
    pub from: SchedulePoint,
    /// Window end, exclusive.
    pub to: SchedulePoint,
    /// Derived delivery stops in slot-time order.
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

impl Itinerary {
    /// Returns whether the window contains the given point.
    ///
    /// The window is half-open: a slot exactly at `from` is eligible, a
    /// slot exactly at `to` is not.
    #[must_use]
    pub fn contains(&self, point: SchedulePoint) -> bool {
        self.from <= point && point < self.to
    }

    /// Returns the hand-edited part of this itinerary.
    ///
    /// Two itinerary sets whose window keys match differ only in derived
    /// assignments.
    #[must_use]
    pub fn window_key(&self) -> (Region, SchedulePoint, SchedulePoint) {
        (self.region.clone(), self.from, self.to)
    }
}

/// An artist and their ordered itinerary windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    /// Display name.
    pub name: String,
    /// Contact number, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Availability windows in declaration order.
    #[serde(default)]
    pub itineraries: Vec<Itinerary>,
}

/// The singleton campaign phase document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppStateRecord {
    /// Current phase.
    pub state: AppState,
}

/// A queued outbound SMS, keyed in the store by the change event that
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    /// Rendered message body.
    pub message: String,
    /// Recipient number as stored on the gift.
    pub to_number: String,
    /// The gift this message is about, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gift_id: Option<GiftId>,
    /// Template key the body was rendered from.
    pub message_key: String,
    /// Whether the external transport has picked this record up.
    pub sent: bool,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn point(date: &str, time: &str) -> SchedulePoint {
        SchedulePoint::new(
            SlotDate::parse(date).unwrap(),
            SlotTime::parse(time).unwrap(),
        )
    }

    #[test]
    fn test_window_is_half_open() {
        let itinerary = Itinerary {
            region: Region::new("kallio"),
            from: point("20261224", "12:00"),
            to: point("20261224", "13:00"),
            assignments: Vec::new(),
        };

        assert!(itinerary.contains(point("20261224", "12:00")));
        assert!(itinerary.contains(point("20261224", "12:30")));
        assert!(!itinerary.contains(point("20261224", "13:00")));
        assert!(!itinerary.contains(point("20261224", "11:59")));
    }

    #[test]
    fn test_window_spans_midnight_across_days() {
        let itinerary = Itinerary {
            region: Region::new("kallio"),
            from: point("20261224", "22:00"),
            to: point("20261225", "02:00"),
            assignments: Vec::new(),
        };

        assert!(itinerary.contains(point("20261224", "23:30")));
        assert!(itinerary.contains(point("20261225", "01:59")));
        assert!(!itinerary.contains(point("20261225", "02:00")));
    }

    #[test]
    fn test_gift_claims_respects_terminal_status() {
        let slot_id = SlotId::new("slot-1");
        let mut gift = Gift {
            status: GiftStatus::Pending,
            slot_id: Some(slot_id.clone()),
            ..Gift::default()
        };

        assert!(gift.claims(&slot_id));

        gift.status = GiftStatus::Cancelled;
        assert!(!gift.claims(&slot_id));
        assert!(!gift.claims(&SlotId::new("slot-2")));
    }

    #[test]
    fn test_gift_serializes_camel_case_and_omits_absent_fields() {
        let gift = Gift {
            status: GiftStatus::Pending,
            slot_id: Some(SlotId::new("slot-1")),
            reserved_until: Some(1_700_000_000_000),
            from_phone_number: Some(String::from("0401234567")),
            ..Gift::default()
        };

        let value = serde_json::to_value(&gift).unwrap();
        assert_eq!(value["status"], "pending");
        assert_eq!(value["slotId"], "slot-1");
        assert_eq!(value["reservedUntil"], 1_700_000_000_000_i64);
        assert_eq!(value["fromPhoneNumber"], "0401234567");
        assert_eq!(value["fromLanguage"], "fi");
        assert!(value.get("processedReservationId").is_none());
        assert!(value.get("toAddress").is_none());
    }

    #[test]
    fn test_gift_deserializes_partial_document() {
        let gift: Gift = serde_json::from_str("{}").unwrap();
        assert_eq!(gift.status, GiftStatus::Creating);
        assert!(gift.slot_id.is_none());
        assert_eq!(gift.from_language, Language::Fi);
    }

    #[test]
    fn test_artist_wire_shape() {
        let artist = Artist {
            name: String::from("Aino"),
            phone_number: None,
            itineraries: vec![Itinerary {
                region: Region::new("kallio"),
                from: point("20261224", "12:00"),
                to: point("20261224", "14:00"),
                assignments: vec![Assignment {
                    slot_id: SlotId::new("slot-1"),
                    gift_id: GiftId::new("gift-1"),
                }],
            }],
        };

        let value = serde_json::to_value(&artist).unwrap();
        assert_eq!(value["itineraries"][0]["from"]["date"], "20261224");
        assert_eq!(value["itineraries"][0]["from"]["time"], "12:00");
        assert_eq!(value["itineraries"][0]["assignments"][0]["slotId"], "slot-1");
    }
}

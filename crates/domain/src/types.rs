// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Identifier of a bookable slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId {
    value: String,
}

impl SlotId {
    /// Creates a new `SlotId`. Surrounding whitespace is trimmed.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self {
            value: value.trim().to_owned(),
        }
    }

    /// Returns the identifier value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Identifier of a gift.
///
/// Gift ids are generated by the giver's client so an interrupted
/// reservation can be resumed from the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GiftId {
    value: String,
}

impl GiftId {
    /// Creates a new `GiftId`. Surrounding whitespace is trimmed.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self {
            value: value.trim().to_owned(),
        }
    }

    /// Returns the identifier value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for GiftId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Identifier of a reservation request record.
///
/// Fresh per attempt; doubles as the idempotency marker on the gift.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId {
    value: String,
}

impl ReservationId {
    /// Creates a new `ReservationId`. Surrounding whitespace is trimmed.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self {
            value: value.trim().to_owned(),
        }
    }

    /// Returns the identifier value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for ReservationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Identifier of an artist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtistId {
    value: String,
}

impl ArtistId {
    /// Creates a new `ArtistId`. Surrounding whitespace is trimmed.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self {
            value: value.trim().to_owned(),
        }
    }

    /// Returns the identifier value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for ArtistId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A named delivery zone.
///
/// Zones are defined by inventory data, not by code; the store schema
/// carries them as plain strings, so this is a normalized newtype rather
/// than a closed enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region {
    value: String,
}

impl Region {
    /// Creates a new `Region`. Surrounding whitespace is trimmed.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self {
            value: value.trim().to_owned(),
        }
    }

    /// Returns the zone name.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A calendar day in the campaign, stored on the wire as `YYYYMMDD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotDate {
    value: time::Date,
}

impl SlotDate {
    /// Wraps an already-validated calendar date.
    #[must_use]
    pub const fn new(value: time::Date) -> Self {
        Self { value }
    }

    /// Parses the `YYYYMMDD` wire form.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDate` if the string is not eight digits
    /// or does not name a real calendar date.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let invalid = || DomainError::InvalidDate {
            value: value.to_owned(),
        };

        if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let year: i32 = value[0..4].parse().map_err(|_| invalid())?;
        let month_number: u8 = value[4..6].parse().map_err(|_| invalid())?;
        let day: u8 = value[6..8].parse().map_err(|_| invalid())?;

        let month = time::Month::try_from(month_number).map_err(|_| invalid())?;
        let date = time::Date::from_calendar_date(year, month, day).map_err(|_| invalid())?;

        Ok(Self { value: date })
    }

    /// Returns the wrapped calendar date.
    #[must_use]
    pub const fn date(self) -> time::Date {
        self.value
    }
}

impl std::fmt::Display for SlotDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}{:02}{:02}",
            self.value.year(),
            u8::from(self.value.month()),
            self.value.day()
        )
    }
}

impl FromStr for SlotDate {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for SlotDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SlotDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(serde::de::Error::custom)
    }
}

/// A time of day, stored on the wire as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotTime {
    value: time::Time,
}

impl SlotTime {
    /// Wraps an already-validated time of day. Seconds are discarded by the
    /// wire form, so callers should pass whole minutes.
    #[must_use]
    pub const fn new(value: time::Time) -> Self {
        Self { value }
    }

    /// Parses the `HH:MM` wire form.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTime` if the string is not `HH:MM` or
    /// the components are out of range.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let invalid = || DomainError::InvalidTime {
            value: value.to_owned(),
        };

        let (hour_part, minute_part) = value.split_once(':').ok_or_else(invalid)?;
        if hour_part.len() != 2 || minute_part.len() != 2 {
            return Err(invalid());
        }

        let hour: u8 = hour_part.parse().map_err(|_| invalid())?;
        let minute: u8 = minute_part.parse().map_err(|_| invalid())?;

        let time = time::Time::from_hms(hour, minute, 0).map_err(|_| invalid())?;

        Ok(Self { value: time })
    }

    /// Returns the wrapped time of day.
    #[must_use]
    pub const fn time(self) -> time::Time {
        self.value
    }
}

impl std::fmt::Display for SlotTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.value.hour(), self.value.minute())
    }
}

impl FromStr for SlotTime {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for SlotTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SlotTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(serde::de::Error::custom)
    }
}

/// A point on the campaign calendar: a date plus a time of day.
///
/// Itinerary window bounds and candidate slots are compared as these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchedulePoint {
    /// The calendar day.
    pub date: SlotDate,
    /// The time of day.
    pub time: SlotTime,
}

impl SchedulePoint {
    /// Creates a new schedule point.
    #[must_use]
    pub const fn new(date: SlotDate, time: SlotTime) -> Self {
        Self { date, time }
    }

    /// Converts to a `PrimitiveDateTime` for duration arithmetic.
    #[must_use]
    pub const fn as_datetime(self) -> time::PrimitiveDateTime {
        time::PrimitiveDateTime::new(self.date.date(), self.time.time())
    }
}

impl std::fmt::Display for SchedulePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.date, self.time)
    }
}

/// Availability state of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SlotStatus {
    /// Not bookable (outside the campaign's open phase).
    #[default]
    NotAvailable,
    /// Bookable.
    Available,
    /// Held by exactly one non-terminal gift.
    Reserved,
}

impl SlotStatus {
    /// Converts this status to its wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotAvailable => "notAvailable",
            Self::Available => "available",
            Self::Reserved => "reserved",
        }
    }
}

impl FromStr for SlotStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notAvailable" => Ok(Self::NotAvailable),
            "available" => Ok(Self::Available),
            "reserved" => Ok(Self::Reserved),
            _ => Err(DomainError::InvalidSlotStatus(s.to_owned())),
        }
    }
}

impl std::fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of a gift.
///
/// Transitions are externally driven (giver or admin action); the core
/// owns only creation normalization and the release side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GiftStatus {
    /// The giver is still filling in the reservation.
    #[default]
    Creating,
    /// Submitted, awaiting admin confirmation.
    Pending,
    /// Confirmed for delivery.
    Confirmed,
    /// Rejected by an admin. Terminal.
    Rejected,
    /// Cancelled by the giver. Terminal.
    Cancelled,
}

impl GiftStatus {
    /// Returns whether this status ends the gift's lifecycle.
    ///
    /// Terminal gifts may not hold a slot and are never delivered.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Cancelled)
    }

    /// Returns whether a gift in this status is ready to be delivered.
    ///
    /// Only confirmed gifts are routed into artist itineraries; in-progress
    /// and pending holds keep their slot reserved but are not assigned.
    #[must_use]
    pub const fn is_deliverable(self) -> bool {
        matches!(self, Self::Confirmed)
    }

    /// Converts this status to its wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Creating => "creating",
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for GiftStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "creating" => Ok(Self::Creating),
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "rejected" => Ok(Self::Rejected),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidGiftStatus(s.to_owned())),
        }
    }
}

impl std::fmt::Display for GiftStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Global campaign phase, driving bulk slot availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppState {
    /// Before the campaign opens.
    #[default]
    Pre,
    /// Reservations open.
    Open,
    /// Temporarily paused.
    Paused,
    /// Campaign over.
    Post,
}

impl AppState {
    /// Returns the availability every non-reserved slot should be set to in
    /// this phase.
    #[must_use]
    pub const fn slot_availability(self) -> SlotStatus {
        match self {
            Self::Open => SlotStatus::Available,
            Self::Pre | Self::Paused | Self::Post => SlotStatus::NotAvailable,
        }
    }

    /// Converts this state to its wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pre => "pre",
            Self::Open => "open",
            Self::Paused => "paused",
            Self::Post => "post",
        }
    }
}

impl FromStr for AppState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pre" => Ok(Self::Pre),
            "open" => Ok(Self::Open),
            "paused" => Ok(Self::Paused),
            "post" => Ok(Self::Post),
            _ => Err(DomainError::InvalidAppState(s.to_owned())),
        }
    }
}

impl std::fmt::Display for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Language of the giver, selecting outbound message templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Finnish.
    #[default]
    Fi,
    /// English.
    En,
    /// Swedish.
    Sv,
}

impl Language {
    /// Converts this language to its wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fi => "fi",
            Self::En => "en",
            Self::Sv => "sv",
        }
    }
}

impl FromStr for Language {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fi" => Ok(Self::Fi),
            "en" => Ok(Self::En),
            "sv" => Ok(Self::Sv),
            _ => Err(DomainError::InvalidLanguage(s.to_owned())),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_date_round_trip() {
        let date = SlotDate::parse("20261224").unwrap();
        assert_eq!(date.date().year(), 2026);
        assert_eq!(date.date().month(), time::Month::December);
        assert_eq!(date.date().day(), 24);
        assert_eq!(date.to_string(), "20261224");
    }

    #[test]
    fn test_slot_date_rejects_malformed() {
        assert!(SlotDate::parse("2026-12-24").is_err());
        assert!(SlotDate::parse("20261301").is_err()); // month 13
        assert!(SlotDate::parse("20260230").is_err()); // Feb 30
        assert!(SlotDate::parse("2026122").is_err()); // too short
        assert!(SlotDate::parse("").is_err());
    }

    #[test]
    fn test_slot_time_round_trip() {
        let t = SlotTime::parse("09:05").unwrap();
        assert_eq!(t.time().hour(), 9);
        assert_eq!(t.time().minute(), 5);
        assert_eq!(t.to_string(), "09:05");
    }

    #[test]
    fn test_slot_time_rejects_malformed() {
        assert!(SlotTime::parse("9:05").is_err());
        assert!(SlotTime::parse("24:00").is_err());
        assert!(SlotTime::parse("12:60").is_err());
        assert!(SlotTime::parse("1205").is_err());
    }

    #[test]
    fn test_schedule_point_ordering() {
        let morning = SchedulePoint::new(
            SlotDate::parse("20261224").unwrap(),
            SlotTime::parse("09:00").unwrap(),
        );
        let evening = SchedulePoint::new(
            SlotDate::parse("20261224").unwrap(),
            SlotTime::parse("18:00").unwrap(),
        );
        let next_day = SchedulePoint::new(
            SlotDate::parse("20261225").unwrap(),
            SlotTime::parse("08:00").unwrap(),
        );

        assert!(morning < evening);
        assert!(evening < next_day);
    }

    #[test]
    fn test_status_wire_forms() {
        assert_eq!(SlotStatus::NotAvailable.as_str(), "notAvailable");
        assert_eq!(
            "reserved".parse::<SlotStatus>().unwrap(),
            SlotStatus::Reserved
        );
        assert_eq!(
            "cancelled".parse::<GiftStatus>().unwrap(),
            GiftStatus::Cancelled
        );
        assert!("deleted".parse::<GiftStatus>().is_err());
        assert_eq!("open".parse::<AppState>().unwrap(), AppState::Open);
    }

    #[test]
    fn test_gift_status_classification() {
        assert!(GiftStatus::Rejected.is_terminal());
        assert!(GiftStatus::Cancelled.is_terminal());
        assert!(!GiftStatus::Creating.is_terminal());
        assert!(GiftStatus::Confirmed.is_deliverable());
        assert!(!GiftStatus::Pending.is_deliverable());
    }

    #[test]
    fn test_app_state_slot_availability() {
        assert_eq!(AppState::Open.slot_availability(), SlotStatus::Available);
        assert_eq!(AppState::Pre.slot_availability(), SlotStatus::NotAvailable);
        assert_eq!(
            AppState::Paused.slot_availability(),
            SlotStatus::NotAvailable
        );
        assert_eq!(AppState::Post.slot_availability(), SlotStatus::NotAvailable);
    }

    #[test]
    fn test_serde_wire_forms() {
        let json = serde_json::to_string(&SlotStatus::NotAvailable).unwrap();
        assert_eq!(json, "\"notAvailable\"");

        let date: SlotDate = serde_json::from_str("\"20260206\"").unwrap();
        assert_eq!(date.to_string(), "20260206");

        let time: SlotTime = serde_json::from_str("\"12:30\"").unwrap();
        assert_eq!(time.to_string(), "12:30");
    }
}

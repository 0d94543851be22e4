// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Outbound SMS queue: exactly-once enqueue on gift transitions, periodic
//! best-effort send through an external transport capability.
//!
//! The queue document is keyed by the change event that produced it, so a
//! redelivered event finds its message already written and does nothing.
//! Sending is at-least-once: a failed send keeps the record unsent and the
//! next sweep retries it.

use crate::clock::Clock;
use crate::error::CoreError;
use crate::refs::{self, collections};
use lahja_domain::{Gift, GiftId, GiftStatus, Language, OutboundMessage, normalize_phone_number};
use lahja_store::{ChangeEvent, DocumentStore};

/// Records younger than this are skipped by the send sweep, batching
/// near-simultaneous writes for the external sender.
pub const MESSAGE_GRACE_MS: i64 = 30_000;

/// Template key of an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    /// The giver finished the reservation form.
    GiftReceived,
    /// An admin confirmed the gift for delivery.
    GiftConfirmed,
}

impl MessageKey {
    /// Converts this key to its wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GiftReceived => "gift-received",
            Self::GiftConfirmed => "gift-confirmed",
        }
    }

    /// Renders the message body in the giver's language.
    #[must_use]
    pub const fn body(self, language: Language) -> &'static str {
        match (self, language) {
            (Self::GiftReceived, Language::Fi) => {
                "Kiitos! Lahjavarauksesi on vastaanotettu. Saat vahvistuksen tekstiviestillä."
            }
            (Self::GiftReceived, Language::En) => {
                "Thank you! Your gift reservation has been received. You will get a confirmation by SMS."
            }
            (Self::GiftReceived, Language::Sv) => {
                "Tack! Din presentbokning har tagits emot. Du får en bekräftelse per SMS."
            }
            (Self::GiftConfirmed, Language::Fi) => {
                "Lahjasi on vahvistettu! Artisti esittää tervehdyksesi varattuna aikana."
            }
            (Self::GiftConfirmed, Language::En) => {
                "Your gift is confirmed! An artist will deliver your greeting at the reserved time."
            }
            (Self::GiftConfirmed, Language::Sv) => {
                "Din present är bekräftad! En artist framför din hälsning vid den bokade tiden."
            }
        }
    }
}

/// Transport failure reported by the external send capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryError {
    reason: String,
}

impl DeliveryError {
    /// Creates a new delivery error.
    #[must_use]
    pub fn new(reason: &str) -> Self {
        Self {
            reason: reason.to_owned(),
        }
    }
}

impl std::fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Message delivery failed: {}", self.reason)
    }
}

impl std::error::Error for DeliveryError {}

/// The external SMS transport, injected into the send sweep.
pub trait TextMessageSender {
    /// Sends one text message to an E.164-form number.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError` on transport failure; the caller keeps the
    /// record queued and retries on a later sweep.
    fn send_text_message(&self, body: &str, to_number: &str) -> Result<(), DeliveryError>;
}

/// Outcome counts of one send sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SendReport {
    /// Records handed to the transport and marked sent.
    pub sent: usize,
    /// Records whose send failed; kept queued.
    pub failed: usize,
    /// Records still inside the grace period.
    pub deferred: usize,
}

/// Enqueues the outbound message a gift transition calls for, if any.
///
/// Monitored transitions are `creating → pending` and
/// `pending → confirmed`. The message document is keyed by the change
/// event id: a duplicate delivery of the same event finds the document
/// already present and writes nothing. Gifts without a sender number
/// enqueue nothing. Returns whether a message was created.
///
/// # Errors
///
/// Returns `CoreError::Store` on transaction failure.
pub fn enqueue_transition_message(
    store: &impl DocumentStore,
    clock: &impl Clock,
    event: &ChangeEvent,
) -> Result<bool, CoreError> {
    let Some(after) = event.after_as::<Gift>() else {
        return Ok(false);
    };
    let before_status = event.before_as::<Gift>().map(|gift| gift.status);
    let Some(key) = transition_message_key(before_status, after.status) else {
        return Ok(false);
    };
    let Some(to_number) = after.from_phone_number.clone() else {
        tracing::warn!(
            gift_id = %event.doc.id(),
            key = key.as_str(),
            "Gift transition without a sender number; no message queued"
        );
        return Ok(false);
    };

    let gift_id = GiftId::new(event.doc.id());
    let record = OutboundMessage {
        message: key.body(after.from_language).to_owned(),
        to_number,
        gift_id: Some(gift_id),
        message_key: key.as_str().to_owned(),
        sent: false,
        created_at: clock.now_ms(),
    };

    store.run_transaction(|tx| {
        let message_ref = refs::message_ref(&event.event_id);
        if tx.read_value(&message_ref).is_some() {
            // Duplicate delivery of the same change event.
            return Ok(false);
        }
        tx.set(&message_ref, &record)?;
        Ok(true)
    })
}

/// Hands queued messages past their grace period to the transport.
///
/// Successful sends are marked `sent` in a transaction that re-checks the
/// flag; failed sends are logged and left queued for the next sweep.
///
/// # Errors
///
/// Returns `CoreError::Store` on transaction failure. Transport failures
/// are not errors; they are counted in the report.
pub fn send_pending_messages(
    store: &impl DocumentStore,
    clock: &impl Clock,
    sender: &impl TextMessageSender,
) -> Result<SendReport, CoreError> {
    let now = clock.now_ms();

    let queued: Vec<(String, OutboundMessage)> = store
        .run_transaction(|tx| {
            Ok::<_, CoreError>(tx.read_collection::<OutboundMessage>(collections::MESSAGES))
        })?
        .into_iter()
        .filter(|(_, message)| !message.sent)
        .collect();

    let mut report = SendReport::default();
    for (id, message) in queued {
        if message.created_at + MESSAGE_GRACE_MS > now {
            report.deferred += 1;
            continue;
        }

        let to_number = match normalize_phone_number(&message.to_number) {
            Ok(normalized) => normalized,
            Err(err) => {
                tracing::warn!(message_id = %id, error = %err, "Queued message has an unusable number");
                report.failed += 1;
                continue;
            }
        };

        match sender.send_text_message(&message.message, &to_number) {
            Ok(()) => {
                mark_sent(store, &id)?;
                report.sent += 1;
            }
            Err(err) => {
                tracing::warn!(message_id = %id, error = %err, "Text message delivery failed; will retry");
                report.failed += 1;
            }
        }
    }

    if report.sent > 0 || report.failed > 0 {
        tracing::info!(
            sent = report.sent,
            failed = report.failed,
            deferred = report.deferred,
            "Send sweep finished"
        );
    }
    Ok(report)
}

const fn transition_message_key(
    before: Option<GiftStatus>,
    after: GiftStatus,
) -> Option<MessageKey> {
    match (before, after) {
        (Some(GiftStatus::Creating), GiftStatus::Pending) => Some(MessageKey::GiftReceived),
        (Some(GiftStatus::Pending), GiftStatus::Confirmed) => Some(MessageKey::GiftConfirmed),
        _ => None,
    }
}

fn mark_sent(store: &impl DocumentStore, message_id: &str) -> Result<(), CoreError> {
    store.run_transaction(|tx| {
        let message_ref = refs::message_ref(message_id);
        if let Some(mut fresh) = tx.read::<OutboundMessage>(&message_ref)?
            && !fresh.sent
        {
            fresh.sent = true;
            tx.set(&message_ref, &fresh)?;
        }
        Ok(())
    })
}

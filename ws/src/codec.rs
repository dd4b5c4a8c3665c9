//! Turns an event kind and its payload into the text frame sent to clients.
//!
//! Encoding degrades in three steps instead of failing:
//!
//! 1. [`Encoded::Full`]: the complete envelope.
//! 2. [`Encoded::Fallback`]: `type`, `eventId`, `error`, `timestamp` and any
//!    raw identifier fields, used when the full envelope can't be serialized.
//! 3. [`Encoded::Minimal`]: a hand-built `{"type":..,"timestamp":..}` literal,
//!    used when even the fallback can't be serialized.

use crate::message::{now_millis, Envelope, EventKind, Scalar};
use crate::simplify::{simplify, Payload};
use log::*;

const SERIALIZATION_FAILED: &str = "Serialization failed";

/// Outcome of encoding one envelope. Every variant carries a sendable frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoded {
    Full(String),
    Fallback(String),
    Minimal(String),
}

impl Encoded {
    pub fn text(&self) -> &str {
        match self {
            Encoded::Full(text) | Encoded::Fallback(text) | Encoded::Minimal(text) => text,
        }
    }

    pub fn is_degraded(&self) -> bool {
        !matches!(self, Encoded::Full(_))
    }
}

/// Raw identifier fields copied verbatim onto delete notifications.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtraIds {
    pub task_id: Option<Scalar>,
    pub attendee_id: Option<Scalar>,
}

impl ExtraIds {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn task(id: impl Into<Scalar>) -> Self {
        Self {
            task_id: Some(id.into()),
            attendee_id: None,
        }
    }

    pub fn attendee(id: impl Into<Scalar>) -> Self {
        Self {
            task_id: None,
            attendee_id: Some(id.into()),
        }
    }
}

/// Build and encode an entity envelope. The payload, if any, is simplified
/// before serialization; identifier fields are passed through untouched.
pub fn encode(
    kind: EventKind,
    event_id: Option<&str>,
    payload: Option<&Payload>,
    ids: ExtraIds,
) -> Encoded {
    let mut draft = Envelope::new(kind);
    draft.event_id = event_id.map(str::to_owned);
    draft.data = payload.map(simplify);
    draft.task_id = ids.task_id;
    draft.attendee_id = ids.attendee_id;

    encode_envelope(&draft)
}

/// Encode an already assembled envelope, degrading as described in the
/// module docs.
pub fn encode_envelope(draft: &Envelope) -> Encoded {
    let err = match serde_json::to_string(draft) {
        Ok(text) => return Encoded::Full(text),
        Err(err) => err,
    };
    error!(
        "Failed to serialize {} envelope, sending fallback: {err}",
        draft.kind
    );

    let timestamp = now_millis();
    let fallback = fallback_envelope(draft, timestamp);
    match serde_json::to_string(&fallback) {
        Ok(text) => Encoded::Fallback(text),
        Err(err) => {
            error!(
                "Failed to serialize {} fallback envelope, sending minimal frame: {err}",
                draft.kind
            );
            Encoded::Minimal(minimal_literal(draft.kind, timestamp))
        }
    }
}

fn fallback_envelope(draft: &Envelope, timestamp: i64) -> Envelope {
    let mut fallback = Envelope::new(draft.kind);
    fallback.event_id = draft.event_id.clone();
    fallback.error = Some(SERIALIZATION_FAILED.to_owned());
    fallback.timestamp = Some(timestamp);
    fallback.task_id = draft.task_id.clone();
    fallback.attendee_id = draft.attendee_id.clone();
    fallback
}

// Kind names are fixed ASCII identifiers, so no escaping is needed.
fn minimal_literal(kind: EventKind, timestamp: i64) -> String {
    format!(r#"{{"type":"{}","timestamp":{}}}"#, kind.as_str(), timestamp)
}

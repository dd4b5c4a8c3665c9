//! Wire types for the real-time channel.
//!
//! Every message pushed to a client is one JSON object (an [`Envelope`]) with
//! exactly one `type`. Optional fields are omitted when unset so clients never
//! have to special-case `null` placeholders.

use chrono::NaiveDate;
use entity::Id;
use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use std::fmt;

/// Kind of change being announced. Serialized as its SCREAMING_SNAKE_CASE name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    TaskCreate,
    TaskUpdate,
    TaskDelete,
    EventCreate,
    EventUpdate,
    EventDelete,
    AttendeeCreate,
    AttendeeUpdate,
    AttendeeDelete,
    SystemStatus,
    Ping,
}

impl EventKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            EventKind::TaskCreate => "TASK_CREATE",
            EventKind::TaskUpdate => "TASK_UPDATE",
            EventKind::TaskDelete => "TASK_DELETE",
            EventKind::EventCreate => "EVENT_CREATE",
            EventKind::EventUpdate => "EVENT_UPDATE",
            EventKind::EventDelete => "EVENT_DELETE",
            EventKind::AttendeeCreate => "ATTENDEE_CREATE",
            EventKind::AttendeeUpdate => "ATTENDEE_UPDATE",
            EventKind::AttendeeDelete => "ATTENDEE_DELETE",
            EventKind::SystemStatus => "SYSTEM_STATUS",
            EventKind::Ping => "PING",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A primitive value carried verbatim on the wire: payload primitives and raw
/// identifiers such as `taskId`.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

// JSON has no representation for NaN or infinities. Non-finite floats are a
// serialization error here rather than serde_json's silent `null`.
impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Int(i) => serializer.serialize_i64(*i),
            Scalar::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            Scalar::Float(f) => Err(S::Error::custom(format!(
                "non-finite number {f} has no JSON representation"
            ))),
            Scalar::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<Id> for Scalar {
    fn from(value: Id) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

/// Relationship-free view of a `Task`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskView {
    pub id: Id,
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: bool,
}

/// Relationship-free view of an `Event`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventView {
    pub id: Id,
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub location: Option<String>,
}

/// Relationship-free view of an `Attendee`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendeeView {
    pub id: Id,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Generic "something changed" marker sent when a payload cannot be projected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub updated: bool,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
}

/// The `data` field of an envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Projection {
    Scalar(Scalar),
    Task(TaskView),
    Event(EventView),
    Attendee(AttendeeView),
    Marker(Marker),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Projection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendee_id: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_connections: Option<usize>,
}

impl Envelope {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            event_id: None,
            data: None,
            task_id: None,
            attendee_id: None,
            error: None,
            status: None,
            message: None,
            timestamp: None,
            active_connections: None,
        }
    }
}

/// Milliseconds since the Unix epoch, the timestamp unit used on the wire.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

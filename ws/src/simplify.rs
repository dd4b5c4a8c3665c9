//! Reduces domain payloads to the small, relationship-free projections that
//! are safe to put on the wire.
//!
//! Projection is a closed match over the payload kinds. Association fields
//! (`Task::event`, `Attendee::event`, ...) are never read, so an unloaded
//! proxy hanging off a record can't reach the encoder.

use crate::message::{now_millis, AttendeeView, EventView, Marker, Projection, Scalar, TaskView};
use entity::{Attendee, EntityName, Event, Lazy, Task};
use log::*;

/// Anything a CRUD service may hand to the hub as the `data` of an envelope.
#[derive(Debug, Clone)]
pub enum Payload {
    Scalar(Scalar),
    Task(Lazy<Task>),
    Event(Lazy<Event>),
    Attendee(Lazy<Attendee>),
    /// A record of a kind this channel has no projection for.
    Other { entity_type: String },
}

impl From<Scalar> for Payload {
    fn from(value: Scalar) -> Self {
        Payload::Scalar(value)
    }
}

impl From<Task> for Payload {
    fn from(value: Task) -> Self {
        Payload::Task(Lazy::loaded(value))
    }
}

impl From<Event> for Payload {
    fn from(value: Event) -> Self {
        Payload::Event(Lazy::loaded(value))
    }
}

impl From<Attendee> for Payload {
    fn from(value: Attendee) -> Self {
        Payload::Attendee(Lazy::loaded(value))
    }
}

impl From<Lazy<Task>> for Payload {
    fn from(value: Lazy<Task>) -> Self {
        Payload::Task(value)
    }
}

impl From<Lazy<Event>> for Payload {
    fn from(value: Lazy<Event>) -> Self {
        Payload::Event(value)
    }
}

impl From<Lazy<Attendee>> for Payload {
    fn from(value: Lazy<Attendee>) -> Self {
        Payload::Attendee(value)
    }
}

/// Project a payload for the wire. Never fails: a record whose fields can't
/// be read becomes a bare [`Marker`].
pub fn simplify(payload: &Payload) -> Projection {
    match payload {
        Payload::Scalar(scalar) => Projection::Scalar(scalar.clone()),
        Payload::Task(task) => project(task, |t| Projection::Task(task_view(t))),
        Payload::Event(event) => project(event, |e| Projection::Event(event_view(e))),
        Payload::Attendee(attendee) => {
            project(attendee, |a| Projection::Attendee(attendee_view(a)))
        }
        Payload::Other { entity_type } => Projection::Marker(Marker {
            updated: true,
            timestamp: now_millis(),
            entity_type: Some(entity_type.clone()),
        }),
    }
}

fn project<T: EntityName>(lazy: &Lazy<T>, view: impl FnOnce(&T) -> Projection) -> Projection {
    match lazy.get() {
        Ok(record) => view(record),
        Err(e) => {
            debug!("Falling back to update marker for {}: {e}", T::NAME);
            Projection::Marker(Marker {
                updated: true,
                timestamp: now_millis(),
                entity_type: None,
            })
        }
    }
}

fn task_view(task: &Task) -> TaskView {
    TaskView {
        id: task.id,
        title: task.title.clone(),
        description: task.description.clone(),
        completed: task.completed,
    }
}

fn event_view(event: &Event) -> EventView {
    EventView {
        id: event.id,
        name: event.name.clone(),
        date: event.date,
        description: event.description.clone(),
        location: event.location.clone(),
    }
}

fn attendee_view(attendee: &Attendee) -> AttendeeView {
    AttendeeView {
        id: attendee.id,
        name: attendee.name.clone(),
        email: attendee.email.clone(),
    }
}

use crate::codec::{encode, encode_envelope, Encoded, ExtraIds};
use crate::connection::{Connection, ConnectionId, ConnectionRegistry, SendError};
use crate::message::{now_millis, Envelope, EventKind, Scalar};
use crate::simplify::Payload;
use log::*;
use serde::Serialize;
use std::sync::Arc;

/// Per-broadcast delivery report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Delivery {
    /// Connections that accepted the frame.
    pub delivered: usize,
    /// Connections removed because they were closed or rejected the frame.
    pub evicted: usize,
    /// The frame was a fallback or minimal envelope.
    pub degraded: bool,
}

/// Fans every mutation out to all connected clients.
///
/// Delivery is best-effort and at most once per connection: a connection that
/// is closed or rejects a frame is dropped from the registry and never
/// retried. None of the broadcast methods fail.
pub struct Hub {
    registry: Arc<ConnectionRegistry>,
}

impl Hub {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Register a newly accepted connection.
    pub fn connect(&self, connection: Arc<dyn Connection>) -> bool {
        let id = connection.id().clone();
        let added = self.registry.add(connection);
        if added {
            info!(
                "Registered WebSocket connection {id} ({} active)",
                self.registry.len()
            );
        }
        added
    }

    /// Forget a connection after the transport reports it closed or errored.
    pub fn disconnect(&self, id: &ConnectionId) -> bool {
        let removed = self.registry.remove(id);
        if removed {
            info!(
                "Unregistered WebSocket connection {id} ({} active)",
                self.registry.len()
            );
        }
        removed
    }

    /// Live connection count read at call time.
    pub fn active_connections(&self) -> usize {
        self.registry.len()
    }

    pub fn task_created(&self, event_id: &str, task: impl Into<Payload>) -> Delivery {
        self.entity(EventKind::TaskCreate, Some(event_id), task.into())
    }

    pub fn task_updated(&self, event_id: &str, task: impl Into<Payload>) -> Delivery {
        self.entity(EventKind::TaskUpdate, Some(event_id), task.into())
    }

    pub fn task_deleted(&self, event_id: &str, task_id: impl Into<Scalar>) -> Delivery {
        self.broadcast(encode(
            EventKind::TaskDelete,
            Some(event_id),
            None,
            ExtraIds::task(task_id),
        ))
    }

    pub fn event_created(&self, event: impl Into<Payload>) -> Delivery {
        self.entity(EventKind::EventCreate, None, event.into())
    }

    pub fn event_updated(&self, event: impl Into<Payload>) -> Delivery {
        self.entity(EventKind::EventUpdate, None, event.into())
    }

    pub fn event_deleted(&self, event_id: &str) -> Delivery {
        self.broadcast(encode(
            EventKind::EventDelete,
            Some(event_id),
            None,
            ExtraIds::none(),
        ))
    }

    pub fn attendee_created(&self, event_id: &str, attendee: impl Into<Payload>) -> Delivery {
        self.entity(EventKind::AttendeeCreate, Some(event_id), attendee.into())
    }

    pub fn attendee_updated(&self, event_id: &str, attendee: impl Into<Payload>) -> Delivery {
        self.entity(EventKind::AttendeeUpdate, Some(event_id), attendee.into())
    }

    pub fn attendee_deleted(&self, event_id: &str, attendee_id: impl Into<Scalar>) -> Delivery {
        self.broadcast(encode(
            EventKind::AttendeeDelete,
            Some(event_id),
            None,
            ExtraIds::attendee(attendee_id),
        ))
    }

    /// Broadcast a `SYSTEM_STATUS` diagnostic.
    pub fn system_status(&self, status: &str, message: &str) -> Delivery {
        let mut envelope = self.diagnostic(EventKind::SystemStatus);
        envelope.status = Some(status.to_owned());
        envelope.message = Some(message.to_owned());
        self.broadcast(encode_envelope(&envelope))
    }

    /// Broadcast a `PING` diagnostic.
    pub fn ping(&self) -> Delivery {
        let envelope = self.diagnostic(EventKind::Ping);
        self.broadcast(encode_envelope(&envelope))
    }

    fn diagnostic(&self, kind: EventKind) -> Envelope {
        let mut envelope = Envelope::new(kind);
        envelope.timestamp = Some(now_millis());
        envelope.active_connections = Some(self.registry.len());
        envelope
    }

    fn entity(&self, kind: EventKind, event_id: Option<&str>, payload: Payload) -> Delivery {
        self.broadcast(encode(kind, event_id, Some(&payload), ExtraIds::none()))
    }

    fn broadcast(&self, encoded: Encoded) -> Delivery {
        let degraded = encoded.is_degraded();
        let text = encoded.text();

        let mut delivered = 0;
        let sweep = self.registry.for_each_evicting(|connection| {
            if !connection.is_open() {
                return Err(SendError::Closed);
            }
            connection.send_text(text)?;
            delivered += 1;
            Ok(())
        });

        debug!(
            "Broadcast delivered to {delivered} of {} connection(s), evicted {}",
            sweep.visited, sweep.evicted
        );

        Delivery {
            delivered,
            evicted: sweep.evicted,
            degraded,
        }
    }
}

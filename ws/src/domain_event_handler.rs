use crate::Hub;
use async_trait::async_trait;
use events::{DomainEvent, EventHandler};
use log::*;
use std::sync::Arc;

/// Handles domain events by broadcasting them to every WebSocket client.
///
/// Each successful mutation maps to exactly one hub call. The hub never
/// fails, so neither does this handler.
pub struct WsDomainEventHandler {
    hub: Arc<Hub>,
}

impl WsDomainEventHandler {
    pub fn new(hub: Arc<Hub>) -> Self {
        Self { hub }
    }
}

#[async_trait]
impl EventHandler for WsDomainEventHandler {
    async fn handle(&self, event: &DomainEvent) {
        debug!("Handling {} for WebSocket broadcast", event.name());

        let delivery = match event {
            DomainEvent::TaskCreated { event_id, task } => {
                self.hub.task_created(&event_id.to_string(), task.clone())
            }
            DomainEvent::TaskUpdated { event_id, task } => {
                self.hub.task_updated(&event_id.to_string(), task.clone())
            }
            DomainEvent::TaskDeleted { event_id, task_id } => {
                self.hub.task_deleted(&event_id.to_string(), *task_id)
            }
            DomainEvent::EventCreated { event } => self.hub.event_created(event.clone()),
            DomainEvent::EventUpdated { event } => self.hub.event_updated(event.clone()),
            DomainEvent::EventDeleted { event_id } => {
                self.hub.event_deleted(&event_id.to_string())
            }
            DomainEvent::AttendeeCreated { event_id, attendee } => self
                .hub
                .attendee_created(&event_id.to_string(), attendee.clone()),
            DomainEvent::AttendeeUpdated { event_id, attendee } => self
                .hub
                .attendee_updated(&event_id.to_string(), attendee.clone()),
            DomainEvent::AttendeeDeleted {
                event_id,
                attendee_id,
            } => self
                .hub
                .attendee_deleted(&event_id.to_string(), *attendee_id),
        };

        debug!(
            "{} reached {} connection(s), evicted {}",
            event.name(),
            delivery.delivered,
            delivery.evicted
        );
    }
}

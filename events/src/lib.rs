//! Event system infrastructure for the event progress backend.
//!
//! This crate provides the event system that decouples the CRUD services
//! from infrastructure concerns such as real-time WebSocket notifications.
//!
//! # Architecture
//!
//! - **DomainEvent**: Enum representing every successful mutation in the system
//! - **EventHandler**: Trait for implementing event handlers
//! - **EventPublisher**: Publishes events to registered handlers
//!
//! Events carry the already-persisted record (or its raw id for deletions),
//! exactly as the owning service produced it. Handlers decide how much of it
//! leaves the process.

use async_trait::async_trait;
use entity::{Attendee, Event, Task};
use log::*;
use std::sync::Arc;

pub use entity::Id;

/// Domain events that represent business-level changes in the system.
/// These events are emitted when domain operations complete successfully.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// A task was added to an event.
    TaskCreated {
        /// Parent event the task belongs to.
        event_id: Id,
        task: Task,
    },
    /// A task was modified (title, description, completion, deadline).
    TaskUpdated { event_id: Id, task: Task },
    /// A task was removed. Only the id survives the deletion.
    TaskDeleted { event_id: Id, task_id: Id },

    /// A new event was created.
    EventCreated { event: Event },
    EventUpdated { event: Event },
    /// An event was removed, including everything hanging off it.
    EventDeleted { event_id: Id },

    /// An attendee registered for an event.
    AttendeeCreated { event_id: Id, attendee: Attendee },
    AttendeeUpdated { event_id: Id, attendee: Attendee },
    AttendeeDeleted { event_id: Id, attendee_id: Id },
}

impl DomainEvent {
    /// Short name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::TaskCreated { .. } => "TaskCreated",
            DomainEvent::TaskUpdated { .. } => "TaskUpdated",
            DomainEvent::TaskDeleted { .. } => "TaskDeleted",
            DomainEvent::EventCreated { .. } => "EventCreated",
            DomainEvent::EventUpdated { .. } => "EventUpdated",
            DomainEvent::EventDeleted { .. } => "EventDeleted",
            DomainEvent::AttendeeCreated { .. } => "AttendeeCreated",
            DomainEvent::AttendeeUpdated { .. } => "AttendeeUpdated",
            DomainEvent::AttendeeDeleted { .. } => "AttendeeDeleted",
        }
    }
}

/// Trait for handling domain events.
/// Implementations can perform side effects like sending notifications,
/// updating caches, logging, etc.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent);
}

/// Publishes domain events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    /// Store the returned publisher in your application state.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Publish an event to all registered handlers.
    pub async fn publish(&self, event: DomainEvent) {
        trace!(
            "Publishing {} to {} handler(s)",
            event.name(),
            self.handlers.len()
        );
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Mutex;

    struct Recorder {
        tag: &'static str,
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl EventHandler for Recorder {
        async fn handle(&self, event: &DomainEvent) {
            self.seen
                .lock()
                .await
                .push(format!("{}:{}", self.tag, event.name()));
        }
    }

    #[tokio::test]
    async fn publish_calls_handlers_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let publisher = EventPublisher::new()
            .with_handler(Arc::new(Recorder {
                tag: "first",
                seen: seen.clone(),
            }))
            .with_handler(Arc::new(Recorder {
                tag: "second",
                seen: seen.clone(),
            }));

        publisher
            .publish(DomainEvent::EventDeleted {
                event_id: Id::new_v4(),
            })
            .await;

        assert_eq!(
            *seen.lock().await,
            vec!["first:EventDeleted", "second:EventDeleted"]
        );
    }

    #[tokio::test]
    async fn with_handler_leaves_original_publisher_untouched() {
        let base = EventPublisher::new();
        let extended = base.clone().with_handler(Arc::new(Recorder {
            tag: "only",
            seen: Arc::new(Mutex::new(Vec::new())),
        }));

        assert_eq!(base.handler_count(), 0);
        assert_eq!(extended.handler_count(), 1);
    }
}

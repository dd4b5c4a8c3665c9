use config::Config;
use events::EventPublisher;
use std::sync::Arc;
use ws::{ConnectionRegistry, Hub, WsDomainEventHandler};

pub mod config;
pub mod logging;

// Service-level state shared by every request handler.
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub ws_hub: Arc<Hub>,
    pub event_publisher: Arc<EventPublisher>,
}

impl AppState {
    /// Build the state around a fresh connection registry, with the WebSocket
    /// broadcaster subscribed to every published domain event.
    pub fn new(app_config: Config) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let ws_hub = Arc::new(Hub::new(registry));
        let event_publisher = EventPublisher::new()
            .with_handler(Arc::new(WsDomainEventHandler::new(Arc::clone(&ws_hub))));

        Self {
            config: app_config,
            ws_hub,
            event_publisher: Arc::new(event_publisher),
        }
    }

    pub fn hub_ref(&self) -> &Hub {
        self.ws_hub.as_ref()
    }
}

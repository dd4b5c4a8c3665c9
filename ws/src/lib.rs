//! WebSocket broadcast infrastructure for real-time updates.
//!
//! Every successful create, update or delete of a task, event or attendee is
//! mirrored to all connected clients as a single JSON envelope.
//!
//! # Architecture
//!
//! - **Connection registry**: a `DashMap`-backed set of live connections.
//!   Broadcast passes snapshot the members and evict those that fail, so
//!   connection churn is never blocked behind a slow write.
//! - **Simplifier**: projects records to a fixed, relationship-free field set
//!   per kind before they reach the encoder.
//! - **Codec**: encodes envelopes and degrades to a fallback or minimal frame
//!   rather than dropping a broadcast.
//! - **Hub**: one method per event kind plus `PING`/`SYSTEM_STATUS`
//!   diagnostics. Best-effort, at most once per connection.
//!
//! # Message Flow
//!
//! 1. A client upgrades at the WebSocket endpoint; the transport registers a
//!    `ChannelConnection` with the hub
//! 2. A CRUD service publishes a `DomainEvent`
//! 3. `WsDomainEventHandler` calls the matching hub method
//! 4. The hub encodes once and hands the frame to every live connection,
//!    evicting any whose writer task has closed
//!
//! # Example
//!
//! ```rust,ignore
//! let hub = Arc::new(Hub::new(Arc::new(ConnectionRegistry::new())));
//! hub.task_deleted(&event_id.to_string(), task_id);
//! ```

pub mod codec;
pub mod connection;
pub mod domain_event_handler;
pub mod hub;
pub mod message;
pub mod simplify;

#[cfg(test)]
mod test_support;

pub use connection::{ChannelConnection, Connection, ConnectionId, ConnectionRegistry, SendError};
pub use domain_event_handler::WsDomainEventHandler;
pub use hub::{Delivery, Hub};
pub use message::{Envelope, EventKind, Scalar};
pub use simplify::Payload;

use dashmap::DashMap;
use log::*;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Unique identifier for a connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a frame could not be handed to a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    /// The remote end or its writer task is gone.
    Closed,
    Transport(String),
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendError::Closed => write!(f, "connection closed"),
            SendError::Transport(reason) => write!(f, "transport error: {reason}"),
        }
    }
}

impl StdError for SendError {}

/// A text-capable push channel to one client.
///
/// The registry only ever holds a shared handle; the transport owns the
/// underlying socket and decides when it is closed.
pub trait Connection: Send + Sync {
    fn id(&self) -> &ConnectionId;

    fn is_open(&self) -> bool;

    /// Hand one text frame to the transport. Must not block on the network.
    fn send_text(&self, text: &str) -> Result<(), SendError>;
}

/// Connection backed by a channel drained by the socket's writer task.
///
/// Queueing never fails while the writer is alive, so a burst of broadcasts
/// cannot evict a healthy client. The writer enforces the per-frame write
/// timeout and drops the receiver when it gives up, after which sends report
/// `Closed`.
#[derive(Debug, Clone)]
pub struct ChannelConnection {
    id: ConnectionId,
    sender: mpsc::UnboundedSender<String>,
}

impl ChannelConnection {
    /// Create a connection plus the receiving end its writer task should drain.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                id: ConnectionId::new(),
                sender,
            },
            receiver,
        )
    }
}

impl Connection for ChannelConnection {
    fn id(&self) -> &ConnectionId {
        &self.id
    }

    fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }

    fn send_text(&self, text: &str) -> Result<(), SendError> {
        self.sender
            .send(text.to_owned())
            .map_err(|_| SendError::Closed)
    }
}

/// Result of one visiting pass over the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sweep {
    pub visited: usize,
    pub evicted: usize,
}

/// Concurrent membership set of live connections, keyed by `ConnectionId`.
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, Arc<dyn Connection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Register a connection. Returns `false` if it was already present.
    pub fn add(&self, connection: Arc<dyn Connection>) -> bool {
        let id = connection.id().clone();
        match self.connections.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(connection);
                true
            }
        }
    }

    /// Remove a connection. Returns `false` if it was not present.
    pub fn remove(&self, id: &ConnectionId) -> bool {
        self.connections.remove(id).is_some()
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Apply `visit` once to every connection present when the pass starts and
    /// evict each one for which it returns an error.
    ///
    /// Members are snapshotted first so no shard lock is held while `visit`
    /// runs; connections added during the pass are left for the next one.
    pub fn for_each_evicting<F>(&self, mut visit: F) -> Sweep
    where
        F: FnMut(&dyn Connection) -> Result<(), SendError>,
    {
        let members: Vec<Arc<dyn Connection>> = self
            .connections
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut sweep = Sweep {
            visited: members.len(),
            evicted: 0,
        };

        for connection in members {
            if let Err(e) = visit(connection.as_ref()) {
                if self.remove(connection.id()) {
                    warn!("Evicting connection {}: {e}", connection.id());
                    sweep.evicted += 1;
                }
            }
        }

        sweep
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

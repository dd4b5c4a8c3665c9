use crate::connection::{Connection, ConnectionId, SendError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory connection that records frames or fails on demand.
pub(crate) struct FakeConnection {
    id: ConnectionId,
    open: AtomicBool,
    fail_writes: bool,
    attempts: AtomicUsize,
    received: Mutex<Vec<String>>,
}

impl FakeConnection {
    fn build(open: bool, fail_writes: bool) -> Arc<Self> {
        Arc::new(Self {
            id: ConnectionId::new(),
            open: AtomicBool::new(open),
            fail_writes,
            attempts: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn healthy() -> Arc<Self> {
        Self::build(true, false)
    }

    /// Reports open but every write fails.
    pub(crate) fn failing() -> Arc<Self> {
        Self::build(true, true)
    }

    pub(crate) fn closed() -> Arc<Self> {
        Self::build(false, false)
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub(crate) fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

impl Connection for FakeConnection {
    fn id(&self) -> &ConnectionId {
        &self.id
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn send_text(&self, text: &str) -> Result<(), SendError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(SendError::Transport("broken pipe".to_string()));
        }
        self.received.lock().unwrap().push(text.to_owned());
        Ok(())
    }
}

//! Per-connection push handle.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Frames a channel may hold before its client counts as too slow.
pub const CHANNEL_BUFFER: usize = 256;

/// Identity of one physical connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(Uuid);

impl ChannelId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Why a frame could not be queued on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendError {
    /// The channel was unregistered or its connection went away.
    #[error("channel closed")]
    Closed,
    /// The client has not drained its queue.
    #[error("channel queue full")]
    Full,
}

/// Handle to one client's push queue.
///
/// Clones share the same queue; equality is identity of the underlying
/// connection, not of the clone. Once [`close`](Self::close) has returned,
/// no further frame can be queued, so the connection's writer task sees the
/// end of its stream after draining what was already accepted.
#[derive(Clone)]
pub struct Channel {
    inner: Arc<ChannelInner>,
}

struct ChannelInner {
    id: ChannelId,
    // `None` once closed. Held only for the duration of a `try_send`.
    tx: Mutex<Option<mpsc::Sender<String>>>,
}

impl Channel {
    /// Creates a channel with the default [`CHANNEL_BUFFER`] capacity.
    ///
    /// The receiver belongs to the connection's writer task.
    pub fn open() -> (Self, mpsc::Receiver<String>) {
        Self::with_capacity(CHANNEL_BUFFER)
    }

    /// Creates a channel that holds at most `capacity` unsent frames.
    pub fn with_capacity(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity);
        let channel = Self {
            inner: Arc::new(ChannelInner {
                id: ChannelId::new(),
                tx: Mutex::new(Some(tx)),
            }),
        };
        (channel, rx)
    }

    pub fn id(&self) -> ChannelId {
        self.inner.id
    }

    /// Whether frames can still be queued (not closed, receiver alive).
    pub fn is_open(&self) -> bool {
        self.slot().as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Queues `frame` without waiting.
    pub fn try_send(&self, frame: &str) -> Result<(), SendError> {
        let slot = self.slot();
        let Some(tx) = slot.as_ref() else {
            return Err(SendError::Closed);
        };
        tx.try_send(frame.to_owned()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SendError::Full,
            mpsc::error::TrySendError::Closed(_) => SendError::Closed,
        })
    }

    /// Drops the sending half. Idempotent.
    pub(crate) fn close(&self) {
        self.slot().take();
    }

    fn slot(&self) -> MutexGuard<'_, Option<mpsc::Sender<String>>> {
        // A poisoned slot still holds a valid Option; keep using it.
        self.inner.tx.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PartialEq for Channel {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Channel {}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("id", &self.inner.id)
            .field("open", &self.is_open())
            .finish()
    }
}

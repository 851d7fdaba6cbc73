//! The set of live client channels.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::channel::Channel;

/// Tracks every currently open client channel.
///
/// Cloning is cheap and every clone sees the same set. Channels are kept in
/// registration order; [`snapshot`](Self::snapshot) returns that order.
#[derive(Clone, Default)]
pub struct ChannelRegistry {
    channels: Arc<RwLock<Vec<Channel>>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a channel to the live set, making it eligible for broadcasts.
    pub async fn register(&self, channel: Channel) {
        let mut channels = self.channels.write().await;
        channels.push(channel);
        tracing::debug!(live = channels.len(), "channel registered");
    }

    /// Removes a channel from the live set and closes it.
    ///
    /// Unregistering a channel that is already gone is a no-op. Returns
    /// whether this call removed it.
    pub async fn unregister(&self, channel: &Channel) -> bool {
        let mut channels = self.channels.write().await;
        let removed = match channels.iter().position(|c| c == channel) {
            Some(pos) => {
                channels.remove(pos);
                true
            }
            None => false,
        };
        // Close while still holding the write lock so no snapshot taken after
        // this returns can hold an open handle to it.
        channel.close();
        if removed {
            tracing::debug!(live = channels.len(), "channel unregistered");
        }
        removed
    }

    /// Point-in-time copy of the live set, in registration order.
    ///
    /// Later registrations and removals do not affect a snapshot already
    /// taken; a removed channel in it simply refuses further frames.
    pub async fn snapshot(&self) -> Arc<[Channel]> {
        self.channels.read().await.as_slice().into()
    }

    pub async fn len(&self) -> usize {
        self.channels.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.channels.read().await.is_empty()
    }
}

//! Fan-out of one [`LiveEvent`] to every registered channel.

use askline_types::LiveEvent;

use crate::channel::{ChannelId, SendError};
use crate::registry::ChannelRegistry;

/// Fans [`LiveEvent`]s out to every registered channel.
#[derive(Clone)]
pub struct Broadcaster {
    registry: ChannelRegistry,
}

impl Broadcaster {
    pub fn new(registry: ChannelRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    /// Offers `event` to every live channel except `exclude`.
    ///
    /// The event is serialized once and channels are visited in registration
    /// order. Any channel that refuses the frame (closed, or its queue is
    /// full) is unregistered and the rest still receive it. Never fails.
    pub async fn broadcast(&self, event: &LiveEvent, exclude: Option<ChannelId>) {
        let frame = match serde_json::to_string(event) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(
                    event = event.event_type(),
                    "failed to serialize live event: {}",
                    e
                );
                return;
            }
        };

        let targets = self.registry.snapshot().await;
        let mut delivered = 0usize;
        for channel in targets.iter() {
            if Some(channel.id()) == exclude {
                continue;
            }
            match channel.try_send(&frame) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    match e {
                        SendError::Full => tracing::warn!(
                            channel = %channel.id(),
                            "dropping slow consumer: queue full"
                        ),
                        SendError::Closed => tracing::debug!(
                            channel = %channel.id(),
                            "skipping closed channel"
                        ),
                    }
                    self.registry.unregister(channel).await;
                }
            }
        }

        tracing::debug!(
            event = event.event_type(),
            delivered,
            targets = targets.len(),
            "live event broadcast"
        );
    }
}

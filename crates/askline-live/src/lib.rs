//! Realtime fan-out for the Askline forum.
//!
//! Three pieces cooperate here:
//!
//! - [`Channel`]: one connected client's push endpoint, a bounded queue of
//!   serialized frames drained by that connection's writer task.
//! - [`ChannelRegistry`]: the set of live channels. It is the only shared
//!   mutable structure in the realtime path and is guarded by an async
//!   `RwLock`; callers only ever see `register`, `unregister`, and
//!   point-in-time snapshots.
//! - [`Broadcaster`]: serializes a [`LiveEvent`](askline_types::LiveEvent)
//!   once and offers it to every channel in a registry snapshot, in
//!   registration order. A channel that fails to accept the frame is
//!   unregistered; the failure never reaches the caller.
//!
//! Delivery is best effort. There is no replay for clients that were not
//! connected, no acknowledgement, and no retry.

mod broadcast;
mod channel;
mod registry;

pub use broadcast::Broadcaster;
pub use channel::{Channel, ChannelId, SendError, CHANNEL_BUFFER};
pub use registry::ChannelRegistry;

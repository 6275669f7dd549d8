//! Domain layer: connection roster and the message pushing seam.

mod pusher;
mod roster;

pub use pusher::{MessagePusher, PushError, PusherChannel};
pub use roster::{ConnectionId, Roster, RosterError};

#[cfg(test)]
pub use pusher::MockMessagePusher;

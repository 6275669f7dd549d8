//! Infrastructure layer: concrete delivery of frames to connections.

pub mod message_pusher;

pub use message_pusher::WebSocketMessagePusher;

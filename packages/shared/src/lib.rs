//! Shared building blocks for the Palaver chat client and server.
//!
//! - [`protocol`]: wire envelopes exchanged over the `/ws` connection
//! - [`time`]: clock abstraction and timestamp formatting
//! - [`logger`]: tracing subscriber setup for the binaries

pub mod logger;
pub mod protocol;
pub mod time;

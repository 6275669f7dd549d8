//! Event-driven WebSocket chat session.
//!
//! [`ChatSession`] owns one connection to a chat server. It sends a `join`
//! envelope as soon as the connection opens, frames outgoing chat text, and
//! turns incoming envelopes into typed [`SessionEvent`]s delivered to
//! subscribers in arrival order.
//!
//! ```no_run
//! use palaver_client::{ChatSession, Endpoint, EventKind, SessionEvent};
//!
//! # async fn run() -> Result<(), palaver_client::SessionError> {
//! let session = ChatSession::new(Endpoint::new("127.0.0.1", 8080));
//! session.on(EventKind::Message, |event| {
//!     if let SessionEvent::Message(message) = event {
//!         println!("{}: {}", message.sender_name, message.text);
//!     }
//! });
//! session.connect("alice").await?;
//! session.send_message("hello");
//! session.disconnect();
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod domain;
pub mod error;
pub mod event;
pub mod session;

pub use domain::{ActiveUser, ChatMessage, ConnectionState, Endpoint};
pub use error::{ClientError, SessionError};
pub use event::{EventKind, SessionEvent};
pub use session::ChatSession;

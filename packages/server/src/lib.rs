//! Reference chat server for Palaver.
//!
//! Speaks the server side of the Palaver wire protocol over a WebSocket at
//! `/ws`: connections announce a display name with `join`, chat text is
//! attributed by connection and echoed to every joined user, and each change
//! in membership is followed by a full `userList` snapshot.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub use ui::{AppState, router, run_server, serve};

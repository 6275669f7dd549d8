//! Terminal chat client built on [`ChatSession`](crate::ChatSession).

mod formatter;
mod runner;
mod session;
mod ui;

pub use runner::run_client;

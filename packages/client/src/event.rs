//! Typed events emitted by a [`ChatSession`](crate::ChatSession) and the
//! subscriber registry that delivers them.

use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{Arc, Mutex, PoisonError},
};

use palaver_shared::protocol::ServerEnvelope;

use crate::{
    domain::{ActiveUser, ChatMessage},
    error::SessionError,
};

/// Event emitted by a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The transport opened and the join envelope was queued
    Connected,
    /// The transport closed; terminal
    Disconnected,
    /// The transport failed to open, or failed while open
    Error(SessionError),
    /// A chat message from the server
    Message(ChatMessage),
    /// Full replacement snapshot of the active users
    UserList(Vec<ActiveUser>),
    /// Another user joined the chat
    UserJoined(String),
}

impl SessionEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Connected => EventKind::Connected,
            Self::Disconnected => EventKind::Disconnected,
            Self::Error(_) => EventKind::Error,
            Self::Message(_) => EventKind::Message,
            Self::UserList(_) => EventKind::UserList,
            Self::UserJoined(_) => EventKind::UserJoined,
        }
    }

    /// Build the event for an incoming envelope received at `received_at`
    pub fn from_envelope(envelope: ServerEnvelope, received_at: i64) -> Self {
        match envelope {
            ServerEnvelope::Message { sender, message } => {
                Self::Message(ChatMessage::new(sender, message, received_at))
            }
            ServerEnvelope::UserList { message } => {
                Self::UserList(message.into_iter().map(ActiveUser::from_name).collect())
            }
            ServerEnvelope::Join { user_name } => Self::UserJoined(user_name),
        }
    }
}

/// Discriminant of [`SessionEvent`], used to subscribe to a single kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Connected,
    Disconnected,
    Error,
    Message,
    UserList,
    UserJoined,
}

type Handler = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

struct Subscription {
    kind: Option<EventKind>,
    handler: Handler,
}

/// Ordered list of subscribers.
///
/// Handlers run outside the registry lock, so a handler may subscribe more
/// handlers or call back into the session.
#[derive(Default)]
pub(crate) struct EventBus {
    subscriptions: Mutex<Vec<Subscription>>,
}

impl EventBus {
    pub(crate) fn subscribe<F>(&self, kind: Option<EventKind>, handler: F)
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscription {
                kind,
                handler: Arc::new(handler),
            });
    }

    /// Deliver `event` to every matching handler in registration order.
    ///
    /// A panicking handler is logged and skipped; later handlers still run.
    pub(crate) fn emit(&self, event: &SessionEvent) {
        let kind = event.kind();
        let handlers: Vec<Handler> = self
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|subscription| subscription.kind.is_none_or(|k| k == kind))
            .map(|subscription| subscription.handler.clone())
            .collect();

        for handler in handlers {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| handler(event))) {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!("Subscriber for {:?} event panicked: {}", kind, reason);
            }
        }
    }
}

//! WebSocket chat session.
//!
//! A [`ChatSession`] exclusively owns one transport for its whole lifetime.
//! Once open, the transport is split in two tasks:
//!
//! - the writer task drains an unbounded channel of outgoing frames, so sends
//!   reach the wire in call order and `send_message` never waits;
//! - the reader task de-frames incoming text and emits one event per envelope,
//!   in arrival order.
//!
//! Reconnecting means building a new session.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use palaver_shared::{
    protocol::{ClientEnvelope, ServerEnvelope, split_segments},
    time::{Clock, SystemClock},
};
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

use crate::{
    domain::{ConnectionState, Endpoint},
    error::SessionError,
    event::{EventBus, EventKind, SessionEvent},
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

enum Outgoing {
    Text(String),
    Close,
}

/// How the reader task stopped
enum ReadOutcome {
    Closed,
    Failed(String),
}

struct Core {
    state: ConnectionState,
    display_name: Option<String>,
    outgoing: Option<mpsc::UnboundedSender<Outgoing>>,
    close_requested: bool,
}

struct Inner {
    endpoint: Endpoint,
    clock: Arc<dyn Clock>,
    events: EventBus,
    core: Mutex<Core>,
}

impl Inner {
    fn core(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn handle_frame(&self, text: &str) {
        for segment in split_segments(text) {
            if self.core().state == ConnectionState::Closed {
                tracing::debug!("Session closed, dropping remaining segments");
                return;
            }

            match ServerEnvelope::decode(segment) {
                Ok(envelope) => {
                    let event = SessionEvent::from_envelope(envelope, self.clock.now_millis());
                    self.events.emit(&event);
                }
                Err(e) => {
                    tracing::warn!("Discarding invalid envelope {:?}: {}", segment, e);
                }
            }
        }
    }

    /// Settle a connect attempt that never reached `Open`.
    ///
    /// Returns `false` when the attempt was already settled.
    fn fail_connect(&self, error: &SessionError) -> bool {
        {
            let mut core = self.core();
            if core.state != ConnectionState::Connecting {
                return false;
            }
            core.state = ConnectionState::Closed;
        }
        self.events.emit(&SessionEvent::Error(error.clone()));
        true
    }

    /// Move to `Closed` and emit the terminal events, at most once.
    fn finish(&self, outcome: ReadOutcome) {
        {
            let mut core = self.core();
            if core.state == ConnectionState::Closed {
                return;
            }
            core.state = ConnectionState::Closed;
            core.outgoing = None;
        }

        if let ReadOutcome::Failed(reason) = outcome {
            tracing::warn!("Connection to {} failed: {}", self.endpoint, reason);
            self.events
                .emit(&SessionEvent::Error(SessionError::Connection(reason)));
        }
        tracing::info!("Disconnected from {}", self.endpoint);
        self.events.emit(&SessionEvent::Disconnected);
    }
}

/// Settles a connect attempt whose future was dropped before the transport opened
struct PendingConnect<'a> {
    inner: &'a Inner,
    armed: bool,
}

impl<'a> PendingConnect<'a> {
    fn new(inner: &'a Inner) -> Self {
        Self { inner, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PendingConnect<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let error = SessionError::Connection("connect cancelled".to_string());
        if self.inner.fail_connect(&error) {
            tracing::warn!("Connect to {} was cancelled", self.inner.endpoint);
        }
    }
}

/// Client-side session for one user's connection to a chat server.
///
/// Cloning yields another handle to the same session. When every handle is
/// dropped the outgoing channel closes and the connection is shut down.
#[derive(Clone)]
pub struct ChatSession {
    inner: Arc<Inner>,
}

impl ChatSession {
    /// Create an idle session bound to `endpoint`
    pub fn new(endpoint: Endpoint) -> Self {
        Self::with_clock(endpoint, Arc::new(SystemClock))
    }

    /// Create an idle session that stamps incoming messages with `clock`
    pub fn with_clock(endpoint: Endpoint, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Inner {
                endpoint,
                clock,
                events: EventBus::default(),
                core: Mutex::new(Core {
                    state: ConnectionState::Idle,
                    display_name: None,
                    outgoing: None,
                    close_requested: false,
                }),
            }),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.inner.endpoint
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.core().state
    }

    /// Display name given to `connect`, once a connection attempt started
    pub fn display_name(&self) -> Option<String> {
        self.inner.core().display_name.clone()
    }

    /// Subscribe to one kind of event.
    ///
    /// Handlers run in registration order on the task that produced the
    /// event. A panicking handler is logged and does not affect the others.
    pub fn on<F>(&self, kind: EventKind, handler: F)
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.inner.events.subscribe(Some(kind), handler);
    }

    /// Subscribe to every event
    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.inner.events.subscribe(None, handler);
    }

    /// Open the transport and join the chat as `name`.
    ///
    /// On success the `join` envelope is the first frame queued on the
    /// transport and [`SessionEvent::Connected`] has been emitted. If the
    /// transport cannot be opened the session is closed, an
    /// [`SessionEvent::Error`] is emitted and the same error is returned.
    ///
    /// Misuse (empty name, session not idle) returns an error without
    /// emitting events or changing state.
    ///
    /// Dropping the returned future before it resolves (for instance under
    /// `tokio::time::timeout`) settles the attempt like a failed connect: the
    /// session becomes `Closed` and an `Error` event is emitted.
    pub async fn connect(&self, name: &str) -> Result<(), SessionError> {
        let name = name.trim();
        if name.is_empty() {
            tracing::warn!("Refusing to connect with an empty display name");
            return Err(SessionError::InvalidName);
        }

        let join = ClientEnvelope::Join(name.to_string())
            .encode()
            .map_err(|e| SessionError::Encode(e.to_string()))?;

        {
            let mut core = self.inner.core();
            if core.state != ConnectionState::Idle {
                tracing::warn!("connect called while session is {}", core.state);
                return Err(SessionError::InvalidOperation {
                    operation: "connect",
                    state: core.state,
                });
            }
            core.state = ConnectionState::Connecting;
            core.display_name = Some(name.to_string());
        }

        // Dropping this future while the transport opens still closes the session
        let mut pending = PendingConnect::new(&self.inner);

        let url = self.inner.endpoint.url();
        tracing::info!("Connecting to {} as '{}'", url, name);

        let ws_stream = match connect_async(url.as_str()).await {
            Ok((ws_stream, _response)) => ws_stream,
            Err(e) => {
                pending.disarm();
                let error = SessionError::Connection(e.to_string());
                tracing::warn!("Failed to connect to {}: {}", url, e);
                self.inner.fail_connect(&error);
                return Err(error);
            }
        };

        let (sink, stream) = ws_stream.split();
        let (tx, rx) = mpsc::unbounded_channel();

        {
            let mut core = self.inner.core();
            // rx is still held here, so these sends cannot fail
            let _ = tx.send(Outgoing::Text(join));
            if core.close_requested {
                tracing::debug!("disconnect requested while connecting, closing right away");
                let _ = tx.send(Outgoing::Close);
            }
            core.state = ConnectionState::Open;
            core.outgoing = Some(tx);
        }
        pending.disarm();

        tokio::spawn(write_loop(rx, sink));
        tracing::info!("Connected to {} as '{}'", self.inner.endpoint, name);
        self.inner.events.emit(&SessionEvent::Connected);
        tokio::spawn(read_loop(Arc::downgrade(&self.inner), stream));

        Ok(())
    }

    /// Queue `text` as a chat message.
    ///
    /// Returns `false` (and logs) when the session is not open; nothing is
    /// transmitted in that case. The server echoes the message back to every
    /// participant, including this one, so nothing is inserted locally.
    pub fn send_message(&self, text: &str) -> bool {
        let core = self.inner.core();
        if core.state != ConnectionState::Open || core.close_requested {
            tracing::warn!(
                "Not connected to server (session is {}), message dropped",
                core.state
            );
            return false;
        }

        let line = match ClientEnvelope::Message(text.to_string()).encode() {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("Failed to serialize message: {}", e);
                return false;
            }
        };

        match core.outgoing.as_ref() {
            Some(tx) if tx.send(Outgoing::Text(line)).is_ok() => true,
            _ => {
                tracing::warn!("Transport writer has stopped, message dropped");
                false
            }
        }
    }

    /// Start closing the transport.
    ///
    /// Idempotent. [`SessionEvent::Disconnected`] follows asynchronously once
    /// the transport confirms the close. A connect still in flight settles
    /// normally and the session closes immediately afterwards.
    pub fn disconnect(&self) {
        let mut core = self.inner.core();
        match core.state {
            ConnectionState::Idle | ConnectionState::Closed => {
                tracing::debug!("disconnect ignored, session is {}", core.state);
            }
            ConnectionState::Connecting => {
                core.close_requested = true;
            }
            ConnectionState::Open => {
                if core.close_requested {
                    return;
                }
                core.close_requested = true;
                if let Some(tx) = core.outgoing.as_ref()
                    && tx.send(Outgoing::Close).is_err()
                {
                    tracing::debug!("Transport writer already stopped");
                }
            }
        }
    }

    /// Feed one raw text frame through the de-framer and dispatcher
    #[cfg(test)]
    pub(crate) fn handle_frame(&self, text: &str) {
        self.inner.handle_frame(text);
    }
}

async fn write_loop(
    mut rx: mpsc::UnboundedReceiver<Outgoing>,
    mut sink: SplitSink<WsStream, Message>,
) {
    while let Some(outgoing) = rx.recv().await {
        match outgoing {
            Outgoing::Text(line) => {
                if let Err(e) = sink.send(Message::Text(line.into())).await {
                    tracing::warn!("Failed to send frame: {}", e);
                    break;
                }
            }
            Outgoing::Close => break,
        }
    }

    // Either a close was requested or every session handle is gone
    if let Err(e) = sink.close().await {
        tracing::debug!("Closing the transport: {}", e);
    }
}

async fn read_loop(session: Weak<Inner>, mut stream: SplitStream<WsStream>) {
    let outcome = loop {
        let Some(frame) = stream.next().await else {
            break ReadOutcome::Closed;
        };
        let Some(inner) = session.upgrade() else {
            return;
        };

        match frame {
            Ok(Message::Text(text)) => inner.handle_frame(text.as_str()),
            Ok(Message::Binary(data)) => {
                tracing::debug!("Ignoring {} bytes of binary data", data.len());
            }
            Ok(Message::Close(frame)) => {
                // Keep polling so the close handshake completes
                tracing::info!("Server closed the connection: {:?}", frame);
            }
            Ok(_) => {}
            Err(e) => break ReadOutcome::Failed(e.to_string()),
        }
    };

    if let Some(inner) = session.upgrade() {
        inner.finish(outcome);
    }
}

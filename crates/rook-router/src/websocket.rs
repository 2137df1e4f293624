//! WebSocket rules and the upgrade handoff object.
//!
//! The routing core stops at the handoff: a matched upgrade produces a
//! [`Connection`] bundling the transferred socket with the rule's callbacks.
//! The websocket protocol layer (handshake, frame codec, read loop) lives
//! outside the core and drives the callbacks through the dispatch methods.

use std::fmt;
use std::sync::Arc;

use rook_core::{Method, MethodSet, Request, Response, Socket, StatusCode, Transport};

use crate::error::RouterError;
use crate::params::RouteParams;
use crate::rule::Rule;

type OpenHandler = dyn Fn(&mut Connection) + Send + Sync;
type MessageHandler = dyn Fn(&mut Connection, &[u8], bool) + Send + Sync;
type CloseHandler = dyn Fn(&mut Connection, &str) + Send + Sync;
type ErrorHandler = dyn Fn(&mut Connection) + Send + Sync;
type AcceptHandler = dyn Fn(&Request) -> bool + Send + Sync;

/// A rule that upgrades matching requests to a websocket connection.
///
/// Regular (non-upgrade) requests hitting a websocket rule receive 404.
/// All five callbacks are optional.
pub struct WebSocketRule {
    pattern: String,
    methods: MethodSet,
    name: Option<String>,
    open: Option<Arc<OpenHandler>>,
    message: Option<Arc<MessageHandler>>,
    close: Option<Arc<CloseHandler>>,
    error: Option<Arc<ErrorHandler>>,
    accept: Option<Arc<AcceptHandler>>,
}

impl WebSocketRule {
    /// Create a websocket rule for `pattern`. Methods default to GET.
    #[must_use]
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            methods: MethodSet::single(Method::Get),
            name: None,
            open: None,
            message: None,
            close: None,
            error: None,
            accept: None,
        }
    }

    /// Replace the allowed methods.
    #[must_use]
    pub fn methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.methods = methods.into_iter().collect();
        self
    }

    /// Set the display name used in error messages.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Called once the connection is established.
    #[must_use]
    pub fn on_open(mut self, f: impl Fn(&mut Connection) + Send + Sync + 'static) -> Self {
        self.open = Some(Arc::new(f));
        self
    }

    /// Called for every complete message, with the payload and a binary flag.
    #[must_use]
    pub fn on_message(
        mut self,
        f: impl Fn(&mut Connection, &[u8], bool) + Send + Sync + 'static,
    ) -> Self {
        self.message = Some(Arc::new(f));
        self
    }

    /// Called when the connection closes, with the close reason.
    #[must_use]
    pub fn on_close(mut self, f: impl Fn(&mut Connection, &str) + Send + Sync + 'static) -> Self {
        self.close = Some(Arc::new(f));
        self
    }

    /// Called on a protocol or transport error.
    #[must_use]
    pub fn on_error(mut self, f: impl Fn(&mut Connection) + Send + Sync + 'static) -> Self {
        self.error = Some(Arc::new(f));
        self
    }

    /// Called before the handshake; returning `false` rejects the upgrade.
    #[must_use]
    pub fn on_accept(mut self, f: impl Fn(&Request) -> bool + Send + Sync + 'static) -> Self {
        self.accept = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for WebSocketRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebSocketRule")
            .field("pattern", &self.pattern)
            .field("methods", &self.methods)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Rule for WebSocketRule {
    fn pattern(&self) -> &str {
        &self.pattern
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn methods(&self) -> MethodSet {
        self.methods
    }

    fn validate(&self) -> Result<(), RouterError> {
        Ok(())
    }

    fn handle(&self, _req: &Request, res: &mut Response, _params: &RouteParams) {
        *res = Response::new(StatusCode::NOT_FOUND);
    }

    fn handle_upgrade(
        &self,
        _req: &Request,
        _res: &mut Response,
        socket: Socket,
    ) -> Option<Connection> {
        Some(Connection {
            socket,
            open: self.open.clone(),
            message: self.message.clone(),
            close: self.close.clone(),
            error: self.error.clone(),
            accept: self.accept.clone(),
        })
    }
}

/// An upgraded connection: the transferred socket plus the matched rule's
/// callbacks.
///
/// Owned by the websocket protocol layer, which performs the handshake and
/// calls the dispatch methods as frames arrive.
pub struct Connection {
    socket: Socket,
    open: Option<Arc<OpenHandler>>,
    message: Option<Arc<MessageHandler>>,
    close: Option<Arc<CloseHandler>>,
    error: Option<Arc<ErrorHandler>>,
    accept: Option<Arc<AcceptHandler>>,
}

impl Connection {
    /// Consult the accept callback; connections are accepted by default.
    #[must_use]
    pub fn accept(&self, req: &Request) -> bool {
        match &self.accept {
            Some(f) => f(req),
            None => true,
        }
    }

    /// Invoke the open callback, if any.
    pub fn dispatch_open(&mut self) {
        if let Some(f) = self.open.clone() {
            f(self);
        }
    }

    /// Invoke the message callback, if any.
    pub fn dispatch_message(&mut self, payload: &[u8], is_binary: bool) {
        if let Some(f) = self.message.clone() {
            f(self, payload, is_binary);
        }
    }

    /// Invoke the close callback, if any.
    pub fn dispatch_close(&mut self, reason: &str) {
        if let Some(f) = self.close.clone() {
            f(self, reason);
        }
    }

    /// Invoke the error callback, if any.
    pub fn dispatch_error(&mut self) {
        if let Some(f) = self.error.clone() {
            f(self);
        }
    }

    /// Borrow the underlying transport.
    pub fn transport_mut(&mut self) -> &mut dyn Transport {
        self.socket.get_mut()
    }

    /// Give up the connection, returning the socket.
    #[must_use]
    pub fn into_socket(self) -> Socket {
        self.socket
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

//! Rule variants: the entities the router owns and dispatches to.
//!
//! Every variant carries a pattern, an allowed-method set, an optional name,
//! and an erased handler. Variants differ in when the handler's parameter
//! signature is checked:
//!
//! - [`TypedRule<Args>`] fixes the signature in its type parameter.
//! - [`RouteRule`] infers it from the attached handler and checks it against
//!   the pattern when the handler is attached.
//! - [`WebSocketRule`](crate::websocket::WebSocketRule) carries upgrade
//!   callbacks instead of a plain handler.
//! - [`CatchallRule`] has no pattern and receives what nothing else matched.

use std::fmt;
use std::marker::PhantomData;

use rook_core::{Method, MethodSet, Request, Response, Socket, StatusCode};

use crate::error::RouterError;
use crate::handler::{BoxedHandler, IntoRouteHandler};
use crate::params::{pattern_bind_kinds, FromRouteParams, RouteParams};
use crate::websocket::{Connection, WebSocketRule};

/// The capability set shared by all rule variants.
///
/// The router stores rules as `Box<dyn Rule>`; after `validate()` succeeds a
/// rule is never mutated again, so `handle` takes `&self` and is safe to
/// call concurrently.
pub trait Rule: Send + Sync {
    /// The pattern the rule was registered under, as written.
    fn pattern(&self) -> &str;

    /// The display name used in error messages.
    fn name(&self) -> Option<&str> {
        None
    }

    /// The methods the rule answers.
    fn methods(&self) -> MethodSet;

    /// Check the rule is complete; called once before serving.
    fn validate(&self) -> Result<(), RouterError>;

    /// Invoke the rule for a regular request.
    fn handle(&self, req: &Request, res: &mut Response, params: &RouteParams);

    /// Invoke the rule for an upgrade request, taking ownership of the
    /// socket. Non-websocket rules answer 404 and drop the socket.
    fn handle_upgrade(
        &self,
        _req: &Request,
        res: &mut Response,
        _socket: Socket,
    ) -> Option<Connection> {
        *res = Response::new(StatusCode::NOT_FOUND);
        None
    }

    /// Give up a replacement rule, if one was configured; the router swaps
    /// it in during validation.
    fn take_upgrade(&mut self) -> Option<Box<dyn Rule>> {
        None
    }
}

/// A rule whose handler signature is checked against the pattern when the
/// handler is attached.
///
/// A mismatch is recorded and reported by `validate()`, so attachment stays
/// chainable while build-time errors still halt startup.
pub struct RouteRule {
    pattern: String,
    methods: MethodSet,
    name: Option<String>,
    handler: Option<BoxedHandler>,
    attach_error: Option<RouterError>,
    upgrade: Option<WebSocketRule>,
}

impl RouteRule {
    /// Create a rule for `pattern`. Methods default to GET.
    #[must_use]
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            methods: MethodSet::single(Method::Get),
            name: None,
            handler: None,
            attach_error: None,
            upgrade: None,
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

    /// Attach the handler, inferring its parameter kinds and checking them
    /// against the pattern (same count, same kinds, same order).
    #[must_use]
    pub fn to<Args, Shape>(mut self, handler: impl IntoRouteHandler<Args, Shape>) -> Self
    where
        Args: FromRouteParams,
    {
        match pattern_bind_kinds(&self.pattern) {
            Ok(kinds) if kinds == Args::KINDS => {
                self.handler = Some(handler.into_route_handler());
            }
            Ok(_) => {
                self.attach_error = Some(RouterError::HandlerArityMismatch {
                    pattern: self.pattern.clone(),
                    name: self.name.clone(),
                });
            }
            Err(err) => {
                self.attach_error = Some(err);
            }
        }
        self
    }

    /// Replace this rule with a websocket rule at validation time.
    ///
    /// The closure configures the replacement (callbacks, methods); pattern
    /// and name carry over.
    #[must_use]
    pub fn websocket(mut self, configure: impl FnOnce(WebSocketRule) -> WebSocketRule) -> Self {
        let mut ws = WebSocketRule::new(self.pattern.clone());
        if let Some(name) = &self.name {
            ws = ws.name(name.clone());
        }
        self.upgrade = Some(configure(ws));
        self
    }
}

impl fmt::Debug for RouteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteRule")
            .field("pattern", &self.pattern)
            .field("methods", &self.methods)
            .field("name", &self.name)
            .field("has_handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}

impl Rule for RouteRule {
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
        if let Some(err) = &self.attach_error {
            return Err(err.clone());
        }
        if self.handler.is_none() {
            return Err(RouterError::HandlerMissing {
                pattern: self.pattern.clone(),
                name: self.name.clone(),
            });
        }
        Ok(())
    }

    fn handle(&self, req: &Request, res: &mut Response, params: &RouteParams) {
        if let Some(handler) = &self.handler {
            handler(req, res, params);
        }
    }

    fn take_upgrade(&mut self) -> Option<Box<dyn Rule>> {
        self.upgrade
            .take()
            .map(|ws| Box::new(ws) as Box<dyn Rule>)
    }
}

/// A rule whose parameter signature is fixed at compile time.
///
/// `Args` is the tuple of typed parameters the handler takes, e.g.
/// `TypedRule::<(i64, String)>::new("/users/<int>/<string>")`. Validation
/// still confirms the pattern agrees with `Args`.
pub struct TypedRule<Args> {
    pattern: String,
    methods: MethodSet,
    name: Option<String>,
    handler: Option<BoxedHandler>,
    _args: PhantomData<fn(Args)>,
}

impl<Args: FromRouteParams + 'static> TypedRule<Args> {
    /// Create a rule for `pattern`. Methods default to GET.
    #[must_use]
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            methods: MethodSet::single(Method::Get),
            name: None,
            handler: None,
            _args: PhantomData,
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

    /// Attach the handler. The signature must match `Args` exactly.
    #[must_use]
    pub fn to<Shape>(mut self, handler: impl IntoRouteHandler<Args, Shape>) -> Self {
        self.handler = Some(handler.into_route_handler());
        self
    }
}

impl<Args> fmt::Debug for TypedRule<Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedRule")
            .field("pattern", &self.pattern)
            .field("methods", &self.methods)
            .field("name", &self.name)
            .field("has_handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}

impl<Args: FromRouteParams + Send + Sync + 'static> Rule for TypedRule<Args> {
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
        if self.handler.is_none() {
            return Err(RouterError::HandlerMissing {
                pattern: self.pattern.clone(),
                name: self.name.clone(),
            });
        }
        let kinds = pattern_bind_kinds(&self.pattern)?;
        if kinds != Args::KINDS {
            return Err(RouterError::HandlerArityMismatch {
                pattern: self.pattern.clone(),
                name: self.name.clone(),
            });
        }
        Ok(())
    }

    fn handle(&self, req: &Request, res: &mut Response, params: &RouteParams) {
        if let Some(handler) = &self.handler {
            handler(req, res, params);
        }
    }
}

/// The fallback rule invoked when no pattern matches and no other method
/// would have matched.
///
/// Accepts the same handler shapes as a zero-parameter route rule.
#[derive(Default)]
pub struct CatchallRule {
    handler: Option<BoxedHandler>,
}

impl CatchallRule {
    /// Create an empty catch-all.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the handler.
    #[must_use]
    pub fn to<Shape>(mut self, handler: impl IntoRouteHandler<(), Shape>) -> Self {
        self.handler = Some(handler.into_route_handler());
        self
    }

    /// Whether a handler is attached.
    #[must_use]
    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    pub(crate) fn invoke(&self, req: &Request, res: &mut Response) {
        if let Some(handler) = &self.handler {
            handler(req, res, &RouteParams::default());
        }
    }
}

impl fmt::Debug for CatchallRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatchallRule")
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

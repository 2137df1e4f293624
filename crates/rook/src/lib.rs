//! Embeddable HTTP request routing.
//!
//! rook is the routing core of an HTTP server: it takes a parsed request
//! (method, URL path, headers) and dispatches it to a registered handler,
//! extracting typed path parameters along the way. It does no I/O — the
//! surrounding server owns sockets, parsing, and serialization.
//!
//! # Quick Start
//!
//! ```
//! use rook::prelude::*;
//!
//! let mut router = Router::new();
//! router.register(RouteRule::new("/").to(|| "hello"));
//! router.register(RouteRule::new("/users/<int>").to(|id: i64| format!("user {id}")));
//! router.register(
//!     RouteRule::new("/submit")
//!         .methods([Method::Post])
//!         .to(|req: &Request, res: &mut Response| {
//!             res.set_body(format!("submitted to {}", req.path()));
//!         }),
//! );
//! router.validate().unwrap();
//!
//! let request = Request::new(Method::Get, "/users/7");
//! let mut response = Response::ok();
//! router.handle(&request, &mut response);
//! assert_eq!(response.body(), b"user 7");
//! ```
//!
//! # Crate Structure
//!
//! - [`rook_core`] — request/response vocabulary shared with the server
//! - [`rook_router`] — the parameter trie, rule variants, and dispatch

#![forbid(unsafe_code)]

// Re-export crates
pub use rook_core as core;
pub use rook_router as router;

// Re-export commonly used types
pub use rook_core::{
    Body, Headers, IntoResponse, Method, MethodSet, Request, Response, Socket, StatusCode,
    Transport,
};
pub use rook_router::{
    CatchallRule, Connection, RouteParams, RouteRule, Router, RouterError, Rule, TypedRule,
    WebSocketRule,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        CatchallRule, IntoResponse, Method, MethodSet, Request, Response, RouteParams, RouteRule,
        Router, RouterError, Rule, Socket, StatusCode, TypedRule, WebSocketRule,
    };
}

//! Trie-based request routing core.
//!
//! This crate matches parsed HTTP requests against registered URL patterns
//! and dispatches them to typed handlers. Patterns mix literal text with
//! typed parameter tokens (`<int>`, `<uint>`, `<float>`/`<double>`,
//! `<str>`/`<string>`, `<path>`); matched fragments are converted and bound
//! to handler arguments by position.
//!
//! # Example
//!
//! ```
//! use rook_core::{Method, Request, Response};
//! use rook_router::{RouteRule, Router};
//!
//! let mut router = Router::new();
//! router.register(RouteRule::new("/users/<int>").to(|id: i64| format!("user {id}")));
//! router.validate().unwrap();
//!
//! let request = Request::new(Method::Get, "/users/42");
//! let mut response = Response::ok();
//! router.handle(&request, &mut response);
//! assert_eq!(response.body(), b"user 42");
//! ```
//!
//! # Lifecycle
//!
//! Registration and [`Router::validate`] form the single-threaded build
//! phase. After validation the router is immutable: [`Router::handle`] and
//! [`Router::handle_upgrade`] take `&self` and may run concurrently from
//! any number of threads without synchronization.

#![forbid(unsafe_code)]

mod error;
mod handler;
mod params;
mod router;
mod rule;
mod trie;
mod websocket;

pub use error::RouterError;
pub use handler::{
    IntoRouteHandler, ParamsOnly, WithRequest, WithRequestResponse, WithResponse,
};
pub use params::{BindKind, FromRouteParam, FromRouteParams, ParamKind, RouteParams};
pub use router::{Router, RULE_SPECIAL_REDIRECT_SLASH};
pub use rule::{CatchallRule, RouteRule, Rule, TypedRule};
pub use trie::Trie;
pub use websocket::{Connection, WebSocketRule};

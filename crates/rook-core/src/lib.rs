//! Core types for the rook routing library.
//!
//! This crate provides the vocabulary shared between the routing core and
//! the surrounding HTTP server:
//! - [`Request`] and [`Response`] (with the HEAD/`Content-Length` flags the
//!   router sets)
//! - [`Method`] and [`MethodSet`]
//! - [`IntoResponse`] for handler return values
//! - [`Socket`], the ownership-transferring upgrade handoff
//!
//! # Design Principles
//!
//! - No I/O: requests arrive fully parsed, responses leave as values
//! - All types are `Send + Sync` where sharing is meaningful
//! - No runtime reflection

#![forbid(unsafe_code)]

mod method;
mod request;
mod response;
mod socket;

pub use method::{Method, MethodSet};
pub use request::{Body, Headers, Request};
pub use response::{IntoResponse, Response, StatusCode};
pub use socket::{Socket, Transport};

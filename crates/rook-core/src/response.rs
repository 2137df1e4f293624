//! HTTP response types and return-value conversion.

use std::fmt;

use crate::request::Headers;

/// HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const NO_CONTENT: StatusCode = StatusCode(204);
    pub const MOVED_PERMANENTLY: StatusCode = StatusCode(301);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const METHOD_NOT_ALLOWED: StatusCode = StatusCode(405);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    /// Wrap a raw status code.
    #[must_use]
    pub const fn from_u16(code: u16) -> Self {
        StatusCode(code)
    }

    /// The numeric code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// The canonical reason phrase for well-known codes.
    #[must_use]
    pub fn canonical_reason(self) -> &'static str {
        match self.0 {
            200 => "OK",
            201 => "Created",
            204 => "No Content",
            301 => "Moved Permanently",
            302 => "Found",
            304 => "Not Modified",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            500 => "Internal Server Error",
            501 => "Not Implemented",
            503 => "Service Unavailable",
            _ => "Unknown",
        }
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        StatusCode::OK
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, self.canonical_reason())
    }
}

/// The response produced by dispatch.
///
/// The routing core only fills this in; serialization belongs to the HTTP
/// layer. `is_head_response` asks that layer to suppress the body, and
/// `manual_length_header` suppresses automatic `Content-Length` injection.
#[derive(Debug, Default)]
pub struct Response {
    status: StatusCode,
    headers: Headers,
    body: Vec<u8>,
    is_head_response: bool,
    manual_length_header: bool,
}

impl Response {
    /// Create a response with the given status and no body.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Vec::new(),
            is_head_response: false,
            manual_length_header: false,
        }
    }

    /// A 200 response with no body.
    #[must_use]
    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    /// Set the body to a UTF-8 string, consuming style.
    #[must_use]
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = body.into().into_bytes();
        self
    }

    /// Set a header, consuming style.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// The status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Replace the status code.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// The headers.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable headers.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Set a header, replacing any existing value.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.headers.insert(name, value);
    }

    /// The body bytes.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Replace the body.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    /// Whether the body should be suppressed (HEAD request).
    #[must_use]
    pub fn is_head_response(&self) -> bool {
        self.is_head_response
    }

    /// Mark the response as answering a HEAD request.
    pub fn set_head_response(&mut self, head: bool) {
        self.is_head_response = head;
    }

    /// Whether automatic `Content-Length` injection is suppressed.
    #[must_use]
    pub fn manual_length_header(&self) -> bool {
        self.manual_length_header
    }

    /// Suppress automatic `Content-Length` injection.
    pub fn set_manual_length_header(&mut self, manual: bool) {
        self.manual_length_header = manual;
    }
}

/// Conversion of handler return values into responses.
///
/// Strings become 200 bodies, integers become bare status codes, and
/// `Response` values pass through untouched.
pub trait IntoResponse {
    /// Convert into a response.
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response {
        self
    }
}

impl IntoResponse for String {
    fn into_response(self) -> Response {
        Response::ok().text(self)
    }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response {
        Response::ok().text(self)
    }
}

impl IntoResponse for Vec<u8> {
    fn into_response(self) -> Response {
        let mut response = Response::ok();
        response.set_body(self);
        response
    }
}

impl IntoResponse for u16 {
    fn into_response(self) -> Response {
        Response::new(StatusCode::from_u16(self))
    }
}

impl IntoResponse for StatusCode {
    fn into_response(self) -> Response {
        Response::new(self)
    }
}

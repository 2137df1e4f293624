//! Typed URL parameters and the handler binding layer.
//!
//! A matched URL yields a [`RouteParams`]: four ordered sequences, one per
//! storage kind, filled in the order the matcher walked the winning path.
//! Each parameter position in a pattern corresponds to a `(kind, ordinal)`
//! pair; [`FromRouteParams`] computes those pairs for a handler's argument
//! tuple and reads the values back positionally.

use crate::error::RouterError;

/// The parameter kinds a trie node can capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Signed 64-bit integer.
    Int,
    /// Unsigned 64-bit integer.
    Uint,
    /// binary64 floating point.
    Double,
    /// One path segment (stops at `/`).
    String,
    /// Greedy: the rest of the URL, slashes included.
    Path,
}

impl ParamKind {
    /// The canonical token text, as written in patterns.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            ParamKind::Int => "<int>",
            ParamKind::Uint => "<uint>",
            ParamKind::Double => "<double>",
            ParamKind::String => "<string>",
            ParamKind::Path => "<path>",
        }
    }

    /// How a captured value of this kind binds to a handler argument.
    #[must_use]
    pub fn binding(self) -> BindKind {
        match self {
            ParamKind::Int => BindKind::Int,
            ParamKind::Uint => BindKind::Uint,
            ParamKind::Double => BindKind::Double,
            ParamKind::String | ParamKind::Path => BindKind::String,
        }
    }

    /// Match a parameter token at the start of `rest`.
    ///
    /// Returns the kind and the token's byte length. `<float>` and `<str>`
    /// are aliases; any other `<...>` sequence is unrecognized.
    pub(crate) fn parse_token(rest: &str) -> Option<(ParamKind, usize)> {
        const TOKENS: &[(&str, ParamKind)] = &[
            ("<int>", ParamKind::Int),
            ("<uint>", ParamKind::Uint),
            ("<float>", ParamKind::Double),
            ("<double>", ParamKind::Double),
            ("<str>", ParamKind::String),
            ("<string>", ParamKind::String),
            ("<path>", ParamKind::Path),
        ];
        TOKENS
            .iter()
            .find(|(token, _)| rest.starts_with(token))
            .map(|(token, kind)| (*kind, token.len()))
    }
}

/// The storage kind a handler argument reads from.
///
/// `<string>` and `<path>` tokens both bind string arguments; the trie
/// distinguishes them, the binder does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindKind {
    Int,
    Uint,
    Double,
    String,
}

/// Extract the binding kinds of a pattern's parameter tokens, in order.
pub(crate) fn pattern_bind_kinds(pattern: &str) -> Result<Vec<BindKind>, RouterError> {
    let mut kinds = Vec::new();
    let mut rest = pattern;
    while let Some(open) = rest.find('<') {
        rest = &rest[open..];
        match ParamKind::parse_token(rest) {
            Some((kind, len)) => {
                kinds.push(kind.binding());
                rest = &rest[len..];
            }
            None => {
                let end = rest.find('>').map_or(rest.len(), |p| p + 1);
                return Err(RouterError::InvalidParameterToken {
                    pattern: pattern.to_string(),
                    token: rest[..end].to_string(),
                });
            }
        }
    }
    Ok(kinds)
}

/// The typed values extracted during a URL match.
///
/// Values are partitioned by storage kind and kept in the order the matcher
/// encountered them along the winning path.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RouteParams {
    pub(crate) int_params: Vec<i64>,
    pub(crate) uint_params: Vec<u64>,
    pub(crate) double_params: Vec<f64>,
    pub(crate) string_params: Vec<String>,
}

impl RouteParams {
    /// The `index`-th integer parameter, in pattern order.
    #[must_use]
    pub fn get_int(&self, index: usize) -> Option<i64> {
        self.int_params.get(index).copied()
    }

    /// The `index`-th unsigned parameter, in pattern order.
    #[must_use]
    pub fn get_uint(&self, index: usize) -> Option<u64> {
        self.uint_params.get(index).copied()
    }

    /// The `index`-th floating-point parameter, in pattern order.
    #[must_use]
    pub fn get_double(&self, index: usize) -> Option<f64> {
        self.double_params.get(index).copied()
    }

    /// The `index`-th string parameter (from `<string>` or `<path>`).
    #[must_use]
    pub fn get_string(&self, index: usize) -> Option<&str> {
        self.string_params.get(index).map(String::as_str)
    }

    /// Whether no parameters were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.int_params.is_empty()
            && self.uint_params.is_empty()
            && self.double_params.is_empty()
            && self.string_params.is_empty()
    }
}

/// A single handler argument readable from [`RouteParams`].
pub trait FromRouteParam: Sized {
    /// The storage kind this argument reads from.
    const KIND: BindKind;

    /// Read the `ordinal`-th value of this kind.
    fn pick(params: &RouteParams, ordinal: usize) -> Option<Self>;
}

impl FromRouteParam for i64 {
    const KIND: BindKind = BindKind::Int;

    fn pick(params: &RouteParams, ordinal: usize) -> Option<Self> {
        params.get_int(ordinal)
    }
}

impl FromRouteParam for u64 {
    const KIND: BindKind = BindKind::Uint;

    fn pick(params: &RouteParams, ordinal: usize) -> Option<Self> {
        params.get_uint(ordinal)
    }
}

impl FromRouteParam for f64 {
    const KIND: BindKind = BindKind::Double;

    fn pick(params: &RouteParams, ordinal: usize) -> Option<Self> {
        params.get_double(ordinal)
    }
}

impl FromRouteParam for String {
    const KIND: BindKind = BindKind::String;

    fn pick(params: &RouteParams, ordinal: usize) -> Option<Self> {
        params.get_string(ordinal).map(str::to_owned)
    }
}

/// Walks a parameter-kind list, assigning each position its ordinal within
/// that kind.
#[derive(Debug, Default)]
struct KindCursor {
    ints: usize,
    uints: usize,
    doubles: usize,
    strings: usize,
}

impl KindCursor {
    fn next(&mut self, kind: BindKind) -> usize {
        let slot = match kind {
            BindKind::Int => &mut self.ints,
            BindKind::Uint => &mut self.uints,
            BindKind::Double => &mut self.doubles,
            BindKind::String => &mut self.strings,
        };
        let ordinal = *slot;
        *slot += 1;
        ordinal
    }
}

/// A handler argument tuple extractable from [`RouteParams`].
pub trait FromRouteParams: Sized {
    /// The binding kinds of the tuple's positions, in order.
    const KINDS: &'static [BindKind];

    /// Extract the tuple; `None` when the captured values do not cover it.
    fn from_params(params: &RouteParams) -> Option<Self>;
}

macro_rules! impl_from_route_params {
    ($($ty:ident),*) => {
        impl<$($ty: FromRouteParam),*> FromRouteParams for ($($ty,)*) {
            const KINDS: &'static [BindKind] = &[$($ty::KIND),*];

            #[allow(unused_variables, unused_mut)]
            fn from_params(params: &RouteParams) -> Option<Self> {
                let mut cursor = KindCursor::default();
                Some(($($ty::pick(params, cursor.next($ty::KIND))?,)*))
            }
        }
    };
}

impl_from_route_params!();
impl_from_route_params!(A);
impl_from_route_params!(A, B);
impl_from_route_params!(A, B, C);
impl_from_route_params!(A, B, C, D);
impl_from_route_params!(A, B, C, D, E);

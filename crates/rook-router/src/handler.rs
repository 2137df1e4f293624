//! Adapting user handlers to the uniform invocation shape.
//!
//! Rules store every handler as the same erased closure,
//! `Fn(&Request, &mut Response, &RouteParams)`. User code may supply any of
//! four shapes:
//!
//! - `Fn(params...) -> impl IntoResponse`
//! - `Fn(&Request, params...) -> impl IntoResponse`
//! - `Fn(&mut Response, params...)`
//! - `Fn(&Request, &mut Response, params...)`
//!
//! The first two return a value that is converted into the response; the
//! latter two populate the response in place. Shape selection happens at
//! compile time through the marker type parameter, one impl block per shape
//! per arity.

use rook_core::{IntoResponse, Request, Response};

use crate::params::{FromRouteParam, FromRouteParams, RouteParams};

/// The erased handler shape every rule stores.
pub(crate) type BoxedHandler = Box<dyn Fn(&Request, &mut Response, &RouteParams) + Send + Sync>;

/// Marker: handler takes only the typed parameters.
pub struct ParamsOnly(());

/// Marker: handler takes the request first.
pub struct WithRequest(());

/// Marker: handler takes the response first.
pub struct WithResponse(());

/// Marker: handler takes request and response first.
pub struct WithRequestResponse(());

/// A function adaptable into the uniform handler shape.
///
/// `Args` is the tuple of typed URL parameters; `Shape` is one of the four
/// marker types and is always inferred.
pub trait IntoRouteHandler<Args, Shape>: Send + Sync + 'static {
    /// Erase the handler into the uniform invocation shape.
    fn into_route_handler(self) -> BoxedHandler;
}

fn bind<Args: FromRouteParams>(params: &RouteParams) -> Args {
    match Args::from_params(params) {
        Some(args) => args,
        // Unreachable once validation has checked the pattern against the
        // handler signature; dispatch turns the panic into a 500.
        None => panic!("bound parameters do not match handler signature"),
    }
}

macro_rules! impl_into_route_handler {
    ($($ty:ident $arg:ident),*) => {
        impl<Fun, Ret, $($ty),*> IntoRouteHandler<($($ty,)*), ParamsOnly> for Fun
        where
            Fun: Fn($($ty),*) -> Ret + Send + Sync + 'static,
            Ret: IntoResponse,
            $($ty: FromRouteParam + 'static,)*
        {
            fn into_route_handler(self) -> BoxedHandler {
                Box::new(move |_req, res, params| {
                    let ($($arg,)*) = bind::<($($ty,)*)>(params);
                    *res = self($($arg),*).into_response();
                })
            }
        }

        impl<Fun, Ret, $($ty),*> IntoRouteHandler<($($ty,)*), WithRequest> for Fun
        where
            Fun: Fn(&Request, $($ty),*) -> Ret + Send + Sync + 'static,
            Ret: IntoResponse,
            $($ty: FromRouteParam + 'static,)*
        {
            fn into_route_handler(self) -> BoxedHandler {
                Box::new(move |req, res, params| {
                    let ($($arg,)*) = bind::<($($ty,)*)>(params);
                    *res = self(req, $($arg),*).into_response();
                })
            }
        }

        impl<Fun, $($ty),*> IntoRouteHandler<($($ty,)*), WithResponse> for Fun
        where
            Fun: Fn(&mut Response, $($ty),*) + Send + Sync + 'static,
            $($ty: FromRouteParam + 'static,)*
        {
            fn into_route_handler(self) -> BoxedHandler {
                Box::new(move |_req, res, params| {
                    let ($($arg,)*) = bind::<($($ty,)*)>(params);
                    self(res, $($arg),*);
                })
            }
        }

        impl<Fun, $($ty),*> IntoRouteHandler<($($ty,)*), WithRequestResponse> for Fun
        where
            Fun: Fn(&Request, &mut Response, $($ty),*) + Send + Sync + 'static,
            $($ty: FromRouteParam + 'static,)*
        {
            fn into_route_handler(self) -> BoxedHandler {
                Box::new(move |req, res, params| {
                    let ($($arg,)*) = bind::<($($ty,)*)>(params);
                    self(req, res, $($arg),*);
                })
            }
        }
    };
}

impl_into_route_handler!();
impl_into_route_handler!(A a);
impl_into_route_handler!(A a, B b);
impl_into_route_handler!(A a, B b, C c);
impl_into_route_handler!(A a, B b, C c, D d);
impl_into_route_handler!(A a, B b, C c, D d, E e);

#[cfg(test)]
mod tests {
    use super::*;
    use rook_core::{Method, StatusCode};

    fn params(ints: Vec<i64>, strings: Vec<String>) -> RouteParams {
        RouteParams {
            int_params: ints,
            string_params: strings,
            ..RouteParams::default()
        }
    }

    fn invoke<Args, Shape>(
        handler: impl IntoRouteHandler<Args, Shape>,
        params: &RouteParams,
    ) -> Response {
        let erased = handler.into_route_handler();
        let request = Request::new(Method::Get, "/");
        let mut response = Response::ok();
        erased(&request, &mut response, params);
        response
    }

    #[test]
    fn params_only_return_converts() {
        let response = invoke(|id: i64| format!("id={id}"), &params(vec![42], vec![]));
        assert_eq!(response.body(), b"id=42");
    }

    #[test]
    fn zero_arg_handler() {
        let response = invoke(|| "root", &RouteParams::default());
        assert_eq!(response.body(), b"root");
    }

    #[test]
    fn request_shape_sees_the_request() {
        let response = invoke(
            |req: &Request, name: String| format!("{} {name}", req.path()),
            &params(vec![], vec!["n".into()]),
        );
        assert_eq!(response.body(), b"/ n");
    }

    #[test]
    fn response_shape_populates_in_place() {
        let response = invoke(
            |res: &mut Response, id: i64| {
                res.set_status(StatusCode::from_u16(201));
                res.set_body(id.to_string());
            },
            &params(vec![7], vec![]),
        );
        assert_eq!(response.status().as_u16(), 201);
        assert_eq!(response.body(), b"7");
    }

    #[test]
    fn request_response_shape() {
        let response = invoke(
            |req: &Request, res: &mut Response| {
                res.set_body(req.path().to_owned());
            },
            &RouteParams::default(),
        );
        assert_eq!(response.body(), b"/");
    }

    #[test]
    fn mixed_kinds_bind_positionally() {
        let response = invoke(
            |a: i64, s: String, b: i64| format!("{a},{s},{b}"),
            &params(vec![1, 2], vec!["mid".into()]),
        );
        assert_eq!(response.body(), b"1,mid,2");
    }

    #[test]
    #[should_panic(expected = "bound parameters do not match")]
    fn missing_parameter_panics() {
        let _ = invoke(|id: i64| id.to_string(), &RouteParams::default());
    }
}

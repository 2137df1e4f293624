//! End-to-end dispatch behavior through the public API.

use std::sync::{Arc, Mutex};

use rook_core::{Method, Request, Response, Socket, StatusCode};
use rook_router::{CatchallRule, RouteRule, Router, TypedRule, WebSocketRule};

fn dispatch(router: &Router, method: Method, path: &str) -> Response {
    let mut response = Response::ok();
    router.handle(&Request::new(method, path), &mut response);
    response
}

fn memory_socket() -> Socket {
    Socket::new(std::io::Cursor::new(Vec::new()))
}

#[test]
fn int_param_reaches_the_handler() {
    let seen = Arc::new(Mutex::new(None));
    let seen_in = Arc::clone(&seen);

    let mut router = Router::new();
    router.register(RouteRule::new("/users/<int>").to(move |id: i64| {
        *seen_in.lock().unwrap() = Some(id);
        format!("user {id}")
    }));
    router.validate().unwrap();

    let response = dispatch(&router, Method::Get, "/users/42");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), b"user 42");
    assert_eq!(*seen.lock().unwrap(), Some(42));

    let response = dispatch(&router, Method::Get, "/users/-5");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(*seen.lock().unwrap(), Some(-5));

    let response = dispatch(&router, Method::Get, "/users/abc");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn path_param_receives_the_whole_tail() {
    let mut router = Router::new();
    router.register(RouteRule::new("/files/<path>").to(|p: String| p));
    router.validate().unwrap();

    let response = dispatch(&router, Method::Get, "/files/a/b/c.txt");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), b"a/b/c.txt");
}

#[test]
fn trailing_slash_pattern_redirects_the_bare_url() {
    let mut router = Router::new();
    router.register(RouteRule::new("/about/").to(|| "about"));
    router.validate().unwrap();

    // Canonical URL serves normally.
    let response = dispatch(&router, Method::Get, "/about/");
    assert_eq!(response.status(), StatusCode::OK);

    // Bare URL redirects; no Host header means a relative location.
    let response = dispatch(&router, Method::Get, "/about");
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(response.headers().get_str("Location"), Some("/about/"));
    assert!(response.body().is_empty());

    // With a Host header the location is absolute.
    let mut request = Request::new(Method::Get, "/about");
    request.headers_mut().insert("Host", b"example.com".to_vec());
    let mut response = Response::ok();
    router.handle(&request, &mut response);
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        response.headers().get_str("Location"),
        Some("http://example.com/about/")
    );
}

#[test]
fn bare_pattern_does_not_match_slashed_url() {
    let mut router = Router::new();
    router.register(RouteRule::new("/foo").to(|| "foo"));
    router.validate().unwrap();

    assert_eq!(dispatch(&router, Method::Get, "/foo").status(), StatusCode::OK);
    assert_eq!(
        dispatch(&router, Method::Get, "/foo/").status(),
        StatusCode::NOT_FOUND
    );
}

#[test]
fn wrong_method_is_405_without_allow() {
    let mut router = Router::new();
    router.register(RouteRule::new("/submit").methods([Method::Post]).to(|| "ok"));
    router.validate().unwrap();

    let response = dispatch(&router, Method::Get, "/submit");
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers().get("Allow"), None);

    let response = dispatch(&router, Method::Post, "/submit");
    assert_eq!(response.status(), StatusCode::OK);
}

#[test]
fn options_star_enumerates_registered_methods() {
    let mut router = Router::new();
    router.register(RouteRule::new("/a").to(|| "a"));
    router.register(RouteRule::new("/b").methods([Method::Post]).to(|| "b"));
    router.validate().unwrap();

    let response = dispatch(&router, Method::Options, "/*");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        response.headers().get_str("Allow"),
        Some("OPTIONS, HEAD, GET, POST")
    );
    assert!(response.manual_length_header());
    assert!(response.body().is_empty());
}

#[test]
fn options_on_a_url_lists_its_methods() {
    let mut router = Router::new();
    router.register(RouteRule::new("/a").to(|| "a"));
    router.register(RouteRule::new("/a").methods([Method::Put]).to(|| "a2"));
    router.register(RouteRule::new("/b").methods([Method::Post]).to(|| "b"));
    router.validate().unwrap();

    let response = dispatch(&router, Method::Options, "/a");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        response.headers().get_str("Allow"),
        Some("OPTIONS, HEAD, GET, PUT")
    );

    let response = dispatch(&router, Method::Options, "/missing");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn registration_order_breaks_ties() {
    let mut router = Router::new();
    router.register(RouteRule::new("/a/<int>").to(|id: i64| format!("int {id}")));
    router.register(RouteRule::new("/a/<string>").to(|s: String| format!("str {s}")));
    router.validate().unwrap();

    let response = dispatch(&router, Method::Get, "/a/7");
    assert_eq!(response.body(), b"int 7");
    let response = dispatch(&router, Method::Get, "/a/seven");
    assert_eq!(response.body(), b"str seven");
}

#[test]
fn head_mirrors_get_with_the_flag_set() {
    let mut router = Router::new();
    router.register(RouteRule::new("/page").to(|res: &mut Response| {
        res.set_header("X-Kind", b"page".to_vec());
        res.set_body("content");
    }));
    router.validate().unwrap();

    let get = dispatch(&router, Method::Get, "/page");
    let head = dispatch(&router, Method::Head, "/page");

    assert_eq!(head.status(), get.status());
    assert_eq!(head.headers().get_str("X-Kind"), get.headers().get_str("X-Kind"));
    assert!(head.is_head_response());
    assert!(!get.is_head_response());

    // A HEAD miss still carries the flag.
    let head = dispatch(&router, Method::Head, "/missing");
    assert_eq!(head.status(), StatusCode::NOT_FOUND);
    assert!(head.is_head_response());
}

#[test]
fn catchall_receives_unmatched_requests() {
    let mut router = Router::new();
    router.register(RouteRule::new("/known").to(|| "known"));
    router.set_catchall(CatchallRule::new().to(|req: &Request, res: &mut Response| {
        res.set_status(StatusCode::NOT_FOUND);
        res.set_body(format!("fallback for {}", req.path()));
    }));
    router.validate().unwrap();

    let response = dispatch(&router, Method::Get, "/unknown");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.body(), b"fallback for /unknown");

    // A URL registered under another method is still 405, not catch-all.
    let response = dispatch(&router, Method::Post, "/known");
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[test]
fn typed_rule_dispatches_like_a_route_rule() {
    let mut router = Router::new();
    router.register(
        TypedRule::<(i64, String)>::new("/orders/<int>/<string>")
            .to(|id: i64, tag: String| format!("{id}:{tag}")),
    );
    router.validate().unwrap();

    let response = dispatch(&router, Method::Get, "/orders/9/open");
    assert_eq!(response.body(), b"9:open");
}

#[test]
fn multi_kind_pattern_binds_in_order() {
    let mut router = Router::new();
    router.register(
        RouteRule::new("/m/<int>/<double>/<string>/<uint>")
            .to(|a: i64, d: f64, s: String, u: u64| format!("{a}|{d}|{s}|{u}")),
    );
    router.validate().unwrap();

    let response = dispatch(&router, Method::Get, "/m/-4/2.5/tag/19");
    assert_eq!(response.body(), b"-4|2.5|tag|19");
}

#[test]
fn upgrade_hands_off_the_socket() {
    let hits = Arc::new(Mutex::new(Vec::new()));
    let hits_in = Arc::clone(&hits);

    let mut router = Router::new();
    router.register(WebSocketRule::new("/ws").on_message(move |_conn, payload, _binary| {
        hits_in.lock().unwrap().push(payload.to_vec());
    }));
    router.validate().unwrap();

    let request = Request::new(Method::Get, "/ws");
    let mut response = Response::ok();
    let mut connection = router
        .handle_upgrade(&request, &mut response, memory_socket())
        .expect("upgrade should match");
    connection.dispatch_message(b"ping", false);
    assert_eq!(*hits.lock().unwrap(), vec![b"ping".to_vec()]);

    // Regular dispatch to a websocket rule is 404.
    let response = dispatch(&router, Method::Get, "/ws");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn upgrade_misses_set_the_response() {
    let mut router = Router::new();
    router.register(WebSocketRule::new("/ws"));
    router.register(RouteRule::new("/plain").methods([Method::Post]).to(|| "p"));
    router.validate().unwrap();

    let mut response = Response::ok();
    let conn = router.handle_upgrade(
        &Request::new(Method::Get, "/nope"),
        &mut response,
        memory_socket(),
    );
    assert!(conn.is_none());
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let mut response = Response::ok();
    let conn = router.handle_upgrade(
        &Request::new(Method::Get, "/plain"),
        &mut response,
        memory_socket(),
    );
    assert!(conn.is_none());
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[test]
fn websocket_via_route_rule_upgrade_swap() {
    let mut router = Router::new();
    router.register(
        RouteRule::new("/live").websocket(|ws| ws.on_open(|_conn| {})),
    );
    router.validate().unwrap();

    let mut response = Response::ok();
    let conn = router.handle_upgrade(
        &Request::new(Method::Get, "/live"),
        &mut response,
        memory_socket(),
    );
    assert!(conn.is_some());
}

#[test]
fn handle_is_safe_from_many_threads() {
    let mut router = Router::new();
    router.register(RouteRule::new("/users/<int>").to(|id: i64| id.to_string()));
    router.register(RouteRule::new("/files/<path>").to(|p: String| p));
    router.validate().unwrap();

    std::thread::scope(|scope| {
        for worker in 0..8 {
            let router = &router;
            scope.spawn(move || {
                for i in 0..200 {
                    let id = worker * 1000 + i;
                    let response = dispatch(router, Method::Get, &format!("/users/{id}"));
                    assert_eq!(response.body(), id.to_string().as_bytes());
                }
            });
        }
    });
}

#[test]
fn handler_return_kinds() {
    let mut router = Router::new();
    router.register(RouteRule::new("/text").to(|| "plain text"));
    router.register(RouteRule::new("/status").to(|| 204u16));
    router.register(RouteRule::new("/response").to(|| {
        Response::new(StatusCode::from_u16(201)).text("created")
    }));
    router.validate().unwrap();

    assert_eq!(dispatch(&router, Method::Get, "/text").body(), b"plain text");
    assert_eq!(
        dispatch(&router, Method::Get, "/status").status(),
        StatusCode::NO_CONTENT
    );
    let response = dispatch(&router, Method::Get, "/response");
    assert_eq!(response.status().as_u16(), 201);
    assert_eq!(response.body(), b"created");
}

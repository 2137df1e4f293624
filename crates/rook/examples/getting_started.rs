//! A tour of the routing core, driven by hand-built requests.
//!
//! Run with `cargo run --example getting_started`.

use rook::prelude::*;

fn show(router: &Router, method: Method, path: &str) {
    let request = Request::new(method, path);
    let mut response = Response::ok();
    router.handle(&request, &mut response);
    println!(
        "{method} {path} -> {} {:?}",
        response.status(),
        String::from_utf8_lossy(response.body()),
    );
}

fn main() -> Result<(), RouterError> {
    let mut router = Router::new();

    router.register(RouteRule::new("/").to(|| "welcome"));
    router.register(
        RouteRule::new("/users/<int>")
            .name("get_user")
            .to(|id: i64| format!("user #{id}")),
    );
    router.register(
        RouteRule::new("/files/<path>").to(|path: String| format!("serving {path}")),
    );
    router.register(
        RouteRule::new("/submit")
            .methods([Method::Post])
            .to(|req: &Request, res: &mut Response| {
                res.set_body(format!("submitted to {}", req.path()));
            }),
    );
    router.register(RouteRule::new("/about/").to(|| "about us"));
    router.set_catchall(CatchallRule::new().to(|res: &mut Response| {
        res.set_status(StatusCode::NOT_FOUND);
        res.set_body("nothing here");
    }));

    router.validate()?;

    show(&router, Method::Get, "/");
    show(&router, Method::Get, "/users/42");
    show(&router, Method::Get, "/users/-5");
    show(&router, Method::Get, "/files/a/b/c.txt");
    show(&router, Method::Get, "/about"); // 301 to /about/
    show(&router, Method::Get, "/submit"); // 405: POST-only
    show(&router, Method::Options, "/*"); // 204 with Allow
    show(&router, Method::Get, "/missing"); // catch-all

    Ok(())
}

//! Build-phase failures: everything here must halt startup with a readable
//! message rather than surface at request time.

use rook_core::Method;
use rook_router::{RouteRule, Router, RouterError, TypedRule};

#[test]
fn duplicate_exact_pattern_in_same_method() {
    let mut router = Router::new();
    router.register(RouteRule::new("/dup").to(|| "a"));
    router.register(RouteRule::new("/dup").to(|| "b"));

    let err = router.validate().unwrap_err();
    assert_eq!(
        err,
        RouterError::PatternConflict {
            pattern: "/dup".into()
        }
    );
    assert_eq!(err.to_string(), "handler already exists for /dup");
}

#[test]
fn same_pattern_in_different_methods_is_allowed() {
    let mut router = Router::new();
    router.register(RouteRule::new("/dup").to(|| "a"));
    router.register(RouteRule::new("/dup").methods([Method::Delete]).to(|| "b"));
    assert!(router.validate().is_ok());
}

#[test]
fn missing_handler_reports_pattern_and_name() {
    let mut router = Router::new();
    router.register(RouteRule::new("/orphan").name("orphan_route"));

    let err = router.validate().unwrap_err();
    assert_eq!(
        err.to_string(),
        "orphan_route: no handler for url /orphan"
    );
}

#[test]
fn arity_mismatch_is_fatal_for_the_rule() {
    let mut router = Router::new();
    router.register(RouteRule::new("/users/<int>/<int>").to(|only: i64| only.to_string()));

    let err = router.validate().unwrap_err();
    assert_eq!(
        err,
        RouterError::HandlerArityMismatch {
            pattern: "/users/<int>/<int>".into(),
            name: None,
        }
    );
}

#[test]
fn kind_mismatch_is_fatal_for_the_rule() {
    let mut router = Router::new();
    // <uint> binds u64, not i64.
    router.register(RouteRule::new("/n/<uint>").to(|n: i64| n.to_string()));
    assert!(matches!(
        router.validate(),
        Err(RouterError::HandlerArityMismatch { .. })
    ));
}

#[test]
fn typed_rule_pattern_disagreement() {
    let mut router = Router::new();
    router.register(TypedRule::<(u64,)>::new("/n/<int>").to(|n: u64| n.to_string()));
    assert!(matches!(
        router.validate(),
        Err(RouterError::HandlerArityMismatch { .. })
    ));
}

#[test]
fn unknown_parameter_token() {
    let mut router = Router::new();
    router.register(RouteRule::new("/x/<uuid>").to(|| "never"));

    let err = router.validate().unwrap_err();
    assert_eq!(
        err,
        RouterError::InvalidParameterToken {
            pattern: "/x/<uuid>".into(),
            token: "<uuid>".into(),
        }
    );
}

#[test]
fn float_and_str_aliases_accepted() {
    let mut router = Router::new();
    router.register(RouteRule::new("/f/<float>").to(|f: f64| f.to_string()));
    router.register(RouteRule::new("/s/<str>").to(|s: String| s));
    assert!(router.validate().is_ok());
}

#[test]
fn registering_both_slashed_and_bare_conflicts() {
    // The trailing-slash pattern implicitly claims the bare URL for the
    // redirect, so also registering the bare URL collides.
    let mut router = Router::new();
    router.register(RouteRule::new("/about").to(|| "bare"));
    router.register(RouteRule::new("/about/").to(|| "slashed"));
    assert!(matches!(
        router.validate(),
        Err(RouterError::PatternConflict { .. })
    ));
}

//! Top-level dispatch.
//!
//! The router has two phases. During the build phase the application
//! registers rules and finally calls [`Router::validate`]; from then on the
//! router is immutable and [`Router::handle`] / [`Router::handle_upgrade`]
//! may be called concurrently from any number of threads without locking.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error, info};

use rook_core::{Method, Request, Response, Socket, StatusCode};

use crate::error::RouterError;
use crate::rule::{CatchallRule, Rule};
use crate::trie::Trie;
use crate::websocket::Connection;

/// Reserved rule id: the canonical URL has a trailing slash, answer 301.
pub const RULE_SPECIAL_REDIRECT_SLASH: u32 = 1;

/// One dispatch table per HTTP method: the trie plus the rule slots it
/// refers to. Slots are indices into the router's master rule list; slots 0
/// and 1 are the reserved placeholders.
struct PerMethod {
    rules: Vec<Option<usize>>,
    trie: Trie,
}

impl Default for PerMethod {
    fn default() -> Self {
        Self {
            rules: vec![None, None],
            trie: Trie::new(),
        }
    }
}

/// Matches requests against registered rules and dispatches them.
#[derive(Default)]
pub struct Router {
    rules: Vec<Box<dyn Rule>>,
    catchall: CatchallRule,
    per_methods: [PerMethod; Method::COUNT],
}

impl Router {
    /// Create an empty router.
    #[must_use]
    pub fn new() -> Self {
        Router::default()
    }

    /// Take ownership of a rule. Rules are matched in registration order
    /// when several patterns cover the same URL.
    pub fn register(&mut self, rule: impl Rule + 'static) -> &mut Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Install the catch-all rule.
    pub fn set_catchall(&mut self, rule: CatchallRule) -> &mut Self {
        self.catchall = rule;
        self
    }

    /// Finish the build phase.
    ///
    /// Swaps in upgrade replacements, validates every rule, registers each
    /// in its methods' tables (also registering the slash-stripped pattern
    /// under the redirect id for `.../` patterns), then optimizes the tries.
    /// Call exactly once; errors are fatal for startup.
    pub fn validate(&mut self) -> Result<(), RouterError> {
        for index in 0..self.rules.len() {
            if let Some(replacement) = self.rules[index].take_upgrade() {
                self.rules[index] = replacement;
            }
            self.rules[index].validate()?;

            let pattern = self.rules[index].pattern().to_string();
            let methods = self.rules[index].methods();
            let stripped = (pattern.len() > 1 && pattern.ends_with('/'))
                .then(|| pattern[..pattern.len() - 1].to_string());

            for method in methods.iter() {
                let per_method = &mut self.per_methods[method.index()];
                per_method.rules.push(Some(index));
                let rule_id = (per_method.rules.len() - 1) as u32;
                per_method.trie.add(&pattern, rule_id)?;

                // Directory case: a request for '/about' matches an
                // '/about/' rule through the redirect id.
                if let Some(stripped) = &stripped {
                    per_method
                        .trie
                        .add(stripped, RULE_SPECIAL_REDIRECT_SLASH)?;
                }
            }
        }
        for per_method in &mut self.per_methods {
            per_method.trie.validate()?;
        }
        Ok(())
    }

    /// Dispatch a request, filling in `res`.
    pub fn handle(&self, req: &Request, res: &mut Response) {
        let mut method = req.method();
        if method == Method::Head {
            method = Method::Get;
        } else if method == Method::Options {
            self.handle_options(req, res);
            return;
        }

        self.dispatch(req, res, method);

        // Set last: handlers replace the response wholesale, and the flag
        // must survive whatever outcome dispatch produced.
        if req.method() == Method::Head {
            res.set_head_response(true);
        }
    }

    fn dispatch(&self, req: &Request, res: &mut Response, method: Method) {
        let per_method = &self.per_methods[method.index()];
        let (rule_id, params) = per_method.trie.find(req.path());

        if rule_id == 0 {
            if self.any_method_matches(req.path()) {
                debug!("cannot match method {} {}", req.path(), method);
                *res = Response::new(StatusCode::METHOD_NOT_ALLOWED);
                return;
            }
            if self.catchall.has_handler() {
                debug!(
                    "cannot match rules {}, redirecting to catchall rule",
                    req.path()
                );
                self.invoke_isolated(res, |res| self.catchall.invoke(req, res));
            } else {
                debug!("cannot match rules {}", req.path());
                *res = Response::new(StatusCode::NOT_FOUND);
            }
            return;
        }

        if rule_id == RULE_SPECIAL_REDIRECT_SLASH {
            redirect_with_slash(req, res);
            return;
        }

        let rule = self.rule_for(per_method, rule_id);
        debug!(
            "matched rule '{}' {} / {:#x}",
            rule.pattern(),
            req.method(),
            rule.methods().bits()
        );
        self.invoke_isolated(res, |res| rule.handle(req, res, &params));
    }

    /// Dispatch an upgrade request, transferring socket ownership to the
    /// matched rule. Returns the connection handoff on a successful upgrade;
    /// `None` means the response carries the outcome (404, 405, 301, 500).
    pub fn handle_upgrade(
        &self,
        req: &Request,
        res: &mut Response,
        socket: Socket,
    ) -> Option<Connection> {
        let per_method = &self.per_methods[req.method().index()];
        let rule_id = per_method.trie.find(req.path()).0;

        if rule_id == 0 {
            if self.any_method_matches(req.path()) {
                debug!("cannot match method {} {}", req.path(), req.method());
                *res = Response::new(StatusCode::METHOD_NOT_ALLOWED);
            } else {
                debug!("cannot match rules {}", req.path());
                *res = Response::new(StatusCode::NOT_FOUND);
            }
            return None;
        }

        if rule_id == RULE_SPECIAL_REDIRECT_SLASH {
            redirect_with_slash(req, res);
            return None;
        }

        let rule = self.rule_for(per_method, rule_id);
        debug!(
            "matched rule (upgrade) '{}' {} / {:#x}",
            rule.pattern(),
            req.method(),
            rule.methods().bits()
        );
        match panic::catch_unwind(AssertUnwindSafe(|| rule.handle_upgrade(req, res, socket))) {
            Ok(connection) => connection,
            Err(payload) => {
                error!(
                    "an uncaught panic occurred: {}",
                    panic_message(payload.as_ref())
                );
                *res = Response::new(StatusCode::INTERNAL_SERVER_ERROR);
                None
            }
        }
    }

    /// Log every per-method trie, one tree per method.
    pub fn debug_print(&self) {
        for method in Method::ALL {
            debug!("{method}");
            self.per_methods[method.index()].trie.debug_print();
        }
    }

    fn handle_options(&self, req: &Request, res: &mut Response) {
        const PREFIX: &str = "OPTIONS, HEAD, ";
        let mut allow = String::from(PREFIX);

        if req.path() == "/*" {
            for method in Method::ALL {
                if !self.per_methods[method.index()].trie.is_empty() {
                    allow.push_str(method.as_str());
                    allow.push_str(", ");
                }
            }
            allow.truncate(allow.len() - 2);
            *res = Response::new(StatusCode::NO_CONTENT);
            res.set_header("Allow", allow);
            res.set_manual_length_header(true);
            return;
        }

        for method in Method::ALL {
            if self.per_methods[method.index()].trie.find(req.path()).0 != 0 {
                allow.push_str(method.as_str());
                allow.push_str(", ");
            }
        }
        if allow != PREFIX {
            allow.truncate(allow.len() - 2);
            *res = Response::new(StatusCode::NO_CONTENT);
            res.set_header("Allow", allow);
            res.set_manual_length_header(true);
        } else {
            debug!("cannot match rules {}", req.path());
            *res = Response::new(StatusCode::NOT_FOUND);
        }
    }

    fn any_method_matches(&self, path: &str) -> bool {
        self.per_methods
            .iter()
            .any(|per_method| per_method.trie.find(path).0 != 0)
    }

    /// Resolve a non-reserved rule id to its rule, panicking on a corrupted
    /// table: that is a programming error, not a request error.
    fn rule_for<'a>(&'a self, per_method: &PerMethod, rule_id: u32) -> &'a dyn Rule {
        per_method
            .rules
            .get(rule_id as usize)
            .copied()
            .flatten()
            .and_then(|index| self.rules.get(index))
            .map(|rule| &**rule)
            .unwrap_or_else(|| panic!("trie internal structure corrupted!"))
    }

    /// Run a handler under panic isolation: any panic becomes a 500.
    fn invoke_isolated(&self, res: &mut Response, invoke: impl FnOnce(&mut Response)) {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| invoke(res))) {
            error!(
                "an uncaught panic occurred: {}",
                panic_message(payload.as_ref())
            );
            *res = Response::new(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

fn redirect_with_slash(req: &Request, res: &mut Response) {
    info!("redirecting to a url with trailing slash: {}", req.path());
    *res = Response::new(StatusCode::MOVED_PERMANENTLY);
    let location = match req.headers().get_str("Host") {
        Some(host) if !host.is_empty() => format!("http://{host}{}/", req.path()),
        _ => format!("{}/", req.path()),
    };
    res.set_header("Location", location);
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "the type was unknown so no information was available"
    }
}

//! Build-time error taxonomy.
//!
//! Everything here is fatal at startup: registration and validation report
//! these and the application is expected to halt with the message. Request
//! outcomes (404, 405, 301, 500) are expressed through the response, never
//! through this type.

use thiserror::Error;

/// Errors raised while building or validating a router.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// The exact same pattern was registered twice within one method.
    #[error("handler already exists for {pattern}")]
    PatternConflict {
        /// The duplicated pattern.
        pattern: String,
    },

    /// A rule reached `validate()` without a handler attached.
    #[error("{}no handler for url {pattern}", name_prefix(.name))]
    HandlerMissing {
        /// The rule's pattern.
        pattern: String,
        /// The rule's display name, when set.
        name: Option<String>,
    },

    /// A handler's parameter list disagrees with the pattern's tokens.
    #[error("{}handler type is mismatched with URL parameters: {pattern}", name_prefix(.name))]
    HandlerArityMismatch {
        /// The rule's pattern.
        pattern: String,
        /// The rule's display name, when set.
        name: Option<String>,
    },

    /// A `<...>` sequence in a pattern is not a recognized parameter token.
    #[error("invalid parameter token {token} in pattern {pattern}")]
    InvalidParameterToken {
        /// The pattern containing the token.
        pattern: String,
        /// The unrecognized token text.
        token: String,
    },

    /// Internal invariant violation: the trie root stopped being simple.
    #[error("internal error: trie root should be simple")]
    RootNotSimple,
}

fn name_prefix(name: &Option<String>) -> String {
    match name {
        Some(name) => format!("{name}: "),
        None => String::new(),
    }
}

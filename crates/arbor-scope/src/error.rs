use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::entry::EntryKind;
use crate::scope::ScopeId;

/// Errors raised by scope-tree operations.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum ScopeError {
    /// No live binding for `name` on the whole chain up to and including the root.
    /// Fatal to the current evaluation.
    #[error("Unresolved name: could not find `{name}` in any enclosing scope")]
    #[diagnostic(
        code(arbor_scope::unresolved_name),
        help("Check that the name is defined in this scope or one of its parents")
    )]
    UnresolvedName {
        name: String,
    },

    /// The key is already live in the target scope.
    ///
    /// The `add_*` family reports this as `Ok(false)`; only the convenience
    /// constructors that allocate a scope on the caller's behalf raise it.
    #[error("Redefinition: `{name}` is already defined in this scope")]
    #[diagnostic(code(arbor_scope::redefinition))]
    Redefinition {
        name: String,
    },

    /// A binding was accessed through an accessor for a different kind.
    #[error("Type mismatch: `{name}` is bound to a {found}, not a {expected}")]
    #[diagnostic(code(arbor_scope::type_mismatch))]
    TypeMismatch {
        name: String,
        expected: EntryKind,
        found: EntryKind,
    },

    /// The caller broke a structural contract of the tree (re-parenting,
    /// cycles, a missing last-result slot).
    #[error("Scope invariant violated: {message}")]
    #[diagnostic(
        code(arbor_scope::invariant_violation),
        help("This is a bug in the code driving the scope tree, not in the interpreted program")
    )]
    InvariantViolation {
        message: String,
    },

    /// The id does not name a live scope of this tree.
    #[error("Unknown scope {id}: it was never created here or has been discarded")]
    #[diagnostic(code(arbor_scope::unknown_scope))]
    UnknownScope {
        id: ScopeId,
    },
}

impl ScopeError {
    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        ScopeError::InvariantViolation { message: message.into() }
    }
}

/// Convenience alias used throughout the crate.
pub type ScopeResult<T> = Result<T, ScopeError>;

/// Errors that can occur while loading a [`ScopeConfig`](crate::config::ScopeConfig).
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Error reading scope configuration {}: {message}", path.display())]
    #[diagnostic(
        code(arbor_scope::config_io),
        help("Check that the file exists and is readable")
    )]
    Io {
        path: PathBuf,
        message: String,
    },

    #[error("Could not parse scope configuration: {0}")]
    #[diagnostic(code(arbor_scope::config_parse))]
    Parse(String),

    #[error("Invalid scope configuration: {0}")]
    #[diagnostic(
        code(arbor_scope::config_invalid),
        help("Key prefixes must be non-empty and no prefix may start with another")
    )]
    Invalid(String),
}

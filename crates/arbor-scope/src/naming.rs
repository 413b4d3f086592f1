//! Key conventions for bindings that share a scope's namespace.
//!
//! Functions, call scopes and thread scopes live in the same string namespace
//! as ordinary objects. Their keys carry a category prefix so they can never
//! collide with a user-visible name. [`ScopeTree`](crate::ScopeTree) applies
//! these itself in its function, call-scope and thread-scope operations.

use serde::{Deserialize, Serialize};

pub const DEFAULT_FUNCTION_PREFIX: &str = "__arbor_inner_function_";
pub const DEFAULT_CALL_SCOPE_PREFIX: &str = "__arbor_inner_call_scope_";
pub const DEFAULT_THREAD_SCOPE_PREFIX: &str = "__arbor_thread_scope_";
pub const DEFAULT_LAST_RESULT_KEY: &str = "last-execution-result";

/// Category prefixes and the reserved last-result key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Prefix prepended to a function signature.
    #[serde(default = "default_function_prefix")]
    pub function_prefix: String,

    /// Prefix prepended to the name of a call scope.
    #[serde(default = "default_call_scope_prefix")]
    pub call_scope_prefix: String,

    /// Prefix prepended to the numeric id of a thread scope.
    #[serde(default = "default_thread_scope_prefix")]
    pub thread_scope_prefix: String,

    /// Key of the slot every scope reserves for the most recent result.
    #[serde(default = "default_last_result_key")]
    pub last_result_key: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            function_prefix: default_function_prefix(),
            call_scope_prefix: default_call_scope_prefix(),
            thread_scope_prefix: default_thread_scope_prefix(),
            last_result_key: default_last_result_key(),
        }
    }
}

pub fn default_function_prefix() -> String {
    DEFAULT_FUNCTION_PREFIX.to_string()
}

pub fn default_call_scope_prefix() -> String {
    DEFAULT_CALL_SCOPE_PREFIX.to_string()
}

pub fn default_thread_scope_prefix() -> String {
    DEFAULT_THREAD_SCOPE_PREFIX.to_string()
}

pub fn default_last_result_key() -> String {
    DEFAULT_LAST_RESULT_KEY.to_string()
}

impl NamingConfig {
    /// Key under which a function with `signature` is bound.
    pub fn function_key(&self, signature: &str) -> String {
        format!("{}{}", self.function_prefix, signature)
    }

    /// Key under which the call scope `name` is bound.
    pub fn call_scope_key(&self, name: &str) -> String {
        format!("{}{}", self.call_scope_prefix, name)
    }

    /// Key under which the private scope of thread `id` is bound.
    pub fn thread_scope_key(&self, id: usize) -> String {
        format!("{}{}", self.thread_scope_prefix, id)
    }

    /// Recovers the signature from a function key.
    pub fn function_signature<'k>(&self, key: &'k str) -> Option<&'k str> {
        key.strip_prefix(self.function_prefix.as_str())
    }

    /// Recovers the thread id from a thread-scope key.
    pub fn thread_id(&self, key: &str) -> Option<usize> {
        key.strip_prefix(self.thread_scope_prefix.as_str())?.parse().ok()
    }

    pub(crate) fn prefixes(&self) -> [(&'static str, &str); 3] {
        [
            ("function_prefix", self.function_prefix.as_str()),
            ("call_scope_prefix", self.call_scope_prefix.as_str()),
            ("thread_scope_prefix", self.thread_scope_prefix.as_str()),
        ]
    }
}

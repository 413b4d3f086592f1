//! Lexical scope tree for the Arbor runtime.
//!
//! A [`ScopeTree`] owns every scope of an interpreter. Each scope binds names
//! to objects, functions or child scopes, resolves identifiers by walking
//! towards the root, and reports the objects it keeps alive to the heap's
//! collector through [`ScopeTree::get_all_objects`] / [`ScopeTree::visit_roots`].

pub mod config;
pub mod dump;
pub mod entry;
pub mod error;
pub mod naming;
pub mod resolve;
pub mod roots;
pub mod scope;
pub mod shared;
pub mod tree;

pub use config::{ScopeConfig, TableConfig};
pub use entry::{EntryKind, FunctionRef, ObjectRef, ScopeEntry};
pub use error::{ConfigError, ScopeError, ScopeResult};
pub use naming::NamingConfig;
pub use resolve::{Resolution, ScopeChain};
pub use roots::{RootSet, RootVisitor};
pub use scope::{Scope, ScopeId};
pub use shared::SharedScopeTree;
pub use tree::ScopeTree;

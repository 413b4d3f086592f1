//! Name resolution along the scope chain.

use crate::entry::{EntryKind, FunctionRef, ObjectRef, ScopeEntry};
use crate::error::{ScopeError, ScopeResult};
use crate::scope::{Scope, ScopeId};
use crate::tree::ScopeTree;

/// Where a name resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// The binding that won.
    pub entry: ScopeEntry,
    /// The scope holding the binding.
    pub scope: ScopeId,
    /// How many parent links were followed to reach `scope`.
    pub depth: usize,
}

/// Iterator from a scope up through its ancestors to the root.
pub struct ScopeChain<'a> {
    tree: &'a ScopeTree,
    next: Option<ScopeId>,
}

impl<'a> Iterator for ScopeChain<'a> {
    type Item = (ScopeId, &'a Scope);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let scope = self.tree.scope(id).ok()?;
        self.next = scope.parent;
        Some((id, scope))
    }
}

impl ScopeTree {
    /// Walks from `scope` to the root, starting with `scope` itself.
    pub fn scope_chain(&self, scope: ScopeId) -> ScopeResult<ScopeChain<'_>> {
        self.scope(scope)?;
        Ok(ScopeChain { tree: self, next: Some(scope) })
    }

    /// Resolves `name` to the nearest enclosing binding of any kind.
    ///
    /// Fails with [`ScopeError::UnresolvedName`] if no scope on the chain,
    /// the root included, binds `name`.
    pub fn name_lookup(&self, scope: ScopeId, name: &str) -> ScopeResult<ScopeEntry> {
        self.resolve(scope, name).map(|resolution| resolution.entry)
    }

    /// Like [`name_lookup`](ScopeTree::name_lookup), also reporting which
    /// scope held the binding.
    pub fn resolve(&self, scope: ScopeId, name: &str) -> ScopeResult<Resolution> {
        for (depth, (id, current)) in self.scope_chain(scope)?.enumerate() {
            if let Some(entry) = current.get(name) {
                log::trace!("resolved `{name}` from {scope} in {id} at depth {depth}");
                return Ok(Resolution { entry, scope: id, depth });
            }
        }
        Err(ScopeError::UnresolvedName { name: name.to_string() })
    }

    /// Resolves `name` through the chain and requires an object binding.
    pub fn lookup_object(&self, scope: ScopeId, name: &str) -> ScopeResult<Option<ObjectRef>> {
        match self.name_lookup(scope, name)? {
            ScopeEntry::Object(object) => Ok(object),
            other => Err(ScopeError::TypeMismatch {
                name: name.to_string(),
                expected: EntryKind::Object,
                found: other.kind(),
            }),
        }
    }

    /// Resolves the function for `signature` through the chain.
    pub fn lookup_function(&self, scope: ScopeId, signature: &str) -> ScopeResult<FunctionRef> {
        let key = self.naming().function_key(signature);
        match self.name_lookup(scope, &key)? {
            ScopeEntry::Function(function) => Ok(function),
            other => Err(ScopeError::TypeMismatch {
                name: key,
                expected: EntryKind::Function,
                found: other.kind(),
            }),
        }
    }

    /// Number of ancestors of `scope`.
    pub fn depth(&self, scope: ScopeId) -> ScopeResult<usize> {
        Ok(self.scope_chain(scope)?.count() - 1)
    }

    /// The root of the tree `scope` belongs to.
    pub fn root_of(&self, scope: ScopeId) -> ScopeResult<ScopeId> {
        let mut root = scope;
        for (id, _) in self.scope_chain(scope)? {
            root = id;
        }
        Ok(root)
    }

    /// Whether `ancestor` is `scope` or lies on its chain.
    pub fn is_ancestor(&self, ancestor: ScopeId, scope: ScopeId) -> ScopeResult<bool> {
        Ok(self.scope_chain(scope)?.any(|(id, _)| id == ancestor))
    }
}

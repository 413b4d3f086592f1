//! Root enumeration for the heap's collector.
//!
//! Every non-null object bound in a scope or in any scope registered below it
//! is a root. The collector relies on this set being complete: an object
//! missing here may be reclaimed while still reachable by name.

use rustc_hash::FxHashSet;

use crate::entry::{ObjectRef, ScopeEntry};
use crate::error::ScopeResult;
use crate::scope::ScopeId;
use crate::tree::ScopeTree;

/// Receives the roots found during a traversal.
pub trait RootVisitor {
    fn visit(&mut self, object: ObjectRef);
}

impl<F: FnMut(ObjectRef)> RootVisitor for F {
    fn visit(&mut self, object: ObjectRef) {
        self(object)
    }
}

/// A deduplicated set of roots that remembers first-seen order.
#[derive(Debug, Clone, Default)]
pub struct RootSet {
    seen: FxHashSet<ObjectRef>,
    order: Vec<ObjectRef>,
}

impl RootSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, object: ObjectRef) -> bool {
        self.seen.contains(&object)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ObjectRef> + '_ {
        self.order.iter().copied()
    }

    pub fn into_vec(self) -> Vec<ObjectRef> {
        self.order
    }
}

impl RootVisitor for RootSet {
    fn visit(&mut self, object: ObjectRef) {
        if self.seen.insert(object) {
            self.order.push(object);
        }
    }
}

impl ScopeTree {
    /// Streams every object reachable from `scope` to `visitor`, depth-first
    /// in binding order.
    ///
    /// An object bound under several names is visited once per binding; use a
    /// [`RootSet`] to deduplicate. Depth is unbounded: the traversal keeps its
    /// own stack instead of recursing.
    pub fn visit_roots(&self, scope: ScopeId, visitor: &mut dyn RootVisitor) -> ScopeResult<()> {
        let mut stack = vec![self.scope(scope)?.bindings.values()];
        let mut visited_scopes = 1usize;

        while let Some(entries) = stack.last_mut() {
            match entries.next() {
                Some(ScopeEntry::Object(Some(object))) => visitor.visit(*object),
                Some(ScopeEntry::Scope(child)) => {
                    stack.push(self.scope(*child)?.bindings.values());
                    visited_scopes += 1;
                }
                Some(_) => {}
                None => {
                    stack.pop();
                }
            }
        }

        log::trace!("enumerated roots of {scope} across {visited_scopes} scopes");
        Ok(())
    }

    /// Every distinct object reachable from `scope`: its own object bindings
    /// and, recursively, those of every child scope bound in it.
    pub fn get_all_objects(&self, scope: ScopeId) -> ScopeResult<Vec<ObjectRef>> {
        let mut roots = RootSet::new();
        self.visit_roots(scope, &mut roots)?;
        Ok(roots.into_vec())
    }
}

//! A scope tree shared between executor threads.
//!
//! [`ScopeTree`] does no locking of its own. `SharedScopeTree` puts one
//! reader-writer lock around the whole tree: registering a thread's private
//! scope holds the write lock only for allocation and registration, and pure
//! resolutions from several threads share the read lock.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::entry::{ObjectRef, ScopeEntry};
use crate::error::{ScopeError, ScopeResult};
use crate::scope::ScopeId;
use crate::tree::ScopeTree;

#[derive(Debug, Clone, Default)]
pub struct SharedScopeTree {
    inner: Arc<RwLock<ScopeTree>>,
}

impl SharedScopeTree {
    pub fn new(tree: ScopeTree) -> Self {
        SharedScopeTree {
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    /// Shared access for resolution and traversal.
    pub fn read(&self) -> RwLockReadGuard<'_, ScopeTree> {
        self.inner.read()
    }

    /// Exclusive access for mutation.
    pub fn write(&self) -> RwLockWriteGuard<'_, ScopeTree> {
        self.inner.write()
    }

    /// Allocates the private scope of thread `thread_id` and registers it
    /// under `parent` with the thread-scope key.
    ///
    /// Fails with [`ScopeError::Redefinition`] if `parent` already has a scope
    /// for that thread id.
    pub fn spawn_thread_scope(&self, parent: ScopeId, thread_id: usize) -> ScopeResult<ScopeId> {
        let mut tree = self.inner.write();
        tree.scope(parent)?;
        let child = tree.create_scope();
        match tree.add_thread_scope(parent, thread_id, child) {
            Ok(true) => {
                log::debug!("spawned scope {child} for thread {thread_id} under {parent}");
                Ok(child)
            }
            Ok(false) => {
                tree.discard(child)?;
                Err(ScopeError::Redefinition {
                    name: tree.naming().thread_scope_key(thread_id),
                })
            }
            Err(err) => {
                tree.discard(child)?;
                Err(err)
            }
        }
    }

    pub fn name_lookup(&self, scope: ScopeId, name: &str) -> ScopeResult<ScopeEntry> {
        self.inner.read().name_lookup(scope, name)
    }

    pub fn get_all_objects(&self, scope: ScopeId) -> ScopeResult<Vec<ObjectRef>> {
        self.inner.read().get_all_objects(scope)
    }

    /// Runs `f` with exclusive access to the tree.
    pub fn with_write<R>(&self, f: impl FnOnce(&mut ScopeTree) -> R) -> R {
        f(&mut self.inner.write())
    }
}

impl From<ScopeTree> for SharedScopeTree {
    fn from(tree: ScopeTree) -> Self {
        Self::new(tree)
    }
}

//! The scope arena and its mutation and single-level access operations.

use std::sync::atomic::{AtomicU32, Ordering};

use arbor_table::BindingTable;
use slab::Slab;

use crate::config::ScopeConfig;
use crate::entry::{EntryKind, FunctionRef, ObjectRef, ScopeEntry};
use crate::error::{ConfigError, ScopeError, ScopeResult};
use crate::naming::NamingConfig;
use crate::scope::{Scope, ScopeId};

/// Source of the stamp that distinguishes the ids of different trees.
static NEXT_TREE_STAMP: AtomicU32 = AtomicU32::new(0);

fn next_tree_stamp() -> u32 {
    NEXT_TREE_STAMP.fetch_add(1, Ordering::Relaxed)
}

/// Owns every scope of one interpreter and keeps their parent links consistent.
///
/// Scopes are addressed by [`ScopeId`]. A scope created with [`create_scope`]
/// starts as a root; registering it under another scope sets its parent
/// exactly once. Re-parenting, registering a scope under itself or under one of
/// its own descendants are rejected, so the tree stays acyclic.
///
/// The tree performs no locking. See [`SharedScopeTree`](crate::SharedScopeTree)
/// for use across threads.
///
/// [`create_scope`]: ScopeTree::create_scope
#[derive(Debug)]
pub struct ScopeTree {
    /// Stamped into every id this tree hands out.
    stamp: u32,
    /// Arena of live scopes.
    pub(crate) scopes: Slab<Scope>,
    /// Generation stamped on the next scope created.
    next_generation: u32,
    pub(crate) config: ScopeConfig,
}

impl ScopeTree {
    /// Creates an empty tree with the default configuration.
    pub fn new() -> Self {
        ScopeTree {
            stamp: next_tree_stamp(),
            scopes: Slab::new(),
            next_generation: 0,
            config: ScopeConfig::default(),
        }
    }

    /// Creates an empty tree with a validated configuration.
    pub fn with_config(config: ScopeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(ScopeTree {
            stamp: next_tree_stamp(),
            scopes: Slab::new(),
            next_generation: 0,
            config,
        })
    }

    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    pub fn naming(&self) -> &NamingConfig {
        &self.config.naming
    }

    /// Number of live scopes.
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn contains(&self, id: ScopeId) -> bool {
        self.scope(id).is_ok()
    }

    /// Allocates a new, unparented scope.
    ///
    /// The scope starts with the last-result slot bound to a null object.
    pub fn create_scope(&mut self) -> ScopeId {
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);

        let mut bindings = BindingTable::with_compact_threshold(self.config.table.compact_threshold);
        bindings.add(self.config.naming.last_result_key.clone(), ScopeEntry::Object(None));

        let index = self.scopes.insert(Scope::new(generation, bindings));
        let id = ScopeId {
            tree: self.stamp,
            index,
            generation,
        };
        log::debug!("created scope {id}");
        id
    }

    /// Read access to a live scope.
    pub fn scope(&self, id: ScopeId) -> ScopeResult<&Scope> {
        self.scopes
            .get(id.index)
            .filter(|scope| id.tree == self.stamp && scope.generation == id.generation)
            .ok_or(ScopeError::UnknownScope { id })
    }

    pub(crate) fn scope_mut(&mut self, id: ScopeId) -> ScopeResult<&mut Scope> {
        self.scopes
            .get_mut(id.index)
            .filter(|scope| id.tree == self.stamp && scope.generation == id.generation)
            .ok_or(ScopeError::UnknownScope { id })
    }

    // --- Mutation -----------------------------------------------------------

    /// Binds `object` to `name` in `scope`.
    ///
    /// Returns `Ok(false)` without changing anything if `name` is already live
    /// in this scope. Shadowing only happens across scope levels.
    pub fn add_object(&mut self, scope: ScopeId, name: &str, object: ObjectRef) -> ScopeResult<bool> {
        self.add(scope, name, ScopeEntry::object(object))
    }

    /// Binds `function` under the function key derived from `signature`.
    ///
    /// Overloads are distinguished purely by exact signature text.
    pub fn add_function(&mut self, scope: ScopeId, signature: &str, function: FunctionRef) -> ScopeResult<bool> {
        let key = self.config.naming.function_key(signature);
        self.add(scope, &key, ScopeEntry::function(function))
    }

    /// Registers `child` as a child of `scope` under `name`.
    ///
    /// `child` must be unparented (or parented here but currently unbound) and
    /// must not be `scope` or one of its ancestors. On a name collision the
    /// result is `Ok(false)` and `child` stays unparented.
    pub fn add_child_scope(&mut self, scope: ScopeId, name: &str, child: ScopeId) -> ScopeResult<bool> {
        self.add(scope, name, ScopeEntry::Scope(child))
    }

    /// Registers `child` under the call-scope key for `name`.
    pub fn add_call_scope(&mut self, scope: ScopeId, name: &str, child: ScopeId) -> ScopeResult<bool> {
        let key = self.config.naming.call_scope_key(name);
        self.add_child_scope(scope, &key, child)
    }

    /// Registers `child` as the private scope of thread `thread_id`.
    pub fn add_thread_scope(&mut self, scope: ScopeId, thread_id: usize, child: ScopeId) -> ScopeResult<bool> {
        let key = self.config.naming.thread_scope_key(thread_id);
        self.add_child_scope(scope, &key, child)
    }

    /// Allocates a scope and registers it under `name` in one step.
    ///
    /// Fails with [`ScopeError::Redefinition`] if `name` is taken; the scope
    /// allocated for the attempt is released again.
    pub fn new_child_scope(&mut self, scope: ScopeId, name: &str) -> ScopeResult<ScopeId> {
        self.scope(scope)?;
        let child = self.create_scope();
        match self.add_child_scope(scope, name, child) {
            Ok(true) => Ok(child),
            Ok(false) => {
                self.discard(child)?;
                Err(ScopeError::Redefinition { name: name.to_string() })
            }
            Err(err) => {
                self.discard(child)?;
                Err(err)
            }
        }
    }

    /// Binds an arbitrary entry under `name` without key mangling.
    ///
    /// Scope entries go through the same parenting checks as
    /// [`add_child_scope`](ScopeTree::add_child_scope).
    pub fn add(&mut self, scope: ScopeId, name: &str, entry: ScopeEntry) -> ScopeResult<bool> {
        if let ScopeEntry::Scope(child) = entry {
            self.check_adoptable(scope, child)?;
        }

        let target = self.scope_mut(scope)?;
        if target.contains(name) {
            log::trace!("refusing to redefine `{name}` in scope {scope}");
            return Ok(false);
        }
        target.bindings.add(name, entry);

        if let ScopeEntry::Scope(child) = entry {
            self.adopt(scope, child)?;
        }
        Ok(true)
    }

    /// Overwrites the binding for `name` in place, or adds it if absent.
    ///
    /// Repeating the same call leaves the scope unchanged. The last-result
    /// slot only accepts object entries.
    pub fn change(&mut self, scope: ScopeId, name: &str, entry: ScopeEntry) -> ScopeResult<()> {
        if name == self.config.naming.last_result_key && entry.kind() != EntryKind::Object {
            return Err(ScopeError::invariant(format!(
                "the last-result slot `{name}` can only hold an object, not a {}",
                entry.kind()
            )));
        }

        let current = self.scope(scope)?.get(name);
        if let ScopeEntry::Scope(child) = entry {
            if current != Some(entry) {
                self.check_adoptable(scope, child)?;
            }
        }
        if let Some(ScopeEntry::Scope(previous)) = current {
            if current != Some(entry) {
                log::debug!("binding `{name}` in scope {scope} no longer refers to child {previous}");
            }
        }

        self.scope_mut(scope)?.bindings.upsert(name, entry);

        if let ScopeEntry::Scope(child) = entry {
            self.adopt(scope, child)?;
        }
        Ok(())
    }

    /// Removes the binding for `name` from `scope` only.
    ///
    /// Returns whether a binding was removed. The last-result slot cannot be
    /// deleted. Deleting a scope binding unbinds the child but keeps it owned
    /// by `scope`; use [`discard`](ScopeTree::discard) to reclaim it.
    pub fn del(&mut self, scope: ScopeId, name: &str) -> ScopeResult<bool> {
        self.scope(scope)?;
        if name == self.config.naming.last_result_key {
            log::warn!("ignoring attempt to delete the last-result slot of scope {scope}");
            return Ok(false);
        }
        Ok(self.scope_mut(scope)?.bindings.del(name).is_some())
    }

    /// Removes `scope` and every scope below it from the arena.
    ///
    /// Its bindings in the parent are removed as well. Returns the number of
    /// scopes released. Ids of released scopes become unknown to the tree.
    pub fn discard(&mut self, scope: ScopeId) -> ScopeResult<usize> {
        let parent = self.scope(scope)?.parent;

        if let Some(parent_id) = parent {
            let parent_scope = self.scope_mut(parent_id)?;
            for name in parent_scope.names_of(scope) {
                parent_scope.bindings.del(&name);
            }
            parent_scope.children.retain(|child| *child != scope);
        }

        let mut released = 0;
        let mut pending = vec![scope];
        while let Some(id) = pending.pop() {
            if self.scope(id).is_err() {
                continue;
            }
            let removed = self.scopes.remove(id.index);
            pending.extend(removed.children);
            released += 1;
        }

        log::debug!("discarded scope {scope} ({released} scopes released)");
        Ok(released)
    }

    // --- Single-level access ------------------------------------------------

    /// Raw local lookup of `name`, without key mangling.
    pub fn get(&self, scope: ScopeId, name: &str) -> ScopeResult<Option<ScopeEntry>> {
        Ok(self.scope(scope)?.get(name))
    }

    /// Local lookup of an object binding.
    ///
    /// `Ok(None)` if `name` is unbound here or bound to a null object;
    /// [`ScopeError::TypeMismatch`] if it is bound to something else.
    pub fn get_object(&self, scope: ScopeId, name: &str) -> ScopeResult<Option<ObjectRef>> {
        match self.get(scope, name)? {
            None => Ok(None),
            Some(ScopeEntry::Object(object)) => Ok(object),
            Some(other) => Err(mismatch(name, EntryKind::Object, other)),
        }
    }

    /// Local lookup of the function bound for `signature`.
    pub fn get_function(&self, scope: ScopeId, signature: &str) -> ScopeResult<Option<FunctionRef>> {
        let key = self.config.naming.function_key(signature);
        match self.get(scope, &key)? {
            None => Ok(None),
            Some(ScopeEntry::Function(function)) => Ok(Some(function)),
            Some(other) => Err(mismatch(&key, EntryKind::Function, other)),
        }
    }

    /// Local lookup of a child scope bound under `name`.
    pub fn get_child_scope(&self, scope: ScopeId, name: &str) -> ScopeResult<Option<ScopeId>> {
        match self.get(scope, name)? {
            None => Ok(None),
            Some(ScopeEntry::Scope(child)) => Ok(Some(child)),
            Some(other) => Err(mismatch(name, EntryKind::Scope, other)),
        }
    }

    /// Local lookup of the private scope of thread `thread_id`.
    pub fn get_thread_scope(&self, scope: ScopeId, thread_id: usize) -> ScopeResult<Option<ScopeId>> {
        let key = self.config.naming.thread_scope_key(thread_id);
        self.get_child_scope(scope, &key)
    }

    /// Snapshot of every live binding of `scope`, in insertion order.
    pub fn get_all(&self, scope: ScopeId) -> ScopeResult<Vec<(String, ScopeEntry)>> {
        Ok(self.scope(scope)?.get_all())
    }

    /// Child scopes bound directly in `scope`, in binding order.
    pub fn get_all_children(&self, scope: ScopeId) -> ScopeResult<Vec<ScopeId>> {
        Ok(self.scope(scope)?.get_all_children())
    }

    pub fn parent(&self, scope: ScopeId) -> ScopeResult<Option<ScopeId>> {
        Ok(self.scope(scope)?.parent)
    }

    // --- Last execution result ----------------------------------------------

    /// Records `value` as the most recent result in `scope`.
    pub fn update_last_exec_res(&mut self, scope: ScopeId, value: Option<ObjectRef>) -> ScopeResult<()> {
        let key = self.config.naming.last_result_key.clone();
        self.scope_mut(scope)?.bindings.upsert(key, ScopeEntry::Object(value));
        Ok(())
    }

    /// Binds the most recent result of `scope` to `name`.
    pub fn store_last_exec_res(&mut self, scope: ScopeId, name: &str) -> ScopeResult<()> {
        let entry = self.last_exec_entry(scope)?;
        self.change(scope, name, entry)
    }

    /// The most recent result recorded in `scope`.
    pub fn last_exec_res(&self, scope: ScopeId) -> ScopeResult<Option<ObjectRef>> {
        match self.last_exec_entry(scope)? {
            ScopeEntry::Object(object) => Ok(object),
            other => Err(ScopeError::invariant(format!(
                "last-result slot of scope {scope} holds a {}",
                other.kind()
            ))),
        }
    }

    fn last_exec_entry(&self, scope: ScopeId) -> ScopeResult<ScopeEntry> {
        let key = &self.config.naming.last_result_key;
        self.scope(scope)?
            .get(key)
            .ok_or_else(|| ScopeError::invariant(format!("scope {scope} lost its last-result slot `{key}`")))
    }

    // --- Parenting ----------------------------------------------------------

    /// Checks that `child` may be registered under `parent`.
    fn check_adoptable(&self, parent: ScopeId, child: ScopeId) -> ScopeResult<()> {
        self.scope(parent)?;
        let child_scope = self.scope(child)?;

        if child == parent {
            return Err(ScopeError::invariant(format!("scope {child} cannot be registered under itself")));
        }

        match child_scope.parent {
            None => {}
            Some(existing) if existing == parent => {
                // Re-binding a child that was unbound with `del` is allowed;
                // binding it under a second name is not.
                let parent_scope = self.scope(parent)?;
                if let Some(name) = parent_scope.names_of(child).first() {
                    return Err(ScopeError::invariant(format!(
                        "scope {child} is already bound in {parent} as `{name}`"
                    )));
                }
            }
            Some(existing) => {
                return Err(ScopeError::invariant(format!(
                    "scope {child} already has parent {existing} and cannot be re-parented under {parent}"
                )));
            }
        }

        // Only an unparented scope with descendants can sit above `parent`.
        if !child_scope.children.is_empty() && self.is_ancestor(child, parent)? {
            return Err(ScopeError::invariant(format!(
                "registering {child} under {parent} would create a cycle"
            )));
        }
        Ok(())
    }

    /// Sets the parent link of an already checked child.
    fn adopt(&mut self, parent: ScopeId, child: ScopeId) -> ScopeResult<()> {
        let child_scope = self.scope_mut(child)?;
        if child_scope.parent.is_some() {
            return Ok(());
        }
        child_scope.parent = Some(parent);
        self.scope_mut(parent)?.children.push(child);
        log::debug!("registered scope {child} under {parent}");
        Ok(())
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

fn mismatch(name: &str, expected: EntryKind, found: ScopeEntry) -> ScopeError {
    ScopeError::TypeMismatch {
        name: name.to_string(),
        expected,
        found: found.kind(),
    }
}

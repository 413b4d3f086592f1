use std::fmt;

use arbor_table::BindingTable;

use crate::entry::ScopeEntry;

/// Stable handle to a scope in a [`ScopeTree`](crate::ScopeTree).
///
/// The generation distinguishes a live scope from an earlier, discarded one
/// that occupied the same arena slot. The tree stamp ties the id to the tree
/// that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId {
    pub(crate) tree: u32,
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

/// A node of the scope tree: the local bindings of one lexical context.
///
/// Read access is public; mutation goes through the tree so that parent
/// links and child registrations stay consistent.
#[derive(Debug)]
pub struct Scope {
    pub(crate) generation: u32,
    /// Enclosing scope. Set once, when the scope is registered as a child.
    pub(crate) parent: Option<ScopeId>,
    /// Local bindings in insertion order.
    pub(crate) bindings: BindingTable<ScopeEntry>,
    /// Scopes parented here, whether or not they are still bound by name.
    /// This is the ownership edge used when a subtree is discarded.
    pub(crate) children: Vec<ScopeId>,
}

impl Scope {
    pub(crate) fn new(generation: u32, bindings: BindingTable<ScopeEntry>) -> Self {
        Scope {
            generation,
            parent: None,
            bindings,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// Live binding for `name` in this scope only.
    pub fn get(&self, name: &str) -> Option<ScopeEntry> {
        self.bindings.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Snapshot of the live bindings in insertion order.
    pub fn get_all(&self) -> Vec<(String, ScopeEntry)> {
        self.bindings
            .iter()
            .map(|(name, entry)| (name.to_string(), *entry))
            .collect()
    }

    /// Live bindings in insertion order, without copying.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &ScopeEntry)> + '_ {
        self.bindings.iter()
    }

    /// Direct child scopes bound in this scope, in binding order.
    pub fn get_all_children(&self) -> Vec<ScopeId> {
        self.bindings.values().filter_map(ScopeEntry::as_scope).collect()
    }

    /// Number of live bindings, including the last-result slot.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Names under which `child` is currently bound here.
    pub(crate) fn names_of(&self, child: ScopeId) -> Vec<String> {
        self.bindings
            .iter()
            .filter(|(_, entry)| entry.as_scope() == Some(child))
            .map(|(name, _)| name.to_string())
            .collect()
    }
}

//! Tagged binding values stored in a scope.

use std::fmt;
use std::num::NonZeroUsize;

use crate::scope::ScopeId;

/// Identity reference to an object owned by the managed heap.
///
/// The scope tree never dereferences it; it only stores, compares and reports
/// it to the collector. A null reference cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef(NonZeroUsize);

impl ObjectRef {
    /// Wraps a raw heap handle, returning `None` for the null handle.
    pub fn from_raw(raw: usize) -> Option<Self> {
        NonZeroUsize::new(raw).map(ObjectRef)
    }

    pub fn as_raw(self) -> usize {
        self.0.get()
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj@{:#x}", self.0.get())
    }
}

/// Identity reference to a function definition owned by the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionRef(NonZeroUsize);

impl FunctionRef {
    /// Wraps a raw function handle, returning `None` for the null handle.
    pub fn from_raw(raw: usize) -> Option<Self> {
        NonZeroUsize::new(raw).map(FunctionRef)
    }

    pub fn as_raw(self) -> usize {
        self.0.get()
    }
}

impl fmt::Display for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn@{:#x}", self.0.get())
    }
}

/// The kind tag of a [`ScopeEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Object,
    Function,
    Scope,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryKind::Object => "object",
            EntryKind::Function => "function",
            EntryKind::Scope => "scope",
        };
        f.write_str(name)
    }
}

/// A value bound to a name in a scope.
///
/// Equality is identity equality of the payload within the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeEntry {
    /// A managed object. `None` only appears in the last-result slot before
    /// anything has been evaluated, or when a null result was recorded.
    Object(Option<ObjectRef>),
    Function(FunctionRef),
    /// A child scope registered under this scope.
    Scope(ScopeId),
}

impl ScopeEntry {
    pub fn object(object: ObjectRef) -> Self {
        ScopeEntry::Object(Some(object))
    }

    pub fn function(function: FunctionRef) -> Self {
        ScopeEntry::Function(function)
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            ScopeEntry::Object(_) => EntryKind::Object,
            ScopeEntry::Function(_) => EntryKind::Function,
            ScopeEntry::Scope(_) => EntryKind::Scope,
        }
    }

    /// The child scope this entry refers to, if it is a scope entry.
    pub fn as_scope(&self) -> Option<ScopeId> {
        match self {
            ScopeEntry::Scope(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for ScopeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeEntry::Object(Some(object)) => write!(f, "object({object})"),
            ScopeEntry::Object(None) => f.write_str("object(null)"),
            ScopeEntry::Function(function) => write!(f, "function({function})"),
            ScopeEntry::Scope(id) => write!(f, "scope({id})"),
        }
    }
}

//! Human-readable rendering of a scope subtree, for debugging.

use std::fmt;

use arbor_table::Iter;

use crate::entry::ScopeEntry;
use crate::error::ScopeResult;
use crate::scope::ScopeId;
use crate::tree::ScopeTree;

/// Displays a scope and every child bound in it, one binding per line.
pub struct ScopeDump<'a> {
    tree: &'a ScopeTree,
    scope: ScopeId,
}

impl ScopeTree {
    /// Renders `scope` and its bound descendants as an indented listing.
    pub fn dump(&self, scope: ScopeId) -> ScopeResult<String> {
        self.scope(scope)?;
        Ok(ScopeDump { tree: self, scope }.to_string())
    }

    pub fn display(&self, scope: ScopeId) -> ScopeDump<'_> {
        ScopeDump { tree: self, scope }
    }
}

impl ScopeDump<'_> {
    /// Writes the bindings of `root` and of every bound child, depth-first.
    ///
    /// Keeps its own stack so that arbitrarily deep chains render.
    fn write_scope(&self, f: &mut fmt::Formatter<'_>, root: ScopeId, indent: usize) -> fmt::Result {
        let mut stack: Vec<(usize, Iter<'_, ScopeEntry>)> = match self.tree.scope(root) {
            Ok(scope) => vec![(indent, scope.bindings.iter())],
            Err(_) => return writeln!(f, "{:indent$}<discarded>", ""),
        };

        while let Some((indent, entries)) = stack.last_mut() {
            let indent = *indent;
            let Some((name, entry)) = entries.next() else {
                stack.pop();
                continue;
            };
            match entry {
                ScopeEntry::Scope(child) => {
                    writeln!(f, "{:indent$}{name}: scope {child}", "")?;
                    let nested = indent + 2;
                    match self.tree.scope(*child) {
                        Ok(scope) => stack.push((nested, scope.bindings.iter())),
                        Err(_) => writeln!(f, "{:nested$}<discarded>", "")?,
                    }
                }
                other => writeln!(f, "{:indent$}{name}: {other}", "")?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for ScopeDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "scope {}", self.scope)?;
        self.write_scope(f, self.scope, 2)
    }
}

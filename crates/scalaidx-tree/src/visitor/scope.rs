// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Lexical scopes and import bindings.
//!
//! Scopes live in a [`ScopeArena`] and refer to their parent by [`ScopeId`].
//! Each scope accumulates:
//! - the set of fully-qualified import strings seen in it or below it
//! - a mapping from short name to fully-qualified import
//!
//! # Propagation
//!
//! [`ScopeArena::add_import`] writes the import into the target scope and
//! every ancestor up to the root. After a full visit the root therefore holds
//! every import in the file, which is what extends resolution reads.
//!
//! # Lifetime
//!
//! The root scope is created with the arena and never popped. Nested scopes
//! follow the walker: [`ScopeArena::push`] on entering a typed node and
//! [`ScopeArena::pop`] on leaving it, in strict LIFO order.
//!
//! # Usage
//!
//! ```
//! use scalaidx_tree::visitor::ScopeArena;
//!
//! let mut scopes = ScopeArena::new();
//! let root = scopes.root();
//! let inner = scopes.push("stats", root);
//! scopes.add_import(inner, "x.y.Z", Some("Z"));
//! assert_eq!(scopes.resolve_symbol(root, "Z"), "x.y.Z");
//! scopes.pop(inner);
//! ```

use std::collections::{BTreeSet, HashMap};

use tracing::trace;

/// Handle to a scope in a [`ScopeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

impl ScopeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One lexical scope.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub name: String,
    pub parent: Option<ScopeId>,
    pub imports: BTreeSet<String>,
    pub symbols: HashMap<String, String>,
}

impl Scope {
    fn new(name: impl Into<String>, parent: Option<ScopeId>) -> Self {
        Scope {
            name: name.into(),
            parent,
            ..Default::default()
        }
    }
}

/// Arena of scopes for one file.
#[derive(Debug, Clone)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

/// Name given to the root scope.
pub const ROOT_SCOPE_NAME: &str = "root";

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeArena {
    /// Create an arena holding only the root scope.
    pub fn new() -> Self {
        ScopeArena {
            scopes: vec![Scope::new(ROOT_SCOPE_NAME, None)],
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Number of live scopes, root included.
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Always false: the root scope cannot be removed.
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    /// Open a child scope of `parent`.
    pub fn push(&mut self, name: impl Into<String>, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope::new(name, Some(parent)));
        trace!(scope = id.0, parent = parent.0, "push scope");
        id
    }

    /// Close `id`, which must be the most recently pushed live scope.
    ///
    /// Popping the root is ignored.
    pub fn pop(&mut self, id: ScopeId) {
        if id.0 == 0 {
            return;
        }
        debug_assert_eq!(id.0 + 1, self.scopes.len(), "scopes must close in LIFO order");
        trace!(scope = id.0, "pop scope");
        self.scopes.truncate(id.0);
    }

    /// Record `import` in `scope` and every ancestor, binding `symbol` to it
    /// when given.
    pub fn add_import(&mut self, scope: ScopeId, import: &str, symbol: Option<&str>) {
        let mut current = Some(scope);
        while let Some(id) = current {
            let entry = &mut self.scopes[id.0];
            entry.imports.insert(import.to_string());
            if let Some(symbol) = symbol.filter(|s| !s.is_empty()) {
                entry.symbols.insert(symbol.to_string(), import.to_string());
            }
            current = entry.parent;
        }
    }

    /// Fully-qualified import bound to `symbol` in `scope`, else `symbol`.
    pub fn resolve_symbol<'s>(&'s self, scope: ScopeId, symbol: &'s str) -> &'s str {
        self.scopes[scope.0]
            .symbols
            .get(symbol)
            .map(String::as_str)
            .unwrap_or(symbol)
    }

    /// Dot-joined scope names from `scope` up to the root.
    pub fn qualified_name(&self, scope: ScopeId) -> String {
        let mut names = Vec::new();
        let mut current = Some(scope);
        while let Some(id) = current {
            let entry = &self.scopes[id.0];
            names.push(entry.name.as_str());
            current = entry.parent;
        }
        names.join(".")
    }

    pub fn imports(&self, scope: ScopeId) -> &BTreeSet<String> {
        &self.scopes[scope.0].imports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_scope_is_empty() {
        let mut scopes = ScopeArena::new();
        let root = scopes.root();
        let child = scopes.push("stats", root);
        assert!(scopes.imports(child).is_empty());
        assert!(scopes.get(child).symbols.is_empty());
        assert_eq!(scopes.get(child).parent, Some(root));
        assert_eq!(scopes.len(), 2);
    }

    #[test]
    fn import_propagates_to_every_ancestor() {
        let mut scopes = ScopeArena::new();
        let root = scopes.root();
        let a = scopes.push("stats", root);
        let b = scopes.push("body", a);
        let c = scopes.push("stats", b);

        scopes.add_import(c, "scala.util.Random.nextInt", Some("nextInt"));

        for id in [root, a, b, c] {
            assert!(scopes.imports(id).contains("scala.util.Random.nextInt"));
            assert_eq!(scopes.resolve_symbol(id, "nextInt"), "scala.util.Random.nextInt");
        }
    }

    #[test]
    fn import_does_not_reach_descendants_or_siblings() {
        let mut scopes = ScopeArena::new();
        let root = scopes.root();
        let parent = scopes.push("stats", root);
        let child = scopes.push("templ", parent);
        scopes.pop(child);

        scopes.add_import(parent, "a.B", Some("B"));
        let sibling = scopes.push("templ", parent);
        assert!(scopes.imports(sibling).is_empty());
        assert_eq!(scopes.resolve_symbol(sibling, "B"), "B");
    }

    #[test]
    fn wildcard_binds_no_symbol() {
        let mut scopes = ScopeArena::new();
        let root = scopes.root();
        scopes.add_import(root, "x.y._", None);
        assert!(scopes.imports(root).contains("x.y._"));
        assert!(scopes.get(root).symbols.is_empty());
        assert_eq!(scopes.resolve_symbol(root, "_"), "_");
    }

    #[test]
    fn unresolved_symbol_is_returned_unchanged() {
        let scopes = ScopeArena::new();
        assert_eq!(scopes.resolve_symbol(scopes.root(), "HasIsOpsAdmin"), "HasIsOpsAdmin");
    }

    #[test]
    fn resolving_a_qualified_name_is_a_no_op() {
        let mut scopes = ScopeArena::new();
        let root = scopes.root();
        scopes.add_import(root, "x.y.Z", Some("Z"));
        let once = scopes.resolve_symbol(root, "Z");
        assert_eq!(scopes.resolve_symbol(root, once), "x.y.Z");
    }

    #[test]
    fn pop_is_lifo_and_root_survives() {
        let mut scopes = ScopeArena::new();
        let root = scopes.root();
        let a = scopes.push("stats", root);
        let b = scopes.push("name", a);
        scopes.pop(b);
        scopes.pop(a);
        assert_eq!(scopes.len(), 1);
        scopes.pop(root);
        assert_eq!(scopes.len(), 1);
    }

    #[test]
    fn qualified_name_walks_leaf_to_root() {
        let mut scopes = ScopeArena::new();
        let root = scopes.root();
        let a = scopes.push("stats", root);
        let b = scopes.push("templ", a);
        assert_eq!(scopes.qualified_name(b), "templ.stats.root");
        assert_eq!(scopes.qualified_name(root), "root");
    }
}

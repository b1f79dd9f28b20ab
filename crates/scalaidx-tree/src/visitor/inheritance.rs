// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Inheritance edges for classes, traits and objects.
//!
//! Each declaration with an `extends`/`with` clause contributes one entry
//! keyed by `"<kind> <qualified name>"`, e.g. `"class a.Foo"`. The value
//! lists the supertypes in declaration order, first as written and, after
//! [`ExtendsMap::resolve`], rewritten through the root scope's import
//! bindings. Names without a binding are kept as written.

use std::collections::BTreeMap;

use serde_json::Value;

use super::names::parse_name;
use super::scope::{ScopeArena, ScopeId};
use crate::nodes::TreeNode;

/// Declaration kinds that can carry inheritance edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Class,
    Trait,
    Object,
}

impl DeclKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclKind::Class => "class",
            DeclKind::Trait => "trait",
            DeclKind::Object => "object",
        }
    }
}

impl std::fmt::Display for DeclKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inheritance edges for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendsMap {
    entries: BTreeMap<String, Vec<String>>,
}

impl ExtendsMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(kind: DeclKind, qualified_name: &str) -> String {
        format!("{} {}", kind, qualified_name)
    }

    /// Record the supertypes in `node.templ.inits`.
    ///
    /// Inits whose type has no name are skipped; a declaration with no named
    /// supertypes adds no entry.
    pub fn record(&mut self, kind: DeclKind, qualified_name: &str, node: &TreeNode<'_>) {
        let Some(templ) = node.child("templ") else {
            return;
        };
        let supertypes: Vec<String> = templ.seq("inits").filter_map(init_type_name).collect();
        if supertypes.is_empty() {
            return;
        }
        self.entries
            .entry(Self::key(kind, qualified_name))
            .or_default()
            .extend(supertypes);
    }

    /// Rewrite every supertype through `scope`'s bindings.
    ///
    /// Resolving twice gives the same result as resolving once.
    pub fn resolve(&mut self, scopes: &ScopeArena, scope: ScopeId) {
        for supertypes in self.entries.values_mut() {
            for name in supertypes.iter_mut() {
                let resolved = scopes.resolve_symbol(scope, name.as_str()).to_string();
                *name = resolved;
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_map(self) -> BTreeMap<String, Vec<String>> {
        self.entries
    }
}

fn init_type_name(init: &Value) -> Option<String> {
    TreeNode::new(init)?.field("tpe").and_then(parse_name)
}

// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! StructureVisitor: package-aware dispatch over declaration nodes.
//!
//! Where the generic walk looks at every value in the tree, this visitor
//! follows only the structural spine (source, packages, templates) and
//! records top-level declarations qualified by the enclosing package path.
//!
//! # Dispatch
//!
//! | Node | Action |
//! |------|--------|
//! | `Source`, `Template`, `Pkg.Body` | visit `stats` |
//! | `Pkg` | record package, push, visit `body` (or `stats`), pop |
//! | `Pkg.Object` | record as object and package, push, visit `templ`, pop |
//! | `Import` | add bindings to the current scope |
//! | `Defn.Object` | record object and its supertypes |
//! | `Defn.Class`, `Defn.Trait` | record, supertypes, visit own `stats` |
//! | `Defn.Val` | record when the first pattern is a plain `Pat.Var` |
//! | `Defn.Type` | record type |
//! | anything else | visit `stats` if present |
//!
//! The package stack is restored on every exit path, so a visit that fails
//! part-way still leaves [`StructureVisitor::package_depth`] at zero.
//!
//! # Usage
//!
//! ```
//! use scalaidx_tree::visitor::{ScopeArena, StructureVisitor};
//! use serde_json::json;
//!
//! let tree = json!({
//!     "type": "Source",
//!     "stats": [{
//!         "type": "Pkg",
//!         "ref": { "type": "Term.Name", "value": "a" },
//!         "stats": [{ "type": "Defn.Class", "name": { "type": "Type.Name", "value": "Foo" } }]
//!     }]
//! });
//!
//! let mut scopes = ScopeArena::new();
//! let root = scopes.root();
//! let mut visitor = StructureVisitor::new(&mut scopes, root, 512);
//! visitor.visit(&tree)?;
//! let (tables, _extends) = visitor.into_parts();
//! assert!(tables.classes.contains("a.Foo"));
//! # Ok::<(), scalaidx_core::error::IndexError>(())
//! ```

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::debug;

use scalaidx_core::error::{IndexError, IndexResult};

use super::import::record_import;
use super::inheritance::{DeclKind, ExtendsMap};
use super::names::parse_name;
use super::scope::{ScopeArena, ScopeId};
use crate::nodes::{NodeKind, TreeNode};

/// Declarations found by the structural visit, each qualified by package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTables {
    pub packages: BTreeSet<String>,
    pub classes: BTreeSet<String>,
    pub traits: BTreeSet<String>,
    pub objects: BTreeSet<String>,
    pub vals: BTreeSet<String>,
    pub types: BTreeSet<String>,
}

/// Structural visitor for one file.
pub struct StructureVisitor<'s> {
    scopes: &'s mut ScopeArena,
    scope: ScopeId,
    packages: Vec<String>,
    tables: SymbolTables,
    extends: ExtendsMap,
    depth: usize,
    max_depth: usize,
}

impl<'s> StructureVisitor<'s> {
    /// Create a visitor recording imports into `scope`.
    pub fn new(scopes: &'s mut ScopeArena, scope: ScopeId, max_depth: usize) -> Self {
        StructureVisitor {
            scopes,
            scope,
            packages: Vec::new(),
            tables: SymbolTables::default(),
            extends: ExtendsMap::new(),
            depth: 0,
            max_depth,
        }
    }

    /// Visit a tree root.
    pub fn visit(&mut self, root: &Value) -> IndexResult<()> {
        self.visit_node(root)
    }

    /// Current package nesting.
    pub fn package_depth(&self) -> usize {
        self.packages.len()
    }

    pub fn tables(&self) -> &SymbolTables {
        &self.tables
    }

    pub fn into_parts(self) -> (SymbolTables, ExtendsMap) {
        (self.tables, self.extends)
    }

    /// `name` joined onto the current package path.
    pub fn qualify(&self, name: &str) -> String {
        if self.packages.is_empty() {
            return name.to_string();
        }
        let mut qualified = self.packages.join(".");
        qualified.push('.');
        qualified.push_str(name);
        qualified
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    fn visit_node(&mut self, value: &Value) -> IndexResult<()> {
        let Some(node) = TreeNode::new(value) else {
            return Ok(());
        };
        if self.depth >= self.max_depth {
            return Err(IndexError::TreeTooDeep {
                max_depth: self.max_depth,
            });
        }
        self.depth += 1;
        let result = self.dispatch(&node);
        self.depth -= 1;
        result
    }

    fn dispatch(&mut self, node: &TreeNode<'_>) -> IndexResult<()> {
        match node.kind() {
            NodeKind::Source | NodeKind::Template | NodeKind::PkgBody => self.visit_stats(node),
            NodeKind::Pkg => self.visit_pkg(node),
            NodeKind::PkgObject => self.visit_pkg_object(node),
            NodeKind::Import => {
                record_import(self.scopes, self.scope, node.value());
                Ok(())
            }
            NodeKind::DefnObject => {
                self.visit_defn_object(node);
                Ok(())
            }
            NodeKind::DefnClass => self.visit_defn_class(DeclKind::Class, node),
            NodeKind::DefnTrait => self.visit_defn_class(DeclKind::Trait, node),
            NodeKind::DefnVal => {
                self.visit_defn_val(node);
                Ok(())
            }
            NodeKind::DefnType => {
                self.visit_defn_type(node);
                Ok(())
            }
            other => {
                debug!(kind = %other, "unhandled node type, visiting stats");
                self.visit_stats(node)
            }
        }
    }

    fn visit_stats(&mut self, node: &TreeNode<'_>) -> IndexResult<()> {
        for stat in node.seq("stats") {
            self.visit_node(stat)?;
        }
        Ok(())
    }

    /// Run `f` with `name` pushed on the package stack.
    fn with_package<F>(&mut self, name: String, f: F) -> IndexResult<()>
    where
        F: FnOnce(&mut Self) -> IndexResult<()>,
    {
        self.packages.push(name);
        let result = f(self);
        self.packages.pop();
        result
    }

    // ========================================================================
    // Packages
    // ========================================================================

    fn visit_pkg(&mut self, node: &TreeNode<'_>) -> IndexResult<()> {
        let Some(name) = node.field("ref").and_then(parse_name) else {
            debug!("package without a resolvable ref");
            return self.visit_pkg_contents(node);
        };
        let qualified = self.qualify(&name);
        self.tables.packages.insert(qualified);
        self.with_package(name, |v| v.visit_pkg_contents(node))
    }

    /// `Pkg.body` on newer trees, the package's own `stats` on older ones.
    fn visit_pkg_contents(&mut self, node: &TreeNode<'_>) -> IndexResult<()> {
        match node.field("body") {
            Some(body) => self.visit_node(body),
            None => self.visit_stats(node),
        }
    }

    fn visit_pkg_object(&mut self, node: &TreeNode<'_>) -> IndexResult<()> {
        let Some(name) = node.field("name").and_then(parse_name) else {
            debug!("package object without a name");
            return Ok(());
        };
        let qualified = self.qualify(&name);
        self.tables.objects.insert(qualified.clone());
        self.tables.packages.insert(qualified);

        let templ = node.field("templ");
        self.with_package(name, |v| match templ {
            Some(templ) => v.visit_node(templ),
            None => Ok(()),
        })
    }

    // ========================================================================
    // Definitions
    // ========================================================================

    fn declared_name(&self, node: &TreeNode<'_>) -> Option<String> {
        let name = node.field("name").and_then(parse_name);
        if name.is_none() {
            debug!(kind = %node.kind(), "declaration without a name");
        }
        name.map(|n| self.qualify(&n))
    }

    fn visit_defn_object(&mut self, node: &TreeNode<'_>) {
        if let Some(qualified) = self.declared_name(node) {
            self.extends.record(DeclKind::Object, &qualified, node);
            self.tables.objects.insert(qualified);
        }
    }

    fn visit_defn_class(&mut self, kind: DeclKind, node: &TreeNode<'_>) -> IndexResult<()> {
        if let Some(qualified) = self.declared_name(node) {
            self.extends.record(kind, &qualified, node);
            match kind {
                DeclKind::Trait => self.tables.traits.insert(qualified),
                _ => self.tables.classes.insert(qualified),
            };
        }
        self.visit_stats(node)
    }

    fn visit_defn_val(&mut self, node: &TreeNode<'_>) {
        let Some(pat) = node.seq("pats").next().and_then(TreeNode::new) else {
            return;
        };
        if pat.kind() != NodeKind::PatVar {
            return;
        }
        if let Some(name) = pat.field("name").and_then(parse_name) {
            let qualified = self.qualify(&name);
            self.tables.vals.insert(qualified);
        }
    }

    fn visit_defn_type(&mut self, node: &TreeNode<'_>) {
        if let Some(qualified) = self.declared_name(node) {
            self.tables.types.insert(qualified);
        }
    }
}

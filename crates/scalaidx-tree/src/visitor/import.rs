// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Import statement handling.
//!
//! An `Import` holds one or more `Importer`s, each a prefix (`ref`) plus a
//! list of importees. Each importee becomes one import string:
//!
//! | Importee | Import | Short name |
//! |----------|--------|------------|
//! | `Importee.Name` (`import a.b.C`) | `a.b.C` | `C` |
//! | `Importee.Rename` (`import a.b.{C => D}`) | `a.b.C` | `C` |
//! | `Importee.Unimport` (`import a.b.{C => _}`) | `a.b.C` | none |
//! | `Importee.Wildcard` (`import a.b._`) | `a.b._` | none |
//!
//! Unimports still record the import: they signal a dependency on the
//! package even though the name is hidden.

use serde_json::Value;
use tracing::debug;

use super::names::parse_name;
use super::scope::{ScopeArena, ScopeId};
use crate::nodes::{NodeKind, TreeNode};

/// One importee reduced to its import string and optional short name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub import: String,
    pub symbol: Option<String>,
}

/// Record every importer of `import` into `scope` (and its ancestors).
///
/// Returns the bindings added, in source order.
pub fn record_import(
    scopes: &mut ScopeArena,
    scope: ScopeId,
    import: &Value,
) -> Vec<ImportBinding> {
    let Some(node) = TreeNode::new(import) else {
        return Vec::new();
    };
    let bindings: Vec<ImportBinding> = node.seq("importers").flat_map(importer_bindings).collect();
    for binding in &bindings {
        scopes.add_import(scope, &binding.import, binding.symbol.as_deref());
    }
    bindings
}

/// Bindings produced by one `Importer`.
pub fn importer_bindings(importer: &Value) -> Vec<ImportBinding> {
    let Some(node) = TreeNode::new(importer) else {
        return Vec::new();
    };
    let Some(prefix) = node.field("ref").and_then(parse_name) else {
        debug!(tag = node.tag(), "importer without a resolvable ref");
        return Vec::new();
    };
    node.seq("importees")
        .filter_map(|importee| importee_binding(&prefix, importee))
        .collect()
}

fn importee_binding(prefix: &str, importee: &Value) -> Option<ImportBinding> {
    let node = TreeNode::new(importee)?;
    match node.kind() {
        NodeKind::ImporteeName | NodeKind::ImporteeRename => {
            let name = importee_name(&node)?;
            Some(ImportBinding {
                import: format!("{}.{}", prefix, name),
                symbol: Some(name.to_string()),
            })
        }
        NodeKind::ImporteeUnimport => {
            let name = importee_name(&node)?;
            Some(ImportBinding {
                import: format!("{}.{}", prefix, name),
                symbol: None,
            })
        }
        NodeKind::ImporteeWildcard => Some(ImportBinding {
            import: format!("{}._", prefix),
            symbol: None,
        }),
        other => {
            debug!(kind = %other, prefix, "unhandled importee type");
            None
        }
    }
}

/// The `value` of an importee's `name` (a `Name.Indeterminate`).
fn importee_name<'a>(node: &TreeNode<'a>) -> Option<&'a str> {
    node.child("name")?.value_str()
}

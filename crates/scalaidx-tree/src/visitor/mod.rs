// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitors over scalameta JSON trees.
//!
//! Two traversals run over every file, independently:
//!
//! - The generic walk ([`TreeWalker`]) offers every value in the tree to a
//!   [`WalkVisitor`], opening a [`Scope`] per typed node. The indexer uses it
//!   to harvest referenced names and to catch imports at any depth.
//! - The structural visit ([`StructureVisitor`]) dispatches on declaration
//!   nodes and records packages, imports and top-level definitions qualified
//!   by their package path, plus inheritance edges ([`ExtendsMap`]).
//!
//! # Traversal Order
//!
//! - Depth-first, pre-order
//! - Sequence fields (`stats`, `inits`, `importees`) in source order
//! - Object fields in sorted key order
//!
//! # Walk Visitor Pattern
//!
//! ```
//! use scalaidx_tree::visitor::{ScopeArena, TreeWalker, VisitResult, WalkEntry, WalkVisitor};
//! use serde_json::json;
//!
//! struct CountTyped(usize);
//!
//! impl<'a> WalkVisitor<'a> for CountTyped {
//!     fn visit(&mut self, _: &mut ScopeArena, entry: &WalkEntry<'a, '_>) -> VisitResult {
//!         if entry.child.get("type").is_some() {
//!             self.0 += 1;
//!         }
//!         VisitResult::Continue
//!     }
//! }
//!
//! let tree = json!({ "type": "Source", "stats": [{ "type": "Lit.Unit" }] });
//! let mut scopes = ScopeArena::new();
//! let root = scopes.root();
//! let mut counter = CountTyped(0);
//! TreeWalker::new(512).walk(&mut scopes, root, &tree, &mut counter)?;
//! assert_eq!(counter.0, 1);
//! # Ok::<(), scalaidx_core::error::IndexError>(())
//! ```

mod import;
mod inheritance;
mod names;
mod scope;
mod structure;
mod traits;
mod walk;

pub use import::{importer_bindings, record_import, ImportBinding};
pub use inheritance::{DeclKind, ExtendsMap};
pub use names::{
    is_all_lowercase_name, is_operator_token, parse_name, should_index_name, OPERATOR_TOKENS,
};
pub use scope::{Scope, ScopeArena, ScopeId, ROOT_SCOPE_NAME};
pub use structure::{StructureVisitor, SymbolTables};
pub use traits::{VisitResult, WalkEntry, WalkVisitor};
pub use walk::TreeWalker;

// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Symbol indexing over scalameta JSON trees.
//!
//! This crate turns one parsed Scala file into a [`FileSummary`]: its
//! packages, imports, top-level declarations, inheritance edges and the set
//! of type-like names it references. It never parses source text; callers
//! hand it the tree a scalameta parser produced.
//!
//! # Quick Start
//!
//! ```
//! use scalaidx_core::config::IndexOptions;
//! use scalaidx_tree::SourceIndexer;
//! use serde_json::json;
//!
//! // package a; class Foo
//! let tree = json!({
//!     "type": "Source",
//!     "stats": [{
//!         "type": "Pkg",
//!         "ref": { "type": "Term.Name", "value": "a" },
//!         "body": {
//!             "type": "Pkg.Body",
//!             "stats": [{ "type": "Defn.Class", "name": { "type": "Type.Name", "value": "Foo" } }]
//!         }
//!     }]
//! });
//!
//! let options = IndexOptions::default();
//! let summary = SourceIndexer::new("Foo.scala", &options).index(&tree)?;
//! assert_eq!(summary.packages, vec!["a"]);
//! assert_eq!(summary.classes, vec!["a.Foo"]);
//! # Ok::<(), scalaidx_core::error::IndexError>(())
//! ```

// ============================================================================
// Public modules and re-exports
// ============================================================================

/// Indexer entry point and result assembly.
pub mod indexer;
pub use indexer::{assemble_summary, NameHarvester, SourceIndexer};

/// Typed view over JSON nodes.
pub mod nodes;
pub use nodes::{parse_error, NodeKind, TreeNode};

/// Scopes, walkers and visitors.
pub mod visitor;

pub use scalaidx_core::output::FileSummary;

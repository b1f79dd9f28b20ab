// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! SourceIndexer: one tree in, one [`FileSummary`] out.
//!
//! Indexing a file runs four stages over the same tree:
//!
//! 1. **Name walk**: [`TreeWalker`] with a [`NameHarvester`] collects every
//!    referenced name and, when nested imports are enabled, records imports
//!    found at any depth into the scope they appear in.
//! 2. **Structural visit**: [`StructureVisitor`] records packages, imports
//!    and top-level declarations, and the raw inheritance edges.
//! 3. **Extends resolution**: supertypes are rewritten through the root
//!    scope, which by now holds every import in the file.
//! 4. **Assembly**: [`assemble_summary`] flattens everything into sorted
//!    lists, leaving empty collections out.
//!
//! A tree that carries an `error` field skips stages 1 to 3 and yields a
//! summary with only `filename` and `error`.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;
use tracing::{trace, warn};

use scalaidx_core::config::IndexOptions;
use scalaidx_core::error::{IndexError, IndexResult};
use scalaidx_core::output::{sorted_list, FileSummary};

use crate::nodes::{parse_error, NodeKind, TreeNode};
use crate::visitor::{
    parse_name, record_import, should_index_name, ExtendsMap, ScopeArena, StructureVisitor,
    SymbolTables, TreeWalker, VisitResult, WalkEntry, WalkVisitor,
};

// ============================================================================
// Name Harvesting
// ============================================================================

/// Walk visitor that fills the names set.
#[derive(Debug)]
pub struct NameHarvester<'o> {
    options: &'o IndexOptions,
    names: BTreeSet<String>,
}

impl<'o> NameHarvester<'o> {
    pub fn new(options: &'o IndexOptions) -> Self {
        NameHarvester {
            options,
            names: BTreeSet::new(),
        }
    }

    pub fn names(&self) -> &BTreeSet<String> {
        &self.names
    }

    pub fn into_names(self) -> BTreeSet<String> {
        self.names
    }
}

impl<'a> WalkVisitor<'a> for NameHarvester<'_> {
    fn visit(&mut self, scopes: &mut ScopeArena, entry: &WalkEntry<'a, '_>) -> VisitResult {
        if entry.child.is_null() {
            return VisitResult::SkipChildren;
        }

        if self.options.nested_imports
            && TreeNode::new(entry.child).is_some_and(|n| n.kind() == NodeKind::Import)
        {
            record_import(scopes, entry.scope, entry.child);
            return VisitResult::SkipChildren;
        }

        if let Some(name) = parse_name(entry.child) {
            if should_index_name(&name) {
                let name = if self.options.annotate_name_types {
                    format!("{}<{}>", name, entry.stack_type_name())
                } else {
                    name
                };
                self.names.insert(name);
            }
        }
        VisitResult::Continue
    }
}

// ============================================================================
// Source Indexer
// ============================================================================

/// Indexes one parsed file.
#[derive(Debug, Clone)]
pub struct SourceIndexer<'o> {
    filename: String,
    options: &'o IndexOptions,
}

impl<'o> SourceIndexer<'o> {
    pub fn new(filename: impl Into<String>, options: &'o IndexOptions) -> Self {
        SourceIndexer {
            filename: filename.into(),
            options,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Index `tree`.
    ///
    /// A parse-error tree yields `Ok` with an error-bearing summary. `Err` is
    /// reserved for trees the walk cannot finish.
    pub fn index(&self, tree: &Value) -> IndexResult<FileSummary> {
        if let Some(error) = parse_error(tree) {
            warn!(file = %self.filename, %error, "parse error");
            return Ok(FileSummary::failed(self.filename.clone(), error));
        }

        let mut scopes = ScopeArena::new();
        let root = scopes.root();

        let mut harvester = NameHarvester::new(self.options);
        TreeWalker::new(self.options.max_depth).walk(&mut scopes, root, tree, &mut harvester)?;

        let mut visitor = StructureVisitor::new(&mut scopes, root, self.options.max_depth);
        visitor.visit(tree)?;
        let (tables, mut extends) = visitor.into_parts();

        extends.resolve(&scopes, root);

        let rendered = if self.options.want_parse_tree {
            Some(render_tree(tree)?)
        } else {
            None
        };

        trace!(
            file = %self.filename,
            imports = scopes.imports(root).len(),
            names = harvester.names().len(),
            "indexed"
        );

        Ok(assemble_summary(
            self.filename.clone(),
            tables,
            scopes.imports(root).clone(),
            harvester.into_names(),
            extends,
            rendered,
        ))
    }
}

// ============================================================================
// Assembly
// ============================================================================

/// Build the summary record. Empty collections are left empty so that they
/// are omitted when serialized.
pub fn assemble_summary(
    filename: String,
    tables: SymbolTables,
    imports: BTreeSet<String>,
    names: BTreeSet<String>,
    extends: ExtendsMap,
    tree: Option<String>,
) -> FileSummary {
    FileSummary {
        filename,
        error: None,
        tree,
        packages: sorted_list(tables.packages),
        imports: sorted_list(imports),
        classes: sorted_list(tables.classes),
        traits: sorted_list(tables.traits),
        objects: sorted_list(tables.objects),
        vals: sorted_list(tables.vals),
        types: sorted_list(tables.types),
        names: sorted_list(names),
        extends: extends.into_map(),
    }
}

/// Pretty-print the tree with four-space indentation.
fn render_tree(tree: &Value) -> IndexResult<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    tree.serialize(&mut serializer)
        .map_err(|e| IndexError::internal(format!("rendering parse tree: {}", e)))?;
    String::from_utf8(buf).map_err(|e| IndexError::internal(format!("rendering parse tree: {}", e)))
}

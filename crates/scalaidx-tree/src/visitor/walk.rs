// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Generic depth-first walk over a JSON tree.
//!
//! The walker visits every array element and object field of the tree,
//! typed or not. On entering a typed node (an object with a `type` tag) it
//! pushes the node onto the node stack and opens a child scope named after
//! the field the node was reached through. Both are closed again on the way
//! out, including when the walk aborts.
//!
//! # Ordering
//!
//! Array elements are offered in order. Object fields are offered in the
//! map's key order, which is sorted for `serde_json` objects; sibling field
//! order carries no meaning for the indexer.
//!
//! # Depth
//!
//! Nesting is bounded by `max_depth` typed nodes. A deeper tree aborts the
//! walk with [`IndexError::TreeTooDeep`].

use serde_json::Value;

use scalaidx_core::error::{IndexError, IndexResult};

use super::scope::{ScopeArena, ScopeId, ROOT_SCOPE_NAME};
use super::traits::{VisitResult, WalkEntry, WalkVisitor};
use crate::nodes::TreeNode;

/// Depth-first walker that tracks typed-node nesting and scopes.
#[derive(Debug)]
pub struct TreeWalker<'a> {
    stack: Vec<TreeNode<'a>>,
    max_depth: usize,
}

impl<'a> TreeWalker<'a> {
    pub fn new(max_depth: usize) -> Self {
        TreeWalker {
            stack: Vec::new(),
            max_depth,
        }
    }

    /// Current typed-node nesting.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Walk `root`, opening scopes beneath `scope`.
    pub fn walk<V: WalkVisitor<'a>>(
        &mut self,
        scopes: &mut ScopeArena,
        scope: ScopeId,
        root: &'a Value,
        visitor: &mut V,
    ) -> IndexResult<()> {
        self.traverse(scopes, scope, ROOT_SCOPE_NAME, root, None, visitor)
    }

    fn traverse<V: WalkVisitor<'a>>(
        &mut self,
        scopes: &mut ScopeArena,
        scope: ScopeId,
        key: &'a str,
        value: &'a Value,
        parent: Option<TreeNode<'a>>,
        visitor: &mut V,
    ) -> IndexResult<()> {
        if !(value.is_array() || value.is_object()) {
            return Ok(());
        }

        let Some(node) = TreeNode::new(value) else {
            return self.descend(scopes, scope, key, value, parent, visitor);
        };

        if self.stack.len() >= self.max_depth {
            return Err(IndexError::TreeTooDeep {
                max_depth: self.max_depth,
            });
        }

        self.stack.push(node);
        let inner = scopes.push(key, scope);
        let result = self.descend(scopes, inner, key, value, Some(node), visitor);
        scopes.pop(inner);
        self.stack.pop();
        result
    }

    fn descend<V: WalkVisitor<'a>>(
        &mut self,
        scopes: &mut ScopeArena,
        scope: ScopeId,
        key: &'a str,
        value: &'a Value,
        parent: Option<TreeNode<'a>>,
        visitor: &mut V,
    ) -> IndexResult<()> {
        match value {
            Value::Array(items) => {
                for item in items {
                    self.offer(scopes, scope, key, item, parent, visitor)?;
                }
            }
            Value::Object(fields) => {
                for (field, child) in fields {
                    self.offer(scopes, scope, field.as_str(), child, parent, visitor)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn offer<V: WalkVisitor<'a>>(
        &mut self,
        scopes: &mut ScopeArena,
        scope: ScopeId,
        key: &'a str,
        child: &'a Value,
        parent: Option<TreeNode<'a>>,
        visitor: &mut V,
    ) -> IndexResult<()> {
        let entry = WalkEntry {
            key,
            child,
            parent,
            stack: &self.stack,
            scope,
        };
        match visitor.visit(scopes, &entry) {
            VisitResult::Continue => self.traverse(scopes, scope, key, child, parent, visitor),
            VisitResult::SkipChildren => Ok(()),
        }
    }
}

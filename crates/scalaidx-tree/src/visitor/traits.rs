// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Callback trait for the generic tree walk.

use serde_json::Value;

use super::scope::{ScopeArena, ScopeId};
use crate::nodes::TreeNode;

/// Result of offering a child to a walk visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisitResult {
    /// Descend into the child.
    #[default]
    Continue,
    /// Skip the child and its subtree, continue with siblings.
    SkipChildren,
}

/// One child value offered to a [`WalkVisitor`].
#[derive(Debug, Clone, Copy)]
pub struct WalkEntry<'a, 'w> {
    /// Field name of the child. Array elements carry the array's field name.
    pub key: &'a str,
    /// The child value. May be a scalar, `null`, an array or an object.
    pub child: &'a Value,
    /// Nearest enclosing typed node.
    pub parent: Option<TreeNode<'a>>,
    /// Typed nodes from the root down to `parent`.
    pub stack: &'w [TreeNode<'a>],
    /// Scope the child is offered in.
    pub scope: ScopeId,
}

impl WalkEntry<'_, '_> {
    /// Slash-joined tags of the enclosing typed nodes plus the child's own tag.
    pub fn stack_type_name(&self) -> String {
        let mut tags: Vec<&str> = self.stack.iter().map(|n| n.tag()).collect();
        if let Some(node) = TreeNode::new(self.child) {
            tags.push(node.tag());
        }
        tags.join("/")
    }
}

/// Callback driven by [`TreeWalker`](super::walk::TreeWalker).
///
/// `visit` is called before the walker descends into each child value. The
/// visitor may record imports through `scopes`.
pub trait WalkVisitor<'a> {
    fn visit(&mut self, scopes: &mut ScopeArena, entry: &WalkEntry<'a, '_>) -> VisitResult;
}

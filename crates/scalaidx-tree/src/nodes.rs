// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Typed view over scalameta JSON nodes.
//!
//! The parser emits a tree of JSON objects. Every syntax node carries a
//! `type` tag (`"Defn.Class"`, `"Term.Select"`, ...) plus node-specific
//! fields. This module gives that loose shape a borrowed, typed face:
//!
//! - [`NodeKind`]: closed enum over the tags the indexer dispatches on, with
//!   an [`NodeKind::Other`] arm for everything else
//! - [`TreeNode`]: a borrowed view of one tagged object
//! - [`parse_error`]: detects the error node a failed parse produces
//!
//! Nothing here copies or mutates the tree.

use serde_json::Value;

/// Node tags the indexer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind<'a> {
    Source,
    Pkg,
    /// `Pkg.Body`, introduced in scalameta 4.10.
    PkgBody,
    PkgObject,
    Import,
    Importer,
    ImporteeName,
    ImporteeRename,
    ImporteeUnimport,
    ImporteeWildcard,
    DefnObject,
    DefnClass,
    DefnTrait,
    DefnVal,
    DefnType,
    Template,
    TypeName,
    TermName,
    TypeSelect,
    TermSelect,
    TypeApply,
    TermParam,
    PatVar,
    /// Any tag not listed above.
    Other(&'a str),
}

impl<'a> NodeKind<'a> {
    /// Classify a `type` tag.
    pub fn from_tag(tag: &'a str) -> Self {
        match tag {
            "Source" => NodeKind::Source,
            "Pkg" => NodeKind::Pkg,
            "Pkg.Body" => NodeKind::PkgBody,
            "Pkg.Object" => NodeKind::PkgObject,
            "Import" => NodeKind::Import,
            "Importer" => NodeKind::Importer,
            "Importee.Name" => NodeKind::ImporteeName,
            "Importee.Rename" => NodeKind::ImporteeRename,
            "Importee.Unimport" => NodeKind::ImporteeUnimport,
            "Importee.Wildcard" => NodeKind::ImporteeWildcard,
            "Defn.Object" => NodeKind::DefnObject,
            "Defn.Class" => NodeKind::DefnClass,
            "Defn.Trait" => NodeKind::DefnTrait,
            "Defn.Val" => NodeKind::DefnVal,
            "Defn.Type" => NodeKind::DefnType,
            "Template" => NodeKind::Template,
            "Type.Name" => NodeKind::TypeName,
            "Term.Name" => NodeKind::TermName,
            "Type.Select" => NodeKind::TypeSelect,
            "Term.Select" => NodeKind::TermSelect,
            "Type.Apply" => NodeKind::TypeApply,
            "Term.Param" => NodeKind::TermParam,
            "Pat.Var" => NodeKind::PatVar,
            other => NodeKind::Other(other),
        }
    }

    /// The tag as it appears in the tree.
    pub fn as_str(&self) -> &'a str {
        match self {
            NodeKind::Source => "Source",
            NodeKind::Pkg => "Pkg",
            NodeKind::PkgBody => "Pkg.Body",
            NodeKind::PkgObject => "Pkg.Object",
            NodeKind::Import => "Import",
            NodeKind::Importer => "Importer",
            NodeKind::ImporteeName => "Importee.Name",
            NodeKind::ImporteeRename => "Importee.Rename",
            NodeKind::ImporteeUnimport => "Importee.Unimport",
            NodeKind::ImporteeWildcard => "Importee.Wildcard",
            NodeKind::DefnObject => "Defn.Object",
            NodeKind::DefnClass => "Defn.Class",
            NodeKind::DefnTrait => "Defn.Trait",
            NodeKind::DefnVal => "Defn.Val",
            NodeKind::DefnType => "Defn.Type",
            NodeKind::Template => "Template",
            NodeKind::TypeName => "Type.Name",
            NodeKind::TermName => "Term.Name",
            NodeKind::TypeSelect => "Type.Select",
            NodeKind::TermSelect => "Term.Select",
            NodeKind::TypeApply => "Type.Apply",
            NodeKind::TermParam => "Term.Param",
            NodeKind::PatVar => "Pat.Var",
            NodeKind::Other(tag) => tag,
        }
    }
}

impl std::fmt::Display for NodeKind<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Borrowed view of one tagged JSON object.
#[derive(Debug, Clone, Copy)]
pub struct TreeNode<'a> {
    value: &'a Value,
    tag: &'a str,
}

impl<'a> TreeNode<'a> {
    /// View `value` as a node. Returns `None` unless it is an object with a
    /// non-empty string `type`.
    pub fn new(value: &'a Value) -> Option<Self> {
        let tag = value.as_object()?.get("type")?.as_str()?;
        if tag.is_empty() {
            return None;
        }
        Some(TreeNode { value, tag })
    }

    pub fn kind(&self) -> NodeKind<'a> {
        NodeKind::from_tag(self.tag)
    }

    pub fn tag(&self) -> &'a str {
        self.tag
    }

    /// The underlying JSON object.
    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// Raw field access. JSON `null` reads as absent.
    pub fn field(&self, name: &str) -> Option<&'a Value> {
        self.value.get(name).filter(|v| !v.is_null())
    }

    /// A field that is itself a node.
    pub fn child(&self, name: &str) -> Option<TreeNode<'a>> {
        self.field(name).and_then(TreeNode::new)
    }

    /// Elements of a sequence field; empty when missing or not an array.
    pub fn seq(&self, name: &str) -> impl Iterator<Item = &'a Value> {
        self.field(name)
            .and_then(Value::as_array)
            .map(|items| items.iter())
            .into_iter()
            .flatten()
    }

    /// A string-valued field.
    pub fn str_field(&self, name: &str) -> Option<&'a str> {
        self.field(name).and_then(Value::as_str)
    }

    /// The non-empty `value` of a name node.
    pub fn value_str(&self) -> Option<&'a str> {
        self.str_field("value").filter(|v| !v.is_empty())
    }
}

/// Returns the parse error message if `root` is an error node.
///
/// String errors are returned as-is; any other non-null value is rendered as
/// compact JSON.
pub fn parse_error(root: &Value) -> Option<String> {
    match root.get("error")? {
        Value::Null => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}

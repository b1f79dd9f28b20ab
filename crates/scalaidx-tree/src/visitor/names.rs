// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Name extraction from reference nodes and the names-set filter.

use serde_json::Value;

use crate::nodes::{NodeKind, TreeNode};

/// Operator identifiers never recorded as names.
pub const OPERATOR_TOKENS: &[&str] = &[
    "-", "->", "::", ":=", "!", "???", "*", "&&", "+", "+=", "<", "<=", "==", ">", ">=", "~>",
];

/// Resolve a reference node to a dotted name.
///
/// - `Type.Name` / `Term.Name`: the literal `value`
/// - `Type.Select` / `Term.Select`: `qual.name`, an unresolvable side
///   rendering as the empty string
/// - `Type.Apply`: the applied type, type arguments dropped
/// - `Term.Param`: its declared type
///
/// Anything else has no name.
pub fn parse_name(value: &Value) -> Option<String> {
    let node = TreeNode::new(value)?;
    match node.kind() {
        NodeKind::TypeName | NodeKind::TermName => node.value_str().map(str::to_string),
        NodeKind::TypeApply => node.field("tpe").and_then(parse_name),
        NodeKind::TermParam => node.field("decltpe").and_then(parse_name),
        NodeKind::TypeSelect | NodeKind::TermSelect => {
            let qual = node.field("qual").and_then(parse_name);
            let name = node.field("name").and_then(parse_name);
            if qual.is_none() && name.is_none() {
                return None;
            }
            Some(format!(
                "{}.{}",
                qual.unwrap_or_default(),
                name.unwrap_or_default()
            ))
        }
        _ => None,
    }
}

pub fn is_operator_token(name: &str) -> bool {
    OPERATOR_TOKENS.contains(&name)
}

/// True when every dot-separated segment starts with a lowercase letter.
///
/// Empty segments and segments starting with a digit or symbol do not count
/// as lowercase.
pub fn is_all_lowercase_name(name: &str) -> bool {
    name.split('.').all(|segment| {
        segment
            .chars()
            .next()
            .is_some_and(|c| c.is_lowercase() && !c.is_uppercase())
    })
}

/// Filter applied before a name enters the names set.
pub fn should_index_name(name: &str) -> bool {
    !name.is_empty()
        && !is_operator_token(name)
        && !name.starts_with('.')
        && !is_all_lowercase_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn term(value: &str) -> Value {
        json!({ "type": "Term.Name", "value": value })
    }

    #[test]
    fn plain_names() {
        assert_eq!(parse_name(&term("Foo")), Some("Foo".to_string()));
        assert_eq!(
            parse_name(&json!({ "type": "Type.Name", "value": "HashMap" })),
            Some("HashMap".to_string())
        );
        assert_eq!(parse_name(&term("")), None);
    }

    #[test]
    fn selects_join_with_dots() {
        let select = json!({
            "type": "Term.Select",
            "qual": { "type": "Term.Select", "qual": term("java"), "name": term("util") },
            "name": term("HashMap")
        });
        assert_eq!(parse_name(&select), Some("java.util.HashMap".to_string()));
    }

    #[test]
    fn select_on_this_starts_with_dot() {
        let select = json!({
            "type": "Term.Select",
            "qual": { "type": "Term.This", "qual": { "type": "Name.Anonymous" } },
            "name": term("foo")
        });
        assert_eq!(parse_name(&select), Some(".foo".to_string()));
        assert!(!should_index_name(".foo"));
    }

    #[test]
    fn apply_and_param_unwrap() {
        let applied = json!({
            "type": "Type.Apply",
            "tpe": { "type": "Type.Name", "value": "Seq" },
            "argClause": { "type": "Type.ArgClause", "values": [{ "type": "Type.Name", "value": "Int" }] }
        });
        assert_eq!(parse_name(&applied), Some("Seq".to_string()));

        let param = json!({
            "type": "Term.Param",
            "name": term("config"),
            "decltpe": { "type": "Type.Name", "value": "Config" }
        });
        assert_eq!(parse_name(&param), Some("Config".to_string()));
        assert_eq!(parse_name(&json!({ "type": "Term.Param", "name": term("x") })), None);
    }

    #[test]
    fn unknown_and_untyped_have_no_name() {
        assert_eq!(parse_name(&json!({ "type": "Lit.Int", "value": 1 })), None);
        assert_eq!(parse_name(&json!("Foo")), None);
        assert_eq!(parse_name(&json!({ "value": "Foo" })), None);
    }

    #[test]
    fn lowercase_rule() {
        assert!(is_all_lowercase_name("logger"));
        assert!(is_all_lowercase_name("logger.info"));
        assert!(!is_all_lowercase_name("ArgProcessor.process"));
        assert!(!is_all_lowercase_name("scala.Some"));
        assert!(!is_all_lowercase_name("a..b"));
        assert!(!is_all_lowercase_name("_root_"));
        assert!(!is_all_lowercase_name("1x"));
    }

    #[test]
    fn filter_policy() {
        for op in OPERATOR_TOKENS {
            assert!(!should_index_name(op), "{op}");
        }
        assert!(!should_index_name("println"));
        assert!(!should_index_name(".bar"));
        assert!(should_index_name("Foo"));
        assert!(should_index_name("ArgProcessor.process"));
        // symbolic names off the denylist pass through
        assert!(should_index_name("||"));
    }
}

//! End-to-end indexing scenarios.
//!
//! Each test writes a scalameta-shaped JSON tree to a temp file, indexes it
//! through the file driver, and checks the serialized summary.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use tempfile::TempDir;

use scalaidx::batch::index_file;
use scalaidx::config::IndexOptions;
use scalaidx::output::FileSummary;
use scalaidx::parser::JsonTreeParser;

// ============================================================================
// Test Infrastructure
// ============================================================================

fn term(value: &str) -> Value {
    json!({ "type": "Term.Name", "value": value })
}

fn type_name(value: &str) -> Value {
    json!({ "type": "Type.Name", "value": value })
}

/// `a.b.c` as nested `Term.Select`s.
fn path(dotted: &str) -> Value {
    let mut parts = dotted.split('.');
    let first = parts.next().unwrap_or_default();
    parts.fold(term(first), |qual, name| {
        json!({ "type": "Term.Select", "qual": qual, "name": term(name) })
    })
}

fn pkg(dotted: &str, stats: Vec<Value>) -> Value {
    json!({
        "type": "Pkg",
        "ref": path(dotted),
        "body": { "type": "Pkg.Body", "stats": stats }
    })
}

fn import(prefix: &str, importees: Vec<Value>) -> Value {
    json!({
        "type": "Import",
        "importers": [{ "type": "Importer", "ref": path(prefix), "importees": importees }]
    })
}

fn importee(name: &str) -> Value {
    json!({ "type": "Importee.Name", "name": { "type": "Name.Indeterminate", "value": name } })
}

fn init(tpe: Value) -> Value {
    json!({ "type": "Init", "tpe": tpe, "name": { "type": "Name.Anonymous" }, "argClauses": [] })
}

fn class(name: &str, inits: Vec<Value>) -> Value {
    json!({
        "type": "Defn.Class",
        "mods": [],
        "name": type_name(name),
        "tparamClause": { "type": "Type.ParamClause", "values": [] },
        "ctor": { "type": "Ctor.Primary", "mods": [], "name": { "type": "Name.Anonymous" } },
        "templ": { "type": "Template", "inits": inits, "stats": [] }
    })
}

fn source(stats: Vec<Value>) -> Value {
    json!({ "type": "Source", "stats": stats })
}

/// Write `tree` as `name` under `dir` and index it with default options.
fn index_tree(dir: &TempDir, name: &str, tree: &Value) -> (FileSummary, Value) {
    let file = dir.path().join(name);
    fs::write(&file, tree.to_string()).unwrap();
    index_path(&file, &IndexOptions::default())
}

fn index_path(file: &Path, options: &IndexOptions) -> (FileSummary, Value) {
    let summary = index_file(&file.to_string_lossy(), &JsonTreeParser, options);
    let value = serde_json::to_value(&summary).unwrap();
    (summary, value)
}

// ============================================================================
// Scenarios
// ============================================================================

/// `package a.b; class Foo`
#[test]
fn package_qualifies_class() {
    let dir = tempfile::tempdir().unwrap();
    let tree = source(vec![pkg("a.b", vec![class("Foo", vec![])])]);
    let (summary, value) = index_tree(&dir, "Foo.scala", &tree);

    assert!(summary.error.is_none());
    assert_eq!(value["packages"], json!(["a.b"]));
    assert_eq!(value["classes"], json!(["a.b.Foo"]));
    assert_eq!(value["names"], json!(["Foo"]));
}

/// `import x.y.Z; class Foo extends Z`
#[test]
fn imported_supertype_is_resolved() {
    let dir = tempfile::tempdir().unwrap();
    let tree = source(vec![
        import("x.y", vec![importee("Z")]),
        class("Foo", vec![init(type_name("Z"))]),
    ]);
    let (_, value) = index_tree(&dir, "Foo.scala", &tree);

    assert_eq!(value["imports"], json!(["x.y.Z"]));
    assert_eq!(value["extends"], json!({ "class Foo": ["x.y.Z"] }));
}

/// `import x.y._; class Foo extends Z`
#[test]
fn wildcard_import_binds_no_short_name() {
    let dir = tempfile::tempdir().unwrap();
    let tree = source(vec![
        import("x.y", vec![json!({ "type": "Importee.Wildcard" })]),
        class("Foo", vec![init(type_name("Z"))]),
    ]);
    let (_, value) = index_tree(&dir, "Foo.scala", &tree);

    assert_eq!(value["imports"], json!(["x.y._"]));
    assert_eq!(value["extends"], json!({ "class Foo": ["Z"] }));
}

/// A file the parser could not parse.
#[test]
fn syntax_error_yields_error_record() {
    let dir = tempfile::tempdir().unwrap();
    let tree = json!({ "error": "<input>:3: error: } expected but end of file found" });
    let (summary, value) = index_tree(&dir, "Broken.scala", &tree);

    assert!(summary.is_error());
    let object = value.as_object().unwrap();
    let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
    keys.sort();
    assert_eq!(keys, vec!["error", "filename"]);
    assert!(value["error"].as_str().unwrap().contains("expected"));
}

/// `val count = 1; val (a, b) = pair`
#[test]
fn only_simple_vals_are_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let tree = source(vec![
        json!({
            "type": "Defn.Val",
            "mods": [],
            "pats": [{ "type": "Pat.Var", "name": term("count") }],
            "rhs": { "type": "Lit.Int", "value": 1 }
        }),
        json!({
            "type": "Defn.Val",
            "mods": [],
            "pats": [{
                "type": "Pat.Tuple",
                "args": [
                    { "type": "Pat.Var", "name": term("a") },
                    { "type": "Pat.Var", "name": term("b") }
                ]
            }],
            "rhs": term("pair")
        }),
    ]);
    let (summary, _) = index_tree(&dir, "Vals.scala", &tree);

    assert_eq!(summary.vals, vec!["count"]);
}

/// ```scala
/// package foo.test
///
/// import org.scalatest.{FlatSpec, Matchers}
/// import java.time.{LocalDate, LocalTime}
///
/// class FooTest extends FlatSpec with Matchers {}
/// ```
#[test]
fn grouped_imports_resolve_mixins() {
    let dir = tempfile::tempdir().unwrap();
    let tree = source(vec![pkg(
        "foo.test",
        vec![
            import("org.scalatest", vec![importee("FlatSpec"), importee("Matchers")]),
            import("java.time", vec![importee("LocalDate"), importee("LocalTime")]),
            class(
                "FooTest",
                vec![init(type_name("FlatSpec")), init(type_name("Matchers"))],
            ),
        ],
    )]);
    let (summary, value) = index_tree(&dir, "FooTest.scala", &tree);

    assert_eq!(summary.packages, vec!["foo.test"]);
    assert_eq!(summary.classes, vec!["foo.test.FooTest"]);
    assert_eq!(
        summary.imports,
        vec![
            "java.time.LocalDate",
            "java.time.LocalTime",
            "org.scalatest.FlatSpec",
            "org.scalatest.Matchers",
        ]
    );
    assert_eq!(
        value["extends"],
        json!({ "class foo.test.FooTest": ["org.scalatest.FlatSpec", "org.scalatest.Matchers"] })
    );
    assert_eq!(summary.names, vec!["FlatSpec", "FooTest", "Matchers"]);
}

/// ```scala
/// package gum.entity
///
/// case class CounterpartyUser(user: UserRecord[ActorId, EntityId])
///   extends UserComposition[ActorId, EntityId]
///   with HasIsOpsAdmin[ActorId, EntityId]
/// ```
#[test]
fn unresolved_supertypes_keep_declaration_order() {
    let applied = |name: &str| {
        json!({
            "type": "Type.Apply",
            "tpe": type_name(name),
            "args": [type_name("ActorId"), type_name("EntityId")]
        })
    };
    let mut decl = class(
        "CounterpartyUser",
        vec![init(applied("UserComposition")), init(applied("HasIsOpsAdmin"))],
    );
    decl["ctor"]["paramss"] = json!([[{
        "type": "Term.Param",
        "mods": [],
        "name": term("user"),
        "decltpe": applied("UserRecord")
    }]]);

    let dir = tempfile::tempdir().unwrap();
    let tree = source(vec![pkg("gum.entity", vec![decl])]);
    let (summary, value) = index_tree(&dir, "Main.scala", &tree);

    assert_eq!(summary.classes, vec!["gum.entity.CounterpartyUser"]);
    assert_eq!(
        value["extends"],
        json!({ "class gum.entity.CounterpartyUser": ["UserComposition", "HasIsOpsAdmin"] })
    );
    assert_eq!(
        summary.names,
        vec![
            "ActorId",
            "CounterpartyUser",
            "EntityId",
            "HasIsOpsAdmin",
            "UserComposition",
            "UserRecord",
        ]
    );
    assert!(summary.imports.is_empty());
    assert!(value.get("imports").is_none());
}

#[test]
fn same_tree_same_output() {
    let dir = tempfile::tempdir().unwrap();
    let tree = source(vec![pkg(
        "a",
        vec![
            import("x.y", vec![importee("Z"), json!({ "type": "Importee.Wildcard" })]),
            class("Foo", vec![init(type_name("Z"))]),
            json!({ "type": "Defn.Trait", "name": type_name("T"), "templ": { "type": "Template" } }),
            json!({ "type": "Defn.Object", "name": term("O"), "templ": { "type": "Template" } }),
        ],
    )]);
    let (_, first) = index_tree(&dir, "Same.scala", &tree);
    let (_, second) = index_tree(&dir, "Same.scala", &tree);

    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn parse_tree_is_included_on_request() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("T.scala");
    let tree = source(vec![]);
    fs::write(&file, tree.to_string()).unwrap();

    let options = IndexOptions {
        want_parse_tree: true,
        ..Default::default()
    };
    let (summary, _) = index_path(&file, &options);
    let rendered = summary.tree.unwrap();
    assert!(rendered.contains("\n    \"stats\""));
    let reparsed: Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(reparsed, tree);
}

/// `class Foo extends Z; import x.y.Z`
#[test]
fn import_after_class_still_resolves() {
    let dir = tempfile::tempdir().unwrap();
    let tree = source(vec![
        class("Foo", vec![init(type_name("Z"))]),
        import("x.y", vec![importee("Z")]),
    ]);
    let (_, value) = index_tree(&dir, "Foo.scala", &tree);

    assert_eq!(value["imports"], json!(["x.y.Z"]));
    assert_eq!(value["extends"], json!({ "class Foo": ["x.y.Z"] }));
}

/// ```scala
/// package a { import x.y.Z }
/// package b { class Foo extends Z }
/// ```
#[test]
fn import_in_sibling_package_resolves() {
    let dir = tempfile::tempdir().unwrap();
    let tree = source(vec![
        pkg("a", vec![import("x.y", vec![importee("Z")])]),
        pkg("b", vec![class("Foo", vec![init(type_name("Z"))])]),
    ]);
    let (summary, value) = index_tree(&dir, "Foo.scala", &tree);

    assert_eq!(summary.packages, vec!["a", "b"]);
    assert_eq!(value["extends"], json!({ "class b.Foo": ["x.y.Z"] }));
}

/// `object Holder { import x.y.Z }; class Foo extends Z`
#[test]
fn import_inside_object_resolves() {
    let dir = tempfile::tempdir().unwrap();
    let holder = json!({
        "type": "Defn.Object",
        "mods": [],
        "name": term("Holder"),
        "templ": {
            "type": "Template",
            "inits": [],
            "stats": [import("x.y", vec![importee("Z")])]
        }
    });
    let tree = source(vec![holder, class("Foo", vec![init(type_name("Z"))])]);
    let (summary, value) = index_tree(&dir, "Foo.scala", &tree);

    assert_eq!(summary.objects, vec!["Holder"]);
    assert_eq!(value["imports"], json!(["x.y.Z"]));
    assert_eq!(value["extends"], json!({ "class Foo": ["x.y.Z"] }));
}

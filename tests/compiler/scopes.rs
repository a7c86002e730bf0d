use crate::common::{compiled, RecordingBuilder};
use json_query::compiler::scope_calls;
use json_query::error::JsonQueryError;
use json_query::spec::ScopeDecl;
use json_query::{compile, QuerySpec};
use serde_json::json;

fn scope_lines(json: &str) -> Vec<String> {
    compiled(RecordingBuilder::users().with_scopes(&["active", "role"]), json)
        .calls
        .into_iter()
        .filter(|call| call.starts_with("scope"))
        .collect()
}

#[test]
fn test_declaration_shapes_resolve_to_the_same_call() {
    let csv = scope_lines(r#"{"scopes": {"active": "x,y"}}"#);
    let listed = scope_lines(r#"{"scopes": ["active:x,y"]}"#);
    let explicit = scope_lines(r#"{"scopes": {"active": ["x", "y"]}}"#);

    assert_eq!(csv, vec!["scope active[\"x\",\"y\"]"]);
    assert_eq!(listed, csv);
    assert_eq!(explicit, csv);

    assert_eq!(scope_lines(r#"{"scopes": {"active": []}}"#), vec!["scope active[]"]);
    assert_eq!(scope_lines(r#"{"scopes": ["active"]}"#), vec!["scope active[]"]);
}

#[test]
fn test_scopes_run_in_declaration_order() {
    assert_eq!(
        scope_lines(r#"{"scopes": {"role": "admin", "active": null}}"#),
        vec!["scope role[\"admin\"]", "scope active[]"]
    );
}

#[test]
fn test_unknown_scope_aborts_remaining_scopes() {
    let spec = QuerySpec::from_json(r#"{"scopes": ["active", "missing", "role:admin"]}"#).unwrap();
    let mut builder = RecordingBuilder::users().with_scopes(&["active", "role"]);

    let err = compile(&mut builder, &spec).unwrap_err();
    assert!(matches!(
        err,
        JsonQueryError::UnknownScope { ref scope, ref entity } if scope == "missing" && entity == "User"
    ));
    assert_eq!(builder.conditions(), vec!["scope active[]"]);
}

#[test]
fn test_scope_calls_without_a_builder() {
    let decl: ScopeDecl = serde_json::from_value(json!(["between:1,5", "flag"])).unwrap();
    let calls = scope_calls(&decl);
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].name, "between");
    assert_eq!(calls[0].args, vec![json!("1"), json!("5")]);
    assert!(calls[1].args.is_empty());
}

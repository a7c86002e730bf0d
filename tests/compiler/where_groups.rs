use crate::common::{compiled, RecordingBuilder};
use json_query::compiler::compile_where;
use json_query::error::JsonQueryError;
use json_query::spec::WhereNode;
use json_query::{compile, QuerySpec};
use serde_json::json;

fn where_calls(builder: RecordingBuilder, where_: serde_json::Value) -> Vec<String> {
    let json = json!({ "where": where_ }).to_string();
    compiled(builder, &json)
        .conditions()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_first_or_member_anchors_the_group() {
    let calls = where_calls(
        RecordingBuilder::users(),
        json!({"or": [{"field": "a", "value": 1}, {"field": "b", "operator": "null"}]}),
    );
    assert_eq!(calls, vec!["and (", "and a = 1", "or b is null", ")"]);
}

#[test]
fn test_member_order_shapes_the_group() {
    let calls = where_calls(
        RecordingBuilder::users(),
        json!({"or": [{"field": "b", "operator": "null"}, {"field": "a", "value": 1}]}),
    );
    assert_eq!(calls, vec!["and (", "and b is null", "or a = 1", ")"]);
}

#[test]
fn test_direct_condition_and_groups_all_compile() {
    let calls = where_calls(
        RecordingBuilder::users(),
        json!({
            "field": "status",
            "value": "open",
            "and": [
                {"field": "age", "operator": ">", "value": 18},
                {"field": "role", "operator": "in", "value": "admin,owner"}
            ],
            "or": [
                {"field": "created_at", "operator": "year", "value": 2024},
                {"field": "score", "operator": "between", "value": [1, 5]}
            ]
        }),
    );
    assert_eq!(
        calls,
        vec![
            "and status = \"open\"",
            "and (",
            "and age > 18",
            "and role in [\"admin\",\"owner\"]",
            ")",
            "and (",
            "and year(created_at) = 2024",
            "or score between [1,5]",
            ")",
        ]
    );
}

#[test]
fn test_nested_groups_recurse_with_the_same_anchoring() {
    let calls = where_calls(
        RecordingBuilder::users(),
        json!({"or": [
            {"field": "a", "value": 1, "or": [{"field": "b", "value": 2}, {"field": "c", "value": 3}]},
            {"field": "d", "value": 4, "and": [{"field": "e", "value": 5}]}
        ]}),
    );
    assert_eq!(
        calls,
        vec![
            "and (",
            "and a = 1",
            "and (",
            "and b = 2",
            "or c = 3",
            ")",
            "or d = 4",
            "and (",
            "and e = 5",
            ")",
            ")",
        ]
    );
}

#[test]
fn test_members_without_field_only_contribute_groups() {
    let calls = where_calls(
        RecordingBuilder::users(),
        json!({"and": [
            {"value": 1},
            {"field": "", "or": [{"field": "x", "value": 1}, {"field": "y", "value": 2}]}
        ]}),
    );
    assert_eq!(
        calls,
        vec!["and (", "and (", "and x = 1", "or y = 2", ")", ")"]
    );
}

#[test]
fn test_unknown_operator_falls_through_to_comparison() {
    let calls = where_calls(
        RecordingBuilder::users(),
        json!({"field": "name", "operator": "SOUNDS_LIKE", "value": "ann"}),
    );
    assert_eq!(calls, vec!["and name sounds_like \"ann\""]);
}

#[test]
fn test_like_wraps_value_and_negations_map() {
    let calls = where_calls(
        RecordingBuilder::users(),
        json!({"and": [
            {"field": "name", "operator": "like", "value": "ann"},
            {"field": "id", "operator": "not_in", "value": [1, 2]},
            {"field": "age", "operator": "not_between", "value": "1,9"},
            {"field": "deleted_at", "operator": "not_null"}
        ]}),
    );
    assert_eq!(
        calls,
        vec![
            "and (",
            "and name like \"%ann%\"",
            "and id not in [1,2]",
            "and age not between [\"1\",\"9\"]",
            "and deleted_at is not null",
            ")",
        ]
    );
}

#[test]
fn test_zero_set_comparand_is_an_empty_set() {
    let calls = where_calls(
        RecordingBuilder::users(),
        json!({"and": [
            {"field": "id", "operator": "in", "value": 0},
            {"field": "id", "operator": "not_in", "value": "0"}
        ]}),
    );
    assert_eq!(calls, vec!["and (", "and id in []", "and id not in []", ")"]);
}

#[test]
fn test_wildcard_expands_into_one_or_group() {
    let calls = where_calls(
        RecordingBuilder::users(),
        json!({"wildcard": {"fields": ["name", "profile:bio"], "value": "x"}}),
    );
    assert_eq!(
        calls,
        vec![
            "and (",
            "and name like \"%x%\"",
            "or where_has(profile, declared, present) {",
            "and (",
            "and bio like \"%x%\"",
            ")",
            "}",
            ")",
        ]
    );
}

#[test]
fn test_wildcard_with_comma_separated_fields() {
    let calls = where_calls(
        RecordingBuilder::users(),
        json!({"wildcard": {"fields": ["first_name,last_name", "posts:title,body"], "value": "q"}}),
    );
    assert_eq!(
        calls,
        vec![
            "and (",
            "and first_name like \"%q%\"",
            "or last_name like \"%q%\"",
            "or where_has(posts, declared, present) {",
            "and (",
            "and title like \"%q%\"",
            "or body like \"%q%\"",
            ")",
            "}",
            ")",
        ]
    );
}

#[test]
fn test_empty_wildcard_is_ignored() {
    let calls = where_calls(
        RecordingBuilder::users(),
        json!({"wildcard": {"fields": [], "value": "x"}}),
    );
    assert!(calls.is_empty());
}

#[test]
fn test_has_passes_quantifier_and_polymorphism() {
    let calls = where_calls(
        RecordingBuilder::users().with_polymorphic("commentable"),
        json!({"and": [
            {"field": "posts", "operator": "has", "sub_operator": ">=", "value": 3},
            {"field": "commentable", "operator": "has"},
            {"field": "posts", "operator": "not_has"}
        ]}),
    );
    assert_eq!(
        calls,
        vec![
            "and (",
            "and has(posts, declared, present, >= 3)",
            "and has(commentable, any, present, = null)",
            "and has(posts, declared, absent, = null)",
            ")",
        ]
    );
}

#[test]
fn test_where_has_compiles_constraint_against_relation() {
    let calls = where_calls(
        RecordingBuilder::users().with_polymorphic("commentable"),
        json!({
            "field": "commentable",
            "operator": "where_has",
            "value": {"field": "title", "operator": "like", "value": "rust"}
        }),
    );
    assert_eq!(
        calls,
        vec![
            "and where_has(commentable, any, present) {",
            "and title like \"%rust%\"",
            "}",
        ]
    );
}

#[test]
fn test_where_not_has_consults_polymorphism_only_when_or_joined() {
    let calls = where_calls(
        RecordingBuilder::users().with_polymorphic("commentable"),
        json!({
            "field": "commentable",
            "operator": "where_not_has",
            "or": [
                {"field": "a", "value": 1},
                {"field": "commentable", "operator": "where_not_has"}
            ]
        }),
    );
    assert_eq!(
        calls,
        vec![
            "and where_has(commentable, declared, absent) {",
            "}",
            "and (",
            "and a = 1",
            "or where_has(commentable, any, absent) {",
            "}",
            ")",
        ]
    );
}

#[test]
fn test_compile_where_on_constructed_nodes() {
    let node = WhereNode::condition("posts", "has", json!(1)).with_sub_operator(">");
    let mut builder = RecordingBuilder::users();
    compile_where(&mut builder, &node).unwrap();
    assert_eq!(
        builder.conditions(),
        vec!["and has(posts, declared, present, > 1)"]
    );
}

#[test]
fn test_builder_errors_propagate_unchanged() {
    let spec = QuerySpec::from_json(
        r#"{"where": {"field": "a", "value": 1}, "scopes": ["missing"]}"#,
    )
    .unwrap();
    let mut builder = RecordingBuilder::users();
    let err = compile(&mut builder, &spec).unwrap_err();
    assert!(matches!(err, JsonQueryError::UnknownScope { ref scope, .. } if scope == "missing"));
}

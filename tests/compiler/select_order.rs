use crate::common::{compiled, RecordingBuilder};

fn select_call(builder: RecordingBuilder, json: &str) -> String {
    compiled(builder, json)
        .calls
        .into_iter()
        .find(|call| call.starts_with("select"))
        .expect("select is always compiled")
}

#[test]
fn test_select_is_idempotent_on_primary_key() {
    let without = select_call(RecordingBuilder::users(), r#"{"select": ["name"]}"#);
    let with = select_call(RecordingBuilder::users(), r#"{"select": ["id", "name"]}"#);
    assert_eq!(without, "select users.id, users.name");
    assert_eq!(with, without);
}

#[test]
fn test_mandatory_fields_are_appended_once() {
    let call = select_call(
        RecordingBuilder::users().with_mandatory(&["tenant_id", "name"]),
        r#"{"select": ["name", "email", "name"]}"#,
    );
    assert_eq!(call, "select users.id, users.name, users.email, users.tenant_id");
}

#[test]
fn test_empty_spec_selects_everything_and_nothing_else() {
    let builder = compiled(RecordingBuilder::users(), "{}");
    assert_eq!(builder.calls, vec!["select users.*"]);
    assert!(builder.loads.is_empty());

    let blank = compiled(RecordingBuilder::users(), "");
    assert_eq!(blank.calls, vec!["select users.*"]);
}

#[test]
fn test_null_sections_are_no_ops() {
    let builder = compiled(
        RecordingBuilder::users(),
        r#"{"select": null, "where": null, "order": null, "include": null, "includeCount": null, "scopes": null}"#,
    );
    assert_eq!(builder.calls, vec!["select users.*"]);
}

#[test]
fn test_order_directions_are_normalized() {
    let builder = compiled(
        RecordingBuilder::users(),
        r#"{"order": [
            {"field": "name", "order": "DESC"},
            {"field": "age", "order": "sideways"},
            {"field": "id"},
            {"field": "email", "direction": "desc"}
        ]}"#,
    );
    assert_eq!(
        builder.conditions(),
        vec!["order name desc", "order age asc", "order id asc", "order email desc"]
    );
}

#[test]
fn test_stages_run_in_a_fixed_order() {
    let builder = compiled(
        RecordingBuilder::users().with_scopes(&["active"]),
        r#"{
            "scopes": ["active"],
            "includeCount": [{"relation": "comments"}],
            "include": [{"relation": "posts"}],
            "order": [{"field": "name"}],
            "where": {"field": "age", "operator": ">", "value": 30},
            "select": ["name"]
        }"#,
    );
    assert_eq!(
        builder.calls,
        vec![
            "select users.id, users.name",
            "and age > 30",
            "order name asc",
            "with posts",
            "with_count comments",
            "scope active[]",
        ]
    );
}

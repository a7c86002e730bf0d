use json_query::capability::{LogicalOperator, Predicate};
use json_query::error::JsonQueryError;
use json_query::query_builder::{Model, Schema, SqlQueryBuilder};
use json_query::{compile, JsonQuery, QuerySpec};
use serde_json::{json, Value};

fn schema() -> std::sync::Arc<Schema> {
    Schema::new()
        .register(
            Model::new("User", "users")
                .scope("active", |query, _args| {
                    query.where_predicate(
                        LogicalOperator::And,
                        Predicate::Null {
                            field: "users.deleted_at".to_string(),
                            negated: false,
                        },
                    )
                })
                .scope("role", |query, args| {
                    query.where_predicate(
                        LogicalOperator::And,
                        Predicate::In {
                            field: "users.role".to_string(),
                            values: args.to_vec(),
                            negated: false,
                        },
                    )
                })
                .scope("older_than", |query, args| {
                    let age = args.first().cloned().unwrap_or(Value::Null);
                    query.where_predicate(
                        LogicalOperator::And,
                        Predicate::Compare {
                            field: "users.age".to_string(),
                            operator: ">".to_string(),
                            value: age,
                        },
                    )
                }),
        )
        .into_shared()
}

fn users() -> SqlQueryBuilder {
    SqlQueryBuilder::new(schema(), "User").unwrap()
}

#[test]
fn test_registered_scopes_receive_declared_arguments() {
    let mut query = users();
    let spec = QuerySpec::from_json(
        r#"{"scopes": {"active": [], "role": "admin,editor", "older_than": 30}}"#,
    )
    .unwrap();
    compile(&mut query, &spec).unwrap();

    assert_eq!(
        query.build_sql(),
        r#"SELECT "users".* FROM "users" WHERE "users"."deleted_at" IS NULL AND "users"."role" IN (?, ?) AND "users"."age" > ?"#
    );
    assert_eq!(
        query.bindings(),
        vec![json!("admin"), json!("editor"), json!("30")]
    );
}

#[test]
fn test_unknown_scope_stops_later_scopes() {
    let mut query = users();
    let spec = QuerySpec::from_json(r#"{"scopes": ["active", "vip", "role:admin"]}"#).unwrap();

    let err = compile(&mut query, &spec).unwrap_err();
    assert!(matches!(err, JsonQueryError::UnknownScope { ref scope, .. } if scope == "vip"));
    assert_eq!(
        query.build_sql(),
        r#"SELECT "users".* FROM "users" WHERE "users"."deleted_at" IS NULL"#
    );
}

#[test]
fn test_facade_add_scopes_after_build() {
    let mut query = JsonQuery::new(users(), r#"{"scopes": ["role:admin"]}"#).unwrap();
    query.build_query().unwrap().add_scopes(&["active"]).unwrap();

    assert_eq!(
        query.query().build_sql(),
        r#"SELECT "users".* FROM "users" WHERE "users"."role" IN (?) AND "users"."deleted_at" IS NULL"#
    );
}

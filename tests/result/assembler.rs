use crate::common::ScriptedExecutor;
use json_query::result::{QueryExecutor, ResultAssembler};
use serde_json::{json, Value};

#[tokio::test]
async fn test_unpaginated_envelope() {
    let executor = ScriptedExecutor::with_rows(7);
    let result = ResultAssembler::new()
        .assemble(&executor, None, &json!(4))
        .await
        .unwrap();

    assert_eq!(result.items.len(), 7);
    let meta = result.meta;
    assert_eq!(meta.page, 1);
    assert_eq!(meta.last_page, None);
    assert_eq!(meta.from, Some(1));
    assert_eq!(meta.to, Some(7));
    assert_eq!(meta.limit, 7);
    assert_eq!(meta.total, 7);
    assert!(!meta.has_more_pages);
    assert!(meta.is_first_page);
    assert_eq!(meta.query, r#"select * from "users" where "age" > 30"#);
}

#[tokio::test]
async fn test_zero_limit_means_unpaginated() {
    let executor = ScriptedExecutor::with_rows(3);
    let result = ResultAssembler::new()
        .assemble(&executor, Some(0), &json!(2))
        .await
        .unwrap();
    assert_eq!(result.items.len(), 3);
    assert_eq!(result.meta.last_page, None);
    assert_eq!(result.meta.limit, 3);
}

#[tokio::test]
async fn test_paginated_envelope() {
    let executor = ScriptedExecutor::with_rows(25);
    let result = ResultAssembler::new()
        .assemble(&executor, Some(10), &json!("2"))
        .await
        .unwrap();

    assert_eq!(result.items.first(), Some(&json!({"id": 11})));
    assert_eq!(result.items.len(), 10);
    let meta = result.meta;
    assert_eq!(meta.page, 2);
    assert_eq!(meta.last_page, Some(3));
    assert_eq!(meta.from, Some(11));
    assert_eq!(meta.to, Some(20));
    assert_eq!(meta.limit, 10);
    assert_eq!(meta.total, 25);
    assert!(meta.has_more_pages);
    assert!(!meta.is_first_page);
    assert_eq!(
        meta.query,
        r#"select * from "users" where "age" > 30 limit 10 offset 10"#
    );
}

#[tokio::test]
async fn test_last_and_empty_pages() {
    let executor = ScriptedExecutor::with_rows(25);
    let assembler = ResultAssembler::new();

    let last = assembler.assemble(&executor, Some(10), &json!(3)).await.unwrap();
    assert_eq!(last.items.len(), 5);
    assert_eq!(last.meta.to, Some(25));
    assert!(!last.meta.has_more_pages);

    let beyond = assembler.assemble(&executor, Some(10), &json!(9)).await.unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.meta.page, 9);
    assert_eq!(beyond.meta.from, None);
    assert_eq!(beyond.meta.to, None);
}

#[tokio::test]
async fn test_invalid_pages_clamp_to_first() {
    let executor = ScriptedExecutor::with_rows(5);
    let assembler = ResultAssembler::new();

    for page in [json!(0), json!(-3), json!("abc"), Value::Null, json!(false)] {
        let result = assembler.assemble(&executor, Some(2), &page).await.unwrap();
        assert_eq!(result.meta.page, 1, "page input {page}");
        assert!(result.meta.is_first_page);
        assert_eq!(result.items.first(), Some(&json!({"id": 1})));
    }
}

#[tokio::test]
async fn test_page_size_cap() {
    let executor = ScriptedExecutor::with_rows(50);
    let result = ResultAssembler::new()
        .with_max_page_size(20)
        .assemble(&executor, Some(100), &json!(1))
        .await
        .unwrap();
    assert_eq!(result.items.len(), 20);
    assert_eq!(result.meta.limit, 20);
    assert_eq!(result.meta.last_page, Some(3));
}

#[tokio::test]
async fn test_envelope_serializes_with_snake_case_keys() {
    let executor = ScriptedExecutor::with_rows(1);
    let result = ResultAssembler::new()
        .assemble(&executor, None, &Value::Null)
        .await
        .unwrap();
    let meta = serde_json::to_value(&result.meta).unwrap();
    assert_eq!(
        meta,
        json!({
            "page": 1,
            "last_page": null,
            "from": 1,
            "to": 1,
            "limit": 1,
            "total": 1,
            "has_more_pages": false,
            "is_first_page": true,
            "query": "select * from \"users\" where \"age\" > 30"
        })
    );
}

#[tokio::test]
async fn test_executor_is_usable_as_trait_object() {
    let executor: Box<dyn QueryExecutor> = Box::new(ScriptedExecutor::with_rows(2));
    let result = ResultAssembler::new()
        .assemble(executor.as_ref(), Some(1), &json!(2))
        .await
        .unwrap();
    assert_eq!(result.items, vec![json!({"id": 2})]);
}

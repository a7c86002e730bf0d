use proptest::prelude::*;
use proptest::strategy::Just;
use serde_json::{json, Value};

/// Strategy for generating column names
pub fn field_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}"
}

/// Strategy for operators that compile to exactly one column predicate
pub fn column_operator_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "=", ">", "<=", "<>", "like", "in", "not_in", "between", "not_between", "null",
        "not_null", "date", "year", "month",
    ])
}

/// Strategy for generating single-condition where nodes
pub fn condition_strategy() -> impl Strategy<Value = Value> {
    (field_name_strategy(), column_operator_strategy(), 0i64..1000).prop_map(
        |(field, operator, value)| json!({"field": field, "operator": operator, "value": value}),
    )
}

/// Strategy for generating non-empty OR/AND member lists
pub fn members_strategy() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(condition_strategy(), 1..8)
}

/// Strategy for generating loosely typed page inputs
pub fn page_input_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        (-1.0e6f64..1.0e6).prop_map(Value::from),
        "[0-9 .+-]{0,8}".prop_map(Value::from),
        "[a-z]{1,5}".prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        Just(Value::Null),
        Just(json!([2])),
    ]
}

/// Strategy for generating select lists
pub fn select_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop_oneof![Just("id".to_string()), field_name_strategy()],
        1..8,
    )
}

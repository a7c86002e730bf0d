//! # Specification Model
//!
//! Typed, order-preserving representation of a JSON query description.
//!
//! A [`QuerySpec`] describes one level of a query: the root entity or one
//! related entity reached through an include. Nodes hold data only; the
//! [`compiler`](crate::compiler) walks them and drives a
//! [`QueryBuilder`](crate::capability::QueryBuilder).
//!
//! ```rust
//! use json_query::spec::QuerySpec;
//!
//! let spec = QuerySpec::from_json(
//!     r#"{
//!         "select": ["name", "email"],
//!         "where": {"field": "active", "value": true},
//!         "order": [{"field": "name", "order": "desc"}],
//!         "include": [{"relation": "posts", "select": ["title"]}],
//!         "scopes": ["verified"]
//!     }"#,
//! )
//! .unwrap();
//!
//! assert_eq!(spec.select, vec!["name", "email"]);
//! assert_eq!(spec.include[0].relation, "posts");
//! ```

pub mod query_spec;
pub mod scope_decl;
pub mod where_node;

pub use query_spec::{IncludeCountNode, IncludeNode, OrderItem, QuerySpec};
pub use scope_decl::{ScopeArgs, ScopeDecl};
pub use where_node::{ConditionValue, WhereNode, WildcardNode};

use serde::{Deserialize, Deserializer};

/// Treats an explicit JSON `null` the same as an absent key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Renders a JSON scalar the way it would appear in a query string.
pub(crate) fn scalar_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

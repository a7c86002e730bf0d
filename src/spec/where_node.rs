use serde::Deserialize;
use serde_json::Value;

use super::{null_as_default, scalar_text};

/// A boolean condition tree node.
///
/// A node may carry a direct condition (`field`/`operator`/`value`) together
/// with `and`, `or` and `wildcard` groups; every part present is compiled.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawWhereNode")]
pub struct WhereNode {
    pub field: Option<String>,
    pub value: ConditionValue,
    pub operator: String,
    pub sub_operator: String,
    pub and: Vec<WhereNode>,
    pub or: Vec<WhereNode>,
    pub wildcard: Option<WildcardNode>,
}

/// Comparand of a condition.
///
/// `where_has`/`where_not_has` carry a nested node evaluated against the
/// related entity; every other operator carries a plain JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionValue {
    Value(Value),
    Constraint(Box<WhereNode>),
}

impl Default for ConditionValue {
    fn default() -> Self {
        ConditionValue::Value(Value::Null)
    }
}

impl ConditionValue {
    pub fn as_value(&self) -> &Value {
        match self {
            ConditionValue::Value(value) => value,
            ConditionValue::Constraint(_) => &Value::Null,
        }
    }

    pub fn as_constraint(&self) -> Option<&WhereNode> {
        match self {
            ConditionValue::Constraint(node) => Some(node),
            ConditionValue::Value(_) => None,
        }
    }
}

impl Default for WhereNode {
    fn default() -> Self {
        Self {
            field: None,
            value: ConditionValue::default(),
            operator: "=".to_string(),
            sub_operator: "=".to_string(),
            and: Vec::new(),
            or: Vec::new(),
            wildcard: None,
        }
    }
}

impl WhereNode {
    /// A direct `field operator value` condition
    pub fn condition(field: &str, operator: &str, value: Value) -> Self {
        Self {
            field: Some(field.to_string()),
            value: ConditionValue::Value(value),
            operator: operator.to_string(),
            ..Self::default()
        }
    }

    /// A relation-existence condition gated by `constraint`
    pub fn relation(field: &str, operator: &str, constraint: WhereNode) -> Self {
        Self {
            field: Some(field.to_string()),
            value: ConditionValue::Constraint(Box::new(constraint)),
            operator: operator.to_string(),
            ..Self::default()
        }
    }

    /// A node with no direct condition whose `or` group is `members`
    pub fn any_of(members: Vec<WhereNode>) -> Self {
        Self {
            or: members,
            ..Self::default()
        }
    }

    /// A node with no direct condition whose `and` group is `members`
    pub fn all_of(members: Vec<WhereNode>) -> Self {
        Self {
            and: members,
            ..Self::default()
        }
    }

    pub fn with_sub_operator(mut self, sub_operator: &str) -> Self {
        self.sub_operator = sub_operator.to_string();
        self
    }

    pub fn with_and(mut self, members: Vec<WhereNode>) -> Self {
        self.and = members;
        self
    }

    pub fn with_or(mut self, members: Vec<WhereNode>) -> Self {
        self.or = members;
        self
    }

    pub fn with_wildcard(mut self, wildcard: WildcardNode) -> Self {
        self.wildcard = Some(wildcard);
        self
    }

    /// The field of the direct condition, if the node carries one
    pub fn condition_field(&self) -> Option<&str> {
        self.field.as_deref().filter(|field| !field.is_empty())
    }
}

/// Multi-field substring search, possibly reaching through relations
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WildcardNode {
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<String>,

    #[serde(default, deserialize_with = "scalar_as_text")]
    pub value: String,
}

impl WildcardNode {
    pub fn new(fields: &[&str], value: &str) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            value: value.to_string(),
        }
    }
}

fn scalar_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Array(_) | Value::Object(_) => Err(serde::de::Error::custom(
            "wildcard value must be a string or number",
        )),
        scalar => Ok(scalar_text(&scalar)),
    }
}

/// Wire shape of a [`WhereNode`] before operator-aware value mapping
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawWhereNode {
    field: Option<String>,
    value: Option<Value>,
    operator: Option<String>,
    #[serde(alias = "subOperator")]
    sub_operator: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    and: Vec<WhereNode>,
    #[serde(deserialize_with = "null_as_default")]
    or: Vec<WhereNode>,
    wildcard: Option<WildcardNode>,
}

impl TryFrom<RawWhereNode> for WhereNode {
    type Error = String;

    fn try_from(raw: RawWhereNode) -> Result<Self, Self::Error> {
        let operator = raw
            .operator
            .filter(|op| !op.is_empty())
            .unwrap_or_else(|| "=".to_string());
        let sub_operator = raw
            .sub_operator
            .filter(|op| !op.is_empty())
            .unwrap_or_else(|| "=".to_string());

        let value = match operator.to_lowercase().as_str() {
            "where_has" | "where_not_has" => match raw.value {
                None | Some(Value::Null) => ConditionValue::Constraint(Box::default()),
                Some(nested @ Value::Object(_)) => {
                    let node: WhereNode = serde_json::from_value(nested).map_err(|e| {
                        format!("invalid {operator} constraint on {:?}: {e}", raw.field)
                    })?;
                    ConditionValue::Constraint(Box::new(node))
                }
                Some(other) => {
                    return Err(format!(
                        "{operator} on {:?} expects an object constraint, got {other}",
                        raw.field
                    ))
                }
            },
            _ => ConditionValue::Value(raw.value.unwrap_or(Value::Null)),
        };

        Ok(WhereNode {
            field: raw.field,
            value,
            operator,
            sub_operator,
            and: raw.and,
            or: raw.or,
            wildcard: raw.wildcard,
        })
    }
}

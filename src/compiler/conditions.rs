//! Where compilation: direct conditions, AND/OR groups and wildcard search.
//!
//! Grouping rules:
//!
//! - a node's direct condition is AND-joined at its own level
//! - its `and`, `or` and `wildcard` parts each open an AND-joined group
//! - inside an `or` group the first member anchors the group (AND-joined)
//!   and every later member is OR-joined
//! - a member's own `and`/`or` parts open AND-joined groups after it
//!
//! Member order therefore shapes the generated predicate even though OR is
//! commutative.

use std::borrow::Cow;

use serde_json::Value;
use tracing::debug;

use super::operators::{like_pattern, value_list, Operator};
use crate::capability::{Existence, LogicalOperator, Predicate, QueryBuilder, RelatedTypes};
use crate::error::{JsonQueryError, Result};
use crate::spec::{ConditionValue, WhereNode, WildcardNode};

/// Separates a relation from the rest of a wildcard field path
const RELATION_SEPARATOR: char = ':';

/// Separates sibling fields inside one wildcard path segment
const FIELD_SEPARATOR: char = ',';

/// Compile a root where node onto `builder`
pub fn compile_where(builder: &mut dyn QueryBuilder, node: &WhereNode) -> Result<()> {
    if node.condition_field().is_some() {
        compile_condition(builder, node, LogicalOperator::And)?;
    }

    compile_nested_groups(builder, node)?;

    if let Some(wildcard) = node.wildcard.as_ref().filter(|w| !w.fields.is_empty()) {
        let members = expand_wildcard(wildcard);
        debug!(
            entity = %builder.entity().name,
            fields = wildcard.fields.len(),
            members = members.len(),
            "expanded wildcard search"
        );
        builder.where_group(LogicalOperator::And, &mut |query| {
            compile_or_group(query, &members)
        })?;
    }

    Ok(())
}

fn compile_nested_groups(builder: &mut dyn QueryBuilder, node: &WhereNode) -> Result<()> {
    if !node.and.is_empty() {
        builder.where_group(LogicalOperator::And, &mut |query| {
            compile_and_group(query, &node.and)
        })?;
    }

    if !node.or.is_empty() {
        builder.where_group(LogicalOperator::And, &mut |query| {
            compile_or_group(query, &node.or)
        })?;
    }

    Ok(())
}

/// Conjoin every member
pub fn compile_and_group(builder: &mut dyn QueryBuilder, members: &[WhereNode]) -> Result<()> {
    for member in members {
        compile_member(builder, member, LogicalOperator::And)?;
    }
    Ok(())
}

/// First member anchors with AND, the rest join with OR
pub fn compile_or_group(builder: &mut dyn QueryBuilder, members: &[WhereNode]) -> Result<()> {
    for (position, member) in members.iter().enumerate() {
        let join = if position == 0 {
            LogicalOperator::And
        } else {
            LogicalOperator::Or
        };
        compile_member(builder, member, join)?;
    }
    Ok(())
}

fn compile_member(
    builder: &mut dyn QueryBuilder,
    member: &WhereNode,
    join: LogicalOperator,
) -> Result<()> {
    if member.condition_field().is_some() {
        compile_condition(builder, member, join)?;
    } else if member.and.is_empty() && member.or.is_empty() {
        debug!(operator = %member.operator, "skipping group member without a field");
    }

    compile_nested_groups(builder, member)
}

/// Compile the direct condition of `node` with the given join.
///
/// Nodes without a field contribute nothing.
pub fn compile_condition(
    builder: &mut dyn QueryBuilder,
    node: &WhereNode,
    join: LogicalOperator,
) -> Result<()> {
    let Some(field) = node.condition_field() else {
        return Ok(());
    };
    let value = node.value.as_value();

    let predicate = match Operator::parse(&node.operator) {
        Operator::Between => Predicate::Between {
            field: field.to_string(),
            values: value_list(value),
            negated: false,
        },
        Operator::NotBetween => Predicate::Between {
            field: field.to_string(),
            values: value_list(value),
            negated: true,
        },
        Operator::In => Predicate::In {
            field: field.to_string(),
            values: value_list(value),
            negated: false,
        },
        Operator::NotIn => Predicate::In {
            field: field.to_string(),
            values: value_list(value),
            negated: true,
        },
        Operator::Null => Predicate::Null {
            field: field.to_string(),
            negated: false,
        },
        Operator::NotNull => Predicate::Null {
            field: field.to_string(),
            negated: true,
        },
        Operator::DatePart(part) => Predicate::DatePart {
            field: field.to_string(),
            part,
            value: value.clone(),
        },
        Operator::Like => Predicate::Compare {
            field: field.to_string(),
            operator: "like".to_string(),
            value: like_pattern(value),
        },
        Operator::Has => {
            let types = related_types(builder, field);
            return builder.has(
                join,
                field,
                types,
                Existence::Present,
                &node.sub_operator.to_lowercase(),
                value,
            );
        }
        Operator::NotHas => {
            let types = related_types(builder, field);
            return builder.has(
                join,
                field,
                types,
                Existence::Absent,
                &node.sub_operator.to_lowercase(),
                value,
            );
        }
        Operator::WhereHas => {
            let types = related_types(builder, field);
            let constraint = constraint_of(node)?;
            return builder.where_has(join, field, types, Existence::Present, &mut |query| {
                compile_where(query, &constraint)
            });
        }
        Operator::WhereNotHas => {
            // Only the OR-joined form consults polymorphism.
            let types = match join {
                LogicalOperator::And => RelatedTypes::Declared,
                LogicalOperator::Or => related_types(builder, field),
            };
            let constraint = constraint_of(node)?;
            return builder.where_has(join, field, types, Existence::Absent, &mut |query| {
                compile_where(query, &constraint)
            });
        }
        Operator::Compare(operator) => Predicate::Compare {
            field: field.to_string(),
            operator,
            value: value.clone(),
        },
    };

    builder.where_predicate(join, predicate)
}

fn related_types(builder: &dyn QueryBuilder, relation: &str) -> RelatedTypes {
    if builder.is_polymorphic(relation) {
        RelatedTypes::Any
    } else {
        RelatedTypes::Declared
    }
}

/// Nested node gating a `where_has`/`where_not_has` condition
fn constraint_of(node: &WhereNode) -> Result<Cow<'_, WhereNode>> {
    match &node.value {
        ConditionValue::Constraint(constraint) => Ok(Cow::Borrowed(constraint.as_ref())),
        ConditionValue::Value(Value::Null) => Ok(Cow::Owned(WhereNode::default())),
        ConditionValue::Value(nested @ Value::Object(_)) => {
            let constraint: WhereNode = serde_json::from_value(nested.clone())?;
            Ok(Cow::Owned(constraint))
        }
        ConditionValue::Value(other) => Err(JsonQueryError::MalformedSpec(format!(
            "{} on '{}' expects an object constraint, got {other}",
            node.operator,
            node.field.as_deref().unwrap_or_default()
        ))),
    }
}

/// Expand a wildcard into the flat member list of one OR group
pub fn expand_wildcard(wildcard: &WildcardNode) -> Vec<WhereNode> {
    wildcard
        .fields
        .iter()
        .flat_map(|path| expand_path(path, &wildcard.value))
        .collect()
}

fn expand_path(path: &str, value: &str) -> Vec<WhereNode> {
    match path.split_once(RELATION_SEPARATOR) {
        Some((relation, rest)) => vec![WhereNode::relation(
            relation,
            "where_has",
            WhereNode::any_of(expand_path(rest, value)),
        )],
        None => path
            .split(FIELD_SEPARATOR)
            .map(|field| WhereNode::condition(field, "like", Value::String(value.to_string())))
            .collect(),
    }
}

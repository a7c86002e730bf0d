//! Post-fetch relation loading.
//!
//! Each include registered on a builder runs as one query over the related
//! model, restricted with `IN (...)` to the keys found in the parent rows.
//! Polymorphic relations run one such query per morph type present. Loaded
//! rows are attached to their parents under the relation name, and the
//! related builders load their own includes the same way.

use std::collections::{HashMap, HashSet};

use futures::future::BoxFuture;
use serde_json::Value;
use sqlx::PgPool;
use tracing::debug;

use super::builder::SqlQueryBuilder;
use super::executor::fetch_rows;
use super::schema::RelationKind;
use crate::capability::RelationLoad;
use crate::error::Result;
use crate::spec::scalar_text;

/// Attach every include registered on `builder` to `rows`
pub fn load_relations<'a>(
    builder: &'a SqlQueryBuilder,
    pool: &'a PgPool,
    rows: &'a mut [Value],
) -> BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        if rows.is_empty() {
            return Ok(());
        }
        for load in builder.eager_loads() {
            load_relation(builder, pool, load, rows).await?;
        }
        Ok(())
    })
}

async fn load_relation(
    builder: &SqlQueryBuilder,
    pool: &PgPool,
    load: &RelationLoad,
    rows: &mut [Value],
) -> Result<()> {
    let name = load.relation();
    let relation = builder.model().get_relation(name)?;

    match &relation.kind {
        RelationKind::HasMany {
            related,
            foreign_key,
            local_key,
        } => {
            let keys = distinct_keys(rows, local_key);
            let children = fetch_related(builder, pool, load, related, foreign_key, keys).await?;
            let grouped = group_by(children, foreign_key);
            for row in rows.iter_mut() {
                let matched = key_of(row, local_key)
                    .and_then(|key| grouped.get(&key))
                    .cloned()
                    .unwrap_or_default();
                attach(row, name, Value::Array(matched));
            }
        }
        RelationKind::HasOne {
            related,
            foreign_key,
            local_key,
        } => {
            let keys = distinct_keys(rows, local_key);
            let children = fetch_related(builder, pool, load, related, foreign_key, keys).await?;
            let grouped = group_by(children, foreign_key);
            for row in rows.iter_mut() {
                let matched = first_match(&grouped, key_of(row, local_key));
                attach(row, name, matched);
            }
        }
        RelationKind::BelongsTo {
            related,
            foreign_key,
            owner_key,
        } => {
            let keys = distinct_keys(rows, foreign_key);
            let owners = fetch_related(builder, pool, load, related, owner_key, keys).await?;
            let grouped = group_by(owners, owner_key);
            for row in rows.iter_mut() {
                let matched = first_match(&grouped, key_of(row, foreign_key));
                attach(row, name, matched);
            }
        }
        RelationKind::MorphTo {
            type_column,
            id_column,
            types,
        } => {
            let mut loaded: HashMap<(String, String), Value> = HashMap::new();
            for morph in types {
                let of_type: Vec<Value> = rows
                    .iter()
                    .filter(|row| key_of(row, type_column).as_deref() == Some(morph.alias.as_str()))
                    .cloned()
                    .collect();
                let keys = distinct_keys(&of_type, id_column);
                if keys.is_empty() {
                    continue;
                }

                let primary_key = builder
                    .schema()
                    .model(&morph.model)?
                    .meta()
                    .primary_key
                    .clone();
                let targets =
                    fetch_related(builder, pool, load, &morph.model, &primary_key, keys).await?;
                for target in targets {
                    if let Some(key) = key_of(&target, &primary_key) {
                        loaded.insert((morph.alias.clone(), key), target);
                    }
                }
            }

            for row in rows.iter_mut() {
                let matched = match (key_of(row, type_column), key_of(row, id_column)) {
                    (Some(alias), Some(id)) => loaded.get(&(alias, id)).cloned().unwrap_or(Value::Null),
                    _ => Value::Null,
                };
                attach(row, name, matched);
            }
        }
    }

    Ok(())
}

/// Rows of `model` whose `key_column` is one of `keys`, shaped by the
/// include's own specification
async fn fetch_related(
    builder: &SqlQueryBuilder,
    pool: &PgPool,
    load: &RelationLoad,
    model: &str,
    key_column: &str,
    keys: Vec<Value>,
) -> Result<Vec<Value>> {
    if keys.is_empty() {
        return Ok(Vec::new());
    }

    let mut related = builder.related(model)?;
    load.configure(&mut related)?;
    related.restrict_to(key_column, keys);
    related.ensure_selected(key_column);

    debug!(
        parent = %builder.model().name(),
        relation = %load.relation(),
        model = %model,
        "eager loading relation"
    );
    fetch_rows(&related, pool).await
}

/// Non-null values of `column` across `rows`, first occurrence order
fn distinct_keys(rows: &[Value], column: &str) -> Vec<Value> {
    let mut seen = HashSet::new();
    let mut keys = Vec::new();
    for row in rows {
        if let Some(key) = key_of(row, column) {
            if seen.insert(key) {
                keys.push(row[column].clone());
            }
        }
    }
    keys
}

fn key_of(row: &Value, column: &str) -> Option<String> {
    match row.get(column) {
        None | Some(Value::Null) => None,
        Some(value) => Some(scalar_text(value)),
    }
}

fn group_by(rows: Vec<Value>, column: &str) -> HashMap<String, Vec<Value>> {
    let mut grouped: HashMap<String, Vec<Value>> = HashMap::new();
    for row in rows {
        if let Some(key) = key_of(&row, column) {
            grouped.entry(key).or_default().push(row);
        }
    }
    grouped
}

fn first_match(grouped: &HashMap<String, Vec<Value>>, key: Option<String>) -> Value {
    key.and_then(|key| grouped.get(&key))
        .and_then(|matches| matches.first())
        .cloned()
        .unwrap_or(Value::Null)
}

fn attach(row: &mut Value, relation: &str, value: Value) {
    if let Value::Object(fields) = row {
        fields.insert(relation.to_string(), value);
    }
}

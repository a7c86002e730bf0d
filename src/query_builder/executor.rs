use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;
use sqlx::{PgPool, Row};
use tracing::debug;

use super::builder::SqlQueryBuilder;
use super::conditions::SqlFragment;
use super::eager::load_relations;
use crate::error::{JsonQueryError, Result};
use crate::result::render::{split_placeholders, Segment};
use crate::result::{Paginated, QueryExecutor};

/// Runs a [`SqlQueryBuilder`] against a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgExecutor {
    builder: SqlQueryBuilder,
    pool: PgPool,
}

impl PgExecutor {
    pub fn new(builder: SqlQueryBuilder, pool: PgPool) -> Self {
        Self { builder, pool }
    }

    pub fn builder(&self) -> &SqlQueryBuilder {
        &self.builder
    }
}

#[async_trait]
impl QueryExecutor for PgExecutor {
    async fn paginate(&self, per_page: u64, page: u64) -> Result<Paginated> {
        let total = self.count().await?;
        let paged = self.builder.clone().paginate(page, per_page);
        let items = fetch_rows(&paged, &self.pool).await?;
        Ok(Paginated { items, total })
    }

    async fn get(&self) -> Result<Vec<Value>> {
        fetch_rows(&self.builder, &self.pool).await
    }

    async fn count(&self) -> Result<u64> {
        let sql = inline_bindings(&self.builder.build_count())?;
        debug!(sql = %sql, "counting rows");

        let row = sqlx::query(&sql).fetch_one(&self.pool).await?;
        let count: i64 = row.try_get(0)?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    fn to_sql(&self) -> String {
        self.builder.build_sql()
    }

    fn page_sql(&self, per_page: u64, page: u64) -> String {
        self.builder.clone().paginate(page, per_page).build_sql()
    }

    fn bindings(&self) -> Vec<Value> {
        self.builder.bindings()
    }
}

/// Rows of `builder`'s query as JSON objects, includes attached
pub(crate) fn fetch_rows<'a>(
    builder: &'a SqlQueryBuilder,
    pool: &'a PgPool,
) -> BoxFuture<'a, Result<Vec<Value>>> {
    Box::pin(async move {
        let sql = format!(
            "SELECT to_jsonb(q) AS data FROM ({}) AS q",
            inline_bindings(&builder.build())?
        );
        debug!(model = %builder.model().name(), sql = %sql, "fetching rows");

        let mut rows = sqlx::query(&sql)
            .fetch_all(pool)
            .await?
            .iter()
            .map(|row| row.try_get::<Value, _>("data"))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        load_relations(builder, pool, &mut rows).await?;
        Ok(rows)
    })
}

/// Splice bindings into the query as SQL literals.
///
/// Values arrive untyped, so each becomes a quoted literal and PostgreSQL
/// resolves its type from the column it meets.
pub fn inline_bindings(query: &SqlFragment) -> Result<String> {
    let mut values = query.bindings.iter();
    let mut sql = String::with_capacity(query.sql.len());

    for segment in split_placeholders(&query.sql) {
        match segment {
            Segment::Text(text) => sql.push_str(text),
            Segment::Placeholder => {
                let value = values.next().ok_or_else(|| {
                    JsonQueryError::Execution("query has more placeholders than bindings".to_string())
                })?;
                sql.push_str(&sql_literal(value));
            }
        }
    }

    if values.next().is_some() {
        return Err(JsonQueryError::Execution(
            "query has more bindings than placeholders".to_string(),
        ));
    }
    Ok(sql)
}

fn sql_literal(value: &Value) -> String {
    let text = match value {
        Value::Null => return "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    format!("'{}'", text.replace('\'', "''"))
}

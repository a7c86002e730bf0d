use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::conditions::{quote_identifier, render_clauses, Condition, SqlFragment, WhereClause};
use super::pagination::Pagination;
use super::schema::{Model, Relation, RelationKind, Schema};
use crate::capability::{
    Configure, Direction, EntityMeta, Existence, LogicalOperator, Predicate, QueryBuilder,
    RelatedTypes, RelationLoad,
};
use crate::error::{JsonQueryError, Result};

/// Operators rendered into comparisons as written. Any other token becomes
/// an equality against the token itself.
const COMPARISON_OPERATORS: &[&str] = &[
    "=", "<", ">", "<=", ">=", "<>", "!=", "like", "not like", "ilike", "not ilike", "~", "~*",
    "!~", "!~*", "~~", "~~*", "!~~", "!~~*", "similar to", "not similar to",
    "is distinct from", "is not distinct from", "<<", ">>", "<<=", ">>=", "&&", "@>", "<@", "@@",
];

/// Whitelisted operator and value, or `= 'token'` for an unknown token
fn comparison(operator: &str, value: Value) -> (String, Value) {
    let normalized = operator.trim().to_lowercase();
    if COMPARISON_OPERATORS.contains(&normalized.as_str()) {
        (normalized, value)
    } else {
        debug!(operator, "unknown operator compared as an equality against its token");
        ("=".to_string(), Value::String(operator.to_string()))
    }
}

/// PostgreSQL query builder for one model of a [`Schema`].
///
/// Renders `?` placeholders with an ordered binding list; the executor
/// renumbers them for the wire.
#[derive(Debug, Clone)]
pub struct SqlQueryBuilder {
    schema: Arc<Schema>,
    model: Arc<Model>,
    select_fields: Vec<String>,
    count_columns: Vec<SqlFragment>,
    where_clauses: Vec<WhereClause>,
    order_by: Vec<String>,
    eager_loads: Vec<RelationLoad>,
    pagination: Option<Pagination>,
    /// Name the table goes by inside a subquery over its own table
    alias: Option<String>,
    /// Subquery nesting level
    depth: usize,
}

impl SqlQueryBuilder {
    /// Create a query builder for the named model
    pub fn new(schema: Arc<Schema>, model: &str) -> Result<Self> {
        let model = schema.model(model)?;
        Ok(Self::for_model(schema, model))
    }

    fn for_model(schema: Arc<Schema>, model: Arc<Model>) -> Self {
        Self {
            schema,
            model,
            select_fields: Vec::new(),
            count_columns: Vec::new(),
            where_clauses: Vec::new(),
            order_by: Vec::new(),
            eager_loads: Vec::new(),
            pagination: None,
            alias: None,
            depth: 0,
        }
    }

    /// Fresh builder for another model of the same schema
    pub fn related(&self, model: &str) -> Result<Self> {
        Self::new(self.schema.clone(), model)
    }

    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn where_clauses(&self) -> &[WhereClause] {
        &self.where_clauses
    }

    pub fn eager_loads(&self) -> &[RelationLoad] {
        &self.eager_loads
    }

    /// Add pagination (LIMIT/OFFSET)
    pub fn paginate(mut self, page: u64, per_page: u64) -> Self {
        self.pagination = Some(Pagination::new(page, per_page));
        self
    }

    /// Build the complete query with its bindings
    pub fn build(&self) -> SqlFragment {
        let table = quote_identifier(self.model.table());
        let mut bindings = Vec::new();

        let mut columns: Vec<String> = if self.select_fields.is_empty() {
            vec![format!("{table}.*")]
        } else {
            self.select_fields
                .iter()
                .map(|field| quote_identifier(field))
                .collect()
        };
        for count in &self.count_columns {
            columns.push(count.sql.clone());
            bindings.extend(count.bindings.iter().cloned());
        }

        let mut sql = format!("SELECT {} FROM {table}", columns.join(", "));

        if !self.where_clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&render_clauses(&self.where_clauses, &mut bindings));
        }

        if !self.order_by.is_empty() {
            sql.push_str(&format!(" ORDER BY {}", self.order_by.join(", ")));
        }

        if let Some(ref pagination) = self.pagination {
            sql.push_str(&pagination.to_sql());
        }

        SqlFragment::new(sql, bindings)
    }

    /// Build the complete SQL query string
    pub fn build_sql(&self) -> String {
        self.build().sql
    }

    pub fn bindings(&self) -> Vec<Value> {
        self.build().bindings
    }

    /// Count of the rows the query matches, ignoring order and pagination
    pub fn build_count(&self) -> SqlFragment {
        let mut counted = self.clone();
        counted.order_by.clear();
        counted.pagination = None;

        let inner = counted.build();
        SqlFragment::new(
            format!("SELECT count(*) FROM ({}) AS \"aggregate_table\"", inner.sql),
            inner.bindings,
        )
    }

    /// Keep only rows whose `column` holds one of `keys`, ahead of any
    /// constraints already added
    pub fn restrict_to(&mut self, column: &str, keys: Vec<Value>) {
        let existing = std::mem::take(&mut self.where_clauses);
        self.where_clauses.push(WhereClause::and(Condition::In {
            field: format!("{}.{column}", self.model.table()),
            values: keys,
            negated: false,
        }));
        if !existing.is_empty() {
            self.where_clauses
                .push(WhereClause::and(Condition::Group(existing)));
        }
    }

    /// Add `column` to an explicit projection that lacks it
    pub fn ensure_selected(&mut self, column: &str) {
        let table = self.model.table();
        let everything = format!("{table}.*");
        let qualified = format!("{table}.{column}");
        if self.select_fields.is_empty() || self.select_fields.contains(&everything) {
            return;
        }
        if !self.select_fields.contains(&qualified) {
            self.select_fields.push(qualified);
        }
    }

    /// Builder over the same model with no clauses, for parenthesized groups
    fn nested(&self) -> Self {
        let mut nested = Self::for_model(self.schema.clone(), self.model.clone());
        nested.alias = self.alias.clone();
        nested.depth = self.depth;
        nested
    }

    /// Builder for a subquery over `model`, aliased when it shares this
    /// builder's table
    fn subquery_builder(&self, model: &str) -> Result<Self> {
        let mut related = self.related(model)?;
        related.depth = self.depth + 1;
        if related.model.table() == self.model.table() {
            related.alias = Some(format!("self_{}", self.depth));
        }
        Ok(related)
    }

    /// Table name or alias that qualifies this builder's columns
    fn source(&self) -> &str {
        self.alias.as_deref().unwrap_or(self.model.table())
    }

    fn from_clause(&self) -> String {
        let table = quote_identifier(self.model.table());
        match &self.alias {
            Some(alias) => format!("{table} AS {}", quote_identifier(alias)),
            None => table,
        }
    }

    fn column(table: &str, column: &str) -> String {
        quote_identifier(&format!("{table}.{column}"))
    }

    /// Related builder plus the SQL linking its rows to this model's rows
    fn link(&self, relation: &Relation) -> Result<(Self, String)> {
        let parent = self.source();
        match &relation.kind {
            RelationKind::HasMany {
                related,
                foreign_key,
                local_key,
            }
            | RelationKind::HasOne {
                related,
                foreign_key,
                local_key,
            } => {
                let related = self.subquery_builder(related)?;
                let link = format!(
                    "{} = {}",
                    Self::column(related.source(), foreign_key),
                    Self::column(parent, local_key)
                );
                Ok((related, link))
            }
            RelationKind::BelongsTo {
                related,
                foreign_key,
                owner_key,
            } => {
                let related = self.subquery_builder(related)?;
                let link = format!(
                    "{} = {}",
                    Self::column(related.source(), owner_key),
                    Self::column(parent, foreign_key)
                );
                Ok((related, link))
            }
            RelationKind::MorphTo { .. } => Err(JsonQueryError::Execution(format!(
                "relation '{}' on {} is polymorphic and needs a related type set",
                relation.name,
                self.model.name()
            ))),
        }
    }

    /// `SELECT projection FROM related WHERE link [AND (constraints)]`
    fn scoped_subquery(
        mut related: Self,
        link: String,
        projection: &str,
        configure: Configure<'_>,
    ) -> Result<SqlFragment> {
        configure(&mut related)?;
        if let Some(alias) = &related.alias {
            for clause in &mut related.where_clauses {
                clause.condition.requalify(related.model.table(), alias);
            }
        }

        let mut bindings = Vec::new();
        let mut sql = format!(
            "SELECT {projection} FROM {} WHERE {link}",
            related.from_clause()
        );
        if !related.where_clauses.is_empty() {
            sql.push_str(" AND (");
            sql.push_str(&render_clauses(&related.where_clauses, &mut bindings));
            sql.push(')');
        }
        Ok(SqlFragment::new(sql, bindings))
    }

    /// Plain existence when `quantifier` is absent, a count comparison otherwise
    fn quantified(
        related: Self,
        link: String,
        quantifier: Option<&(String, Value)>,
        negated: bool,
        configure: Configure<'_>,
    ) -> Result<Condition> {
        match quantifier {
            None => Ok(Condition::Exists {
                subquery: Self::scoped_subquery(related, link, "*", configure)?,
                negated,
            }),
            Some((operator, count)) => Ok(Condition::CountCompare {
                subquery: Self::scoped_subquery(related, link, "count(*)", configure)?,
                operator: operator.clone(),
                count: count.clone(),
                negated,
            }),
        }
    }

    fn existence(
        &self,
        relation: &str,
        types: RelatedTypes,
        existence: Existence,
        quantifier: Option<&(String, Value)>,
        configure: Configure<'_>,
    ) -> Result<Condition> {
        let relation = self.model.get_relation(relation)?;
        let negated = existence == Existence::Absent;

        match (&relation.kind, types) {
            (
                RelationKind::MorphTo {
                    type_column,
                    id_column,
                    types: morph_types,
                },
                RelatedTypes::Any,
            ) => {
                let parent = self.source();
                if morph_types.is_empty() {
                    // No possible related rows.
                    return Ok(Condition::In {
                        field: format!("{parent}.{type_column}"),
                        values: Vec::new(),
                        negated,
                    });
                }

                let mut alternatives = Vec::with_capacity(morph_types.len());
                for morph in morph_types {
                    let related = self.subquery_builder(&morph.model)?;
                    let link = format!(
                        "{} = {}",
                        Self::column(related.source(), &related.model.meta().primary_key),
                        Self::column(parent, id_column)
                    );
                    let condition =
                        Self::quantified(related, link, quantifier, negated, &mut *configure)?;
                    alternatives.push(WhereClause::or(Condition::Group(vec![
                        WhereClause::and(Condition::Simple {
                            field: format!("{parent}.{type_column}"),
                            operator: "=".to_string(),
                            value: Value::String(morph.alias.clone()),
                        }),
                        WhereClause::and(condition),
                    ])));
                }
                Ok(Condition::Group(alternatives))
            }
            _ => {
                let (related, link) = self.link(relation)?;
                Self::quantified(related, link, quantifier, negated, configure)
            }
        }
    }

    fn push(&mut self, join: LogicalOperator, condition: Condition) {
        self.where_clauses.push(WhereClause { join, condition });
    }
}

impl QueryBuilder for SqlQueryBuilder {
    fn entity(&self) -> &EntityMeta {
        self.model.meta()
    }

    fn is_polymorphic(&self, relation: &str) -> bool {
        self.model.is_polymorphic(relation)
    }

    fn select(&mut self, fields: Vec<String>) -> Result<()> {
        self.select_fields = fields;
        Ok(())
    }

    fn order_by(&mut self, field: &str, direction: Direction) -> Result<()> {
        self.order_by
            .push(format!("{} {}", quote_identifier(field), direction.to_sql()));
        Ok(())
    }

    fn where_predicate(&mut self, join: LogicalOperator, predicate: Predicate) -> Result<()> {
        let condition = match predicate {
            Predicate::Compare {
                field,
                operator,
                value,
            } => {
                let (operator, value) = comparison(&operator, value);
                match (operator.as_str(), value.is_null()) {
                    ("=", true) => Condition::IsNull {
                        field,
                        negated: false,
                    },
                    ("<>" | "!=", true) => Condition::IsNull {
                        field,
                        negated: true,
                    },
                    _ => Condition::Simple {
                        field,
                        operator,
                        value,
                    },
                }
            }
            Predicate::Between {
                field,
                values,
                negated,
            } => {
                let mut bounds = values.into_iter();
                match (bounds.next(), bounds.next()) {
                    (Some(start), Some(end)) => Condition::Between {
                        field,
                        start,
                        end,
                        negated,
                    },
                    _ => {
                        return Err(JsonQueryError::MalformedSpec(format!(
                            "between on '{field}' needs two values"
                        )))
                    }
                }
            }
            Predicate::In {
                field,
                values,
                negated,
            } => Condition::In {
                field,
                values,
                negated,
            },
            Predicate::Null { field, negated } => Condition::IsNull { field, negated },
            Predicate::DatePart { field, part, value } => {
                Condition::DatePart { field, part, value }
            }
        };

        self.push(join, condition);
        Ok(())
    }

    fn where_group(&mut self, join: LogicalOperator, configure: Configure<'_>) -> Result<()> {
        let mut nested = self.nested();
        configure(&mut nested)?;
        if !nested.where_clauses.is_empty() {
            self.push(join, Condition::Group(nested.where_clauses));
        }
        Ok(())
    }

    fn has(
        &mut self,
        join: LogicalOperator,
        relation: &str,
        types: RelatedTypes,
        existence: Existence,
        operator: &str,
        count: &Value,
    ) -> Result<()> {
        let quantifier = (!count.is_null()).then(|| comparison(operator, count.clone()));

        let condition = self.existence(
            relation,
            types,
            existence,
            quantifier.as_ref(),
            &mut |_| Ok(()),
        )?;
        self.push(join, condition);
        Ok(())
    }

    fn where_has(
        &mut self,
        join: LogicalOperator,
        relation: &str,
        types: RelatedTypes,
        existence: Existence,
        configure: Configure<'_>,
    ) -> Result<()> {
        let condition = self.existence(relation, types, existence, None, configure)?;
        self.push(join, condition);
        Ok(())
    }

    fn with(&mut self, loads: Vec<RelationLoad>) -> Result<()> {
        for load in &loads {
            self.model.get_relation(load.relation())?;
        }
        debug!(
            model = %self.model.name(),
            relations = ?loads.iter().map(RelationLoad::relation).collect::<Vec<_>>(),
            "registered eager loads"
        );
        self.eager_loads.extend(loads);
        Ok(())
    }

    fn with_count(&mut self, loads: Vec<RelationLoad>) -> Result<()> {
        for load in loads {
            let relation = self.model.get_relation(load.relation())?;
            let (related, link) = self.link(relation)?;
            let subquery =
                Self::scoped_subquery(related, link, "count(*)", &mut |query| load.configure(query))?;
            let alias = quote_identifier(&format!("{}_count", load.relation()));
            self.count_columns.push(SqlFragment::new(
                format!("({}) AS {alias}", subquery.sql),
                subquery.bindings,
            ));
        }
        Ok(())
    }

    fn call_scope(&mut self, name: &str, args: &[Value]) -> Result<()> {
        let scope = self.model.get_scope(name)?;
        scope(self, args)
    }
}

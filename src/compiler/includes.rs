//! Relation loading and relation counting.
//!
//! Includes are not compiled in place. Each node becomes a [`RelationLoad`]
//! that owns its sub-specification; the builder calls
//! [`RelationLoad::configure`] with a relation-scoped builder whenever it
//! materializes the relation.

use tracing::debug;

use super::{compile, conditions::compile_where, scopes::compile_scopes};
use crate::capability::QueryBuilder;
use crate::error::Result;
use crate::spec::{IncludeCountNode, IncludeNode, QuerySpec, ScopeDecl, WhereNode};

/// Deferred compilation unit for one related entity
#[derive(Debug, Clone, PartialEq)]
pub struct RelationLoad {
    relation: String,
    unit: LoadUnit,
}

#[derive(Debug, Clone, PartialEq)]
enum LoadUnit {
    /// Full projection, filtering, ordering, nesting and scopes
    Include(QuerySpec),
    /// Filtering and scopes only
    Count {
        where_: Option<WhereNode>,
        scopes: ScopeDecl,
    },
}

impl RelationLoad {
    pub fn include(node: &IncludeNode) -> Self {
        Self {
            relation: node.relation.clone(),
            unit: LoadUnit::Include(node.spec.clone()),
        }
    }

    pub fn count(node: &IncludeCountNode) -> Self {
        Self {
            relation: node.relation.clone(),
            unit: LoadUnit::Count {
                where_: node.where_.clone(),
                scopes: node.scopes.clone(),
            },
        }
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }

    pub fn is_count(&self) -> bool {
        matches!(self.unit, LoadUnit::Count { .. })
    }

    /// Apply this unit's specification to a builder scoped to the relation
    pub fn configure(&self, builder: &mut dyn QueryBuilder) -> Result<()> {
        debug!(
            relation = %self.relation,
            entity = %builder.entity().name,
            count = self.is_count(),
            "configuring relation"
        );
        match &self.unit {
            LoadUnit::Include(spec) => compile(builder, spec),
            LoadUnit::Count { where_, scopes } => {
                if let Some(node) = where_ {
                    compile_where(builder, node)?;
                }
                compile_scopes(builder, scopes)
            }
        }
    }
}

pub fn compile_includes(builder: &mut dyn QueryBuilder, include: &[IncludeNode]) -> Result<()> {
    if include.is_empty() {
        return Ok(());
    }
    builder.with(include.iter().map(RelationLoad::include).collect())
}

pub fn compile_include_counts(
    builder: &mut dyn QueryBuilder,
    include_count: &[IncludeCountNode],
) -> Result<()> {
    if include_count.is_empty() {
        return Ok(());
    }
    builder.with_count(include_count.iter().map(RelationLoad::count).collect())
}

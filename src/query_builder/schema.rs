//! Model metadata: tables, keys, relations and scopes.
//!
//! Models are declared in code and registered in a [`Schema`]:
//!
//! ```rust
//! use json_query::capability::{LogicalOperator, Predicate};
//! use json_query::query_builder::{Model, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::new()
//!     .register(
//!         Model::new("User", "users")
//!             .forced_select(&["tenant_id"])
//!             .has_many("posts", "Post", "user_id", "id")
//!             .scope("active", |query, _args| {
//!                 query.where_predicate(
//!                     LogicalOperator::And,
//!                     Predicate::Compare {
//!                         field: "users.active".to_string(),
//!                         operator: "=".to_string(),
//!                         value: json!(true),
//!                     },
//!                 )
//!             }),
//!     )
//!     .register(Model::new("Post", "posts").belongs_to("author", "User", "user_id", "id"));
//!
//! assert!(schema.model("User").is_ok());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::capability::{EntityMeta, QueryBuilder};
use crate::error::{JsonQueryError, Result};

/// Named, reusable query transformation
pub type ScopeFn = Arc<dyn Fn(&mut dyn QueryBuilder, &[Value]) -> Result<()> + Send + Sync>;

/// How a relation links two tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationKind {
    /// `related.foreign_key = parent.local_key`, many rows
    HasMany {
        related: String,
        foreign_key: String,
        local_key: String,
    },
    /// `related.foreign_key = parent.local_key`, at most one row
    HasOne {
        related: String,
        foreign_key: String,
        local_key: String,
    },
    /// `related.owner_key = parent.foreign_key`
    BelongsTo {
        related: String,
        foreign_key: String,
        owner_key: String,
    },
    /// `parent.type_column` names the related model through `types`
    MorphTo {
        type_column: String,
        id_column: String,
        types: Vec<MorphType>,
    },
}

/// One entry of a polymorphic relation's morph map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MorphType {
    /// Value stored in the type column
    pub alias: String,
    /// Registered model name
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub name: String,
    pub kind: RelationKind,
}

impl Relation {
    pub fn is_polymorphic(&self) -> bool {
        matches!(self.kind, RelationKind::MorphTo { .. })
    }
}

#[derive(Clone)]
pub struct Model {
    meta: EntityMeta,
    relations: IndexMap<String, Relation>,
    scopes: IndexMap<String, ScopeFn>,
}

impl Model {
    /// A model keyed by `id`
    pub fn new(name: &str, table: &str) -> Self {
        Self {
            meta: EntityMeta::new(name, table),
            relations: IndexMap::new(),
            scopes: IndexMap::new(),
        }
    }

    pub fn primary_key(mut self, column: &str) -> Self {
        self.meta.primary_key = column.to_string();
        self
    }

    /// Columns projected whenever an explicit select list is compiled
    pub fn forced_select(mut self, columns: &[&str]) -> Self {
        self.meta.mandatory_fields = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn has_many(self, name: &str, related: &str, foreign_key: &str, local_key: &str) -> Self {
        self.relation(
            name,
            RelationKind::HasMany {
                related: related.to_string(),
                foreign_key: foreign_key.to_string(),
                local_key: local_key.to_string(),
            },
        )
    }

    pub fn has_one(self, name: &str, related: &str, foreign_key: &str, local_key: &str) -> Self {
        self.relation(
            name,
            RelationKind::HasOne {
                related: related.to_string(),
                foreign_key: foreign_key.to_string(),
                local_key: local_key.to_string(),
            },
        )
    }

    pub fn belongs_to(self, name: &str, related: &str, foreign_key: &str, owner_key: &str) -> Self {
        self.relation(
            name,
            RelationKind::BelongsTo {
                related: related.to_string(),
                foreign_key: foreign_key.to_string(),
                owner_key: owner_key.to_string(),
            },
        )
    }

    /// Polymorphic relation; `types` maps type-column values to model names
    pub fn morph_to(
        self,
        name: &str,
        type_column: &str,
        id_column: &str,
        types: &[(&str, &str)],
    ) -> Self {
        self.relation(
            name,
            RelationKind::MorphTo {
                type_column: type_column.to_string(),
                id_column: id_column.to_string(),
                types: types
                    .iter()
                    .map(|(alias, model)| MorphType {
                        alias: alias.to_string(),
                        model: model.to_string(),
                    })
                    .collect(),
            },
        )
    }

    fn relation(mut self, name: &str, kind: RelationKind) -> Self {
        self.relations.insert(
            name.to_string(),
            Relation {
                name: name.to_string(),
                kind,
            },
        );
        self
    }

    pub fn scope<F>(mut self, name: &str, scope: F) -> Self
    where
        F: Fn(&mut dyn QueryBuilder, &[Value]) -> Result<()> + Send + Sync + 'static,
    {
        self.scopes.insert(name.to_string(), Arc::new(scope));
        self
    }

    pub fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn table(&self) -> &str {
        &self.meta.table
    }

    pub fn get_relation(&self, name: &str) -> Result<&Relation> {
        self.relations
            .get(name)
            .ok_or_else(|| JsonQueryError::unknown_relation(name, &self.meta.name))
    }

    pub fn get_scope(&self, name: &str) -> Result<ScopeFn> {
        self.scopes
            .get(name)
            .cloned()
            .ok_or_else(|| JsonQueryError::unknown_scope(name, &self.meta.name))
    }

    pub fn is_polymorphic(&self, relation: &str) -> bool {
        self.relations
            .get(relation)
            .is_some_and(Relation::is_polymorphic)
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("meta", &self.meta)
            .field("relations", &self.relations)
            .field("scopes", &self.scopes.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Registry of models by name
#[derive(Debug, Clone, Default)]
pub struct Schema {
    models: HashMap<String, Arc<Model>>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, model: Model) -> Self {
        self.models.insert(model.name().to_string(), Arc::new(model));
        self
    }

    pub fn model(&self, name: &str) -> Result<Arc<Model>> {
        self.models
            .get(name)
            .cloned()
            .ok_or_else(|| JsonQueryError::UnknownModel(name.to_string()))
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

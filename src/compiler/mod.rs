//! # Query Compiler
//!
//! Walks a [`QuerySpec`] and issues the equivalent calls on a
//! [`QueryBuilder`].
//!
//! ## Stages
//!
//! - [`select`] - projection (primary key first, mandatory fields merged) and ordering
//! - [`conditions`] - where trees, AND/OR anchoring and wildcard expansion
//! - [`operators`] - operator token table
//! - [`includes`] - deferred eager-load and eager-count units
//! - [`scopes`] - named scope invocation
//!
//! [`compile`] runs every stage in order: select, where, order, include,
//! include count, scopes. Compilation is synchronous, only reads the
//! specification and mutates nothing but the builder it is given, so
//! independent specifications can be compiled concurrently on separate
//! builders.

pub mod conditions;
pub mod includes;
pub mod operators;
pub mod scopes;
pub mod select;

pub use conditions::{compile_condition, compile_where, expand_wildcard};
pub use includes::{compile_include_counts, compile_includes, RelationLoad};
pub use operators::Operator;
pub use scopes::{compile_scopes, scope_calls, ScopeCall};
pub use select::{compile_order, compile_select, select_fields};

use tracing::debug;

use crate::capability::QueryBuilder;
use crate::error::Result;
use crate::spec::QuerySpec;

/// Compile a whole specification level onto `builder`
pub fn compile(builder: &mut dyn QueryBuilder, spec: &QuerySpec) -> Result<()> {
    debug!(
        entity = %builder.entity().name,
        select = spec.select.len(),
        has_where = spec.where_.is_some(),
        order = spec.order.len(),
        include = spec.include.len(),
        include_count = spec.include_count.len(),
        "compiling query specification"
    );

    compile_select(builder, &spec.select)?;
    if let Some(node) = &spec.where_ {
        compile_where(builder, node)?;
    }
    compile_order(builder, &spec.order)?;
    compile_includes(builder, &spec.include)?;
    compile_include_counts(builder, &spec.include_count)?;
    compile_scopes(builder, &spec.scopes)
}

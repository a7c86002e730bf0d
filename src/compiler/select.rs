//! Projection and ordering.

use crate::capability::{Direction, EntityMeta, QueryBuilder};
use crate::error::Result;
use crate::spec::OrderItem;

/// Project `select` onto the builder's entity
pub fn compile_select(builder: &mut dyn QueryBuilder, select: &[String]) -> Result<()> {
    let fields = select_fields(builder.entity(), select);
    builder.select(fields)
}

/// Qualified projection for `select`.
///
/// An empty list projects `table.*`. Otherwise the primary key leads when
/// missing, mandatory fields are appended and duplicates keep their first
/// position.
pub fn select_fields(entity: &EntityMeta, select: &[String]) -> Vec<String> {
    let mut fields: Vec<&str> = Vec::new();

    if select.is_empty() {
        fields.push("*");
    } else {
        if !select.iter().any(|field| field == &entity.primary_key) {
            fields.push(&entity.primary_key);
        }
        fields.extend(select.iter().map(String::as_str));
        fields.extend(entity.mandatory_fields.iter().map(String::as_str));
    }

    let mut qualified: Vec<String> = Vec::with_capacity(fields.len());
    for field in fields {
        let column = format!("{}.{}", entity.table, field);
        if !qualified.contains(&column) {
            qualified.push(column);
        }
    }
    qualified
}

pub fn compile_order(builder: &mut dyn QueryBuilder, order: &[OrderItem]) -> Result<()> {
    for item in order {
        builder.order_by(&item.field, Direction::parse(&item.direction))?;
    }
    Ok(())
}

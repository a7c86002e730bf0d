mod scopes;
mod select_order;
mod where_groups;

mod scopes;

use std::sync::Arc;

use json_query::capability::{LogicalOperator, Predicate};
use json_query::query_builder::{Model, Schema, SqlQueryBuilder};

/// Users with posts, posts with comments, comments on posts or users, and
/// categories nested under categories
pub fn blog_schema() -> Arc<Schema> {
    Schema::new()
        .register(
            Model::new("User", "users")
                .forced_select(&["tenant_id"])
                .has_many("posts", "Post", "user_id", "id")
                .has_one("profile", "Profile", "user_id", "id"),
        )
        .register(
            Model::new("Post", "posts")
                .belongs_to("author", "User", "user_id", "id")
                .has_many("comments", "Comment", "post_id", "id"),
        )
        .register(Model::new("Profile", "profiles"))
        .register(
            Model::new("Category", "categories")
                .has_many("children", "Category", "parent_id", "id")
                .belongs_to("parent", "Category", "parent_id", "id")
                .scope("roots", |query, _| {
                    query.where_predicate(
                        LogicalOperator::And,
                        Predicate::Null {
                            field: "categories.parent_id".to_string(),
                            negated: false,
                        },
                    )
                }),
        )
        .register(
            Model::new("Comment", "comments").morph_to(
                "commentable",
                "commentable_type",
                "commentable_id",
                &[("post", "Post"), ("user", "User")],
            ),
        )
        .into_shared()
}

pub fn builder_for(model: &str) -> SqlQueryBuilder {
    SqlQueryBuilder::new(blog_schema(), model).expect("model is registered")
}

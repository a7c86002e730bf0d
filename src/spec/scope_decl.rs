use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// Named scopes to apply, in declaration order.
///
/// Two wire shapes are accepted:
///
/// - `{"active": [], "in_region": "eu,us"}` (name to arguments)
/// - `["active", "in_region:eu,us"]` (name with optional `:`-separated CSV)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScopeDecl {
    Named(IndexMap<String, ScopeArgs>),
    Listed(Vec<String>),
}

impl Default for ScopeDecl {
    fn default() -> Self {
        ScopeDecl::Listed(Vec::new())
    }
}

impl ScopeDecl {
    pub fn is_empty(&self) -> bool {
        match self {
            ScopeDecl::Named(scopes) => scopes.is_empty(),
            ScopeDecl::Listed(scopes) => scopes.is_empty(),
        }
    }
}

/// Arguments of a scope in the mapping form
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScopeArgs {
    None,
    List(Vec<Value>),
    Csv(String),
    Number(serde_json::Number),
}

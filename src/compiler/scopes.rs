//! Scope invocation.

use serde_json::Value;
use tracing::debug;

use crate::capability::QueryBuilder;
use crate::error::Result;
use crate::spec::{ScopeArgs, ScopeDecl};

/// Separates a scope name from its arguments in the list form
const ARGUMENT_SEPARATOR: char = ':';

/// A scope name and the positional arguments it is called with
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeCall {
    pub name: String,
    pub args: Vec<Value>,
}

/// Call every declared scope in order, stopping at the first failure
pub fn compile_scopes(builder: &mut dyn QueryBuilder, scopes: &ScopeDecl) -> Result<()> {
    for call in scope_calls(scopes) {
        debug!(
            scope = %call.name,
            args = call.args.len(),
            entity = %builder.entity().name,
            "applying scope"
        );
        builder.call_scope(&call.name, &call.args)?;
    }
    Ok(())
}

/// Normalize either declaration shape into calls
pub fn scope_calls(scopes: &ScopeDecl) -> Vec<ScopeCall> {
    match scopes {
        ScopeDecl::Named(named) => named
            .iter()
            .map(|(name, args)| ScopeCall {
                name: name.clone(),
                args: named_arguments(args),
            })
            .collect(),
        ScopeDecl::Listed(listed) => listed.iter().map(String::as_str).map(listed_call).collect(),
    }
}

fn named_arguments(args: &ScopeArgs) -> Vec<Value> {
    match args {
        ScopeArgs::None => Vec::new(),
        ScopeArgs::List(items) => items.clone(),
        ScopeArgs::Csv(csv) => split_csv(csv),
        ScopeArgs::Number(number) => vec![Value::String(number.to_string())],
    }
}

fn listed_call(entry: &str) -> ScopeCall {
    match entry.split_once(ARGUMENT_SEPARATOR) {
        Some((name, csv)) => ScopeCall {
            name: name.to_string(),
            args: split_csv(csv),
        },
        None => ScopeCall {
            name: entry.to_string(),
            args: Vec::new(),
        },
    }
}

fn split_csv(csv: &str) -> Vec<Value> {
    if csv.is_empty() {
        return Vec::new();
    }
    csv.split(',').map(|arg| Value::String(arg.to_string())).collect()
}

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::{render_query, QueryExecutor};
use crate::config::JsonQueryConfig;
use crate::error::Result;
use crate::query_builder::Pagination;

/// Pagination metadata returned with every result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultEnvelope {
    pub page: u64,
    pub last_page: Option<u64>,
    pub from: Option<u64>,
    pub to: Option<u64>,
    pub limit: u64,
    pub total: u64,
    pub has_more_pages: bool,
    pub is_first_page: bool,
    /// Diagnostic rendering of the executed query; see [`render_query`]
    pub query: String,
}

/// Rows plus their envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub items: Vec<Value>,
    pub meta: ResultEnvelope,
}

/// Runs a compiled query in paginated or full-fetch mode
#[derive(Debug, Clone, Default)]
pub struct ResultAssembler {
    max_page_size: Option<u64>,
    log_queries: bool,
}

impl ResultAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &JsonQueryConfig) -> Self {
        Self {
            max_page_size: (config.max_page_size > 0).then_some(config.max_page_size),
            log_queries: config.log_queries,
        }
    }

    /// Cap page sizes at `max`
    pub fn with_max_page_size(mut self, max: u64) -> Self {
        self.max_page_size = Some(max);
        self
    }

    /// Execute with `limit` rows per page, or fetch everything when `limit`
    /// is absent or zero. `page` may be any JSON value; see
    /// [`normalize_page`].
    pub async fn assemble<E>(&self, executor: &E, limit: Option<u64>, page: &Value) -> Result<QueryResult>
    where
        E: QueryExecutor + ?Sized,
    {
        let result = match limit.filter(|limit| *limit > 0) {
            Some(limit) => self.paginated(executor, limit, normalize_page(page)).await?,
            None => self.unpaginated(executor).await?,
        };

        if self.log_queries {
            info!(
                query = %result.meta.query,
                rows = result.items.len(),
                total = result.meta.total,
                page = result.meta.page,
                "executed json query"
            );
        }

        Ok(result)
    }

    async fn paginated<E>(&self, executor: &E, limit: u64, page: u64) -> Result<QueryResult>
    where
        E: QueryExecutor + ?Sized,
    {
        let per_page = match self.max_page_size {
            Some(max) if limit > max => {
                debug!(requested = limit, max, "clamping page size");
                max
            }
            _ => limit,
        };

        let page_result = executor.paginate(per_page, page).await?;
        let pagination = Pagination::new(page, per_page);
        let rows = page_result.items.len() as u64;
        let total = page_result.total;

        let meta = ResultEnvelope {
            page: pagination.current_page(),
            last_page: Some(pagination.total_pages(total)),
            from: pagination.first_item(rows),
            to: pagination.last_item(rows),
            limit: per_page,
            total,
            has_more_pages: pagination.has_next_page(total),
            is_first_page: !pagination.has_previous_page(),
            query: render_query(&executor.page_sql(per_page, page), &executor.bindings()),
        };

        Ok(QueryResult {
            items: page_result.items,
            meta,
        })
    }

    async fn unpaginated<E>(&self, executor: &E) -> Result<QueryResult>
    where
        E: QueryExecutor + ?Sized,
    {
        let items = executor.get().await?;
        let count = executor.count().await?;

        let meta = ResultEnvelope {
            page: 1,
            last_page: None,
            from: Some(1),
            to: Some(count),
            limit: count,
            total: count,
            has_more_pages: false,
            is_first_page: true,
            query: render_query(&executor.to_sql(), &executor.bindings()),
        };

        Ok(QueryResult { items, meta })
    }
}

/// Page number from loosely typed input.
///
/// Numbers and numeric strings are truncated to an integer; anything below 1
/// or non-numeric means the first page.
pub fn normalize_page(page: &Value) -> u64 {
    let number = match page {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(n) if n.is_finite() && n >= 1.0 => n.trunc() as u64,
        _ => 1,
    }
}

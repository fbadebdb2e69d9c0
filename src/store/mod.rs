//! Record store adapter.
//!
//! One [`RecordStore`] interface with two implementations, picked once when
//! the application state is built:
//!
//! - [`LiveStore`]: filtered search against the hosted index
//! - [`FallbackStore`]: substring matching over an in-memory dataset
//!
//! Stores never degrade on their own. A live transport error is returned to
//! the caller, which decides whether to retry against the fallback.

pub mod client;
pub mod fallback;
pub mod live;

pub use client::SearchClient;
pub use fallback::FallbackStore;
pub use live::LiveStore;

use crate::error::Result;
use crate::records::{
    BenchmarkRecord, Category, CropRotationRecord, LogisticsRecord, MarketPriceRecord,
    RecordBatch,
};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Page size for direct searches from the UI.
pub const DIRECT_HITS_PER_PAGE: usize = 20;

/// Page size when a lookup runs as a tool call.
pub const TOOL_HITS_PER_PAGE: usize = 10;

/// Attribute filters, keyed by index attribute name.
///
/// Ordered so the rendered filter expression is deterministic.
pub type Filters = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    pub filters: Filters,
    pub hits_per_page: usize,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, filters: Filters, hits_per_page: usize) -> Self {
        Self {
            text: text.into(),
            filters,
            hits_per_page,
        }
    }

    /// Same filters and page size, empty query text (browse the index).
    pub fn browse(&self) -> Self {
        Self {
            text: String::new(),
            filters: self.filters.clone(),
            hits_per_page: self.hits_per_page,
        }
    }
}

/// Render non-empty filters as `field:"value"` joined with ` AND `.
pub fn filter_expression(filters: &Filters) -> Option<String> {
    let parts: Vec<String> = filters
        .iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(field, value)| format!("{}:\"{}\"", field, value.replace('"', "\\\"")))
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" AND "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Live,
    Fallback,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    fn backend(&self) -> Backend;

    async fn market_prices(&self, query: &SearchQuery) -> Result<Vec<MarketPriceRecord>>;

    async fn crop_rotation(&self, query: &SearchQuery) -> Result<Vec<CropRotationRecord>>;

    async fn logistics(&self, query: &SearchQuery) -> Result<Vec<LogisticsRecord>>;

    async fn benchmarks(&self, query: &SearchQuery) -> Result<Vec<BenchmarkRecord>>;
}

/// Run one category lookup and tag the hits with their category.
pub async fn search(
    store: &dyn RecordStore,
    category: Category,
    query: &SearchQuery,
) -> Result<RecordBatch> {
    Ok(match category {
        Category::Market => RecordBatch::Market(store.market_prices(query).await?),
        Category::Rotation => RecordBatch::Rotation(store.crop_rotation(query).await?),
        Category::Logistics => RecordBatch::Logistics(store.logistics(query).await?),
        Category::Benchmarks => RecordBatch::Benchmarks(store.benchmarks(query).await?),
    })
}

//! In-memory record store used when the hosted index is not configured.

use crate::error::Result;
use crate::records::{
    BenchmarkRecord, CropRotationRecord, Dataset, LogisticsRecord, MarketPriceRecord, Record,
};
use crate::store::{Backend, Filters, RecordStore, SearchQuery};
use async_trait::async_trait;

pub struct FallbackStore {
    dataset: Dataset,
}

impl FallbackStore {
    /// Build a store over `dataset`. Records get stable ids up front so
    /// repeated searches return identical results.
    pub fn new(dataset: Dataset) -> Self {
        let now_ms = chrono::Utc::now().timestamp_millis();
        Self {
            dataset: dataset.with_fallback_ids(now_ms),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

#[async_trait]
impl RecordStore for FallbackStore {
    fn backend(&self) -> Backend {
        Backend::Fallback
    }

    async fn market_prices(&self, query: &SearchQuery) -> Result<Vec<MarketPriceRecord>> {
        Ok(select(&self.dataset.market_prices, query))
    }

    async fn crop_rotation(&self, query: &SearchQuery) -> Result<Vec<CropRotationRecord>> {
        Ok(select(&self.dataset.crop_rotation, query))
    }

    async fn logistics(&self, query: &SearchQuery) -> Result<Vec<LogisticsRecord>> {
        Ok(select(&self.dataset.logistics, query))
    }

    async fn benchmarks(&self, query: &SearchQuery) -> Result<Vec<BenchmarkRecord>> {
        Ok(select(&self.dataset.benchmarks, query))
    }
}

fn select<T: Record>(records: &[T], query: &SearchQuery) -> Vec<T> {
    let needle = query.text.to_lowercase();
    let hits: Vec<T> = records
        .iter()
        .filter(|record| matches(*record, &needle, &query.filters))
        .take(query.hits_per_page)
        .cloned()
        .collect();

    tracing::debug!(
        category = ?T::CATEGORY,
        query = %query.text,
        hits = hits.len(),
        "Fallback search completed"
    );

    hits
}

/// Inclusive match: any one condition keeps the record.
///
/// 1. the query appears in a searchable field
/// 2. an explicit filter equals its field (case-insensitive)
/// 3. a mentioned field value appears in the query
fn matches<T: Record>(record: &T, needle: &str, filters: &Filters) -> bool {
    if record
        .searchable()
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    {
        return true;
    }

    let filtered = filters.iter().any(|(field, value)| {
        !value.is_empty()
            && record
                .filter_field(field)
                .is_some_and(|v| v.to_lowercase() == value.to_lowercase())
    });
    if filtered {
        return true;
    }

    record
        .mentioned()
        .iter()
        .any(|field| !field.is_empty() && needle.contains(&field.to_lowercase()))
}

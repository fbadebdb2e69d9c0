//! Record store backed by the hosted search index.

use crate::error::Result;
use crate::records::{
    BenchmarkRecord, CropRotationRecord, LogisticsRecord, MarketPriceRecord, Record,
};
use crate::store::{Backend, RecordStore, SearchClient, SearchQuery};
use async_trait::async_trait;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::Arc;

pub struct LiveStore {
    client: Arc<SearchClient>,
}

impl LiveStore {
    pub fn new(client: Arc<SearchClient>) -> Self {
        Self { client }
    }

    async fn fetch<T: Record>(&self, query: &SearchQuery) -> Result<Vec<T>> {
        let hits = self
            .client
            .query(T::CATEGORY.index_name(), query)
            .await?;

        hits.into_iter().map(decode_hit::<T>).collect()
    }
}

#[async_trait]
impl RecordStore for LiveStore {
    fn backend(&self) -> Backend {
        Backend::Live
    }

    async fn market_prices(&self, query: &SearchQuery) -> Result<Vec<MarketPriceRecord>> {
        self.fetch(query).await
    }

    async fn crop_rotation(&self, query: &SearchQuery) -> Result<Vec<CropRotationRecord>> {
        self.fetch(query).await
    }

    async fn logistics(&self, query: &SearchQuery) -> Result<Vec<LogisticsRecord>> {
        self.fetch(query).await
    }

    async fn benchmarks(&self, query: &SearchQuery) -> Result<Vec<BenchmarkRecord>> {
        self.fetch(query).await
    }
}

/// Decode one hit, synthesizing an id from its content when the index
/// did not supply one.
fn decode_hit<T: Record>(hit: Value) -> Result<T> {
    let id = synthesize_id(&hit);
    let mut record: T = serde_json::from_value(hit)?;
    if record.id().is_empty() {
        record.set_id(id);
    }
    Ok(record)
}

fn synthesize_id(hit: &Value) -> String {
    let digest = Sha256::digest(hit.to_string().as_bytes());
    let hex: String = digest.iter().take(8).map(|b| format!("{:02x}", b)).collect();
    format!("hit-{}", hex)
}

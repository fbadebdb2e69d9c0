//! Query orchestration.
//!
//! Resolves a chat query into tool calls, runs them against the record store
//! and composes the answer. Flow per query:
//!
//! 1. **Cache check**: a fresh entry for the exact query text is returned as-is
//! 2. **Resolve**: with a completions endpoint configured, the agent picks the
//!    tool calls; otherwise (or on any live failure) the keyword classifier does
//! 3. **Merge**: results are attached per call and per category, the message is
//!    composed, and the result is written to the cache
//!
//! Callers always get a well-formed result. Live failures degrade to
//! simulation, and store failures degrade to the fallback dataset.

pub mod cache;
pub mod completions;
pub mod compose;
pub mod types;

pub use cache::{CacheStats, ResponseCache};
pub use completions::{CompletionsClient, CompletionsResponse, ToolDirective};
pub use types::{Metadata, OrchestrationResult, OrchestrationType, ToolCallRecord};

use crate::error::Result;
use crate::intent::classify;
use crate::records::{Category, RecordBatch, ResultData};
use crate::store::{self, FallbackStore, RecordStore, SearchQuery, TOOL_HITS_PER_PAGE};
use crate::tools::{ToolCall, ToolRegistry};
use compose::{clause, compose_message};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;

pub struct Orchestrator {
    store: Arc<dyn RecordStore>,
    fallback: Arc<FallbackStore>,
    completions: Option<CompletionsClient>,
    registry: ToolRegistry,
    cache: Arc<ResponseCache>,
    agent_id: String,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn RecordStore>,
        fallback: Arc<FallbackStore>,
        cache: Arc<ResponseCache>,
        agent_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            fallback,
            completions: None,
            registry: ToolRegistry::new(),
            cache,
            agent_id: agent_id.into(),
        }
    }

    /// Enable the live completions path.
    pub fn with_completions(mut self, client: CompletionsClient) -> Self {
        self.completions = Some(client);
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn is_live(&self) -> bool {
        self.completions.is_some()
    }

    pub async fn run(&self, query: &str) -> OrchestrationResult {
        if let Some(cached) = self.cache.get(query).await {
            tracing::info!(query, "Returning cached orchestration result");
            metrics::counter!("orchestration_cache_hits_total").increment(1);
            return cached;
        }

        let start = Instant::now();
        let result = match &self.completions {
            Some(client) => match self.run_live(client, query).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(
                        query,
                        error = %e,
                        "Live orchestration failed, falling back to simulation"
                    );
                    metrics::counter!("orchestration_fallbacks_total", "reason" => "live_error")
                        .increment(1);
                    self.simulate(query).await
                }
            },
            None => self.simulate(query).await,
        };

        self.cache.insert(query, result.clone()).await;

        tracing::info!(
            query,
            orchestration = ?result.metadata.orchestration_type,
            tool_calls = result.tool_calls.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Orchestration completed"
        );

        result
    }

    async fn run_live(
        &self,
        client: &CompletionsClient,
        query: &str,
    ) -> Result<OrchestrationResult> {
        let response = client.complete(query, self.registry.tools()).await?;

        let calls = response
            .tool_calls
            .into_iter()
            .map(|directive| ToolCall::decode(&directive.tool, directive.params))
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(query, tool_calls = calls.len(), "Agent resolved tool calls");

        let batches = join_all(calls.iter().map(|call| self.invoke_live(call, query))).await;
        let (records, data) = merge(&calls, batches);

        let message = compose_message(
            &response.message,
            false,
            &data,
            OrchestrationType::AgentStudio,
        );

        Ok(self.finish(message, records, data, OrchestrationType::AgentStudio))
    }

    /// Execute one agent-issued call. Unknown tools and failed lookups
    /// yield an empty result for that call only.
    async fn invoke_live(&self, call: &ToolCall, query: &str) -> RecordBatch {
        let Some(category) = call.category() else {
            tracing::warn!(tool = call.name(), "Ignoring unknown tool call");
            return RecordBatch::Empty;
        };

        let search = SearchQuery::new(query, call.filters(), TOOL_HITS_PER_PAGE);
        match store::search(self.store.as_ref(), category, &search).await {
            Ok(batch) => batch,
            Err(e) => {
                tracing::error!(tool = call.name(), error = %e, "Tool call failed");
                RecordBatch::Empty
            }
        }
    }

    async fn simulate(&self, query: &str) -> OrchestrationResult {
        let intent = classify(query);
        let tool_names: Vec<&str> = intent.tools.iter().map(|k| k.name()).collect();
        tracing::info!(
            query,
            tools = ?tool_names,
            broad = intent.broad,
            "Simulating orchestration"
        );

        let calls: Vec<ToolCall> = intent.tools.iter().map(|k| ToolCall::bare(*k)).collect();
        let batches = join_all(calls.iter().map(|call| self.invoke_simulated(call, query))).await;
        let (records, data) = merge(&calls, batches);

        let lead: String = if intent.broad {
            String::new()
        } else {
            intent.tools.iter().map(|k| clause(*k)).collect()
        };
        let message = compose_message(&lead, intent.broad, &data, OrchestrationType::Simulated);

        self.finish(message, records, data, OrchestrationType::Simulated)
    }

    /// Run a simulated call. If the query text finds nothing, the lookup is
    /// repeated as a browse so a resolved tool still contributes records.
    async fn invoke_simulated(&self, call: &ToolCall, query: &str) -> RecordBatch {
        let Some(category) = call.category() else {
            return RecordBatch::Empty;
        };

        let search = SearchQuery::new(query, call.filters(), TOOL_HITS_PER_PAGE);
        let batch = self.search(category, &search).await;
        if !batch.is_empty() {
            return batch;
        }

        tracing::debug!(category = ?category, query, "No hits for query text, browsing index");
        self.search(category, &search.browse()).await
    }

    /// Search one category, retrying on the fallback dataset if the store fails.
    pub async fn search(&self, category: Category, query: &SearchQuery) -> RecordBatch {
        match store::search(self.store.as_ref(), category, query).await {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!(
                    category = ?category,
                    error = %e,
                    "Store search failed, using fallback dataset"
                );
                metrics::counter!("store_fallbacks_total").increment(1);
                store::search(self.fallback.as_ref(), category, query)
                    .await
                    .unwrap_or_else(|_| RecordBatch::empty(category))
            }
        }
    }

    /// Search several categories concurrently.
    pub async fn search_many(&self, categories: &[Category], query: &SearchQuery) -> ResultData {
        let batches = join_all(categories.iter().map(|c| self.search(*c, query))).await;

        let mut data = ResultData::default();
        for batch in batches {
            data.insert(batch);
        }
        data
    }

    pub async fn shutdown(&self) {
        let entries = self.cache.len().await;
        self.cache.clear().await;
        tracing::info!(entries, "Response cache released");
    }

    fn finish(
        &self,
        message: String,
        tool_calls: Vec<ToolCallRecord>,
        data: ResultData,
        orchestration_type: OrchestrationType,
    ) -> OrchestrationResult {
        OrchestrationResult {
            message,
            tool_calls,
            data,
            metadata: Metadata {
                agent_id: self.agent_id.clone(),
                orchestration_type,
                timestamp: chrono::Utc::now().timestamp_millis(),
            },
        }
    }
}

/// Pair each call with its batch, and fold the batches into per-category data.
/// A later call to the same tool replaces the earlier category entry.
fn merge(calls: &[ToolCall], batches: Vec<RecordBatch>) -> (Vec<ToolCallRecord>, ResultData) {
    let mut data = ResultData::default();
    let records = calls
        .iter()
        .zip(batches)
        .map(|(call, batch)| {
            data.insert(batch.clone());
            ToolCallRecord {
                tool: call.name().to_string(),
                params: call.params(),
                results: batch,
            }
        })
        .collect();
    (records, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::records::{
        BenchmarkRecord, CropRotationRecord, Dataset, LogisticsRecord, MarketPriceRecord,
    };
    use crate::store::Backend;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Fallback store that counts every lookup.
    struct CountingStore {
        inner: FallbackStore,
        calls: AtomicUsize,
    }

    impl CountingStore {
        fn new() -> Self {
            Self {
                inner: FallbackStore::new(Dataset::demo()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RecordStore for CountingStore {
        fn backend(&self) -> Backend {
            Backend::Live
        }

        async fn market_prices(&self, q: &SearchQuery) -> Result<Vec<MarketPriceRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.market_prices(q).await
        }

        async fn crop_rotation(&self, q: &SearchQuery) -> Result<Vec<CropRotationRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.crop_rotation(q).await
        }

        async fn logistics(&self, q: &SearchQuery) -> Result<Vec<LogisticsRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.logistics(q).await
        }

        async fn benchmarks(&self, q: &SearchQuery) -> Result<Vec<BenchmarkRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.benchmarks(q).await
        }
    }

    /// Store whose every lookup fails, like an index with bad credentials.
    struct FailingStore;

    #[async_trait]
    impl RecordStore for FailingStore {
        fn backend(&self) -> Backend {
            Backend::Live
        }

        async fn market_prices(&self, _: &SearchQuery) -> Result<Vec<MarketPriceRecord>> {
            Err(AppError::UpstreamError("403 Forbidden".to_string()))
        }

        async fn crop_rotation(&self, _: &SearchQuery) -> Result<Vec<CropRotationRecord>> {
            Err(AppError::UpstreamError("403 Forbidden".to_string()))
        }

        async fn logistics(&self, _: &SearchQuery) -> Result<Vec<LogisticsRecord>> {
            Err(AppError::UpstreamError("403 Forbidden".to_string()))
        }

        async fn benchmarks(&self, _: &SearchQuery) -> Result<Vec<BenchmarkRecord>> {
            Err(AppError::UpstreamError("403 Forbidden".to_string()))
        }
    }

    fn orchestrator_over(store: Arc<dyn RecordStore>) -> Orchestrator {
        Orchestrator::new(
            store,
            Arc::new(FallbackStore::new(Dataset::demo())),
            Arc::new(ResponseCache::new(Duration::from_secs(300))),
            "test-agent",
        )
    }

    fn fallback_orchestrator() -> Orchestrator {
        orchestrator_over(Arc::new(FallbackStore::new(Dataset::demo())))
    }

    #[tokio::test]
    async fn test_market_query_routes_to_market_prices() {
        let result = fallback_orchestrator()
            .run("What are the almond prices in California?")
            .await;

        assert!(result.message.contains("market prices"));
        assert!(!result.message.contains("broad search"));
        let market = result.data.market.as_ref().unwrap();
        assert!(!market.is_empty());
        assert_eq!(market[0].region, "California");
        assert!(result.data.rotation.is_none());

        assert_eq!(result.tool_calls.len(), 1);
        assert_eq!(result.tool_calls[0].tool, "getMarketPulse");
        assert_eq!(result.metadata.orchestration_type, OrchestrationType::Simulated);
        assert_eq!(result.metadata.agent_id, "test-agent");
    }

    #[tokio::test]
    async fn test_rotation_query_mentions_next_crop_and_compatibility() {
        let result = fallback_orchestrator()
            .run("What should I plant after corn?")
            .await;

        assert!(result.message.contains("agronomy rules"));
        let rotation = result.data.rotation.as_ref().unwrap();
        let rule = rotation.iter().find(|r| r.previous_crop == "Corn").unwrap();
        assert!(result.message.contains(&rule.next_crop));
        assert!(result.message.contains(&rule.compatibility));
    }

    #[tokio::test]
    async fn test_multi_crop_rotation_query_names_every_matched_rule() {
        let result = fallback_orchestrator()
            .run("What should I plant after corn, soybeans, wheat or cotton?")
            .await;

        let rotation = result.data.rotation.as_ref().unwrap();
        assert_eq!(rotation.len(), 5);
        for rule in rotation {
            let line = format!(
                "- After {} on {} soil: plant {} ({} compatibility",
                rule.previous_crop, rule.soil_type, rule.next_crop, rule.compatibility
            );
            assert!(
                result.message.contains(&line),
                "missing rule {} -> {}",
                rule.previous_crop,
                rule.next_crop
            );
        }
    }

    #[tokio::test]
    async fn test_logistics_query_widens_to_browse() {
        let result = fallback_orchestrator().run("Find buyers for my crops").await;

        assert!(result.message.contains("logistics chain"));
        let logistics = result.data.logistics.as_ref().unwrap();
        assert_eq!(logistics.len(), 9);
    }

    #[tokio::test]
    async fn test_broad_search_populates_every_category() {
        let result = fallback_orchestrator()
            .run("Analyze my farm's potential")
            .await;

        assert!(result.message.contains("broad search"));
        for category in Category::ALL {
            assert!(result.data.contains(category), "missing {:?}", category);
        }
        assert!(!result.data.market.as_ref().unwrap().is_empty());
        assert!(!result.data.benchmarks.as_ref().unwrap().is_empty());
        assert_eq!(result.tool_calls.len(), 4);
    }

    #[tokio::test]
    async fn test_clauses_follow_resolution_order() {
        let result = fallback_orchestrator()
            .run("benchmark yield, then price after corn")
            .await;

        let market = result.message.find("market prices").unwrap();
        let rotation = result.message.find("agronomy rules").unwrap();
        let benchmarks = result.message.find("performance benchmarks").unwrap();
        assert!(market < rotation && rotation < benchmarks);
        assert!(!result.message.contains("logistics chain"));

        let tools: Vec<&str> = result.tool_calls.iter().map(|c| c.tool.as_str()).collect();
        assert_eq!(tools, vec!["getMarketPulse", "suggestRotation", "getBenchmarks"]);
    }

    #[tokio::test]
    async fn test_message_ends_with_attribution() {
        let result = fallback_orchestrator().run("corn").await;
        assert!(result
            .message
            .ends_with(compose::attribution(OrchestrationType::Simulated)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hit_skips_store_until_ttl() {
        let store = Arc::new(CountingStore::new());
        let orchestrator = orchestrator_over(store.clone());

        let first = orchestrator.run("What should I plant after corn?").await;
        let round_trip = store.calls();
        assert!(round_trip > 0);

        tokio::time::advance(Duration::from_secs(120)).await;
        let second = orchestrator.run("What should I plant after corn?").await;
        assert_eq!(store.calls(), round_trip);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );

        tokio::time::advance(Duration::from_secs(181)).await;
        orchestrator.run("What should I plant after corn?").await;
        assert_eq!(store.calls(), round_trip * 2);
    }

    #[tokio::test]
    async fn test_failing_store_degrades_to_fallback_dataset() {
        let result = orchestrator_over(Arc::new(FailingStore))
            .run("What are the almond prices in California?")
            .await;

        let market = result.data.market.as_ref().unwrap();
        assert_eq!(market[0].region, "California");
        assert_eq!(market[0].id, "mock-mp-0");
    }

    #[tokio::test]
    async fn test_search_many_keeps_requested_categories() {
        let orchestrator = fallback_orchestrator();
        let query = SearchQuery::new("midwest", Default::default(), 20);

        let data = orchestrator
            .search_many(&[Category::Market, Category::Benchmarks], &query)
            .await;

        assert_eq!(data.market.as_ref().unwrap().len(), 3);
        assert_eq!(data.benchmarks.as_ref().unwrap().len(), 2);
        assert!(data.rotation.is_none());
        assert!(data.logistics.is_none());
    }

    #[test]
    fn test_merge_later_call_wins_category() {
        let calls = vec![
            ToolCall::bare(crate::tools::ToolKind::MarketPulse),
            ToolCall::Unknown {
                name: "getWeather".to_string(),
                params: serde_json::Value::Null,
            },
            ToolCall::bare(crate::tools::ToolKind::MarketPulse),
        ];
        let demo = Dataset::demo();
        let batches = vec![
            RecordBatch::Market(demo.market_prices[..2].to_vec()),
            RecordBatch::Empty,
            RecordBatch::Market(demo.market_prices[..1].to_vec()),
        ];

        let (records, data) = merge(&calls, batches);

        assert_eq!(records.len(), 3);
        assert_eq!(records[1].tool, "getWeather");
        assert!(records[1].results.is_empty());
        assert_eq!(data.market.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_clears_cache() {
        let orchestrator = fallback_orchestrator();
        orchestrator.run("corn").await;
        assert_eq!(orchestrator.cache().len().await, 1);

        orchestrator.shutdown().await;
        assert!(orchestrator.cache().is_empty().await);
    }
}

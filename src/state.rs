use crate::admin::IndexAdmin;
use crate::config::Config;
use crate::error::Result;
use crate::orchestrator::{CompletionsClient, Orchestrator, ResponseCache};
use crate::records::Dataset;
use crate::store::{Backend, FallbackStore, LiveStore, RecordStore, SearchClient};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Application state shared across all request handlers.
///
/// Owns the process-scoped context: HTTP clients, the response cache and the
/// selected record store. Built once by [`AppState::init`].
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub admin: IndexAdmin,
    pub fallback: Arc<FallbackStore>,
    /// Flag indicating the service is ready (stores selected, clients built)
    pub ready: AtomicBool,
    pub config: Arc<Config>,
}

impl AppState {
    /// Initialize application state.
    ///
    /// # Store selection
    /// With search credentials the live index backs every lookup and the
    /// fallback dataset only serves failed reads. Without them the fallback
    /// store is used directly. The choice is made here, once.
    ///
    /// # Live orchestration
    /// Enabled only when an agent id is configured next to the credentials.
    pub fn init(config: Config) -> Result<Self> {
        let dataset = match &config.fallback_data_path {
            Some(path) => Dataset::load(path)?,
            None => Dataset::demo(),
        };
        let fallback = Arc::new(FallbackStore::new(dataset));

        let search_client = config
            .search_credentials()
            .map(|credentials| SearchClient::new(&credentials, config.upstream_timeout()))
            .transpose()?
            .map(Arc::new);

        let store: Arc<dyn RecordStore> = match &search_client {
            Some(client) => Arc::new(LiveStore::new(Arc::clone(client))),
            None => fallback.clone(),
        };

        let cache = Arc::new(ResponseCache::new(config.cache_ttl()));
        let mut orchestrator = Orchestrator::new(
            Arc::clone(&store),
            Arc::clone(&fallback),
            cache,
            config.agent_id(),
        );
        if let Some(endpoint) = config.agent_endpoint() {
            let client = CompletionsClient::new(&endpoint, config.upstream_timeout())?;
            tracing::info!(url = client.url(), "Live orchestration enabled");
            orchestrator = orchestrator.with_completions(client);
        }

        let admin = IndexAdmin::new(search_client, config.masked_app_id());

        tracing::info!(
            backend = ?store.backend(),
            live_orchestration = orchestrator.is_live(),
            cache_ttl_secs = config.cache_ttl_secs,
            "Record store selected"
        );
        if store.backend() == Backend::Fallback {
            tracing::warn!("Search credentials not set, serving the fallback dataset");
        }

        let state = Self {
            orchestrator,
            admin,
            fallback,
            ready: AtomicBool::new(false),
            config: Arc::new(config),
        };

        state.ready.store(true, Ordering::SeqCst);

        Ok(state)
    }

    /// Release process-scoped resources. The service reports not ready afterwards.
    pub async fn shutdown(&self) {
        self.ready.store(false, Ordering::SeqCst);
        self.orchestrator.shutdown().await;
        tracing::info!("Application state shut down");
    }

    /// Check if the service is ready to handle requests.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_init_without_credentials_uses_fallback() {
        let state = AppState::init(Config::default()).unwrap();

        assert!(state.is_ready());
        assert!(!state.orchestrator.is_live());
        assert!(!state.admin.status().configured);
        assert_eq!(state.fallback.dataset().market_prices.len(), 15);
    }

    #[test]
    fn test_init_with_credentials_enables_live_paths() {
        let config = Config {
            app_id: Some("APP1234".to_string()),
            api_key: Some("key".to_string()),
            agent_id: Some("agent-1".to_string()),
            ..Config::default()
        };
        let state = AppState::init(config).unwrap();

        assert!(state.orchestrator.is_live());
        let status = state.admin.status();
        assert!(status.configured);
        assert_eq!(status.app_id_masked.as_deref(), Some("***1234"));
    }

    #[test]
    fn test_init_loads_dataset_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"benchmarks":[{{"region":"Delta","crop_mix":["Rice"],"margin":"Low","yield":"High","practices":"Flood"}}]}}"#
        )
        .unwrap();

        let config = Config {
            fallback_data_path: Some(file.path().to_path_buf()),
            ..Config::default()
        };
        let state = AppState::init(config).unwrap();

        let dataset = state.fallback.dataset();
        assert!(dataset.market_prices.is_empty());
        assert_eq!(dataset.benchmarks[0].id, "mock-bm-0");
    }

    #[test]
    fn test_init_fails_on_missing_dataset_file() {
        let config = Config {
            fallback_data_path: Some("/nonexistent/agri-data.json".into()),
            ..Config::default()
        };
        assert!(AppState::init(config).is_err());
    }

    #[tokio::test]
    async fn test_shutdown_marks_not_ready() {
        let state = AppState::init(Config::default()).unwrap();
        state.orchestrator.run("corn").await;

        state.shutdown().await;

        assert!(!state.is_ready());
        assert!(state.orchestrator.cache().is_empty().await);
    }
}

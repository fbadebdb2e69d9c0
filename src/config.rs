use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Agent id reported in response metadata when `ALGOLIA_AGENT_ID` is unset.
pub const DEFAULT_AGENT_ID: &str = "agri-intel-primary-agent";

/// Credentials and base URL for the hosted search index.
#[derive(Debug, Clone)]
pub struct SearchCredentials {
    pub app_id: String,
    pub api_key: String,
    pub base_url: String,
}

/// Completions endpoint for live tool orchestration.
#[derive(Debug, Clone)]
pub struct AgentEndpoint {
    pub app_id: String,
    pub api_key: String,
    pub agent_id: String,
    pub base_url: String,
}

impl AgentEndpoint {
    pub fn completions_url(&self) -> String {
        format!(
            "{}/agent-studio/1/agents/{}/completions",
            self.base_url.trim_end_matches('/'),
            self.agent_id
        )
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
    /// Search application id. Together with `api_key` this enables the live store.
    pub app_id: Option<String>,
    pub api_key: Option<String>,
    /// Enables the live completions path when search credentials are also present.
    pub agent_id: Option<String>,
    /// Override for the search base URL (defaults to the app's DSN host).
    pub search_url: Option<String>,
    /// Override for the completions base URL.
    pub agent_url: Option<String>,
    /// Bearer token required by admin operations. Admin calls are refused while unset.
    pub admin_token: Option<String>,
    pub cache_ttl_secs: u64,
    /// Transport timeout for every upstream call.
    pub upstream_timeout_secs: u64,
    /// Optional JSON file replacing the built-in demo dataset.
    pub fallback_data_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout_secs: 5,
            app_id: None,
            api_key: None,
            agent_id: None,
            search_url: None,
            agent_url: None,
            admin_token: None,
            cache_ttl_secs: 300,
            upstream_timeout_secs: 15,
            fallback_data_path: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// Empty variables are treated as unset, so `ALGOLIA_APP_ID=` in a `.env`
    /// file keeps the service on its fallback dataset.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            shutdown_timeout_secs: env::var("SHUTDOWN_TIMEOUT")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            app_id: non_empty("ALGOLIA_APP_ID"),
            api_key: non_empty("ALGOLIA_WRITE_KEY"),
            agent_id: non_empty("ALGOLIA_AGENT_ID"),
            search_url: non_empty("ALGOLIA_SEARCH_URL"),
            agent_url: non_empty("AGENT_STUDIO_URL"),
            admin_token: non_empty("ADMIN_TOKEN"),
            cache_ttl_secs: env::var("CACHE_TTL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()?,
            upstream_timeout_secs: env::var("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()?,
            fallback_data_path: non_empty("FALLBACK_DATA_PATH").map(PathBuf::from),
        })
    }

    /// Search credentials, present only when both app id and key are set.
    pub fn search_credentials(&self) -> Option<SearchCredentials> {
        let (app_id, api_key) = (self.app_id.clone()?, self.api_key.clone()?);
        let base_url = self
            .search_url
            .clone()
            .unwrap_or_else(|| format!("https://{}-dsn.algolia.net", app_id));
        Some(SearchCredentials {
            app_id,
            api_key,
            base_url,
        })
    }

    /// Completions endpoint, present only when search credentials and an agent id are set.
    pub fn agent_endpoint(&self) -> Option<AgentEndpoint> {
        let (app_id, api_key) = (self.app_id.clone()?, self.api_key.clone()?);
        let agent_id = self.agent_id.clone()?;
        let base_url = self
            .agent_url
            .clone()
            .unwrap_or_else(|| format!("https://{}.algolia.net", app_id));
        Some(AgentEndpoint {
            app_id,
            api_key,
            agent_id,
            base_url,
        })
    }

    /// Agent id reported in response metadata.
    pub fn agent_id(&self) -> &str {
        self.agent_id.as_deref().unwrap_or(DEFAULT_AGENT_ID)
    }

    /// App id reduced to its last four characters, e.g. `***1234`.
    pub fn masked_app_id(&self) -> Option<String> {
        self.app_id.as_ref().map(|id| {
            let tail: String = id
                .chars()
                .rev()
                .take(4)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("***{}", tail)
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> Config {
        Config {
            app_id: Some("APP12345".to_string()),
            api_key: Some("secret".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn test_default_has_no_credentials() {
        let config = Config::default();
        assert!(config.search_credentials().is_none());
        assert!(config.agent_endpoint().is_none());
        assert_eq!(config.agent_id(), DEFAULT_AGENT_ID);
        assert_eq!(config.masked_app_id(), None);
    }

    #[test]
    fn test_search_credentials_default_dsn_host() {
        let creds = configured().search_credentials().unwrap();
        assert_eq!(creds.base_url, "https://APP12345-dsn.algolia.net");
    }

    #[test]
    fn test_agent_endpoint_requires_agent_id() {
        let mut config = configured();
        assert!(config.agent_endpoint().is_none());

        config.agent_id = Some("agent-7".to_string());
        let endpoint = config.agent_endpoint().unwrap();
        assert_eq!(
            endpoint.completions_url(),
            "https://APP12345.algolia.net/agent-studio/1/agents/agent-7/completions"
        );
    }

    #[test]
    fn test_agent_endpoint_requires_search_key() {
        let config = Config {
            app_id: Some("APP12345".to_string()),
            agent_id: Some("agent-7".to_string()),
            ..Config::default()
        };
        assert!(config.agent_endpoint().is_none());
    }

    #[test]
    fn test_masked_app_id_keeps_last_four() {
        assert_eq!(configured().masked_app_id().as_deref(), Some("***2345"));

        let short = Config {
            app_id: Some("AB".to_string()),
            ..Config::default()
        };
        assert_eq!(short.masked_app_id().as_deref(), Some("***AB"));
    }
}

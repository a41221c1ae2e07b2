//! Centralized configuration for Context Explorer.
//!
//! Constant structs hold the fixed hosts, file names and timeouts. The
//! runtime-adjustable subset lives in [`ExplorerConfig`], which the server
//! fills from command-line flags and tests point at mock servers.

use std::time::Duration;

/// Application-level constants.
pub struct AppConfig;

impl AppConfig {
    pub const USER_AGENT: &'static str = "context-explorer/0.1";
    /// Name of the manifest file looked up in every repository.
    pub const MANIFEST_FILE_NAME: &'static str = "context.json";
    pub const DEFAULT_BRANCH: &'static str = "main";
    /// User-Agent value reported by the desktop editor extension.
    pub const EDITOR_CLIENT_ID: &'static str = "Visual Studio Code (desktop)";
}

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
    pub const MANIFEST_BASE_URL: &'static str = "https://raw.githubusercontent.com";
    pub const RETRIEVAL_BASE_URL: &'static str = "https://uuithub.com";
    pub const PROMPT_BASE_URL: &'static str = "https://lmpify.com";
    pub const BADGE_BASE_URL: &'static str = "https://b.lmpify.com";
    pub const OPEN_BADGE_URL: &'static str = "https://img.shields.io/badge/open-blue";
    pub const MAX_CONCURRENT_FETCHES: usize = 8;
}

/// Page cache sizing.
pub struct CacheSettings;

impl CacheSettings {
    /// Maximum number of rendered pages held by the in-memory backend.
    pub const MEMORY_MAX_PAGES: u64 = 1_000;
}

/// Runtime configuration for a [`crate::ContextExplorer`].
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    /// Raw-content host serving `<owner>/<repo>/refs/heads/<branch>/context.json`.
    pub manifest_base_url: String,
    /// Retrieval service host serving `<owner>/<repo>/tree/main`.
    pub retrieval_base_url: String,
    pub prompt_base_url: String,
    pub badge_base_url: String,
    /// Static bearer credential sent to the retrieval service.
    pub retrieval_token: String,
    /// Per-request bound applied to every outbound call.
    pub request_timeout: Duration,
    /// Upper bound on concurrent retrieval calls for one manifest.
    pub max_concurrent_fetches: usize,
    pub user_agent: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            manifest_base_url: NetworkConfig::MANIFEST_BASE_URL.to_string(),
            retrieval_base_url: NetworkConfig::RETRIEVAL_BASE_URL.to_string(),
            prompt_base_url: NetworkConfig::PROMPT_BASE_URL.to_string(),
            badge_base_url: NetworkConfig::BADGE_BASE_URL.to_string(),
            retrieval_token: String::new(),
            request_timeout: NetworkConfig::REQUEST_TIMEOUT,
            max_concurrent_fetches: NetworkConfig::MAX_CONCURRENT_FETCHES,
            user_agent: AppConfig::USER_AGENT.to_string(),
        }
    }
}

impl ExplorerConfig {
    pub fn with_manifest_base_url(mut self, url: impl Into<String>) -> Self {
        self.manifest_base_url = trim_base(url.into());
        self
    }

    pub fn with_retrieval_base_url(mut self, url: impl Into<String>) -> Self {
        self.retrieval_base_url = trim_base(url.into());
        self
    }

    pub fn with_prompt_base_url(mut self, url: impl Into<String>) -> Self {
        self.prompt_base_url = trim_base(url.into());
        self
    }

    pub fn with_badge_base_url(mut self, url: impl Into<String>) -> Self {
        self.badge_base_url = trim_base(url.into());
        self
    }

    pub fn with_retrieval_token(mut self, token: impl Into<String>) -> Self {
        self.retrieval_token = token.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Zero is clamped to one so enrichment always makes progress.
    pub fn with_max_concurrent_fetches(mut self, limit: usize) -> Self {
        self.max_concurrent_fetches = limit.max(1);
        self
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

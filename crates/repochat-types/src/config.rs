use serde::{Deserialize, Serialize};

/// Top-level client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api: ApiConfig,
    /// Delay before a mention query is sent to the backend
    pub mention_debounce_ms: u64,
    /// Project list refresh interval while something is indexing
    pub project_poll_interval_ms: u32,
    /// Citation chips rendered under an assistant message
    pub max_visible_sources: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            mention_debounce_ms: 300,
            project_poll_interval_ms: 5000,
            max_visible_sources: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Send the session cookie with every request
    pub include_credentials: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            include_credentials: true,
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Join an API path onto the base URL, tolerating stray slashes.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

const DEFAULT_BASE_URL: &str = "http://localhost:3000";

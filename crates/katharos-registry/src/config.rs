//! Configuration for the Hub client.

use std::time::Duration;

/// Configuration for [`HubClient`](crate::HubClient).
///
/// Endpoint defaults target Docker Hub; they are overridable so tests and
/// private mirrors can point elsewhere.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Hub (metadata/catalog) API base URL.
    pub hub_url: String,

    /// Token service base URL.
    pub auth_url: String,

    /// Registry v2 API base URL.
    pub registry_url: String,

    /// Account username.
    pub username: String,

    /// Account password or personal access token.
    pub password: String,

    /// Per-request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,

    /// When set, deletions are no-ops that report success.
    pub dry_run: bool,

    /// Page size for Hub tag listings.
    pub page_size: u32,
}

impl HubConfig {
    /// Creates a configuration with Docker Hub endpoint defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use katharos_registry::HubConfig;
    ///
    /// let config = HubConfig::new("acme", "hunter2");
    /// assert_eq!(config.hub_url, "https://hub.docker.com/v2");
    /// assert!(!config.dry_run);
    /// ```
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            hub_url: "https://hub.docker.com/v2".to_string(),
            auth_url: "https://auth.docker.io".to_string(),
            registry_url: "https://registry-1.docker.io/v2".to_string(),
            username: username.into(),
            password: password.into(),
            timeout: Duration::from_secs(30),
            user_agent: format!("katharos-registry/{}", env!("CARGO_PKG_VERSION")),
            dry_run: false,
            page_size: 100,
        }
    }

    /// Overrides the Hub API base URL.
    #[must_use]
    pub fn with_hub_url(mut self, url: impl Into<String>) -> Self {
        self.hub_url = trim_trailing_slash(url.into());
        self
    }

    /// Overrides the token service base URL.
    #[must_use]
    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = trim_trailing_slash(url.into());
        self
    }

    /// Overrides the Registry v2 API base URL.
    #[must_use]
    pub fn with_registry_url(mut self, url: impl Into<String>) -> Self {
        self.registry_url = trim_trailing_slash(url.into());
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enables or disables dry-run mode.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Sets the Hub listing page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

fn trim_trailing_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

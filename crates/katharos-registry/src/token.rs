//! Per-repository bearer-token cache.
//!
//! Registry tokens are scoped to a single repository and expire after a
//! few minutes upstream. The cache is an explicit map owned by the client,
//! injected where needed; clock values are passed in by the caller so the
//! expiry logic is testable without waiting.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Tokens older than this are discarded. Upstream tokens last about five
/// minutes; four leaves headroom for in-flight requests.
const DEFAULT_TTL_SECONDS: i64 = 240;

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    created: DateTime<Utc>,
}

/// Time-boxed cache of repository-scoped bearer tokens.
#[derive(Debug)]
pub struct TokenCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CachedToken>>,
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCache {
    /// Creates a cache with the default time-to-live.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(Duration::seconds(DEFAULT_TTL_SECONDS))
    }

    /// Creates a cache with an explicit time-to-live.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached token for a repository if it is still fresh.
    #[must_use]
    pub fn get(&self, repository: &str, now: DateTime<Utc>) -> Option<String> {
        let entries = self.entries.lock().ok()?;
        let entry = entries.get(repository)?;
        if now.signed_duration_since(entry.created) < self.ttl {
            Some(entry.token.clone())
        } else {
            None
        }
    }

    /// Stores a token for a repository, replacing any previous entry.
    pub fn insert(&self, repository: impl Into<String>, token: impl Into<String>, now: DateTime<Utc>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                repository.into(),
                CachedToken {
                    token: token.into(),
                    created: now,
                },
            );
        }
    }
}

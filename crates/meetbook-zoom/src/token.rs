//! In-memory access-token cache, keyed by account email.
//!
//! Tokens live only for the process lifetime. A cached token is returned
//! only while its expiry is more than [`REFRESH_MARGIN`] away; anything
//! closer is treated as absent and re-fetched, silently replacing the stale
//! entry. The cache holds at most one token per account.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::debug;

/// Tokens expiring within this margin are treated as absent.
pub const REFRESH_MARGIN: Duration = Duration::minutes(5);

/// Fallback lifetime when the token response omits `expires_in`.
pub const DEFAULT_EXPIRES_IN: i64 = 3600;

/// A cached access token with its expiry instant.
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now + REFRESH_MARGIN
    }
}

/// Shared mutable token cache for the account pool.
///
/// Guarded by an async mutex: the process handles chat flows sequentially,
/// but the cache is still shared state inside one async runtime, so
/// read-modify-write is kept atomic per call.
#[derive(Debug, Default)]
pub struct TokenCache {
    entries: Mutex<HashMap<String, CachedToken>>,
}

impl TokenCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached token for an account if it is still usable.
    pub async fn get(&self, email: &str) -> Option<String> {
        self.get_at(email, Utc::now()).await
    }

    /// Like [`TokenCache::get`] with an explicit clock, for tests.
    pub async fn get_at(&self, email: &str, now: DateTime<Utc>) -> Option<String> {
        let entries = self.entries.lock().await;
        match entries.get(email) {
            Some(token) if token.is_usable(now) => {
                debug!(account = email, "using cached token");
                Some(token.access_token.clone())
            }
            _ => None,
        }
    }

    /// Stores a freshly exchanged token, replacing any previous entry.
    pub async fn insert(&self, email: &str, access_token: String, expires_in_secs: Option<i64>) {
        self.insert_at(email, access_token, expires_in_secs, Utc::now())
            .await;
    }

    /// Like [`TokenCache::insert`] with an explicit clock, for tests.
    pub async fn insert_at(
        &self,
        email: &str,
        access_token: String,
        expires_in_secs: Option<i64>,
        now: DateTime<Utc>,
    ) {
        let expires_in = expires_in_secs.unwrap_or(DEFAULT_EXPIRES_IN);
        let mut entries = self.entries.lock().await;
        entries.insert(
            email.to_string(),
            CachedToken {
                access_token,
                expires_at: now + Duration::seconds(expires_in),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_fresh_token() {
        let cache = TokenCache::new();
        let now = Utc::now();
        cache
            .insert_at("a@example.com", "tok".into(), Some(3600), now)
            .await;
        assert_eq!(cache.get_at("a@example.com", now).await.as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn token_within_margin_is_absent() {
        let cache = TokenCache::new();
        let now = Utc::now();
        // Expires in 4 minutes, inside the 5-minute margin.
        cache
            .insert_at("a@example.com", "tok".into(), Some(240), now)
            .await;
        assert_eq!(cache.get_at("a@example.com", now).await, None);
    }

    #[tokio::test]
    async fn margin_boundary_is_exclusive() {
        let cache = TokenCache::new();
        let now = Utc::now();
        // Expires in exactly 5 minutes: not usable (must be strictly beyond).
        cache
            .insert_at("a@example.com", "tok".into(), Some(300), now)
            .await;
        assert_eq!(cache.get_at("a@example.com", now).await, None);

        // One second past the margin is usable.
        cache
            .insert_at("b@example.com", "tok2".into(), Some(301), now)
            .await;
        assert_eq!(cache.get_at("b@example.com", now).await.as_deref(), Some("tok2"));
    }

    #[tokio::test]
    async fn stale_entry_is_replaced() {
        let cache = TokenCache::new();
        let now = Utc::now();
        cache
            .insert_at("a@example.com", "old".into(), Some(60), now)
            .await;
        cache
            .insert_at("a@example.com", "new".into(), Some(3600), now)
            .await;
        assert_eq!(cache.get_at("a@example.com", now).await.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn accounts_are_independent() {
        let cache = TokenCache::new();
        let now = Utc::now();
        cache
            .insert_at("a@example.com", "ta".into(), Some(3600), now)
            .await;
        assert_eq!(cache.get_at("b@example.com", now).await, None);
    }

    #[tokio::test]
    async fn missing_expires_in_defaults_to_an_hour() {
        let cache = TokenCache::new();
        let now = Utc::now();
        cache.insert_at("a@example.com", "tok".into(), None, now).await;
        assert!(cache.get_at("a@example.com", now).await.is_some());
        // Fifty-six minutes later the hour-long token is inside the margin.
        let later = now + Duration::minutes(56);
        assert_eq!(cache.get_at("a@example.com", later).await, None);
    }
}

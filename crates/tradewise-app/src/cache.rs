// Provider response caching with TTL.
//
// `CachedProvider` wraps any `LeagueDataProvider` and memoizes its responses
// as JSON values in an injectable `ResponseCache`, so repeated analyses of the
// same league do not refetch rosters, directories or stats.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use tradewise_core::league::{LeagueUser, PlayerInfo, Roster, ScoringSettings};
use tradewise_core::valuation::points::StatLine;

use crate::provider::{LeagueDataProvider, ProviderError};

// ---------------------------------------------------------------------------
// Cache trait
// ---------------------------------------------------------------------------

/// Key/value store for provider responses with per-entry expiry.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Cached value for `key`, or `None` if missing or expired.
    async fn get(&self, key: &str) -> Option<serde_json::Value>;

    async fn set(&self, key: &str, value: serde_json::Value, ttl: Duration);

    async fn has(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }
}

// ---------------------------------------------------------------------------
// In-memory cache
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct CachedEntry {
    value: serde_json::Value,
    /// `None` when the TTL is too large to represent.
    expires_at: Option<DateTime<Utc>>,
}

impl CachedEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Process-local cache backed by a `HashMap` behind a tokio `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CachedEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop every expired entry. Returns how many were removed.
    pub async fn clear_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let now = Utc::now();
        let initial = entries.len();
        entries.retain(|key, entry| {
            if entry.is_expired(now) {
                debug!("Removing expired cache entry {}", key);
                false
            } else {
                true
            }
        });
        let removed = initial - entries.len();
        if removed > 0 {
            info!("Cleared {} expired cache entries", removed);
        }
        removed
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<serde_json::Value> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.is_expired(Utc::now()) {
            debug!("Cache entry {} expired", key);
            return None;
        }
        Some(entry.value.clone())
    }

    async fn set(&self, key: &str, value: serde_json::Value, ttl: Duration) {
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl));
        self.entries
            .write()
            .await
            .insert(key.to_string(), CachedEntry { value, expires_at });
    }
}

// ---------------------------------------------------------------------------
// Caching provider
// ---------------------------------------------------------------------------

/// A provider whose responses are memoized in a `ResponseCache`.
pub struct CachedProvider<P, C> {
    inner: P,
    cache: C,
    ttl: Duration,
}

impl<P, C> CachedProvider<P, C>
where
    P: LeagueDataProvider,
    C: ResponseCache,
{
    pub fn new(inner: P, cache: C, ttl: Duration) -> Self {
        CachedProvider { inner, cache, ttl }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Serve `key` from the cache, or fetch it and cache the result.
    ///
    /// Entries that no longer decode are refetched. Failed fetches are not cached.
    async fn cached<T, F, Fut>(&self, key: String, fetch: F) -> Result<T, ProviderError>
    where
        T: Serialize + DeserializeOwned + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, ProviderError>> + Send,
    {
        if let Some(value) = self.cache.get(&key).await {
            match serde_json::from_value(value) {
                Ok(hit) => {
                    debug!("Cache hit for {}", key);
                    return Ok(hit);
                }
                Err(e) => warn!("Discarding undecodable cache entry {}: {}", key, e),
            }
        }

        let fresh = fetch().await?;
        match serde_json::to_value(&fresh) {
            Ok(value) => self.cache.set(&key, value, self.ttl).await,
            Err(e) => warn!("Not caching {}: {}", key, e),
        }
        Ok(fresh)
    }
}

#[async_trait]
impl<P, C> LeagueDataProvider for CachedProvider<P, C>
where
    P: LeagueDataProvider,
    C: ResponseCache,
{
    async fn league_rosters(&self, league_id: &str) -> Result<Vec<Roster>, ProviderError> {
        self.cached(format!("rosters:{league_id}"), || self.inner.league_rosters(league_id))
            .await
    }

    async fn league_users(&self, league_id: &str) -> Result<Vec<LeagueUser>, ProviderError> {
        self.cached(format!("users:{league_id}"), || self.inner.league_users(league_id))
            .await
    }

    async fn player_directory(&self) -> Result<HashMap<String, PlayerInfo>, ProviderError> {
        self.cached("players".to_string(), || self.inner.player_directory())
            .await
    }

    async fn season_stats(&self, season: &str) -> Result<HashMap<String, StatLine>, ProviderError> {
        self.cached(format!("stats:{season}"), || self.inner.season_stats(season))
            .await
    }

    async fn scoring_settings(&self, league_id: &str) -> Result<ScoringSettings, ProviderError> {
        self.cached(format!("scoring:{league_id}"), || self.inner.scoring_settings(league_id))
            .await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

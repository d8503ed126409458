//! Optional summary cache with TTL expiry
//!
//! Maps ticker → `(summary, fetched_at)`. Entries expire after the configured
//! lifespan and can be invalidated explicitly. Nothing is cached unless a
//! cache is attached to the summarizer.

use cached::{Cached, TimedCache};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::models::StockSummary;

/// A summary together with the time it was fetched
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSummary {
    pub summary: StockSummary,
    pub fetched_at: DateTime<Utc>,
}

/// Thread-safe summary cache
#[derive(Clone)]
pub struct SummaryCache {
    cache: Arc<RwLock<TimedCache<String, CachedSummary>>>,
}

impl SummaryCache {
    /// Create a new cache with specified TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Get a live entry from the cache
    pub async fn get(&self, ticker: &str) -> Option<CachedSummary> {
        let mut cache = self.cache.write().await;
        let hit = cache.cache_get(&ticker.to_string()).cloned();
        if hit.is_some() {
            tracing::debug!(ticker, "Summary cache hit");
        }
        hit
    }

    /// Store a freshly fetched summary
    pub async fn insert(&self, summary: StockSummary) {
        let entry = CachedSummary {
            summary,
            fetched_at: Utc::now(),
        };
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(entry.summary.ticker.clone(), entry);
    }

    /// Invalidate a specific cache entry
    pub async fn invalidate(&self, ticker: &str) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_remove(&ticker.to_string());
    }

    /// Clear all cached entries
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.cache_clear();
    }

    /// Get the number of cached entries
    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(ticker: &str, price: f64) -> StockSummary {
        StockSummary {
            ticker: ticker.to_string(),
            price,
            sector: "Technology".to_string(),
            industry: "Software".to_string(),
            volume: 10,
            ma20: price,
            ma50: price,
            historical_data: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let cache = SummaryCache::new(Duration::from_secs(60));
        cache.insert(summary("AAPL", 150.0)).await;

        let hit = cache.get("AAPL").await.unwrap();
        assert_eq!(hit.summary.price, 150.0);
        assert!(hit.fetched_at <= Utc::now());
        assert!(cache.get("MSFT").await.is_none());
    }

    #[tokio::test]
    async fn test_invalidation() {
        let cache = SummaryCache::new(Duration::from_secs(60));
        cache.insert(summary("AAPL", 150.0)).await;
        assert!(cache.get("AAPL").await.is_some());

        cache.invalidate("AAPL").await;
        assert!(cache.get("AAPL").await.is_none());
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = SummaryCache::new(Duration::from_secs(60));
        for i in 0..5 {
            cache.insert(summary(&format!("STOCK{i}"), f64::from(i))).await;
        }
        assert_eq!(cache.len().await, 5);

        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[test]
    fn test_reinsert_replaces_entry() {
        tokio_test::block_on(async {
            let cache = SummaryCache::new(Duration::from_secs(60));
            cache.insert(summary("AAPL", 150.0)).await;
            cache.insert(summary("AAPL", 151.0)).await;

            assert_eq!(cache.len().await, 1);
            assert_eq!(cache.get("AAPL").await.unwrap().summary.price, 151.0);
        });
    }
}

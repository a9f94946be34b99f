use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::{
    models::RateLimitUsage,
    stores::{Clock, RateLimitStore, SystemClock},
};

#[derive(Debug, Clone, Copy)]
struct Entry {
    count: u32,
    expiry: DateTime<Utc>,
}

/// In-process rate-limit store. Expired entries read as zero and are evicted
/// lazily on the next access; there is no background sweep. Memory is bounded
/// by the number of distinct destinations contacted per window, which is fine
/// for windows of an hour or less. Multi-process deployments need an external
/// store with a single-round-trip conditional increment instead.
pub struct InMemoryRateLimitStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }
}

impl Default for InMemoryRateLimitStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn get(&self, key: &str) -> anyhow::Result<u32> {
        let now = self.clock.now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expiry > now => return Ok(entry.count),
                Some(_) => {}
                None => return Ok(0),
            }
        }
        // stale entry; evict it
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key) {
            if entry.expiry <= now {
                entries.remove(key);
            }
        }
        Ok(0)
    }

    async fn set(&self, key: &str, count: u32, ttl: Duration) -> anyhow::Result<()> {
        let expiry = self.clock.now() + chrono::Duration::from_std(ttl)?;
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), Entry { count, expiry });
        Ok(())
    }

    async fn increment(&self, key: &str, ttl: Duration) -> anyhow::Result<RateLimitUsage> {
        let now = self.clock.now();
        // single write lock: concurrent increments for one key serialize here
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) if entry.expiry > now => {
                entry.count += 1;
                let retry_after = (entry.expiry - now).num_seconds().max(0) as u64;
                Ok(RateLimitUsage {
                    count: entry.count,
                    retry_after,
                })
            }
            _ => {
                let expiry = now + chrono::Duration::from_std(ttl)?;
                entries.insert(key.to_string(), Entry { count: 1, expiry });
                Ok(RateLimitUsage {
                    count: 1,
                    retry_after: ttl.as_secs(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stores::ManualClock;

    #[tokio::test]
    async fn missing_key_reads_zero() {
        let store = InMemoryRateLimitStore::new();
        assert_eq!(store.get("sms:none").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn increment_initializes_then_counts() {
        let store = InMemoryRateLimitStore::new();
        let ttl = Duration::from_secs(60);
        assert_eq!(store.increment("k", ttl).await.unwrap().count, 1);
        assert_eq!(store.increment("k", ttl).await.unwrap().count, 2);
        assert_eq!(store.get("k").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn expired_entries_read_zero_and_reset() {
        let clock = ManualClock::new();
        let store = InMemoryRateLimitStore::with_clock(clock.clone());
        let ttl = Duration::from_secs(60);

        store.increment("k", ttl).await.unwrap();
        store.increment("k", ttl).await.unwrap();
        clock.advance(Duration::from_secs(61));

        assert_eq!(store.get("k").await.unwrap(), 0);
        assert_eq!(store.increment("k", ttl).await.unwrap().count, 1);
    }

    #[tokio::test]
    async fn increment_does_not_extend_the_window() {
        let clock = ManualClock::new();
        let store = InMemoryRateLimitStore::with_clock(clock.clone());
        let ttl = Duration::from_secs(60);

        store.increment("k", ttl).await.unwrap();
        clock.advance(Duration::from_secs(30));
        let usage = store.increment("k", ttl).await.unwrap();
        assert_eq!(usage.count, 2);
        assert_eq!(usage.retry_after, 30);

        // original window still ends 60s after first creation
        clock.advance(Duration::from_secs(31));
        assert_eq!(store.get("k").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn set_overwrites_count_and_expiry() {
        let store = InMemoryRateLimitStore::new();
        store.set("k", 7, Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), 7);
    }

    #[tokio::test]
    async fn concurrent_increments_never_lose_updates() {
        let store = Arc::new(InMemoryRateLimitStore::new());
        let ttl = Duration::from_secs(60);

        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.increment("k", ttl).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.get("k").await.unwrap(), 50);
    }
}

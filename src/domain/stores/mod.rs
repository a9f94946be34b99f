use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::models::RateLimitUsage;

/// Per-key send counters inside sliding windows. `increment` must be atomic:
/// two concurrent sends for the same key may never both observe a stale
/// count. The ttl only applies when a key is first created within a window;
/// later increments leave the expiry untouched.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<u32>;
    async fn set(&self, key: &str, count: u32, ttl: Duration) -> anyhow::Result<()>;
    async fn increment(&self, key: &str, ttl: Duration) -> anyhow::Result<RateLimitUsage>;
}

/// Time source for window expiry. Injected so tests can advance time
/// instead of sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced time source. Lets tests move a rate-limit window past
/// its expiry without sleeping through it.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(Utc::now()),
        })
    }

    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock().expect("clock lock poisoned");
        *now += chrono::Duration::from_std(duration).expect("duration out of range");
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock poisoned")
    }
}

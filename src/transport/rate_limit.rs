//! Client side rate limiting
//!
//! A token bucket (governor) shared by every request an adapter sends.
//! The cooperative adapter awaits a permit; the blocking adapter parks
//! the calling thread until one is available.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Bucket};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;

type DirectBucket = Bucket<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Requests allowed per second and the bucket depth
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimiterConfig {
    pub requests_per_second: u32,
    /// Requests that may go out back to back before throttling starts
    pub burst_size: u32,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::new(10, 10)
    }
}

impl RateLimiterConfig {
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }

    /// Zero values are clamped to one
    fn quota(&self) -> Quota {
        let rate = NonZeroU32::new(self.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(self.burst_size).unwrap_or(NonZeroU32::MIN);
        Quota::per_second(rate).allow_burst(burst)
    }
}

/// Token bucket shared across clones
#[derive(Clone)]
pub struct RateLimiter {
    bucket: Arc<DirectBucket>,
}

impl RateLimiter {
    pub fn new(config: &RateLimiterConfig) -> Self {
        Self {
            bucket: Arc::new(Bucket::direct(config.quota())),
        }
    }

    pub async fn wait(&self) {
        self.bucket.until_ready().await;
    }

    /// Park the current thread until a permit is available
    pub fn wait_blocking(&self) {
        futures::executor::block_on(self.bucket.until_ready());
    }

    /// Take a permit if one is free right now
    pub fn try_acquire(&self) -> bool {
        self.bucket.check().is_ok()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish_non_exhaustive()
    }
}

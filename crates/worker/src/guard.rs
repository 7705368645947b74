//! Minimum spacing between runs of the same update

use std::time::Duration;

use moka::future::Cache;

/// Remembers recent runs for a fixed window
#[derive(Clone)]
pub struct RunGuard {
    recent: Cache<&'static str, ()>,
}

impl RunGuard {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            recent: Cache::builder().time_to_live(min_interval).build(),
        }
    }

    /// Claim a run of `key`; false if one started within the window
    pub async fn try_acquire(&self, key: &'static str) -> bool {
        self.recent.entry(key).or_insert(()).await.is_fresh()
    }
}

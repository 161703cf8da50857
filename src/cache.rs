use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::sleep;
use tracing::trace;

use crate::providers::ProviderKind;
use crate::record::LookupOutcome;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProviderStats {
    pub calls: usize,
    pub cache_hits: usize,
    pub failures: usize,
}

/// Run-scoped memo of one provider's outcomes. Empty and failed outcomes
/// are stored too, so a key is only ever looked up once.
pub struct ProviderCache<K> {
    provider: ProviderKind,
    entries: HashMap<K, Arc<LookupOutcome>>,
    delay: Duration,
    stats: ProviderStats,
}

impl<K> ProviderCache<K>
where
    K: Eq + Hash + Debug,
{
    pub fn new(provider: ProviderKind, delay: Duration) -> Self {
        Self {
            provider,
            entries: HashMap::new(),
            delay,
            stats: ProviderStats::default(),
        }
    }

    /// Returns the stored outcome, or runs `compute` once and then waits out
    /// the throttle delay before handing the fresh outcome back.
    pub async fn get_or_compute<F, Fut>(&mut self, key: K, compute: F) -> Arc<LookupOutcome>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = LookupOutcome>,
    {
        if let Some(outcome) = self.entries.get(&key) {
            self.stats.cache_hits += 1;
            trace!(provider = %self.provider, ?key, "cache hit");
            return Arc::clone(outcome);
        }

        let outcome = Arc::new(compute().await);
        self.stats.calls += 1;
        if outcome.is_failure() {
            self.stats.failures += 1;
        }
        trace!(provider = %self.provider, ?key, "cache miss stored");
        self.entries.insert(key, Arc::clone(&outcome));

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        outcome
    }

    pub fn stats(&self) -> ProviderStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

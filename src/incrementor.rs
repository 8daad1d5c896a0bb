use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AutoincError, Result, StoreError};
use crate::key::SequenceKey;
use crate::store::CounterStore;

/// Settings for an [`Incrementor`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncrementorConfig {
    /// Bound on a single store round-trip. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

/// Allocates the next value of a (type, field, scope) sequence.
///
/// `seed` is the floor of a fresh sequence and `step` is added on every call,
/// so a sequence with seed 1000 and step 2 yields 1002, 1004, ...
///
/// A call that times out or is dropped before the store answers is reported
/// as a failure, but the store may still have consumed a value. That value is
/// never reissued; the sequence simply has a gap.
#[derive(Debug)]
pub struct Incrementor<S> {
    store: S,
    config: IncrementorConfig,
}

impl<S: CounterStore> Incrementor<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, IncrementorConfig::default())
    }

    pub fn with_config(store: S, config: IncrementorConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &IncrementorConfig {
        &self.config
    }

    pub async fn next_value(
        &self,
        type_name: &str,
        field_name: &str,
        scope: Option<&str>,
        seed: Option<i64>,
        step: i64,
    ) -> Result<i64> {
        let seed = seed.unwrap_or(0);
        if seed < 0 {
            return Err(AutoincError::InvalidSeed(seed));
        }
        if step < 1 {
            return Err(AutoincError::InvalidStep(step));
        }
        let key = SequenceKey::new(type_name, field_name, scope)?;

        let increment = self.store.increment_by(&key, seed, step);
        let value = match self.config.timeout {
            Some(limit) => match tokio::time::timeout(limit, increment).await {
                Ok(result) => result?,
                Err(_) => {
                    tracing::warn!(
                        %key,
                        ?limit,
                        "counter increment timed out; a value may have been consumed"
                    );
                    return Err(StoreError::Timeout(limit).into());
                }
            },
            None => increment.await?,
        };

        tracing::debug!(%key, value, "allocated sequence value");
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::store::MemoryCounterStore;

    #[tokio::test]
    async fn defaults_start_at_one() {
        let inc = Incrementor::new(MemoryCounterStore::new());
        assert_eq!(inc.config(), &IncrementorConfig::default());
        assert_eq!(inc.next_value("User", "number", None, None, 1).await.unwrap(), 1);
        assert_eq!(inc.next_value("User", "number", None, None, 1).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn seed_is_the_floor() {
        let inc = Incrementor::new(MemoryCounterStore::new());
        assert_eq!(
            inc.next_value("Vehicle", "vin", None, Some(1000), 1).await.unwrap(),
            1001
        );
        assert_eq!(
            inc.next_value("Vehicle", "vin", None, Some(1000), 1).await.unwrap(),
            1002
        );
    }

    #[tokio::test]
    async fn step_is_added_per_call() {
        let inc = Incrementor::new(MemoryCounterStore::new());
        let mut values = Vec::new();
        for _ in 0..3 {
            values.push(inc.next_value("Ticket", "number", None, None, 2).await.unwrap());
        }
        assert_eq!(values, vec![2, 4, 6]);
    }

    #[tokio::test]
    async fn scopes_are_independent() {
        let inc = Incrementor::new(MemoryCounterStore::new());
        assert_eq!(inc.next_value("T", "f", Some("A"), Some(0), 1).await.unwrap(), 1);
        assert_eq!(inc.next_value("T", "f", Some("B"), Some(0), 1).await.unwrap(), 1);
        assert_eq!(inc.next_value("T", "f", Some("A"), Some(0), 1).await.unwrap(), 2);
        assert_eq!(inc.next_value("T", "f", None, Some(0), 1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn rejects_invalid_arguments() {
        let inc = Incrementor::new(MemoryCounterStore::new());
        assert!(matches!(
            inc.next_value("T", "f", None, Some(-1), 1).await,
            Err(AutoincError::InvalidSeed(-1))
        ));
        assert!(matches!(
            inc.next_value("T", "f", None, None, 0).await,
            Err(AutoincError::InvalidStep(0))
        ));
        assert!(matches!(
            inc.next_value("", "f", None, None, 1).await,
            Err(AutoincError::EmptyKeyComponent("type_name"))
        ));
        assert!(inc.store().counters().is_empty());
    }

    /// Never answers.
    struct HangingStore;

    impl CounterStore for HangingStore {
        fn increment_by(
            &self,
            _key: &SequenceKey,
            _seed: i64,
            _step: i64,
        ) -> impl Future<Output = std::result::Result<i64, StoreError>> + Send {
            std::future::pending()
        }
    }

    #[tokio::test]
    async fn timeout_surfaces_as_store_unavailable() {
        let inc = Incrementor::with_config(
            HangingStore,
            IncrementorConfig {
                timeout: Some(Duration::from_millis(10)),
            },
        );
        assert_eq!(inc.config().timeout, Some(Duration::from_millis(10)));
        let err = inc.next_value("User", "number", None, None, 1).await.unwrap_err();
        assert!(matches!(
            err,
            AutoincError::StoreUnavailable(StoreError::Timeout(limit)) if limit == Duration::from_millis(10)
        ));
    }

    /// Fails every call, counting attempts.
    #[derive(Default)]
    struct DownStore {
        calls: AtomicUsize,
    }

    impl CounterStore for DownStore {
        async fn increment_by(
            &self,
            _key: &SequenceKey,
            _seed: i64,
            _step: i64,
        ) -> std::result::Result<i64, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    #[tokio::test]
    async fn store_failure_propagates_without_retry() {
        let store = Arc::new(DownStore::default());
        let inc = Incrementor::new(Arc::clone(&store));
        let err = inc.next_value("User", "number", None, None, 1).await.unwrap_err();
        assert!(matches!(
            err,
            AutoincError::StoreUnavailable(StoreError::Database(sqlx::Error::PoolTimedOut))
        ));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_get_distinct_increasing_values() {
        let inc = Arc::new(Incrementor::new(MemoryCounterStore::new()));
        let handles: Vec<_> = (0..32)
            .map(|_| {
                let inc = Arc::clone(&inc);
                tokio::spawn(async move {
                    inc.next_value("User", "number", None, None, 3).await.unwrap()
                })
            })
            .collect();

        let mut values = Vec::new();
        for handle in handles {
            values.push(handle.await.unwrap());
        }
        values.sort_unstable();
        assert_eq!(values, (1..=32).map(|n| n * 3).collect::<Vec<i64>>());
    }
}

use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{Counter, CounterStore};
use crate::error::StoreError;
use crate::key::SequenceKey;

/// In-process counter store. The mutex is the serialization point, so it is
/// only shared by callers inside one process.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    counters: Mutex<BTreeMap<SequenceKey, i64>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate `key` as if `value` had already been issued.
    pub fn starting_from(key: SequenceKey, value: i64) -> Self {
        let store = Self::new();
        store.lock().insert(key, value);
        store
    }

    /// Last value issued for `key`, if the counter exists.
    pub fn current(&self, key: &SequenceKey) -> Option<i64> {
        self.lock().get(key).copied()
    }

    pub fn counters(&self) -> Vec<Counter> {
        self.lock()
            .iter()
            .map(|(key, value)| Counter {
                key: key.to_string(),
                value: *value,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<SequenceKey, i64>> {
        // A panic while holding the lock cannot leave a half-applied counter.
        self.counters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn apply(&self, key: &SequenceKey, seed: i64, step: i64) -> Result<i64, StoreError> {
        let mut counters = self.lock();
        let next = counters
            .get(key)
            .copied()
            .unwrap_or(seed)
            .checked_add(step)
            .ok_or_else(|| StoreError::Overflow(key.to_string()))?;
        counters.insert(key.clone(), next);
        Ok(next)
    }
}

impl CounterStore for MemoryCounterStore {
    async fn increment_by(
        &self,
        key: &SequenceKey,
        seed: i64,
        step: i64,
    ) -> Result<i64, StoreError> {
        let value = self.apply(key, seed, step)?;
        tracing::trace!(%key, value, "memory counter incremented");
        Ok(value)
    }
}

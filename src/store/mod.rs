pub mod memory;

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::key::SequenceKey;

pub use memory::MemoryCounterStore;

/// One persisted sequence: the last value issued for `key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Counter {
    pub key: String,
    pub value: i64,
}

/// Keyed counters with an atomic find-or-create-then-increment.
///
/// Implementations must perform the whole operation as one atomic step
/// against the backing store. A counter that does not exist yet is created
/// holding `seed` and then incremented, so the first call returns
/// `seed + step`.
pub trait CounterStore: Send + Sync {
    /// Add `step` to the counter for `key` and return the new value.
    fn increment_by(
        &self,
        key: &SequenceKey,
        seed: i64,
        step: i64,
    ) -> impl Future<Output = Result<i64, StoreError>> + Send;

    /// Add one to the counter for `key` and return the new value.
    fn increment(
        &self,
        key: &SequenceKey,
        seed: i64,
    ) -> impl Future<Output = Result<i64, StoreError>> + Send {
        self.increment_by(key, seed, 1)
    }
}

impl<T: CounterStore> CounterStore for Arc<T> {
    fn increment_by(
        &self,
        key: &SequenceKey,
        seed: i64,
        step: i64,
    ) -> impl Future<Output = Result<i64, StoreError>> + Send {
        (**self).increment_by(key, seed, step)
    }
}

pub mod assign;
pub mod db;
pub mod error;
pub mod incrementor;
pub mod key;
pub mod model;
pub mod store;

pub use assign::AutoIncrements;
pub use error::{AutoincError, Result, StoreError};
pub use incrementor::{Incrementor, IncrementorConfig};
pub use key::SequenceKey;
pub use model::{
    Assignments, AttributeMap, Document, FieldOptions, Registry, ResolvedOptions, Scope, Step,
    TypeConfig,
};
pub use store::{Counter, CounterStore, MemoryCounterStore};

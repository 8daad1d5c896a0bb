use std::time::Duration;

use thiserror::Error;

/// The atomic increment could not be completed against the backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The round-trip did not complete in time. The store may still have
    /// applied the increment.
    #[error("counter store did not answer within {0:?}")]
    Timeout(Duration),

    #[error("counter {0} overflowed")]
    Overflow(String),
}

#[derive(Debug, Error)]
pub enum AutoincError {
    #[error("counter store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("field {field} is already declared as auto-incrementing on {type_name}")]
    DuplicateField { type_name: String, field: String },

    #[error("type {0} is already registered")]
    DuplicateType(String),

    #[error("field {field} was already assigned on this {type_name}")]
    AlreadyAssigned { type_name: String, field: String },

    /// Explicit assignment of an auto field, or automatic assignment of a
    /// manual one.
    #[error("field {field} on {type_name} cannot be assigned through this path (auto: {auto})")]
    AutoIncrements {
        type_name: String,
        field: String,
        auto: bool,
    },

    #[error("no auto-increment configuration registered for type {0}")]
    UnknownType(String),

    #[error("field {field} is not declared as auto-incrementing on {type_name}")]
    UnknownField { type_name: String, field: String },

    #[error("scope for {type_name}.{field} resolved to no value")]
    MissingScope { type_name: String, field: String },

    #[error("seed must be non-negative, got {0}")]
    InvalidSeed(i64),

    #[error("step must be at least 1, got {0}")]
    InvalidStep(i64),

    #[error("sequence key component {0} must not be empty")]
    EmptyKeyComponent(&'static str),
}

pub type Result<T> = std::result::Result<T, AutoincError>;

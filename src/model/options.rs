use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::document::Document;
use crate::error::{AutoincError, Result};

type StepFn = dyn Fn(&dyn Document) -> i64 + Send + Sync;
type ScopeFn = dyn Fn(&dyn Document) -> Value + Send + Sync;

/// Amount added to a sequence on every allocation.
#[derive(Clone)]
pub enum Step {
    Fixed(i64),
    /// Evaluated against the record at assignment time.
    Computed(Arc<StepFn>),
}

impl Step {
    pub fn resolve(&self, record: &dyn Document) -> Result<i64> {
        let step = match self {
            Step::Fixed(step) => *step,
            Step::Computed(f) => f(record),
        };
        if step < 1 {
            return Err(AutoincError::InvalidStep(step));
        }
        Ok(step)
    }
}

impl Default for Step {
    fn default() -> Self {
        Step::Fixed(1)
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Fixed(step) => f.debug_tuple("Fixed").field(step).finish(),
            Step::Computed(_) => f.write_str("Computed(<fn>)"),
        }
    }
}

impl PartialEq for Step {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Step::Fixed(a), Step::Fixed(b)) => a == b,
            (Step::Computed(a), Step::Computed(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Partitions a sequence by a per-record value.
///
/// Scope values are keyed by their text: strings verbatim, other JSON values
/// by their JSON rendering. The number `4` and the string `"4"` therefore
/// share one sequence, as do `true` and `"true"`.
#[derive(Clone)]
pub enum Scope {
    /// Read the named attribute off the record.
    Attribute(String),
    /// Evaluated against the record at assignment time.
    Computed(Arc<ScopeFn>),
}

impl Scope {
    /// The scope value as it appears in the sequence key. `None` when the
    /// record has no value for it.
    pub fn resolve(&self, record: &dyn Document) -> Option<String> {
        let value = match self {
            Scope::Attribute(name) => record.read_attribute(name)?,
            Scope::Computed(f) => f(record),
        };
        match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Attribute(name) => f.debug_tuple("Attribute").field(name).finish(),
            Scope::Computed(_) => f.write_str("Computed(<fn>)"),
        }
    }
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scope::Attribute(a), Scope::Attribute(b)) => a == b,
            (Scope::Computed(a), Scope::Computed(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Declared behavior of one auto-incrementing field.
///
/// Defaults: assigned automatically on create, no seed (sequence starts at 1),
/// step 1, unscoped.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldOptions {
    pub auto: bool,
    pub seed: Option<i64>,
    pub step: Step,
    pub scope: Option<Scope>,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            auto: true,
            seed: None,
            step: Step::default(),
            scope: None,
        }
    }
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only assigned through an explicit `assign` call.
    pub fn manual() -> Self {
        Self {
            auto: false,
            ..Self::default()
        }
    }

    pub fn auto(mut self, auto: bool) -> Self {
        self.auto = auto;
        self
    }

    pub fn seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn step(mut self, step: i64) -> Self {
        self.step = Step::Fixed(step);
        self
    }

    pub fn step_with(mut self, f: impl Fn(&dyn Document) -> i64 + Send + Sync + 'static) -> Self {
        self.step = Step::Computed(Arc::new(f));
        self
    }

    pub fn scope(mut self, attribute: impl Into<String>) -> Self {
        self.scope = Some(Scope::Attribute(attribute.into()));
        self
    }

    pub fn scope_with(
        mut self,
        f: impl Fn(&dyn Document) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.scope = Some(Scope::Computed(Arc::new(f)));
        self
    }

    /// Reject values that can never produce an increasing sequence.
    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(seed) = self.seed
            && seed < 0
        {
            return Err(AutoincError::InvalidSeed(seed));
        }
        if let Step::Fixed(step) = self.step
            && step < 1
        {
            return Err(AutoincError::InvalidStep(step));
        }
        Ok(())
    }
}

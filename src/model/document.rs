use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

/// Fields that received a value during this instance's lifetime.
///
/// Lives with one in-memory record and is dropped with it; never shared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignments {
    assigned: BTreeSet<String>,
}

impl Assignments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_assigned(&self, field: &str) -> bool {
        self.assigned.contains(field)
    }

    pub fn assigned_fields(&self) -> impl Iterator<Item = &str> {
        self.assigned.iter().map(String::as_str)
    }

    pub(crate) fn mark_assigned(&mut self, field: &str) {
        self.assigned.insert(field.to_string());
    }
}

/// A record of the host mapping layer, as seen by the auto-increment core.
pub trait Document {
    /// Name the type's configuration is registered under.
    fn type_name(&self) -> &str;

    /// Namespace used in sequence keys. Hosts that rename a model override
    /// this; the default is the type name.
    fn model_name(&self) -> &str {
        self.type_name()
    }

    fn read_attribute(&self, name: &str) -> Option<Value>;

    fn write_attribute(&mut self, name: &str, value: Value);

    fn assignments(&self) -> &Assignments;

    fn assignments_mut(&mut self) -> &mut Assignments;

    /// True when the attribute holds a non-null value.
    fn has_value(&self, name: &str) -> bool {
        !matches!(self.read_attribute(name), None | Some(Value::Null))
    }
}

/// Schemaless record holding its attributes as JSON values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeMap {
    type_name: String,
    model_name: Option<String>,
    attributes: BTreeMap<String, Value>,
    assignments: Assignments,
}

impl AttributeMap {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    /// Build a record, setting attributes via closure.
    pub fn with(type_name: impl Into<String>, modify: impl FnOnce(&mut Self)) -> Self {
        let mut record = Self::new(type_name);
        modify(&mut record);
        record
    }

    pub fn set(&mut self, name: &str, value: Value) -> &mut Self {
        self.attributes.insert(name.to_string(), value);
        self
    }

    /// Use `model_name` as the sequence namespace instead of the type name.
    pub fn rename_model(&mut self, model_name: impl Into<String>) -> &mut Self {
        self.model_name = Some(model_name.into());
        self
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.attributes.get(name).and_then(Value::as_i64)
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }
}

impl Document for AttributeMap {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn model_name(&self) -> &str {
        self.model_name.as_deref().unwrap_or(&self.type_name)
    }

    fn read_attribute(&self, name: &str) -> Option<Value> {
        self.attributes.get(name).cloned()
    }

    fn write_attribute(&mut self, name: &str, value: Value) {
        self.attributes.insert(name.to_string(), value);
    }

    fn assignments(&self) -> &Assignments {
        &self.assignments
    }

    fn assignments_mut(&mut self) -> &mut Assignments {
        &mut self.assignments
    }
}

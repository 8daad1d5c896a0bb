use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AutoincError, Result};

const SEPARATOR: char = '/';
const ESCAPE: char = '\\';

/// Identifies one counter: a (type, field, scope) triple flattened to a string.
///
/// Components are escaped before joining, so two different triples can never
/// produce the same key even when a scope value contains the separator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceKey(String);

impl SequenceKey {
    pub fn new(type_name: &str, field_name: &str, scope: Option<&str>) -> Result<Self> {
        if type_name.is_empty() {
            return Err(AutoincError::EmptyKeyComponent("type_name"));
        }
        if field_name.is_empty() {
            return Err(AutoincError::EmptyKeyComponent("field_name"));
        }

        let mut key = String::with_capacity(
            type_name.len() + field_name.len() + scope.map_or(0, str::len) + 2,
        );
        push_escaped(&mut key, type_name);
        key.push(SEPARATOR);
        push_escaped(&mut key, field_name);
        if let Some(scope) = scope {
            key.push(SEPARATOR);
            push_escaped(&mut key, scope);
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Escape character first, then the separator.
fn push_escaped(out: &mut String, component: &str) {
    for c in component.chars() {
        match c {
            ESCAPE => out.push_str("\\\\"),
            SEPARATOR => out.push_str("\\/"),
            _ => out.push(c),
        }
    }
}

impl fmt::Display for SequenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SequenceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

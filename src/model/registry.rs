use std::collections::BTreeMap;

use super::document::Document;
use super::options::FieldOptions;
use crate::error::{AutoincError, Result};

/// Concrete values for one allocation, after evaluating computed options
/// against a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub auto: bool,
    pub scope: Option<String>,
    pub seed: Option<i64>,
    pub step: i64,
}

/// Auto-incrementing fields declared on one type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeConfig {
    type_name: String,
    fields: BTreeMap<String, FieldOptions>,
}

impl TypeConfig {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Copy every declaration onto a subtype.
    pub fn inherit(&self, type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: self.fields.clone(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn declare(&mut self, field: impl Into<String>, options: FieldOptions) -> Result<&mut Self> {
        let field = field.into();
        if self.fields.contains_key(&field) {
            return Err(AutoincError::DuplicateField {
                type_name: self.type_name.clone(),
                field,
            });
        }
        options.validate()?;
        self.fields.insert(field, options);
        Ok(self)
    }

    pub fn incrementing_fields(&self) -> &BTreeMap<String, FieldOptions> {
        &self.fields
    }

    pub fn field(&self, field: &str) -> Result<&FieldOptions> {
        self.fields
            .get(field)
            .ok_or_else(|| AutoincError::UnknownField {
                type_name: self.type_name.clone(),
                field: field.to_string(),
            })
    }

    /// Auto fields, which the host must exclude from mass assignment.
    pub fn protected_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, options)| options.auto)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Evaluate scope and step for `record`. Reads the record only.
    pub fn resolve_for_record(&self, field: &str, record: &dyn Document) -> Result<ResolvedOptions> {
        let options = self.field(field)?;
        let scope = match &options.scope {
            Some(scope) => Some(scope.resolve(record).ok_or_else(|| {
                AutoincError::MissingScope {
                    type_name: self.type_name.clone(),
                    field: field.to_string(),
                }
            })?),
            None => None,
        };
        Ok(ResolvedOptions {
            auto: options.auto,
            scope,
            seed: options.seed,
            step: options.step.resolve(record)?,
        })
    }
}

/// Explicit map from type name to its declarations, built at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    types: BTreeMap<String, TypeConfig>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, config: TypeConfig) -> Result<&mut Self> {
        if self.types.contains_key(config.type_name()) {
            return Err(AutoincError::DuplicateType(config.type_name().to_string()));
        }
        self.types.insert(config.type_name().to_string(), config);
        Ok(self)
    }

    pub fn get(&self, type_name: &str) -> Result<&TypeConfig> {
        self.types
            .get(type_name)
            .ok_or_else(|| AutoincError::UnknownType(type_name.to_string()))
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeConfig> {
        self.types.values()
    }

    pub fn protected_fields(&self, type_name: &str) -> Result<Vec<&str>> {
        Ok(self.get(type_name)?.protected_fields())
    }

    pub fn resolve_for_record(
        &self,
        type_name: &str,
        field: &str,
        record: &dyn Document,
    ) -> Result<ResolvedOptions> {
        self.get(type_name)?.resolve_for_record(field, record)
    }
}

use serde_json::Value;

use crate::error::{AutoincError, Result};
use crate::incrementor::Incrementor;
use crate::model::{Document, Registry, ResolvedOptions};
use crate::store::CounterStore;

/// Writes sequence values onto records, per their type's declarations.
///
/// Auto fields are filled by [`update_auto_increments`](Self::update_auto_increments),
/// which the host calls from its pre-create hook. Manual fields are filled only
/// by [`assign`](Self::assign). Each field receives at most one value per
/// record instance.
#[derive(Debug)]
pub struct AutoIncrements<S> {
    registry: Registry,
    incrementor: Incrementor<S>,
}

impl<S: CounterStore> AutoIncrements<S> {
    pub fn new(registry: Registry, incrementor: Incrementor<S>) -> Self {
        Self {
            registry,
            incrementor,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn incrementor(&self) -> &Incrementor<S> {
        &self.incrementor
    }

    /// Explicitly assign a manual field.
    pub async fn assign<D: Document>(&self, doc: &mut D, field: &str) -> Result<i64> {
        self.assign_via(doc, field, false).await
    }

    /// Assign one auto field through the automatic path.
    pub async fn assign_auto<D: Document>(&self, doc: &mut D, field: &str) -> Result<i64> {
        self.assign_via(doc, field, true).await
    }

    /// Pre-create hook: fill every empty auto field. Returns the assigned
    /// (field, value) pairs in field-name order.
    pub async fn update_auto_increments<D: Document>(
        &self,
        doc: &mut D,
    ) -> Result<Vec<(String, i64)>> {
        let config = self.registry.get(doc.type_name())?;
        let pending: Vec<String> = config
            .incrementing_fields()
            .iter()
            .filter(|(field, options)| {
                options.auto && !doc.assignments().is_assigned(field) && !doc.has_value(field)
            })
            .map(|(field, _)| field.clone())
            .collect();

        let mut assigned = Vec::with_capacity(pending.len());
        for field in pending {
            let value = self.assign_via(doc, &field, true).await?;
            assigned.push((field, value));
        }
        Ok(assigned)
    }

    async fn assign_via<D: Document>(&self, doc: &mut D, field: &str, automatic: bool) -> Result<i64> {
        let config = self.registry.get(doc.type_name())?;
        let options = config.field(field)?;
        if options.auto != automatic {
            return Err(AutoincError::AutoIncrements {
                type_name: config.type_name().to_string(),
                field: field.to_string(),
                auto: options.auto,
            });
        }
        if doc.assignments().is_assigned(field) || doc.has_value(field) {
            return Err(AutoincError::AlreadyAssigned {
                type_name: config.type_name().to_string(),
                field: field.to_string(),
            });
        }

        let ResolvedOptions {
            scope, seed, step, ..
        } = config.resolve_for_record(field, &*doc)?;
        let value = self
            .incrementor
            .next_value(doc.model_name(), field, scope.as_deref(), seed, step)
            .await?;

        doc.write_attribute(field, Value::from(value));
        doc.assignments_mut().mark_assigned(field);
        tracing::debug!(
            type_name = config.type_name(),
            field,
            value,
            "assigned auto-increment value"
        );
        Ok(value)
    }
}

//! Value-domain resolution for reference columns.

use std::collections::HashSet;

use entityset_model::FieldType;
use tracing::{debug, info_span, warn};

use crate::callback::CallbackOutput;
use crate::error::{BuildError, QueryError, Result};
use crate::query::{Query, QueryExecutor};
use crate::registry::BuildSpec;

/// Builds the ordered category list of a reference column from the
/// referenced entity set.
pub struct DomainResolver<'a, E> {
    spec: &'a BuildSpec<E>,
    executor: Option<&'a dyn QueryExecutor<E>>,
}

impl<'a, E> DomainResolver<'a, E> {
    pub fn new(spec: &'a BuildSpec<E>, executor: Option<&'a dyn QueryExecutor<E>>) -> Self {
        Self { spec, executor }
    }

    /// Queries every entity of `referenced_type` and converts each one to a
    /// domain label through the field's callback chain, falling back to the
    /// entity's display form.
    ///
    /// Query order is domain order. Repeated labels are kept unless
    /// `dedupe_domains` is set.
    pub fn resolve(&self, field: &str, referenced_type: &str) -> Result<Vec<String>> {
        let _span = info_span!("resolve_domain", field, referenced_type).entered();
        let query = Query::select_all(referenced_type);
        let executor = self.executor.ok_or_else(|| QueryError::Unavailable {
            query: query.to_string(),
        })?;
        let references = executor.select_references(&query)?;

        let field_type = FieldType::Entity(referenced_type.to_string());
        let callback = self.spec.callback_for_field(field, &field_type);
        let dedupe = self.spec.options().dedupe_domains;
        let mut seen = HashSet::new();
        let mut domain = Vec::with_capacity(references.len());
        for reference in &references {
            let label = match callback {
                Some(callback) => match callback.call(None, field, reference) {
                    Ok(CallbackOutput::Text(label)) => label,
                    Ok(CallbackOutput::Number(number)) => number.to_string(),
                    Ok(CallbackOutput::Nothing) => {
                        warn!(field, reference = %reference, "domain callback returned no label, entity skipped");
                        continue;
                    }
                    Err(error) => {
                        return Err(BuildError::DomainCallback {
                            field: field.to_string(),
                            error,
                        });
                    }
                },
                None => reference.to_string(),
            };
            if dedupe && !seen.insert(label.clone()) {
                continue;
            }
            domain.push(label);
        }

        debug!(
            field,
            referenced = references.len(),
            domain_size = domain.len(),
            "domain resolved"
        );
        Ok(domain)
    }
}

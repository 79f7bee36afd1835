//! Dataset builds: classification, domain resolution, materialization and
//! assembly in one pass.

use entityset_model::{Attribute, AttributeKind, Dataset, EntityType};
use tracing::{info, info_span};

use crate::assemble::{Header, assemble};
use crate::classify::{ColumnPlan, ColumnSource, FieldClassifier, ReferenceEncoding};
use crate::domain::DomainResolver;
use crate::error::{QueryError, Result};
use crate::materialize::InstanceMaterializer;
use crate::query::{Query, QueryExecutor};
use crate::registry::BuildSpec;

/// Builds datasets for one entity type under one [`BuildSpec`].
///
/// # Example
///
/// ```ignore
/// let dataset = DatasetBuilder::new(&person_type, &spec)
///     .with_executor(&store)
///     .build()?;
/// ```
pub struct DatasetBuilder<'a, E> {
    entity_type: &'a EntityType<E>,
    spec: &'a BuildSpec<E>,
    executor: Option<&'a dyn QueryExecutor<E>>,
}

impl<'a, E> DatasetBuilder<'a, E> {
    pub fn new(entity_type: &'a EntityType<E>, spec: &'a BuildSpec<E>) -> Self {
        Self {
            entity_type,
            spec,
            executor: None,
        }
    }

    /// Supplies the query collaborator used for reference domains and for
    /// loading subject entities.
    #[must_use]
    pub fn with_executor(mut self, executor: &'a dyn QueryExecutor<E>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Validates the build spec and classifies the entity type's fields.
    pub fn plan(&self) -> Result<ColumnPlan> {
        self.spec.validate()?;
        FieldClassifier::new(self.spec).classify(self.entity_type)
    }

    /// Classifies fields and resolves every reference domain. No rows are
    /// touched.
    pub fn build_header(&self) -> Result<Header> {
        let _span = info_span!("build_header", entity = self.entity_type.name()).entered();
        let plan = self.plan()?;
        let resolver = DomainResolver::new(self.spec, self.executor);

        let mut attributes = Vec::with_capacity(plan.columns.len());
        let mut sources = Vec::with_capacity(plan.columns.len());
        for column in plan.columns {
            let attribute = match (&column.source, column.kind) {
                (
                    ColumnSource::Reference {
                        field,
                        referenced_type,
                        encoding: ReferenceEncoding::Nominal,
                    },
                    _,
                ) => Attribute::nominal(&column.name, resolver.resolve(field, referenced_type)?),
                (_, AttributeKind::Numeric) => Attribute::numeric(&column.name),
                (_, AttributeKind::Date) => Attribute::date(&column.name),
                (_, AttributeKind::String | AttributeKind::Nominal) => {
                    Attribute::string(&column.name)
                }
            };
            attributes.push(attribute);
            sources.push(column.source);
        }

        info!(
            relation = %plan.relation,
            columns = attributes.len(),
            "header ready"
        );
        Ok(Header {
            relation: plan.relation,
            attributes,
            sources,
            fields: plan.fields,
        })
    }

    /// Builds the dataset from every stored entity of the type, fetched with
    /// a select-all query on the relation name.
    pub fn build(&self) -> Result<Dataset> {
        let header = self.build_header()?;
        let query = Query::select_all(header.relation.clone());
        let executor = self.executor.ok_or_else(|| QueryError::Unavailable {
            query: query.to_string(),
        })?;
        let entities = executor.select_entities(&query)?;
        info!(%query, entities = entities.len(), "subject entities loaded");
        self.finish(header, &entities)
    }

    /// Builds the dataset from caller-supplied entities, in the given order.
    pub fn build_from(&self, entities: &[E]) -> Result<Dataset> {
        let header = self.build_header()?;
        self.finish(header, entities)
    }

    fn finish(&self, mut header: Header, entities: &[E]) -> Result<Dataset> {
        let rows = InstanceMaterializer::new(self.entity_type, self.spec)
            .materialize(entities, &mut header)?;
        assemble(header.relation, header.attributes, rows)
    }
}

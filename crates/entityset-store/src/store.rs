//! In-memory entity store.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use entityset_core::{Query, QueryError, QueryExecutor};
use entityset_model::{EntityType, Record, Value};
use tracing::{debug, info};

use crate::document::{StoreDocument, resolve_records};
use crate::error::{Result, StoreError};

/// Records grouped by type, in insertion order, plus the declared entity types.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    types: Vec<EntityType<Record>>,
    records: BTreeMap<String, Vec<Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_json_str(&content)?;
        info!(
            path = %path.display(),
            types = store.types.len(),
            records = store.len(),
            "loaded store"
        );
        Ok(store)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let document: StoreDocument = serde_json::from_str(content)?;
        Self::from_document(&document)
    }

    pub fn from_document(document: &StoreDocument) -> Result<Self> {
        let mut store = Self::new();
        for def in &document.types {
            if store.entity_type(&def.name).is_some() {
                return Err(StoreError::DuplicateType {
                    name: def.name.clone(),
                });
            }
            store.add_type(def.to_entity_type());
        }
        for record in resolve_records(&document.types, &document.records)? {
            store.insert(record);
        }
        debug!(types = store.types.len(), records = store.len(), "store built");
        Ok(store)
    }

    /// Declare an entity type. A type with the same name is replaced.
    pub fn add_type(&mut self, entity_type: EntityType<Record>) {
        match self
            .types
            .iter_mut()
            .find(|existing| existing.name() == entity_type.name())
        {
            Some(existing) => *existing = entity_type,
            None => self.types.push(entity_type),
        }
    }

    pub fn insert(&mut self, record: Record) {
        self.records
            .entry(record.type_name.clone())
            .or_default()
            .push(record);
    }

    /// Declared type by full or simple name.
    pub fn entity_type(&self, name: &str) -> Option<&EntityType<Record>> {
        self.types
            .iter()
            .find(|entity_type| entity_type.name() == name)
            .or_else(|| {
                self.types
                    .iter()
                    .find(|entity_type| entity_type.simple_name() == name)
            })
    }

    pub fn entity_types(&self) -> &[EntityType<Record>] {
        &self.types
    }

    /// Names of declared types and of types that only have records.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.iter().map(EntityType::name).collect();
        for name in self.records.keys() {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }

    pub fn records(&self, type_name: &str) -> &[Record] {
        self.records
            .get(type_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn count(&self, type_name: &str) -> usize {
        self.records(type_name).len()
    }

    pub fn len(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.records.values().all(Vec::is_empty)
    }

    fn knows(&self, name: &str) -> bool {
        self.records.contains_key(name) || self.entity_type(name).is_some()
    }

    fn select(&self, query: &Query) -> std::result::Result<&[Record], QueryError> {
        let name = query.entity_name();
        if !self.knows(name) {
            return Err(QueryError::UnknownEntity {
                entity: name.to_string(),
                query: query.to_string(),
            });
        }
        let stored = self.entity_type(name).map_or(name, EntityType::name);
        let records = if self.records.contains_key(name) {
            self.records(name)
        } else {
            self.records(stored)
        };
        debug!(query = %query, rows = records.len(), "query executed");
        Ok(records)
    }
}

impl QueryExecutor<Record> for MemoryStore {
    fn select_entities(&self, query: &Query) -> std::result::Result<Vec<Record>, QueryError> {
        Ok(self.select(query)?.to_vec())
    }

    fn select_references(&self, query: &Query) -> std::result::Result<Vec<Value>, QueryError> {
        Ok(self
            .select(query)?
            .iter()
            .cloned()
            .map(Value::from)
            .collect())
    }
}

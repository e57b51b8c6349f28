//! Index Manager
//!
//! Owns the secondary indexes of a collection. Indexes are derived state:
//! they are built from the stored documents and updated after every write.
//!
//! # API
//!
//! - `create_index(spec, documents)` - Declare and build an index
//! - `apply_write(id, body)` - Index a stored document
//! - `apply_delete(id, body)` - Unindex a removed document
//! - `lookup_eq(index, value)` - Leading-field equality lookup
//! - `lookup_range(index, min, max)` - Leading-field range lookup

use std::collections::BTreeMap;

use serde_json::Value;

use crate::executor::IndexLookup;

use super::btree::{DocumentId, IndexKey, IndexTree};
use super::errors::{IndexError, IndexResult};
use super::spec::IndexSpec;

/// A declared index and its tree
#[derive(Debug)]
struct FieldIndex {
    spec: IndexSpec,
    tree: IndexTree,
}

/// Read-only view of the declared indexes, handed to the planner
#[derive(Debug, Clone, Default)]
pub struct IndexMetadata {
    specs: Vec<IndexSpec>,
}

impl IndexMetadata {
    /// Creates metadata with no secondary indexes
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates metadata for the given specs
    pub fn with_specs(specs: impl IntoIterator<Item = IndexSpec>) -> Self {
        Self {
            specs: specs.into_iter().collect(),
        }
    }

    /// Declared index specs, ordered by name
    pub fn specs(&self) -> &[IndexSpec] {
        &self.specs
    }

    /// Indexes whose leading field is `field`, ordered by name
    pub fn leading_on<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a IndexSpec> + 'a {
        self.specs.iter().filter(move |s| s.leading_field() == field)
    }
}

/// Index Manager that maintains in-memory indexes
#[derive(Debug, Default)]
pub struct IndexManager {
    /// Keyed by index name; BTreeMap keeps iteration deterministic
    indexes: BTreeMap<String, FieldIndex>,
}

impl IndexManager {
    /// Creates a manager with no secondary indexes
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an index and builds it from `documents`.
    ///
    /// Returns false if an index with the same name already exists, in which
    /// case nothing changes.
    pub fn create_index<'a, D>(&mut self, spec: IndexSpec, documents: D) -> IndexResult<bool>
    where
        D: IntoIterator<Item = (DocumentId, &'a Value)>,
    {
        let name = spec.name();
        if self.indexes.contains_key(&name) {
            return Ok(false);
        }

        let mut tree = IndexTree::new();
        for (id, body) in documents {
            if !body.is_object() {
                return Err(IndexError::build_failed(
                    &name,
                    format!("document {} is not an object", id),
                ));
            }
            tree.insert(spec.key_for(body), id);
        }

        self.indexes.insert(name, FieldIndex { spec, tree });
        Ok(true)
    }

    /// Drops an index by name. Returns false if it did not exist.
    pub fn drop_index(&mut self, name: &str) -> bool {
        self.indexes.remove(name).is_some()
    }

    /// Returns true if an index with this name exists
    pub fn has_index(&self, name: &str) -> bool {
        self.indexes.contains_key(name)
    }

    /// Names of all declared indexes, sorted
    pub fn index_names(&self) -> Vec<String> {
        self.indexes.keys().cloned().collect()
    }

    /// Snapshot of the declared specs for planning
    pub fn metadata(&self) -> IndexMetadata {
        IndexMetadata::with_specs(self.indexes.values().map(|i| i.spec.clone()))
    }

    /// Number of entries held by an index
    pub fn entry_count(&self, name: &str) -> Option<usize> {
        self.indexes.get(name).map(|i| i.tree.entry_count())
    }

    /// Apply a stored document to every index.
    ///
    /// Called AFTER the storage write.
    pub fn apply_write(&mut self, id: DocumentId, body: &Value) {
        for index in self.indexes.values_mut() {
            index.tree.insert(index.spec.key_for(body), id);
        }
    }

    /// Remove a document from every index.
    ///
    /// `body` must be the body the document was indexed with.
    pub fn apply_delete(&mut self, id: DocumentId, body: &Value) {
        for index in self.indexes.values_mut() {
            index.tree.remove(&index.spec.key_for(body), id);
        }
    }

    /// Rebuild every index from scratch
    pub fn rebuild<'a, D>(&mut self, documents: D)
    where
        D: IntoIterator<Item = (DocumentId, &'a Value)>,
    {
        for index in self.indexes.values_mut() {
            index.tree.clear();
        }
        for (id, body) in documents {
            self.apply_write(id, body);
        }
    }

    /// Ids whose leading indexed field equals `value`, ascending
    pub fn lookup_eq(&self, name: &str, value: &Value) -> Vec<DocumentId> {
        match (self.indexes.get(name), IndexKey::from_json(value)) {
            (Some(index), Some(key)) => index.tree.lookup_leading_eq(&key),
            _ => Vec::new(),
        }
    }

    /// Ids whose leading indexed field lies within `[min, max]`, ascending
    pub fn lookup_range(
        &self,
        name: &str,
        min: Option<&Value>,
        max: Option<&Value>,
    ) -> Vec<DocumentId> {
        let index = match self.indexes.get(name) {
            Some(i) => i,
            None => return Vec::new(),
        };
        let min = min.and_then(IndexKey::from_json);
        let max = max.and_then(IndexKey::from_json);
        index.tree.lookup_leading_range(min.as_ref(), max.as_ref())
    }
}

impl IndexLookup for IndexManager {
    fn lookup_eq(&self, index: &str, value: &Value) -> Vec<DocumentId> {
        IndexManager::lookup_eq(self, index, value)
    }

    fn lookup_range(
        &self,
        index: &str,
        min: Option<&Value>,
        max: Option<&Value>,
    ) -> Vec<DocumentId> {
        IndexManager::lookup_range(self, index, min, max)
    }
}

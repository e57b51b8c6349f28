//! BTreeMap-based index structures
//!
//! Every index, single-field or compound, maps a tuple of `IndexKey`s to the
//! ids of the documents holding those values. Ids are kept sorted ascending,
//! which is the collection's natural order.

use std::collections::BTreeMap;
use std::ops::Bound;

use serde_json::Value;

/// Identifier of a document in a collection, assigned in insertion order
pub type DocumentId = u64;

/// Index key representing a single field value.
///
/// Ordering is deterministic: Missing < Bool < Number < String.
/// All numbers share one variant so that `5` and `5.0` index identically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexKey {
    /// Field absent or null
    Missing,
    /// Boolean value (false < true)
    Bool(bool),
    /// Number stored as order-preserving f64 bits
    Number(u64),
    /// String value
    String(String),
}

impl IndexKey {
    /// Create a key from a number.
    ///
    /// Uses bit representation for total ordering.
    pub fn from_f64(v: f64) -> Self {
        // -0.0 and 0.0 must collide
        let v = if v == 0.0 { 0.0 } else { v };
        let bits = v.to_bits();
        let ordered = if (bits >> 63) == 1 {
            !bits
        } else {
            bits ^ (1 << 63)
        };
        IndexKey::Number(ordered)
    }

    /// Create a key from a string
    pub fn from_string(v: impl Into<String>) -> Self {
        IndexKey::String(v.into())
    }

    /// Create a key from a JSON value.
    ///
    /// Returns None for arrays and objects, which are not indexable.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(IndexKey::Missing),
            Value::Bool(b) => Some(IndexKey::Bool(*b)),
            Value::Number(n) => n.as_f64().map(IndexKey::from_f64),
            Value::String(s) => Some(IndexKey::from_string(s.as_str())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Key for a field of a document, `Missing` when absent
    pub fn for_field(document: &Value, field: &str) -> Self {
        document
            .get(field)
            .and_then(IndexKey::from_json)
            .unwrap_or(IndexKey::Missing)
    }
}

/// A single index tree keyed by value tuples.
#[derive(Debug, Default)]
pub struct IndexTree {
    tree: BTreeMap<Vec<IndexKey>, Vec<DocumentId>>,
}

impl IndexTree {
    /// Creates a new empty index tree
    pub fn new() -> Self {
        Self {
            tree: BTreeMap::new(),
        }
    }

    /// Insert an id for a key, keeping ids sorted ascending.
    pub fn insert(&mut self, key: Vec<IndexKey>, id: DocumentId) {
        let ids = self.tree.entry(key).or_default();
        if let Err(pos) = ids.binary_search(&id) {
            ids.insert(pos, id);
        }
    }

    /// Remove an id for a key.
    ///
    /// If the key has no more ids, removes the key entirely.
    pub fn remove(&mut self, key: &[IndexKey], id: DocumentId) {
        if let Some(ids) = self.tree.get_mut(key) {
            if let Ok(pos) = ids.binary_search(&id) {
                ids.remove(pos);
            }
            if ids.is_empty() {
                self.tree.remove(key);
            }
        }
    }

    /// Lookup all ids whose leading key component equals `key`.
    ///
    /// For a single-field index this is an exact match; for a compound index
    /// it is a prefix match. Returns ids sorted ascending.
    pub fn lookup_leading_eq(&self, key: &IndexKey) -> Vec<DocumentId> {
        self.lookup_leading_range(Some(key), Some(key))
    }

    /// Lookup ids whose leading key component is in `[min, max]` (inclusive).
    ///
    /// A missing bound is open on that side. Returns ids sorted ascending.
    pub fn lookup_leading_range(
        &self,
        min: Option<&IndexKey>,
        max: Option<&IndexKey>,
    ) -> Vec<DocumentId> {
        // [k] sorts before every [k, ...] so it is a valid lower bound for a prefix
        let start: Bound<Vec<IndexKey>> = match min {
            Some(k) => Bound::Included(vec![k.clone()]),
            None => Bound::Unbounded,
        };

        let mut result = Vec::new();
        for (key, ids) in self.tree.range((start, Bound::Unbounded)) {
            if let (Some(max), Some(leading)) = (max, key.first()) {
                if leading > max {
                    break;
                }
            }
            result.extend(ids);
        }

        result.sort_unstable();
        result
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the number of distinct keys
    pub fn key_count(&self) -> usize {
        self.tree.len()
    }

    /// Returns the total number of indexed ids
    pub fn entry_count(&self) -> usize {
        self.tree.values().map(|v| v.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn num(v: f64) -> IndexKey {
        IndexKey::from_f64(v)
    }

    #[test]
    fn test_key_ordering() {
        let keys = vec![
            IndexKey::Missing,
            IndexKey::Bool(false),
            IndexKey::Bool(true),
            num(-100.5),
            num(-1.0),
            num(0.0),
            num(1925.0),
            num(2010.0),
            IndexKey::from_string("Austen"),
            IndexKey::from_string("Orwell"),
        ];

        for i in 1..keys.len() {
            assert!(keys[i - 1] < keys[i], "Keys should be ordered at {}", i);
        }
    }

    #[test]
    fn test_int_and_float_keys_collide() {
        assert_eq!(
            IndexKey::from_json(&json!(1925)),
            IndexKey::from_json(&json!(1925.0))
        );
        assert_eq!(num(0.0), num(-0.0));
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut tree = IndexTree::new();

        tree.insert(vec![IndexKey::from_string("Dune")], 1);
        tree.insert(vec![IndexKey::from_string("Dune")], 2);
        tree.insert(vec![IndexKey::from_string("Emma")], 3);

        assert_eq!(
            tree.lookup_leading_eq(&IndexKey::from_string("Dune")),
            vec![1, 2]
        );
        assert_eq!(
            tree.lookup_leading_eq(&IndexKey::from_string("Emma")),
            vec![3]
        );
        assert!(tree
            .lookup_leading_eq(&IndexKey::from_string("Ulysses"))
            .is_empty());
    }

    #[test]
    fn test_ids_sorted() {
        let mut tree = IndexTree::new();

        tree.insert(vec![num(42.0)], 30);
        tree.insert(vec![num(42.0)], 10);
        tree.insert(vec![num(42.0)], 20);
        tree.insert(vec![num(42.0)], 20);

        assert_eq!(tree.lookup_leading_eq(&num(42.0)), vec![10, 20, 30]);
        assert_eq!(tree.entry_count(), 3);
    }

    #[test]
    fn test_remove() {
        let mut tree = IndexTree::new();

        tree.insert(vec![num(1.0)], 100);
        tree.insert(vec![num(1.0)], 200);

        tree.remove(&[num(1.0)], 100);
        assert_eq!(tree.lookup_leading_eq(&num(1.0)), vec![200]);

        tree.remove(&[num(1.0)], 200);
        assert_eq!(tree.key_count(), 0);
    }

    #[test]
    fn test_compound_prefix_lookup() {
        let mut tree = IndexTree::new();
        let orwell = IndexKey::from_string("George Orwell");
        let austen = IndexKey::from_string("Jane Austen");

        tree.insert(vec![orwell.clone(), num(1949.0)], 5);
        tree.insert(vec![orwell.clone(), num(1945.0)], 2);
        tree.insert(vec![austen.clone(), num(1813.0)], 1);
        tree.insert(vec![austen.clone(), IndexKey::Missing], 7);

        assert_eq!(tree.lookup_leading_eq(&orwell), vec![2, 5]);
        assert_eq!(tree.lookup_leading_eq(&austen), vec![1, 7]);
    }

    #[test]
    fn test_leading_range() {
        let mut tree = IndexTree::new();
        for (i, year) in [1813.0, 1925.0, 1949.0, 1988.0, 2012.0].iter().enumerate() {
            tree.insert(vec![num(*year)], i as DocumentId);
        }

        assert_eq!(
            tree.lookup_leading_range(Some(&num(1925.0)), Some(&num(1988.0))),
            vec![1, 2, 3]
        );
        assert_eq!(tree.lookup_leading_range(Some(&num(1949.0)), None), vec![2, 3, 4]);
        assert_eq!(tree.lookup_leading_range(None, Some(&num(1900.0))), vec![0]);
    }

    #[test]
    fn test_from_json() {
        assert_eq!(IndexKey::from_json(&json!(true)), Some(IndexKey::Bool(true)));
        assert_eq!(
            IndexKey::from_json(&json!("hello")),
            Some(IndexKey::String("hello".to_string()))
        );
        assert_eq!(IndexKey::from_json(&json!(null)), Some(IndexKey::Missing));
        assert_eq!(IndexKey::from_json(&json!([1, 2, 3])), None);
        assert_eq!(
            IndexKey::for_field(&json!({"title": "Emma"}), "genre"),
            IndexKey::Missing
        );
    }
}

use alloc::vec::Vec;

use crate::RowKey;

#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

#[cfg(feature = "std")]
type KeyIndexMap<K> = HashMap<K, usize>;
#[cfg(not(feature = "std"))]
type KeyIndexMap<K> = BTreeMap<K, usize>;

/// Metadata for one buffered feed row.
///
/// The buffer does not hold row content; the adapter keeps its own key->row
/// storage and only feeds the ordering and sizing inputs here.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowMeta<K> {
    pub key: K,
    /// Creation timestamp, epoch milliseconds. Primary sort key.
    pub created_at_ms: i64,
    /// Server-side height estimate, used until the row is measured.
    pub estimated_height: u32,
}

/// A client-side buffer of fetched feed rows.
///
/// Pages arrive out of order (older pages prepend, new rows append, a late
/// page may overlap an optimistic insert). The buffer merges them into one
/// sequence:
///
/// - rows are deduplicated by key (first write wins)
/// - order is ascending `(created_at_ms, key)`
/// - `index_of` maps a key back to its current index after any merge
#[derive(Clone, Debug, Default)]
pub struct PageBuffer<K> {
    rows: Vec<RowMeta<K>>,
    index: KeyIndexMap<K>,
}

impl<K: RowKey> PageBuffer<K> {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            index: KeyIndexMap::<K>::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[RowMeta<K>] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<&RowMeta<K>> {
        self.rows.get(index)
    }

    pub fn index_of(&self, key: &K) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn first(&self) -> Option<&RowMeta<K>> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&RowMeta<K>> {
        self.rows.last()
    }

    /// Merges a batch of rows, returning how many were actually new.
    ///
    /// Rows whose key is already buffered are ignored.
    pub fn merge(&mut self, batch: impl IntoIterator<Item = RowMeta<K>>) -> usize {
        let mut added = 0usize;
        for row in batch {
            if self.index.contains_key(&row.key) {
                continue;
            }
            // Placeholder index; reindex() assigns the real one.
            self.index.insert(row.key.clone(), usize::MAX);
            self.rows.push(row);
            added += 1;
        }

        if added > 0 {
            self.rows
                .sort_by(|a, b| (a.created_at_ms, &a.key).cmp(&(b.created_at_ms, &b.key)));
            self.reindex();
        }
        added
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.index.clear();
    }

    fn reindex(&mut self) {
        for (i, row) in self.rows.iter().enumerate() {
            self.index.insert(row.key.clone(), i);
        }
    }
}

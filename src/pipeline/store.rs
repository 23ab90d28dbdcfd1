//! Downstream sorted key-value store interface
//!
//! The pipeline reads through a forward cursor over (row, family,
//! qualifier) keys: row is the shard term, family the document uid, and
//! qualifier the field name. The physical encoding behind the cursor
//! belongs to the storage engine and is out of scope here.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::stream::Term;
use crate::uid::Uid;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Failure surfaced by the downstream store.
///
/// Propagated unchanged through the pipeline; retry policy is the host's
/// responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("store failure: {0}")]
pub struct StoreError(pub String);

/// Sort key for document column entries.
///
/// Ordered lexicographically by (row, family, qualifier).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Key {
    /// Shard term
    pub row: Term,
    /// Document uid column family
    pub family: String,
    /// Field name
    pub qualifier: String,
}

impl Key {
    /// Creates a fully specified key.
    pub fn new(
        row: impl Into<String>,
        family: impl Into<String>,
        qualifier: impl Into<String>,
    ) -> Self {
        Self {
            row: row.into(),
            family: family.into(),
            qualifier: qualifier.into(),
        }
    }

    /// Smallest key in a shard row.
    pub fn row_start(row: impl Into<String>) -> Self {
        Self::new(row, "", "")
    }

    /// Smallest key of one document's column range.
    pub fn document_start(row: impl Into<String>, uid: &Uid) -> Self {
        Self::new(row, uid.as_str(), "")
    }
}

/// Half-open key range `[start, end)`.
///
/// `start_inclusive` is false for resume ranges whose start key was already
/// consumed before the checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Key,
    pub end: Key,
    pub start_inclusive: bool,
}

impl Range {
    /// Creates a range from explicit bounds.
    pub fn new(start: Key, end: Key, start_inclusive: bool) -> Self {
        Self {
            start,
            end,
            start_inclusive,
        }
    }

    /// All column entries of one document.
    ///
    /// The end bound appends `\0` to the family, the immediate successor
    /// string, so exactly the keys with this uid's family fall inside.
    pub fn document(row: &str, uid: &Uid) -> Self {
        Self::new(
            Key::document_start(row, uid),
            Key::new(row, format!("{}\0", uid.as_str()), ""),
            true,
        )
    }

    /// All column entries in one shard row.
    pub fn shard(row: &str) -> Self {
        Self::new(Key::row_start(row), Key::row_start(format!("{row}\0")), true)
    }

    /// Whether `key` falls inside this range.
    pub fn contains(&self, key: &Key) -> bool {
        let after_start = if self.start_inclusive {
            *key >= self.start
        } else {
            *key > self.start
        };
        after_start && *key < self.end
    }
}

/// Forward cursor over the downstream sorted store.
///
/// Synchronous: seeks and advances happen on the calling thread. Cursor
/// errors pass through the pipeline untouched.
pub trait SortedCursor {
    /// Positions the cursor at the first entry in `range`, restricted to
    /// the given column families (document uids) when non-empty. The
    /// `inclusive` flag overrides the range's own start inclusivity.
    fn seek(&mut self, range: &Range, column_families: &[String], inclusive: bool)
        -> StoreResult<()>;

    /// Whether the cursor currently has an entry.
    fn has_top(&self) -> bool;

    /// Key of the current entry, if any.
    fn top_key(&self) -> Option<&Key>;

    /// Value of the current entry, if any.
    fn top_value(&self) -> Option<&Value>;

    /// Advances to the next entry.
    fn advance(&mut self) -> StoreResult<()>;
}

/// In-memory cursor over a sorted column map.
///
/// Backs tests and embedded hosts; the production store lives behind the
/// same trait.
#[derive(Debug, Default, Clone)]
pub struct MemoryCursor {
    entries: BTreeMap<Key, Value>,
    window: VecDeque<(Key, Value)>,
}

impl MemoryCursor {
    /// Creates an empty cursor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cursor over the given column entries.
    pub fn from_entries(entries: impl IntoIterator<Item = (Key, Value)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            window: VecDeque::new(),
        }
    }

    /// Inserts one column entry.
    pub fn insert(&mut self, key: Key, value: Value) {
        self.entries.insert(key, value);
    }
}

impl SortedCursor for MemoryCursor {
    fn seek(
        &mut self,
        range: &Range,
        column_families: &[String],
        inclusive: bool,
    ) -> StoreResult<()> {
        self.window = self
            .entries
            .iter()
            .filter(|(key, _)| {
                let after_start = if inclusive {
                    **key >= range.start
                } else {
                    **key > range.start
                };
                after_start
                    && **key < range.end
                    && (column_families.is_empty() || column_families.contains(&key.family))
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Ok(())
    }

    fn has_top(&self) -> bool {
        !self.window.is_empty()
    }

    fn top_key(&self) -> Option<&Key> {
        self.window.front().map(|(key, _)| key)
    }

    fn top_value(&self) -> Option<&Value> {
        self.window.front().map(|(_, value)| value)
    }

    fn advance(&mut self) -> StoreResult<()> {
        self.window.pop_front();
        Ok(())
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::item::Item;

/// A node of the bucket tree.
///
/// Every `Bucket` that exists as a Rust value here is either a primary
/// bucket or a promoted shard that has just been loaded from the backend;
/// in both cases it owns its own backend record at `key`. An *embedded*
/// shard is represented as a [`ChildSlot::Embedded`] inside a parent's
/// `children` map, not as a free-standing `Bucket` with a flag. Folding
/// "embedded" and "promoted" into one boolean on a shared struct would let
/// a promoted pointer keep stale `items` or `children` around after the
/// split; a tagged child slot makes that state unrepresentable instead of
/// relying on callers to clear it.
///
/// `items` is only ever populated on a leaf `Embedded` child; every other
/// `Bucket` delegates entirely to its `children`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub(crate) key: String,
    pub(crate) depth: u32,
    #[serde(default)]
    pub(crate) items: BTreeMap<String, Item>,
    #[serde(default)]
    pub(crate) children: BTreeMap<String, ChildSlot>,
    /// Last-known serialized byte length of this bucket's own backend
    /// record. Populated by the store gateway on read/write; meaningless
    /// for a bucket that has never been persisted (starts at 0).
    #[serde(skip)]
    pub(crate) size: u64,
}

impl Bucket {
    /// A fresh, never-persisted bucket at `key`/`depth`, with no items and
    /// no children.
    pub fn new(key: impl Into<String>, depth: u32) -> Self {
        Self {
            key: key.into(),
            depth,
            items: BTreeMap::new(),
            children: BTreeMap::new(),
            size: 0,
        }
    }

    /// This bucket's absolute backend key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Number of shard hops from the primary bucket (primary is 0).
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Last-known persisted size of this bucket's own backend record.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Items held directly by this bucket (non-empty only on a leaf
    /// embedded shard in practice, but exposed generally for
    /// administrative callers).
    pub fn items(&self) -> &BTreeMap<String, Item> {
        &self.items
    }

    /// Child slots keyed by shard index hex string.
    pub fn children(&self) -> &BTreeMap<String, ChildSlot> {
        &self.children
    }
}

/// A child of a [`Bucket`], at shard index granularity.
///
/// `Embedded` holds the child's data inline, inside the parent's own
/// backend record. `Pointer` means the child has been promoted to its own
/// independent backend entry at `key`; the pointer itself carries no
/// items, by construction, without any runtime check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChildSlot {
    /// The child bucket, embedded in the parent's serialized record.
    Embedded(Bucket),
    /// A pointer to a promoted child stored independently at `key`.
    Pointer {
        /// The promoted child's own backend key.
        key: String,
    },
}

impl ChildSlot {
    /// A fresh embedded leaf at `key`/`depth`.
    pub fn new_embedded(key: impl Into<String>, depth: u32) -> Self {
        ChildSlot::Embedded(Bucket::new(key, depth))
    }

    /// `true` once this slot has been promoted. Promotion is one-way:
    /// nothing resets a pointer slot back to embedded.
    pub fn is_promoted(&self) -> bool {
        matches!(self, ChildSlot::Pointer { .. })
    }

    /// The key this slot's data lives at: the embedded bucket's own key, or
    /// the pointer's target key.
    pub fn key(&self) -> &str {
        match self {
            ChildSlot::Embedded(bucket) => &bucket.key,
            ChildSlot::Pointer { key } => key,
        }
    }
}

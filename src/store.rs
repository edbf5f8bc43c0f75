//! The backend key/value capability the packer consumes. Treated as an
//! external collaborator beyond its trait surface. [`MemoryStore`] is the
//! in-process reference implementation this crate's own tests, benches and
//! demos run against, grounded on `PolkaX-plum`'s `MapDataStore`.

use std::collections::HashMap;
use std::sync::Mutex;

/// A single record read from or written to the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    /// The record's key.
    pub key: String,
    /// The record's raw bytes.
    pub value: Vec<u8>,
}

/// The backend key/value capability consumed by the [`crate::StoreGateway`].
/// Implementors may fail; failures surface as
/// [`crate::PackerError::Backend`], with the underlying error preserved.
///
/// No Store implementation should ever panic: callers are expected to
/// check every `Result`, the same contract `PolkaX-plum`'s `DataStore`
/// trait documents for its own implementors.
pub trait Store {
    /// The error type this backend can fail with.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the record at `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<Record>, Self::Error>;

    /// Write `record`, keyed by `record.key`.
    fn put(&self, record: Record) -> Result<(), Self::Error>;
}

/// An in-process, mutex-guarded reference [`Store`] implementation. Not a
/// production backend: no persistence across process restarts, and its one
/// internal lock covers every key rather than striping by bucket. Logical
/// per-primary concurrency still comes from the packer's own
/// [`crate::LockTable`], not from this store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held (administrative/test use).
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Whether the store currently holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop the record at `key`, if any (administrative/test use, e.g.
    /// simulating a pruned or corrupted backend record).
    pub fn remove(&self, key: &str) {
        self.records.lock().unwrap().remove(key);
    }
}

impl Store for MemoryStore {
    type Error = std::convert::Infallible;

    fn get(&self, key: &str) -> Result<Option<Record>, Self::Error> {
        let records = self.records.lock().unwrap();
        Ok(records.get(key).map(|value| Record {
            key: key.to_string(),
            value: value.clone(),
        }))
    }

    fn put(&self, record: Record) -> Result<(), Self::Error> {
        self.records
            .lock()
            .unwrap()
            .insert(record.key, record.value);
        Ok(())
    }
}

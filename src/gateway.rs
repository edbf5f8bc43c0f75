//! The store gateway: the only component that touches the backend.
//! The packer core invokes it exclusively.

use crate::bucket::Bucket;
use crate::codec::{decode_wrapper, encode_wrapper};
use crate::error::PackerError;
use crate::store::{Record, Store};

/// Reads and writes whole [`Bucket`] records through a generic [`Store`],
/// enforcing the key-prefix invariant. A nil/absent bucket is not
/// representable here, since Rust's `&Bucket` is never null, so only the
/// empty-key and bad-prefix failure modes apply to
/// [`StoreGateway::put_bucket`].
pub struct StoreGateway<S: Store> {
    store: S,
    view_prefix: String,
}

impl<S: Store> StoreGateway<S> {
    /// Wrap `store`, enforcing that every bucket written carries `view_prefix`.
    pub fn new(store: S, view_prefix: impl Into<String>) -> Self {
        Self {
            store,
            view_prefix: view_prefix.into(),
        }
    }

    /// The wrapped backend, for administrative callers.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the bucket at `key`, or `None` if the backend has no record
    /// for it.
    pub fn get_bucket(&self, key: &str) -> Result<Option<Bucket>, PackerError> {
        if key.is_empty() {
            return Err(PackerError::InvalidArgument(
                "bucket key must not be empty".to_string(),
            ));
        }

        let record = self.store.get(key).map_err(PackerError::backend)?;
        match record {
            None => Ok(None),
            Some(record) => {
                log::trace!("loaded bucket record at '{key}', {} bytes", record.value.len());
                decode_wrapper(&record.value).map(Some)
            }
        }
    }

    /// Persist `bucket` at its own key.
    pub fn put_bucket(&self, bucket: &Bucket) -> Result<(), PackerError> {
        if bucket.key().is_empty() {
            return Err(PackerError::InvalidArgument(
                "bucket key must not be empty".to_string(),
            ));
        }
        if !bucket.key().starts_with(&self.view_prefix) {
            return Err(PackerError::InvalidArgument(format!(
                "bucket key '{}' does not start with view prefix '{}'",
                bucket.key(),
                self.view_prefix
            )));
        }

        let bytes = encode_wrapper(bucket)?;
        log::debug!("writing bucket record at '{}', {} bytes", bucket.key(), bytes.len());
        self.store
            .put(Record {
                key: bucket.key().to_string(),
                value: bytes,
            })
            .map_err(PackerError::backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn get_bucket_rejects_empty_key() {
        let gateway = StoreGateway::new(MemoryStore::new(), "pack/");
        let result = gateway.get_bucket("");
        assert!(matches!(result, Err(PackerError::InvalidArgument(_))));
    }

    #[test]
    fn get_bucket_on_absent_key_is_none() {
        let gateway = StoreGateway::new(MemoryStore::new(), "pack/");
        assert!(gateway.get_bucket("pack/3f").unwrap().is_none());
    }

    #[test]
    fn put_bucket_rejects_key_outside_prefix() {
        let gateway = StoreGateway::new(MemoryStore::new(), "pack/");
        let bucket = Bucket::new("other/3f", 0);
        let result = gateway.put_bucket(&bucket);
        assert!(matches!(result, Err(PackerError::InvalidArgument(_))));
    }

    #[test]
    fn put_then_get_round_trips_through_the_gateway() {
        let gateway = StoreGateway::new(MemoryStore::new(), "pack/");
        let bucket = Bucket::new("pack/3f", 0);
        gateway.put_bucket(&bucket).unwrap();
        let loaded = gateway.get_bucket("pack/3f").unwrap().unwrap();
        assert_eq!(loaded.key(), "pack/3f");
        assert!(loaded.size() > 0);
    }
}

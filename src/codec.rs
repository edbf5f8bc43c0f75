//! Deterministic serialize/decode of a bucket plus the wrapper record that
//! carries its stored size.

use serde::{Deserialize, Serialize};

use crate::bucket::Bucket;
use crate::error::PackerError;
use crate::item::Item;

/// The outer record actually written to the backend: the encoded bucket
/// body plus the body's byte length at encode time, so a later read can
/// recover the bucket's persisted size without re-encoding it.
#[derive(Serialize, Deserialize)]
struct WrapperRecord {
    data: Vec<u8>,
    size: i64,
}

/// Encode a bucket's own record (key/depth/items/children): the bytes a
/// [`WrapperRecord`] wraps, and also what `encoded_length_of_item` measures
/// a single item against.
fn encode_bucket_record(bucket: &Bucket) -> Result<Vec<u8>, PackerError> {
    bincode::serialize(bucket).map_err(PackerError::from)
}

/// Encode a bucket into the wrapper form the backend stores.
pub fn encode_wrapper(bucket: &Bucket) -> Result<Vec<u8>, PackerError> {
    let data = encode_bucket_record(bucket)?;
    let wrapper = WrapperRecord {
        size: data.len() as i64,
        data,
    };
    bincode::serialize(&wrapper).map_err(PackerError::from)
}

/// Decode a wrapper record previously produced by [`encode_wrapper`],
/// copying the wrapper's `size` into the decoded bucket's in-memory `size`
/// field. Absent `items`/`children` (from an older, elided encoding) decode
/// to empty maps via `#[serde(default)]` on [`Bucket`].
pub fn decode_wrapper(bytes: &[u8]) -> Result<Bucket, PackerError> {
    let wrapper: WrapperRecord = bincode::deserialize(bytes).map_err(PackerError::from)?;
    let mut bucket: Bucket = bincode::deserialize(&wrapper.data).map_err(PackerError::from)?;
    bucket.size = wrapper.size.max(0) as u64;
    Ok(bucket)
}

/// The marginal encoded size of a single item, used by the packer's size
/// check instead of re-encoding the whole bucket on every put.
pub fn encoded_length_of_item(item: &Item) -> Result<u64, PackerError> {
    bincode::serialized_size(item).map_err(PackerError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::ChildSlot;

    #[test]
    fn round_trips_an_empty_bucket() {
        let bucket = Bucket::new("pack/3f", 0);
        let wrapper = encode_wrapper(&bucket).unwrap();
        let decoded = decode_wrapper(&wrapper).unwrap();
        assert_eq!(decoded.key(), "pack/3f");
        assert_eq!(decoded.depth(), 0);
        assert!(decoded.items().is_empty());
        assert!(decoded.children().is_empty());
    }

    #[test]
    fn decoded_size_matches_wrapper_not_outer_bytes() {
        let bucket = Bucket::new("pack/3f", 0);
        let wrapper = encode_wrapper(&bucket).unwrap();
        let decoded = decode_wrapper(&wrapper).unwrap();
        let inner_len = encode_bucket_record(&bucket).unwrap().len() as u64;
        assert_eq!(decoded.size(), inner_len);
        assert!(decoded.size() < wrapper.len() as u64);
    }

    #[test]
    fn round_trips_items_and_promoted_children() {
        let mut bucket = Bucket::new("pack/3f", 0);
        bucket
            .items
            .insert("alice".to_string(), Item::new("alice", b"x".to_vec()));
        bucket.children.insert(
            "0a".to_string(),
            ChildSlot::Pointer {
                key: "pack/3f/0a".to_string(),
            },
        );

        let wrapper = encode_wrapper(&bucket).unwrap();
        let decoded = decode_wrapper(&wrapper).unwrap();

        assert_eq!(decoded.items().get("alice").unwrap().payload(), b"x");
        assert!(decoded.children().get("0a").unwrap().is_promoted());
    }

    #[test]
    fn same_bucket_encodes_identically_across_runs() {
        let mut bucket = Bucket::new("pack/3f", 0);
        for i in 0..20 {
            bucket.children.insert(
                format!("{i:02x}"),
                ChildSlot::new_embedded(format!("pack/3f/{i:02x}"), 1),
            );
        }
        let first = encode_wrapper(&bucket).unwrap();
        let second = encode_wrapper(&bucket).unwrap();
        assert_eq!(first, second, "encoding must be deterministic");
    }

    #[test]
    fn encoded_length_of_item_is_positive() {
        let item = Item::new("alice", b"hello world".to_vec());
        let len = encoded_length_of_item(&item).unwrap();
        assert!(len > 0);
    }
}

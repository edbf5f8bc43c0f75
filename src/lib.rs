//! # bucketpack
//!
//! A storage packer: multiplexes a large population of small items onto a
//! small number of backend entries by addressing each item through a
//! recursive, hash-derived bucket tree, and promoting a bucket's embedded
//! shards to independent backend entries only once the bucket's own
//! persisted size would exceed a configured threshold.
//!
//! ## Example
//!
//! ```rust
//! use bucketpack::{Item, Packer, PackerConfig, MemoryStore};
//!
//! let config = PackerConfig::builder()
//!     .view_prefix("pack/")
//!     .build()
//!     .unwrap();
//! let packer = Packer::new(MemoryStore::new(), config);
//!
//! packer.put_item(Item::new("alice", b"hello".to_vec())).unwrap();
//! let found = packer.get_item("alice").unwrap().unwrap();
//! assert_eq!(found.payload(), b"hello");
//! ```
//!
//! ## Concurrency
//!
//! The packer performs no internal locking. Callers that mutate
//! concurrently should hold the stripe returned by
//! [`Packer::lock_table`]`.lock_for(...)`, keyed by the numeric primary
//! index of the item id being written, for the duration of a `put_item` or
//! `delete_item` call.

pub mod bucket;
pub mod codec;
pub mod config;
pub mod error;
pub mod gateway;
pub mod hash_index;
pub mod item;
pub mod locks;
pub mod packer;
pub mod store;

pub use bucket::{Bucket, ChildSlot};
pub use config::{PackerConfig, PackerConfigBuilder};
pub use error::PackerError;
pub use gateway::StoreGateway;
pub use hash_index::{Digest256, HashIndex, Sha256Digest};
pub use item::Item;
pub use locks::LockTable;
pub use packer::Packer;
pub use store::{MemoryStore, Record, Store};

//! The packer core: recursive put/get/delete over the bucket tree, with
//! size-driven shard promotion and item redistribution.

use crate::bucket::{Bucket, ChildSlot};
use crate::codec::encoded_length_of_item;
use crate::config::PackerConfig;
use crate::error::PackerError;
use crate::gateway::StoreGateway;
use crate::hash_index::{Digest256, HashIndex, Sha256Digest};
use crate::item::Item;
use crate::locks::LockTable;
use crate::store::Store;

/// The storage packer: multiplexes a large population of small items onto
/// a small number of backend entries.
///
/// Generic over the backend [`Store`] and, for testing or alternate digest
/// primitives, the [`Digest256`] implementation, mirroring the teacher
/// crate's `LearnedKvStore<K, V, H: KeyHasher<K> = FastIntHash>` shape.
pub struct Packer<S: Store, H: Digest256 = Sha256Digest> {
    gateway: StoreGateway<S>,
    hash_index: HashIndex,
    digest: H,
    lock_table: LockTable,
    config: PackerConfig,
}

impl<S: Store> Packer<S, Sha256Digest> {
    /// Build a packer over `store` using the default SHA-256 digest.
    pub fn new(store: S, config: PackerConfig) -> Self {
        Self::with_digest(store, config, Sha256Digest)
    }
}

impl<S: Store, H: Digest256> Packer<S, H> {
    /// Build a packer over `store` with an explicit digest primitive.
    pub fn with_digest(store: S, config: PackerConfig, digest: H) -> Self {
        let hash_index = HashIndex::new(config.bucket_count(), config.shard_count());
        let lock_table = LockTable::new(config.bucket_count());
        let gateway = StoreGateway::new(store, config.view_prefix().to_string());
        Self {
            gateway,
            hash_index,
            digest,
            lock_table,
            config,
        }
    }

    /// The striped lock table, exposed so callers can compose
    /// larger critical sections around `put_item`/`delete_item`.
    pub fn lock_table(&self) -> &LockTable {
        &self.lock_table
    }

    /// The effective configuration this packer was built with.
    pub fn config(&self) -> &PackerConfig {
        &self.config
    }

    /// The underlying hash indexer, exposed so callers can compute a
    /// primary index's numeric value to pick a lock stripe without
    /// re-deriving the digest themselves.
    pub fn hash_index(&self) -> &HashIndex {
        &self.hash_index
    }

    /// Hash `id` with this packer's configured digest primitive.
    pub fn digest_id(&self, id: &str) -> Result<[u8; 32], PackerError> {
        self.digest.digest256(id)
    }

    fn primary_key(&self, primary_index: &str) -> String {
        format!("{}{}", self.config.view_prefix(), primary_index)
    }

    /// Low-level: load the bucket stored at `key`, for administrative
    /// callers and tests.
    pub fn get_bucket(&self, key: &str) -> Result<Option<Bucket>, PackerError> {
        self.gateway.get_bucket(key)
    }

    /// Low-level: persist `bucket` at its own key, for administrative
    /// callers and tests.
    pub fn put_bucket(&self, bucket: &Bucket) -> Result<(), PackerError> {
        self.gateway.put_bucket(bucket)
    }

    /// The wrapped backend store, for administrative callers.
    pub fn store(&self) -> &S {
        self.gateway.store()
    }

    /// Store or overwrite `item`; returns the backend key of the leaf
    /// bucket that now holds it.
    pub fn put_item(&self, item: Item) -> Result<String, PackerError> {
        if item.id().is_empty() {
            return Err(PackerError::InvalidArgument(
                "item id must not be empty".to_string(),
            ));
        }

        let digest = self.digest.digest256(item.id())?;
        let primary_key = self.primary_key(&self.hash_index.primary_index(&digest));

        let current = self
            .gateway
            .get_bucket(&primary_key)?
            .unwrap_or_else(|| Bucket::new(primary_key.clone(), 0));

        self.put_into(current, &item, &digest)
    }

    /// Read `id`.
    pub fn get_item(&self, id: &str) -> Result<Option<Item>, PackerError> {
        if id.is_empty() {
            return Err(PackerError::InvalidArgument(
                "item id must not be empty".to_string(),
            ));
        }

        let digest = self.digest.digest256(id)?;
        let primary_key = self.primary_key(&self.hash_index.primary_index(&digest));

        let mut current = match self.gateway.get_bucket(&primary_key)? {
            None => return Ok(None),
            Some(bucket) => bucket,
        };

        loop {
            let shard_idx = self.hash_index.shard_index(&digest, current.depth);
            match current.children.get(&shard_idx) {
                None => return Ok(None),
                Some(ChildSlot::Pointer { key }) => {
                    let target = key.clone();
                    log::trace!("get_item: descending into promoted shard at '{target}'");
                    current = self
                        .gateway
                        .get_bucket(&target)?
                        .ok_or_else(|| PackerError::Inconsistency { key: target })?;
                }
                Some(ChildSlot::Embedded(child)) => return Ok(child.items.get(id).cloned()),
            }
        }
    }

    /// Idempotently remove `id`. A no-op if `id` is not present anywhere on
    /// its addressed path.
    pub fn delete_item(&self, id: &str) -> Result<(), PackerError> {
        if id.is_empty() {
            return Err(PackerError::InvalidArgument(
                "item id must not be empty".to_string(),
            ));
        }

        let digest = self.digest.digest256(id)?;
        let primary_key = self.primary_key(&self.hash_index.primary_index(&digest));

        let mut current = match self.gateway.get_bucket(&primary_key)? {
            None => return Ok(()),
            Some(bucket) => bucket,
        };

        let shard_idx = loop {
            let shard_idx = self.hash_index.shard_index(&digest, current.depth);
            match current.children.get(&shard_idx) {
                None => return Ok(()),
                Some(ChildSlot::Pointer { key }) => {
                    let target = key.clone();
                    log::trace!("delete_item: descending into promoted shard at '{target}'");
                    current = self
                        .gateway
                        .get_bucket(&target)?
                        .ok_or_else(|| PackerError::Inconsistency { key: target })?;
                }
                Some(ChildSlot::Embedded(_)) => break shard_idx,
            }
        };

        if let Some(ChildSlot::Embedded(child)) = current.children.get_mut(&shard_idx) {
            child.items.remove(id);
        }
        self.gateway.put_bucket(&current)
    }

    /// Descend one hop from `current`, inserting `item` into the embedded
    /// leaf it resolves to (creating it if needed), recursing through any
    /// promoted pointer crossed along the way, and promoting that leaf if
    /// the parent's prospective size would exceed the threshold.
    fn put_into(&self, mut current: Bucket, item: &Item, digest: &[u8; 32]) -> Result<String, PackerError> {
        let shard_idx = self.hash_index.shard_index(digest, current.depth);

        if let Some(ChildSlot::Pointer { key }) = current.children.get(&shard_idx) {
            let target = key.clone();
            log::debug!("put_into: descending into promoted shard at '{target}'");
            let external = self
                .gateway
                .get_bucket(&target)?
                .ok_or_else(|| PackerError::Inconsistency { key: target })?;
            return self.put_into(external, item, digest);
        }

        let child_key = format!("{}/{}", current.key(), shard_idx);
        let next_depth = current.depth + 1;
        let slot = current
            .children
            .entry(shard_idx.clone())
            .or_insert_with(|| ChildSlot::new_embedded(child_key, next_depth));
        let child = match slot {
            ChildSlot::Embedded(child) => child,
            ChildSlot::Pointer { .. } => unreachable!("pointer branch handled above"),
        };
        child.items.insert(item.id().to_string(), item.clone());
        let leaf_key = child.key().to_string();

        let item_len = encoded_length_of_item(item)?;
        let prospective_size = current.size + item_len;

        if prospective_size <= self.config.promotion_threshold() {
            self.gateway.put_bucket(&current)?;
            return Ok(leaf_key);
        }

        self.promote_and_put(current, shard_idx, item, digest)
    }

    /// Promote the embedded child at `shard_idx` of `parent` into its own
    /// independent bucket, redistribute its items one level deeper, and
    /// recursively continue the put into the promoted bucket.
    fn promote_and_put(
        &self,
        mut parent: Bucket,
        shard_idx: String,
        item: &Item,
        digest: &[u8; 32],
    ) -> Result<String, PackerError> {
        let embedded = match parent.children.remove(&shard_idx) {
            Some(ChildSlot::Embedded(bucket)) => bucket,
            _ => unreachable!("promotion follows directly from inserting into an embedded child"),
        };
        let promoted_key = embedded.key().to_string();
        log::debug!(
            "promoting shard '{promoted_key}' out of parent '{}' ({} bytes over threshold)",
            parent.key(),
            embedded.size,
        );
        parent.children.insert(
            shard_idx,
            ChildSlot::Pointer {
                key: promoted_key.clone(),
            },
        );

        let mut external_copy = embedded;
        let old_items = std::mem::take(&mut external_copy.items);
        for (id, stored_item) in old_items {
            let item_digest = self.digest.digest256(&id)?;
            let grandchild_shard = self.hash_index.shard_index(&item_digest, external_copy.depth);
            let grandchild_key = format!("{}/{}", external_copy.key(), grandchild_shard);
            let grandchild_depth = external_copy.depth + 1;
            let slot = external_copy
                .children
                .entry(grandchild_shard)
                .or_insert_with(|| ChildSlot::new_embedded(grandchild_key, grandchild_depth));
            if let ChildSlot::Embedded(grandchild) = slot {
                grandchild.items.insert(id, stored_item);
            }
        }

        let leaf_key = self.put_into(external_copy, item, digest)?;
        self.gateway.put_bucket(&parent)?;
        Ok(leaf_key)
    }
}

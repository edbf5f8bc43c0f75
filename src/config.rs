use crate::error::PackerError;

/// Default number of primary buckets.
pub const DEFAULT_BUCKET_COUNT: u32 = 256;
/// Default fan-out per non-primary level.
pub const DEFAULT_SHARD_COUNT: u32 = 32;
/// Default soft size cap, in bytes, before promotion.
pub const DEFAULT_BUCKET_MAX_SIZE: u64 = 512 * 1024;

/// Tunables recognized by the packer.
///
/// Construct with [`PackerConfig::builder`] or [`PackerConfig::new`]; both
/// paths normalize `view_prefix` to end in `/` and reject a `bucket_count`
/// or `shard_count` of zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackerConfig {
    view_prefix: String,
    bucket_count: u32,
    shard_count: u32,
    bucket_max_size: u64,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            view_prefix: "pack/".to_string(),
            bucket_count: DEFAULT_BUCKET_COUNT,
            shard_count: DEFAULT_SHARD_COUNT,
            bucket_max_size: DEFAULT_BUCKET_MAX_SIZE,
        }
    }
}

impl PackerConfig {
    /// Build a config directly from the four recognized options.
    pub fn new(
        view_prefix: impl Into<String>,
        bucket_count: u32,
        shard_count: u32,
        bucket_max_size: u64,
    ) -> Result<Self, PackerError> {
        PackerConfigBuilder::new()
            .view_prefix(view_prefix)
            .bucket_count(bucket_count)
            .shard_count(shard_count)
            .bucket_max_size(bucket_max_size)
            .build()
    }

    /// Start a fluent builder seeded with the default tunables.
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::new()
    }

    /// Key prefix under which all packer state lives; always `/`-terminated.
    pub fn view_prefix(&self) -> &str {
        &self.view_prefix
    }

    /// Number of primary buckets.
    pub fn bucket_count(&self) -> u32 {
        self.bucket_count
    }

    /// Fan-out per non-primary level.
    pub fn shard_count(&self) -> u32 {
        self.shard_count
    }

    /// Soft size cap, in bytes, before promotion.
    pub fn bucket_max_size(&self) -> u64 {
        self.bucket_max_size
    }

    /// `ceil(0.9 * bucket_max_size)`, the promotion threshold.
    pub fn promotion_threshold(&self) -> u64 {
        (self.bucket_max_size * 9).div_ceil(10)
    }
}

/// Fluent builder for [`PackerConfig`], in the same style as this crate's
/// other builders.
#[derive(Clone, Debug, Default)]
pub struct PackerConfigBuilder {
    view_prefix: Option<String>,
    bucket_count: Option<u32>,
    shard_count: Option<u32>,
    bucket_max_size: Option<u64>,
}

impl PackerConfigBuilder {
    /// Start from the default tunables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key prefix. An empty prefix falls back to the default at
    /// [`PackerConfigBuilder::build`] time.
    pub fn view_prefix(mut self, view_prefix: impl Into<String>) -> Self {
        self.view_prefix = Some(view_prefix.into());
        self
    }

    /// Set the number of primary buckets.
    pub fn bucket_count(mut self, bucket_count: u32) -> Self {
        self.bucket_count = Some(bucket_count);
        self
    }

    /// Set the fan-out per non-primary level.
    pub fn shard_count(mut self, shard_count: u32) -> Self {
        self.shard_count = Some(shard_count);
        self
    }

    /// Set the soft size cap, in bytes, before promotion.
    pub fn bucket_max_size(mut self, bucket_max_size: u64) -> Self {
        self.bucket_max_size = Some(bucket_max_size);
        self
    }

    /// Validate and normalize accumulated options into a [`PackerConfig`].
    pub fn build(self) -> Result<PackerConfig, PackerError> {
        let defaults = PackerConfig::default();

        let mut view_prefix = self.view_prefix.unwrap_or(defaults.view_prefix);
        if view_prefix.is_empty() {
            view_prefix = PackerConfig::default().view_prefix;
        }
        if !view_prefix.ends_with('/') {
            view_prefix.push('/');
        }

        let bucket_count = self.bucket_count.unwrap_or(defaults.bucket_count);
        if bucket_count == 0 {
            return Err(PackerError::InvalidArgument(
                "bucket_count must be >= 1".to_string(),
            ));
        }

        let shard_count = self.shard_count.unwrap_or(defaults.shard_count);
        if shard_count == 0 {
            return Err(PackerError::InvalidArgument(
                "shard_count must be >= 1".to_string(),
            ));
        }

        let bucket_max_size = self.bucket_max_size.unwrap_or(defaults.bucket_max_size);

        Ok(PackerConfig {
            view_prefix,
            bucket_count,
            shard_count,
            bucket_max_size,
        })
    }
}

use thiserror::Error;

/// Errors surfaced by the packer, the store gateway, and the codec.
///
/// Every fallible public operation in this crate returns `Result<T,
/// PackerError>`. None of these are retried internally; see the crate docs
/// for how callers should sequence retries around the lock table.
#[derive(Error, Debug)]
pub enum PackerError {
    /// A nil/empty item, empty id, missing bucket key, or a bucket key that
    /// does not carry the configured `view_prefix`.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Encoding or decoding a bucket or wrapper record failed.
    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),

    /// The digest primitive failed to hash an item id.
    #[error("hash error: {0}")]
    Hash(String),

    /// The backend `Store` failed a get or put.
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    /// A parent bucket records a promoted child at `key`, but the backend
    /// has no record for it.
    #[error("inconsistency: promoted shard at '{key}' is missing from the backend")]
    Inconsistency {
        /// The key of the missing promoted shard.
        key: String,
    },
}

impl PackerError {
    /// Wrap an arbitrary backend failure, preserving its source.
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        PackerError::Backend(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_message_includes_detail() {
        let err = PackerError::InvalidArgument("item id is empty".into());
        assert_eq!(err.to_string(), "invalid argument: item id is empty");
    }

    #[test]
    fn inconsistency_message_includes_key() {
        let err = PackerError::Inconsistency {
            key: "pack/3f/0a".into(),
        };
        assert_eq!(
            err.to_string(),
            "inconsistency: promoted shard at 'pack/3f/0a' is missing from the backend"
        );
    }

    #[test]
    fn backend_preserves_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = PackerError::backend(io_err);
        assert!(err.to_string().contains("disk full"));
    }
}

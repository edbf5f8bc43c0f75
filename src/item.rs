use serde::{Deserialize, Serialize};

/// The user-visible record addressed by [`Item::id`].
///
/// `id` is non-empty and immutable; it is the sole input to addressing.
/// `payload` is opaque to the packer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    id: String,
    payload: Vec<u8>,
}

impl Item {
    /// Construct a new item. Does not validate `id`; validation happens at
    /// the packer boundary (`Packer::put_item`), since that is where the
    /// "non-empty" precondition is enforced as an `InvalidArgument`.
    pub fn new(id: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            payload: payload.into(),
        }
    }

    /// The item's stable identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The item's opaque payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

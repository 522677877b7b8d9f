use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A required field was empty. Carries the field name.
    #[error("missing required field: {0}")]
    Validation(&'static str),

    /// Unknown channel or message id, possibly evicted by retention.
    #[error("message {message_id} not found in channel {channel_id}")]
    MessageNotFound {
        channel_id: String,
        message_id: String,
    },

    /// A caller-supplied id already exists in the channel.
    #[error("message id {0} already exists")]
    DuplicateId(String),
}

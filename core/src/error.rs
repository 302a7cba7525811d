use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("decode error: {0}")]
    Decode(String),
    #[error("no messages found in export")]
    NoMessagesFound,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

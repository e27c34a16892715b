use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a reply is still in progress")]
    Busy,

    #[error("nothing to send")]
    EmptyInput,

    #[error("storage error: {0}")]
    Storage(#[from] mycoach_storage::error::StorageError),
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unrecognized calendar date: {0}")]
    InvalidDate(String),

    #[error("date arithmetic error: {0}")]
    Time(#[from] jiff::Error),
}

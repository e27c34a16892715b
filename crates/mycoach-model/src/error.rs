use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model invocation failed: {0}")]
    Invocation(String),

    #[error("response parsing failed: {0}")]
    ResponseParse(String),

    #[error("model returned no text")]
    EmptyResponse,

    #[error("invalid image payload: {0}")]
    InvalidImage(String),

    #[error("unsupported image type: {0}")]
    UnsupportedImage(String),
}

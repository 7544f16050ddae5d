//! Crate-wide error type.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PatchError>;

#[derive(Error, Debug)]
pub enum PatchError {
    /// A requested region does not fit inside a tensor.
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    #[error("shape mismatch: expected {expected:?}, got {given:?}")]
    ShapeMismatch {
        expected: Vec<Option<usize>>,
        given: Vec<usize>,
    },

    #[error("invalid transform range: {0}")]
    InvalidTransform(String),

    #[error("patch index {index} out of range for archive of {len} patches")]
    PatchIndexOutOfRange { index: usize, len: usize },

    #[error("malformed patch archive: {0}")]
    Archive(String),

    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

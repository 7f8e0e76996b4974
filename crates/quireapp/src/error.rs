use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuireError {
    #[error("Document not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: expected {expected} markup blobs, got {actual}")]
    Encode { expected: usize, actual: usize },

    #[error("Invalid document: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl QuireError {
    /// True when the error only means "nothing stored there yet".
    pub fn is_not_found(&self) -> bool {
        matches!(self, QuireError::NotFound(_))
    }
}

impl From<confique::Error> for QuireError {
    fn from(err: confique::Error) -> Self {
        QuireError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QuireError>;

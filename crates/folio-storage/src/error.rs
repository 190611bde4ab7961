use std::path::PathBuf;

use thiserror::Error;

use folio_core::error::CoreError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unsupported upload: {0}")]
    UnsupportedUpload(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

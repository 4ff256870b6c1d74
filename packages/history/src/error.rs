//! Error types for the versioning engine

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Storage failure: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Corrupt chain record at {path:?}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("No base snapshot for bucket {bucket}")]
    MissingBase { bucket: String },

    #[error("Unknown restore target")]
    UnknownTarget,
}

pub type HistoryResult<T> = Result<T, HistoryError>;

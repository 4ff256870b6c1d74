//! Error types for the edit service

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditError {
    #[error("Document not found: {path}")]
    NotFound { path: String },

    #[error("Line {line} out of range (document has {lines} lines)")]
    InvalidLineRange { line: usize, lines: usize },

    #[error("No editable region at line {line}: {reason}")]
    InvalidRegion { line: usize, reason: String },

    #[error("Payload for line {line} spans multiple lines")]
    MultilinePayload { line: usize },

    #[error("History error: {0}")]
    History(#[from] tagmend_history::HistoryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Nothing to undo for this session")]
    EmptyUndo,

    #[error("Document is not file-backed")]
    NotFileBacked,
}

pub type EditResult<T> = Result<T, EditError>;

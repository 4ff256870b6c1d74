//! # Document Handle
//!
//! Core document abstraction for line-oriented page editing.
//!
//! A Document holds one HTML page as a vector of lines. Documents can be:
//! - **Memory-backed**: Temporary, for testing or preview rendering
//! - **File-backed**: Read from disk, edited, written back
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Split → Edit → Join → Save
//!   ↓      ↓       ↓      ↓      ↓
//! File   Lines  Replace  Text  File
//! ```

use std::path::PathBuf;

use crate::errors::{EditError, EditResult};

/// Editable page document
#[derive(Debug)]
pub struct Document {
    /// Path to source file (if any)
    pub path: PathBuf,

    /// Backing storage strategy
    storage: DocumentStorage,
}

/// Storage backend for document
#[derive(Debug)]
pub enum DocumentStorage {
    /// In-memory only (for testing, previews)
    Memory { lines: Vec<String> },

    /// File-backed (read from and written back to disk)
    File { lines: Vec<String>, dirty: bool },
}

impl Document {
    /// Create document from page text (memory-backed)
    pub fn from_content(path: PathBuf, content: &str) -> Self {
        Self {
            path,
            storage: DocumentStorage::Memory {
                lines: split_lines(content),
            },
        }
    }

    /// Load document from file (file-backed)
    pub fn load(path: PathBuf) -> EditResult<Self> {
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(EditError::NotFound {
                    path: path.display().to_string(),
                });
            }
            Err(err) => return Err(EditError::Io(err)),
        };

        Ok(Self {
            path,
            storage: DocumentStorage::File {
                lines: split_lines(&text),
                dirty: false,
            },
        })
    }

    /// Get the document's lines
    pub fn lines(&self) -> &[String] {
        match &self.storage {
            DocumentStorage::Memory { lines } => lines,
            DocumentStorage::File { lines, .. } => lines,
        }
    }

    /// Get mutable line access (marks file-backed documents dirty)
    pub fn lines_mut(&mut self) -> &mut Vec<String> {
        match &mut self.storage {
            DocumentStorage::Memory { lines } => lines,
            DocumentStorage::File { lines, dirty } => {
                *dirty = true;
                lines
            }
        }
    }

    /// Get the document as a single string
    pub fn content(&self) -> String {
        self.lines().join("\n")
    }

    /// Number of lines in the document
    pub fn line_count(&self) -> usize {
        self.lines().len()
    }

    /// Check if document has unsaved changes
    pub fn is_dirty(&self) -> bool {
        match &self.storage {
            DocumentStorage::File { dirty, .. } => *dirty,
            _ => false,
        }
    }

    /// Save document to disk (if file-backed)
    pub fn save(&mut self) -> EditResult<()> {
        match &mut self.storage {
            DocumentStorage::File { lines, dirty } => {
                std::fs::write(&self.path, lines.join("\n"))?;
                *dirty = false;
                Ok(())
            }
            _ => Err(EditError::NotFileBacked),
        }
    }
}

/// Split page text into lines, preserving empty trailing lines
fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

//! # Tagmend Editor
//!
//! Click-to-edit service for stored HTML pages.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ markup: line markers + region replacement   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditService orchestration           │
//! │  - Render pages with clickable line markers │
//! │  - Apply, defer, or reject region edits     │
//! │  - Per-session bounded undo                 │
//! │  - Coordinate save → version chain          │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ history: per-day diff chains + snapshots    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Disk is source of truth**: the rendered view and its markers are
//!    derived and disposable
//! 2. **Markers never persist**: every inbound and outbound page passes
//!    through the sanitizer
//! 3. **Line-level operations**: no DOM, no full HTML parse
//! 4. **Every change is recorded**: edits, undos, and restores all flow
//!    through the version chain
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tagmend_editor::{BucketClock, EditReport, EditService};
//!
//! let service = EditService::new("site", "backups", BucketClock::Utc);
//!
//! // Serve the page with line markers for the edit view
//! let html = service.render_for_edit("index.html")?;
//!
//! // The operator clicked line 12 and typed new text
//! match service.edit_line("session-1", "index.html", 12, "Fresh copy")? {
//!     EditReport::Applied { record, .. } => println!("recorded {:?}", record),
//!     EditReport::Deferred { start_line, end_line, .. } => {
//!         // open the whole-region editor for lines start_line..=end_line
//!     }
//! }
//!
//! // Step back
//! service.undo("session-1")?;
//! ```

mod config;
mod document;
mod errors;
mod service;
mod undo;

pub use config::{ServiceConfig, DEFAULT_CONFIG_NAME};
pub use document::{Document, DocumentStorage};
pub use errors::{EditError, EditResult};
pub use service::{EditReport, EditService, RegionContent, RestoreReport, UndoReport};
pub use undo::{MemoryUndoStore, SessionUndoStore, UndoEntry, UndoStack, MAX_UNDO_LEVELS};

// Re-export common types for convenience
pub use tagmend_history::{
    BucketClock, ChainStatus, RecordKind, RecordOutcome, RestorePoint, RestorePointKind,
    RestoreTarget,
};
pub use tagmend_markup::{EditOutcome, Region};

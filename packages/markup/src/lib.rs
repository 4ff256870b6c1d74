//! # Tagmend Markup
//!
//! Line-oriented tag-region engine for editing small text spans inside
//! stored HTML without a full parser.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ scanner: one line → tag tokens              │
//! │  (quote-aware, case-insensitive, boundary)  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ marker: index / sanitize line markers       │
//! │ region: depth-balanced span location        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ replace: classify + rewrite the line array  │
//! │  - same-line substitution                   │
//! │  - multiline promotion (collapse to 1 line) │
//! │  - deferral to a whole-region editor        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Lines, not trees**: documents are line arrays; no DOM is built
//! 2. **Every byte outside the region survives**: rewrites splice, never
//!    reformat
//! 3. **Total where it matters**: `index` and `sanitize` never fail;
//!    the locator and replacer return structured outcomes, not errors
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tagmend_markup::{index, locate, replace, sanitize, EditOutcome};
//!
//! // Annotate a page for the rendering layer
//! let marked = index(&content);
//!
//! // Strip markers before anything touches disk
//! let clean = sanitize(&submitted);
//!
//! // Rewrite the clicked region
//! let mut lines: Vec<String> = clean.split('\n').map(String::from).collect();
//! match replace(&mut lines, 4, "new text") {
//!     EditOutcome::SingleLine { inverse, .. } => { /* record + persist */ }
//!     EditOutcome::Deferred { region, .. } => { /* switch edit mode */ }
//!     _ => {}
//! }
//! ```

mod marker;
mod region;
mod replace;
mod scanner;

pub use marker::{first_markable_tag, index, sanitize, ACTIVE_ATTR, MARKER_ATTR};
pub use region::{locate, Region};
pub use replace::{replace, EditOutcome, UnsupportedReason};
pub use scanner::{first_open_tag, scan_line, TagKind, TagToken};

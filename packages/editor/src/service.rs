//! # Edit Service
//!
//! Orchestrates the full edit flow: render a page with line markers,
//! apply a clicked edit, version it, and walk history back when asked.
//!
//! ## Flow
//!
//! ```text
//! render_for_edit → browser click → edit_line
//!                                       ↓
//!                         sanitize → locate → replace
//!                                       ↓
//!                           save → version chain → undo stack
//! ```
//!
//! Pages are plain HTML files under a site root. Every applied edit is
//! written straight back to disk and recorded in the per-day version
//! chain; the browser never holds authoritative state.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use tagmend_history::{
    file_id, BucketClock, ChainStatus, RecordOutcome, RestorePoint, RestoreTarget, VersionChain,
};
use tagmend_markup::{
    first_markable_tag, index, locate, replace, sanitize, EditOutcome, UnsupportedReason,
};

use crate::config::ServiceConfig;
use crate::document::Document;
use crate::errors::{EditError, EditResult};
use crate::undo::{MemoryUndoStore, SessionUndoStore, UndoEntry};

/// Result of an edit request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EditReport {
    /// The edit was applied, saved, and recorded
    Applied {
        /// 1-based line the region starts on
        line: usize,
        /// Number of lines the region occupies after the edit
        span_len: usize,
        /// What the version chain wrote for it
        record: RecordOutcome,
    },

    /// The region spans lines with nested markup; nothing was changed.
    /// The caller opens a whole-region editor with these bounds.
    Deferred {
        /// 1-based inclusive bounds of the region
        start_line: usize,
        end_line: usize,
        original: Vec<String>,
    },
}

/// A located region, returned for whole-region editing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionContent {
    pub tag_name: String,
    /// 1-based inclusive bounds
    pub start_line: usize,
    pub end_line: usize,
    pub lines: Vec<String>,
}

/// Result of an undo request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoReport {
    pub rel_path: String,
    /// 1-based line the restored span starts on
    pub line: usize,
    pub restored_lines: usize,
}

/// Result of a restore request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreReport {
    pub rel_path: String,
    pub bucket: String,
    pub target: RestoreTarget,
}

/// Stateful edit coordinator for one site root
pub struct EditService {
    site_root: PathBuf,
    chain: VersionChain,
    undo_store: Arc<dyn SessionUndoStore>,

    /// Per-file write locks; edits to different pages proceed in parallel
    file_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl EditService {
    /// Create a service over a site root, with history under `backup_root`
    pub fn new(
        site_root: impl Into<PathBuf>,
        backup_root: impl Into<PathBuf>,
        clock: BucketClock,
    ) -> Self {
        Self {
            site_root: site_root.into(),
            chain: VersionChain::new(backup_root, clock),
            undo_store: Arc::new(MemoryUndoStore::new()),
            file_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Create a service from a loaded config, rooted at `cwd`
    pub fn from_config(cwd: &str, config: &ServiceConfig) -> Self {
        Self::new(
            config.site_root_in(cwd),
            config.backup_root_in(cwd),
            config.bucket_clock,
        )
    }

    /// Swap in a different undo store (e.g. one shared across services)
    pub fn with_undo_store(mut self, store: Arc<dyn SessionUndoStore>) -> Self {
        self.undo_store = store;
        self
    }

    /// Render a page for the edit view: clean copy first, then markers
    pub fn render_for_edit(&self, rel_path: &str) -> EditResult<String> {
        let doc = Document::load(self.full_path(rel_path))?;
        Ok(index(&sanitize(&doc.content())))
    }

    /// Locate the region behind a marked line, for whole-region editing
    pub fn fetch_region(&self, rel_path: &str, line: usize) -> EditResult<RegionContent> {
        let doc = Document::load(self.full_path(rel_path))?;
        let lines: Vec<String> = sanitize(&doc.content())
            .split('\n')
            .map(str::to_string)
            .collect();
        let start = checked_index(line, lines.len())?;

        let tag = first_markable_tag(&lines[start]).ok_or_else(|| EditError::InvalidRegion {
            line,
            reason: unsupported_reason(UnsupportedReason::NoOpeningTag).to_string(),
        })?;
        let region = locate(&lines, start, &tag.name).ok_or_else(|| EditError::InvalidRegion {
            line,
            reason: unsupported_reason(UnsupportedReason::NoClosingTag).to_string(),
        })?;

        Ok(RegionContent {
            tag_name: region.tag_name.clone(),
            start_line: region.start_line + 1,
            end_line: region.end_line + 1,
            lines: lines[region.start_line..=region.end_line].to_vec(),
        })
    }

    /// Apply an operator edit to the region starting on `line` (1-based).
    ///
    /// The payload must stay on one physical line; multiline input is
    /// rejected and belongs to `replace_region`. Single-line regions are
    /// rewritten in place. A multiline region whose body is plain text
    /// collapses onto its start line. Anything else defers: the report
    /// carries the region bounds and nothing is written.
    pub fn edit_line(
        &self,
        session: &str,
        rel_path: &str,
        line: usize,
        new_content: &str,
    ) -> EditResult<EditReport> {
        let lock = self.lock_for(rel_path);
        let _guard = lock.lock().unwrap();

        let mut doc = Document::load(self.full_path(rel_path))?;

        // Work on a marker-free copy; stray markers in the payload or the
        // stored file must never survive an edit.
        let pre_content = sanitize(&doc.content());
        let mut lines: Vec<String> = pre_content.split('\n').map(str::to_string).collect();
        let start = checked_index(line, lines.len())?;

        let payload = sanitize(new_content);
        if payload.contains('\n') || payload.contains('\r') {
            return Err(EditError::MultilinePayload { line });
        }

        let (before, after, entry) = match replace(&mut lines, start, &payload) {
            EditOutcome::Unsupported { reason } => {
                return Err(EditError::InvalidRegion {
                    line,
                    reason: unsupported_reason(reason).to_string(),
                });
            }
            EditOutcome::Deferred { region, original } => {
                tracing::debug!(
                    "Deferring edit of {} line {}: region spans {}..{} with nested markup",
                    rel_path,
                    line,
                    region.start_line + 1,
                    region.end_line + 1
                );
                return Ok(EditReport::Deferred {
                    start_line: region.start_line + 1,
                    end_line: region.end_line + 1,
                    original,
                });
            }
            EditOutcome::SingleLine { line: at, inverse } => {
                let after = lines[at].clone();
                let entry = UndoEntry {
                    rel_path: rel_path.to_string(),
                    span_start: at,
                    span_len: 1,
                    original_lines: vec![inverse.clone()],
                };
                (inverse, after, entry)
            }
            EditOutcome::Promoted {
                start_line,
                removed,
                inverse,
            } => {
                tracing::debug!(
                    "Promoted {} lines of {} onto line {}",
                    removed,
                    rel_path,
                    start_line + 1
                );
                let after = lines[start_line].clone();
                let entry = UndoEntry {
                    rel_path: rel_path.to_string(),
                    span_start: start_line,
                    span_len: 1,
                    original_lines: inverse.clone(),
                };
                (inverse[0].clone(), after, entry)
            }
        };

        let post_content = lines.join("\n");
        *doc.lines_mut() = lines;
        doc.save()?;

        let record = self.chain.record_edit(
            &file_id(rel_path),
            &self.chain.current_bucket(),
            line,
            &before,
            &after,
            &pre_content,
            &post_content,
        )?;
        self.undo_store.push(session, entry);
        tracing::info!(
            "Applied edit to {} line {} ({:?} {})",
            rel_path,
            line,
            record.kind,
            record.sequence
        );

        Ok(EditReport::Applied {
            line,
            span_len: 1,
            record,
        })
    }

    /// Replace a whole region (1-based inclusive bounds) with new lines.
    ///
    /// This is the follow-up path for deferred edits: the operator edits
    /// the region source directly and the result is spliced over it.
    pub fn replace_region(
        &self,
        session: &str,
        rel_path: &str,
        start_line: usize,
        end_line: usize,
        new_content: &str,
    ) -> EditResult<EditReport> {
        let lock = self.lock_for(rel_path);
        let _guard = lock.lock().unwrap();

        let mut doc = Document::load(self.full_path(rel_path))?;
        let pre_content = sanitize(&doc.content());
        let mut lines: Vec<String> = pre_content.split('\n').map(str::to_string).collect();

        let total = lines.len();
        let start = checked_index(start_line, total)?;
        if end_line < start_line || end_line > total {
            return Err(EditError::InvalidLineRange {
                line: end_line,
                lines: total,
            });
        }

        let replacement: Vec<String> = sanitize(new_content)
            .split('\n')
            .map(str::to_string)
            .collect();

        let original: Vec<String> = lines
            .splice(start..end_line, replacement.iter().cloned())
            .collect();
        let before = original[0].clone();
        let after = replacement[0].clone();
        let span_len = replacement.len();

        let post_content = lines.join("\n");
        *doc.lines_mut() = lines;
        doc.save()?;

        let record = self.chain.record_edit(
            &file_id(rel_path),
            &self.chain.current_bucket(),
            start_line,
            &before,
            &after,
            &pre_content,
            &post_content,
        )?;
        self.undo_store.push(
            session,
            UndoEntry {
                rel_path: rel_path.to_string(),
                span_start: start,
                span_len,
                original_lines: original,
            },
        );
        tracing::info!(
            "Replaced region {}..{} of {} with {} lines",
            start_line,
            end_line,
            rel_path,
            span_len
        );

        Ok(EditReport::Applied {
            line: start_line,
            span_len,
            record,
        })
    }

    /// Undo the session's most recent edit.
    ///
    /// The replaced span is spliced back from the undo entry and the
    /// result flows through the same save-and-record path as any other
    /// edit. Undos are history too.
    pub fn undo(&self, session: &str) -> EditResult<UndoReport> {
        let entry = self.undo_store.pop(session).ok_or(EditError::EmptyUndo)?;

        let lock = self.lock_for(&entry.rel_path);
        let _guard = lock.lock().unwrap();

        let mut doc = Document::load(self.full_path(&entry.rel_path))?;
        let pre_content = sanitize(&doc.content());
        let mut lines: Vec<String> = pre_content.split('\n').map(str::to_string).collect();

        let span_end = entry.span_start + entry.span_len;
        if span_end > lines.len() {
            return Err(EditError::InvalidLineRange {
                line: span_end,
                lines: lines.len(),
            });
        }

        let before = lines.get(entry.span_start).cloned().unwrap_or_default();
        lines.splice(
            entry.span_start..span_end,
            entry.original_lines.iter().cloned(),
        );
        let after = lines.get(entry.span_start).cloned().unwrap_or_default();

        let post_content = lines.join("\n");
        *doc.lines_mut() = lines;
        doc.save()?;

        self.chain.record_edit(
            &file_id(&entry.rel_path),
            &self.chain.current_bucket(),
            entry.span_start + 1,
            &before,
            &after,
            &pre_content,
            &post_content,
        )?;
        tracing::info!(
            "Undid edit to {} line {} ({} lines restored)",
            entry.rel_path,
            entry.span_start + 1,
            entry.original_lines.len()
        );

        Ok(UndoReport {
            rel_path: entry.rel_path.clone(),
            line: entry.span_start + 1,
            restored_lines: entry.original_lines.len(),
        })
    }

    /// Restore a page to a recorded point from `bucket`.
    ///
    /// The chain backs up the pre-restore content into the current
    /// bucket before the restored content is written to disk.
    pub fn restore(
        &self,
        rel_path: &str,
        bucket: &str,
        target: RestoreTarget,
    ) -> EditResult<RestoreReport> {
        let lock = self.lock_for(rel_path);
        let _guard = lock.lock().unwrap();

        let mut doc = Document::load(self.full_path(rel_path))?;
        let restored = self
            .chain
            .restore(&file_id(rel_path), bucket, target, &doc.content())?;

        *doc.lines_mut() = restored.split('\n').map(str::to_string).collect();
        doc.save()?;
        tracing::info!("Restored {} to {:?} from bucket {}", rel_path, target, bucket);

        Ok(RestoreReport {
            rel_path: rel_path.to_string(),
            bucket: bucket.to_string(),
            target,
        })
    }

    /// List the restore points recorded for a page in `bucket`
    pub fn restore_points(&self, rel_path: &str, bucket: &str) -> EditResult<Vec<RestorePoint>> {
        Ok(self.chain.restore_points(&file_id(rel_path), bucket)?)
    }

    /// Probe today's chain against the page on disk
    pub fn chain_status(&self, rel_path: &str) -> EditResult<ChainStatus> {
        let doc = Document::load(self.full_path(rel_path))?;
        Ok(self.chain.status(
            &file_id(rel_path),
            &self.chain.current_bucket(),
            &doc.content(),
        )?)
    }

    /// Name of the bucket edits are currently recorded under
    pub fn current_bucket(&self) -> String {
        self.chain.current_bucket()
    }

    /// Number of undo levels held for a session
    pub fn undo_depth(&self, session: &str) -> usize {
        self.undo_store.depth(session)
    }

    /// Drop a session's undo stack
    pub fn end_session(&self, session: &str) {
        self.undo_store.evict(session);
        tracing::debug!("Evicted undo stack for session {}", session);
    }

    fn full_path(&self, rel_path: &str) -> PathBuf {
        self.site_root.join(rel_path)
    }

    fn lock_for(&self, rel_path: &str) -> Arc<Mutex<()>> {
        let mut locks = self.file_locks.lock().unwrap();
        locks.entry(rel_path.to_string()).or_default().clone()
    }
}

fn checked_index(line: usize, total: usize) -> EditResult<usize> {
    if line == 0 || line > total {
        return Err(EditError::InvalidLineRange { line, lines: total });
    }
    Ok(line - 1)
}

fn unsupported_reason(reason: UnsupportedReason) -> &'static str {
    match reason {
        UnsupportedReason::NoOpeningTag => "no opening tag",
        UnsupportedReason::NoClosingTag => "no matching closing tag",
    }
}

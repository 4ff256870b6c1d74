//! The per-file, per-day diff chain.
//!
//! Most edits touch one line, so the chain stores only the changed line per
//! edit and one full base snapshot per day. Before trusting a diff-only
//! write it replays the existing chain and compares the result against the
//! content the caller read; any divergence (an external edit, a promotion
//! that changed the line count, prior corruption) drops the chain onto a
//! fresh out-of-band snapshot instead of appending a lying diff. The
//! invariant bought by that fallback: reconstruction equals live content
//! immediately after every successful `record_edit`.

use std::path::PathBuf;

use chrono::Utc;

use crate::bucket::BucketClock;
use crate::error::{HistoryError, HistoryResult};
use crate::record::{
    ChainStatus, DiffRecord, RecordKind, RecordOutcome, RestorePoint, RestorePointKind,
    RestoreTarget,
};
use crate::store::{ChainEntry, ChainStore};

pub struct VersionChain {
    store: ChainStore,
    clock: BucketClock,
}

impl VersionChain {
    pub fn new(backup_root: impl Into<PathBuf>, clock: BucketClock) -> Self {
        Self {
            store: ChainStore::new(backup_root.into()),
            clock,
        }
    }

    /// The bucket key edits land in right now.
    pub fn current_bucket(&self) -> String {
        self.clock.today()
    }

    /// The convenience copy of the newest content recorded in a bucket.
    pub fn latest(&self, file_id: &str, bucket: &str) -> HistoryResult<Option<String>> {
        self.store.read_latest(file_id, bucket)
    }

    /// Record one applied edit.
    ///
    /// `before`/`after` are the changed line, `pre_content` the full content
    /// the edit was computed from, `post_content` the full content after the
    /// edit. The chain decides what to write:
    ///
    /// - empty bucket: `post_content` becomes the base snapshot (sequence 0)
    /// - consistent chain: a diff record is appended
    /// - diverged chain: `post_content` becomes a rebase snapshot, the
    ///   effective replay base from here on
    ///
    /// The latest-content copy is refreshed in every path.
    pub fn record_edit(
        &self,
        file_id: &str,
        bucket: &str,
        line_number: usize,
        before: &str,
        after: &str,
        pre_content: &str,
        post_content: &str,
    ) -> HistoryResult<RecordOutcome> {
        let base = self.store.read_base(file_id, bucket)?;
        let entries = self.store.entries(file_id, bucket)?;
        let probe = probe_status(base.as_deref(), &entries, pre_content);
        tracing::debug!("Chain probe for {}/{}: {:?}", file_id, bucket, probe);

        let outcome = match probe {
            ChainStatus::Empty => {
                self.store.write_base(file_id, bucket, post_content)?;
                tracing::info!("Recorded base snapshot for {}/{}", file_id, bucket);
                RecordOutcome {
                    kind: RecordKind::Snapshot,
                    sequence: 0,
                }
            }
            ChainStatus::Consistent => {
                let sequence = next_sequence(&entries);
                let record = DiffRecord {
                    sequence,
                    timestamp: Utc::now().timestamp_millis(),
                    line_number,
                    before: before.to_string(),
                    after: after.to_string(),
                };
                self.store.write_diff(file_id, bucket, &record)?;
                tracing::debug!(
                    "Recorded diff {} for {}/{} (line {})",
                    sequence,
                    file_id,
                    bucket,
                    line_number
                );
                RecordOutcome {
                    kind: RecordKind::Diff,
                    sequence,
                }
            }
            ChainStatus::Diverged => {
                let sequence = next_sequence(&entries);
                tracing::warn!(
                    "Chain for {}/{} diverged from live content, rebasing on snapshot {}",
                    file_id,
                    bucket,
                    sequence
                );
                self.store.write_rebase(file_id, bucket, sequence, post_content)?;
                RecordOutcome {
                    kind: RecordKind::Snapshot,
                    sequence,
                }
            }
        };

        self.store.write_latest(file_id, bucket, post_content)?;
        Ok(outcome)
    }

    /// Rebuild the content as of `upto_sequence`.
    ///
    /// Replay starts from the newest snapshot at or below `upto_sequence`
    /// (the base when no rebase intervenes) and applies the diffs after it
    /// in order. A diff addressing a line the content no longer has is
    /// skipped, never fatal. `None` when the bucket holds no snapshot at
    /// all.
    pub fn reconstruct(
        &self,
        file_id: &str,
        bucket: &str,
        upto_sequence: u32,
    ) -> HistoryResult<Option<String>> {
        let base = self.store.read_base(file_id, bucket)?;
        let entries = self.store.entries(file_id, bucket)?;
        Ok(replay(base.as_deref(), &entries, upto_sequence))
    }

    /// Probe the chain against the live content the caller holds.
    pub fn status(
        &self,
        file_id: &str,
        bucket: &str,
        live_content: &str,
    ) -> HistoryResult<ChainStatus> {
        let base = self.store.read_base(file_id, bucket)?;
        let entries = self.store.entries(file_id, bucket)?;
        Ok(probe_status(base.as_deref(), &entries, live_content))
    }

    /// Whether replaying the whole chain reproduces `live_content` exactly.
    pub fn verify(&self, file_id: &str, bucket: &str, live_content: &str) -> HistoryResult<bool> {
        Ok(self.status(file_id, bucket, live_content)? == ChainStatus::Consistent)
    }

    /// The selectable restore points of a bucket, base first, then diffs
    /// and rebase snapshots in sequence order.
    pub fn restore_points(&self, file_id: &str, bucket: &str) -> HistoryResult<Vec<RestorePoint>> {
        let mut points = Vec::new();
        if self.store.has_base(file_id, bucket) {
            points.push(RestorePoint {
                kind: RestorePointKind::Base,
                sequence: 0,
                timestamp: None,
                line_number: None,
            });
        }
        for entry in self.store.entries(file_id, bucket)? {
            points.push(match entry {
                ChainEntry::Diff(d) => RestorePoint {
                    kind: RestorePointKind::Diff,
                    sequence: d.sequence,
                    timestamp: Some(d.timestamp),
                    line_number: Some(d.line_number),
                },
                ChainEntry::Rebase { sequence, .. } => RestorePoint {
                    kind: RestorePointKind::Rebase,
                    sequence,
                    timestamp: None,
                    line_number: None,
                },
            });
        }
        Ok(points)
    }

    /// Resolve a restore target to full content.
    ///
    /// Snapshot targets are used verbatim; a diff target reconstructs up to
    /// its sequence. The pre-restore live content is first backed up as a
    /// rebase snapshot in the current bucket, so the restore itself stays
    /// recoverable. The caller persists the returned content.
    pub fn restore(
        &self,
        file_id: &str,
        bucket: &str,
        target: RestoreTarget,
        live_content: &str,
    ) -> HistoryResult<String> {
        let restored = match target {
            RestoreTarget::Base => self
                .store
                .read_base(file_id, bucket)?
                .ok_or_else(|| HistoryError::MissingBase {
                    bucket: bucket.to_string(),
                })?,
            RestoreTarget::Rebase(sequence) => self
                .store
                .read_rebase(file_id, bucket, sequence)?
                .ok_or(HistoryError::UnknownTarget)?,
            RestoreTarget::Diff(sequence) => {
                let entries = self.store.entries(file_id, bucket)?;
                let known = entries
                    .iter()
                    .any(|e| matches!(e, ChainEntry::Diff(d) if d.sequence == sequence));
                if !known {
                    return Err(HistoryError::UnknownTarget);
                }
                self.reconstruct(file_id, bucket, sequence)?.ok_or_else(|| {
                    HistoryError::MissingBase {
                        bucket: bucket.to_string(),
                    }
                })?
            }
        };

        let current = self.current_bucket();
        let entries = self.store.entries(file_id, &current)?;
        let backup_sequence = next_sequence(&entries);
        self.store
            .write_rebase(file_id, &current, backup_sequence, live_content)?;
        tracing::info!(
            "Restored {}/{} to {:?}, pre-restore content backed up as snapshot {} in {}",
            file_id,
            bucket,
            target,
            backup_sequence,
            current
        );

        Ok(restored)
    }
}

fn next_sequence(entries: &[ChainEntry]) -> u32 {
    entries.last().map(|e| e.sequence()).unwrap_or(0) + 1
}

fn probe_status(base: Option<&str>, entries: &[ChainEntry], live_content: &str) -> ChainStatus {
    match replay(base, entries, u32::MAX) {
        None => ChainStatus::Empty,
        Some(expected) if expected == live_content => ChainStatus::Consistent,
        Some(_) => ChainStatus::Diverged,
    }
}

// Effective-base replay: the newest snapshot at or below `upto` wins and
// the diffs after it are applied in sequence order.
fn replay(base: Option<&str>, entries: &[ChainEntry], upto: u32) -> Option<String> {
    let mut start: Option<(u32, &str)> = base.map(|c| (0, c));
    for entry in entries {
        if entry.sequence() > upto {
            break;
        }
        if let ChainEntry::Rebase { sequence, content } = entry {
            start = Some((*sequence, content));
        }
    }
    let (from, content) = start?;

    let mut lines: Vec<String> = content.split('\n').map(String::from).collect();
    for entry in entries {
        let sequence = entry.sequence();
        if sequence <= from {
            continue;
        }
        if sequence > upto {
            break;
        }
        if let ChainEntry::Diff(record) = entry {
            if record.line_number >= 1 && record.line_number <= lines.len() {
                lines[record.line_number - 1] = record.after.clone();
            } else {
                tracing::debug!(
                    "Skipping diff {}: line {} out of range ({} lines)",
                    record.sequence,
                    record.line_number,
                    lines.len()
                );
            }
        }
    }
    Some(lines.join("\n"))
}

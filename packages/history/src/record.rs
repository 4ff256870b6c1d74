//! Record and outcome types for the diff chain.

use serde::{Deserialize, Serialize};

/// One recorded single-line edit. Immutable once written.
///
/// `sequence` is monotonic within one day-bucket and shared with rebase
/// snapshots; the base snapshot implicitly holds sequence 0. `line_number`
/// is 1-based, the addressing the line markers expose externally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRecord {
    pub sequence: u32,
    /// Milliseconds since the Unix epoch, UTC.
    pub timestamp: i64,
    pub line_number: usize,
    pub before: String,
    pub after: String,
}

/// What `record_edit` wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    /// A single-line diff was appended to the chain.
    Diff,
    /// A full snapshot was written: the day's base at sequence 0, or an
    /// out-of-band rebase snapshot at a later sequence.
    Snapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordOutcome {
    pub kind: RecordKind,
    pub sequence: u32,
}

/// Result of probing a chain against live content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainStatus {
    /// No snapshot exists yet for the bucket.
    Empty,
    /// Replaying the chain reproduces the live content byte for byte.
    Consistent,
    /// Replay and live content differ; the next recorded edit rebases on a
    /// fresh snapshot.
    Diverged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestorePointKind {
    Base,
    Diff,
    Rebase,
}

/// One selectable entry on the restore page for a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestorePoint {
    pub kind: RestorePointKind,
    pub sequence: u32,
    /// Present for diff records only.
    pub timestamp: Option<i64>,
    /// Present for diff records only; 1-based.
    pub line_number: Option<usize>,
}

/// Which restore point to roll back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestoreTarget {
    /// The bucket's base snapshot, verbatim.
    Base,
    /// The state immediately after the diff with this sequence.
    Diff(u32),
    /// A rebase snapshot with this sequence, verbatim.
    Rebase(u32),
}

//! # Tagmend History
//!
//! Diff-chain versioning for edited documents: space-efficient backups,
//! integrity verification and point-in-time reconstruction.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ bucket: day keys + flat file identifiers    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ store: on-disk layout                       │
//! │  base.html / diff-NNNN.json /               │
//! │  rebase-NNNN.html / latest.html             │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ chain: record / verify / reconstruct /      │
//! │        restore                              │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Diffs first**: one changed line per edit, a full snapshot only once
//!    per day
//! 2. **Never trust a stale chain**: every diff append is preceded by a
//!    replay-and-compare probe; divergence rebases onto a fresh snapshot
//! 3. **The chain never reads live files**: callers pass content in and
//!    persist content out
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tagmend_history::{BucketClock, RestoreTarget, VersionChain, file_id};
//!
//! let chain = VersionChain::new("/var/backups", BucketClock::Utc);
//! let id = file_id("news/index.html");
//! let bucket = chain.current_bucket();
//!
//! let outcome = chain.record_edit(&id, &bucket, 4, before, after, pre, post)?;
//! let yesterday = chain.reconstruct(&id, "2026-08-24", 7)?;
//! let content = chain.restore(&id, &bucket, RestoreTarget::Diff(3), &live)?;
//! ```

mod bucket;
mod chain;
mod error;
mod record;
mod store;

pub use bucket::{file_id, BucketClock};
pub use chain::VersionChain;
pub use error::{HistoryError, HistoryResult};
pub use record::{
    ChainStatus, DiffRecord, RecordKind, RecordOutcome, RestorePoint, RestorePointKind,
    RestoreTarget,
};

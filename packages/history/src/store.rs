//! On-disk chain storage.
//!
//! One directory per file identifier, one subdirectory per day-bucket:
//!
//! ```text
//! <root>/<file_id>/<bucket>/
//!     base.html          base snapshot, verbatim
//!     diff-0001.json     one DiffRecord per file
//!     diff-0002.json
//!     rebase-0003.html   out-of-band snapshot, verbatim
//!     latest.html        convenience copy of the newest content
//! ```
//!
//! Sequence numbers are shared between diffs and rebase snapshots and are
//! zero-padded to four digits in filenames so lexical order matches replay
//! order.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{HistoryError, HistoryResult};
use crate::record::DiffRecord;

const BASE_FILE: &str = "base.html";
const LATEST_FILE: &str = "latest.html";
const DIFF_PREFIX: &str = "diff-";
const DIFF_EXT: &str = ".json";
const REBASE_PREFIX: &str = "rebase-";
const REBASE_EXT: &str = ".html";

/// One replayable chain entry with its payload loaded.
#[derive(Debug, Clone)]
pub(crate) enum ChainEntry {
    Diff(DiffRecord),
    Rebase { sequence: u32, content: String },
}

impl ChainEntry {
    pub fn sequence(&self) -> u32 {
        match self {
            ChainEntry::Diff(d) => d.sequence,
            ChainEntry::Rebase { sequence, .. } => *sequence,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ChainStore {
    root: PathBuf,
}

impl ChainStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn bucket_dir(&self, file_id: &str, bucket: &str) -> PathBuf {
        self.root.join(file_id).join(bucket)
    }

    pub fn has_base(&self, file_id: &str, bucket: &str) -> bool {
        self.bucket_dir(file_id, bucket).join(BASE_FILE).exists()
    }

    pub fn read_base(&self, file_id: &str, bucket: &str) -> HistoryResult<Option<String>> {
        read_optional(&self.bucket_dir(file_id, bucket).join(BASE_FILE))
    }

    pub fn write_base(&self, file_id: &str, bucket: &str, content: &str) -> HistoryResult<()> {
        let dir = self.bucket_dir(file_id, bucket);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(BASE_FILE), content)?;
        Ok(())
    }

    pub fn read_rebase(
        &self,
        file_id: &str,
        bucket: &str,
        sequence: u32,
    ) -> HistoryResult<Option<String>> {
        read_optional(&self.bucket_dir(file_id, bucket).join(rebase_name(sequence)))
    }

    pub fn write_rebase(
        &self,
        file_id: &str,
        bucket: &str,
        sequence: u32,
        content: &str,
    ) -> HistoryResult<()> {
        let dir = self.bucket_dir(file_id, bucket);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(rebase_name(sequence)), content)?;
        Ok(())
    }

    pub fn read_latest(&self, file_id: &str, bucket: &str) -> HistoryResult<Option<String>> {
        read_optional(&self.bucket_dir(file_id, bucket).join(LATEST_FILE))
    }

    pub fn write_latest(&self, file_id: &str, bucket: &str, content: &str) -> HistoryResult<()> {
        let dir = self.bucket_dir(file_id, bucket);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(LATEST_FILE), content)?;
        Ok(())
    }

    pub fn write_diff(&self, file_id: &str, bucket: &str, record: &DiffRecord) -> HistoryResult<()> {
        let dir = self.bucket_dir(file_id, bucket);
        fs::create_dir_all(&dir)?;
        let path = dir.join(diff_name(record.sequence));
        let json = serde_json::to_string_pretty(record).map_err(|e| HistoryError::Corrupt {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        fs::write(path, json)?;
        Ok(())
    }

    /// All diff and rebase entries in the bucket, sorted by sequence.
    ///
    /// A missing bucket directory is an empty chain. Files that do not match
    /// the chain naming scheme are ignored; a diff file that cannot be
    /// parsed, or whose recorded sequence disagrees with its filename, is a
    /// corrupt chain.
    pub fn entries(&self, file_id: &str, bucket: &str) -> HistoryResult<Vec<ChainEntry>> {
        let dir = self.bucket_dir(file_id, bucket);
        let read = match fs::read_dir(&dir) {
            Ok(r) => r,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for item in read {
            let item = item?;
            let name = item.file_name();
            let name = name.to_string_lossy();
            if let Some(seq) = parse_numbered(&name, DIFF_PREFIX, DIFF_EXT) {
                let path = item.path();
                let text = fs::read_to_string(&path)?;
                let record: DiffRecord =
                    serde_json::from_str(&text).map_err(|e| HistoryError::Corrupt {
                        path: path.clone(),
                        reason: e.to_string(),
                    })?;
                if record.sequence != seq {
                    return Err(HistoryError::Corrupt {
                        path,
                        reason: format!("sequence {} does not match filename", record.sequence),
                    });
                }
                entries.push(ChainEntry::Diff(record));
            } else if let Some(seq) = parse_numbered(&name, REBASE_PREFIX, REBASE_EXT) {
                let content = fs::read_to_string(item.path())?;
                entries.push(ChainEntry::Rebase {
                    sequence: seq,
                    content,
                });
            }
        }
        entries.sort_by_key(|e| e.sequence());
        Ok(entries)
    }
}

fn diff_name(sequence: u32) -> String {
    format!("{}{:04}{}", DIFF_PREFIX, sequence, DIFF_EXT)
}

fn rebase_name(sequence: u32) -> String {
    format!("{}{:04}{}", REBASE_PREFIX, sequence, REBASE_EXT)
}

fn parse_numbered(name: &str, prefix: &str, ext: &str) -> Option<u32> {
    name.strip_prefix(prefix)?.strip_suffix(ext)?.parse().ok()
}

fn read_optional(path: &Path) -> HistoryResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

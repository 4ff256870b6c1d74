//! Bucket keys and file identifiers.

use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};

/// Which calendar the day-bucket keys follow. Pick one per deployment and
/// keep it; mixing clocks splits a day's edits across two buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketClock {
    #[default]
    Utc,
    Local,
}

impl BucketClock {
    /// Today's bucket key, `YYYY-MM-DD`.
    pub fn today(&self) -> String {
        match self {
            BucketClock::Utc => Utc::now().format("%Y-%m-%d").to_string(),
            BucketClock::Local => Local::now().format("%Y-%m-%d").to_string(),
        }
    }
}

/// Derive the flat on-disk folder name for a relative document path.
///
/// Path separators become `_s_` and literal dots `_d_`, so one document maps
/// to exactly one directory name with no nesting and no extension ambiguity.
pub fn file_id(rel_path: &str) -> String {
    rel_path
        .replace('\\', "_s_")
        .replace('/', "_s_")
        .replace('.', "_d_")
}

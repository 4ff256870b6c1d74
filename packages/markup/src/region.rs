//! Depth-balanced region location.

use serde::{Deserialize, Serialize};

use crate::scanner::{self, TagKind};

/// One addressable editable span: the lines and offsets between an opening
/// tag and its matching closing tag, depth-balanced against same-named
/// nested tags.
///
/// Line indices are 0-based into the scanned slice. `open_tag_end` is the
/// offset of the `>` ending the opening tag on `start_line`;
/// `close_tag_start` is the offset of the `<` beginning the closing tag on
/// `end_line`. Invariant: `start_line <= end_line`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub tag_name: String,
    pub start_line: usize,
    pub end_line: usize,
    pub open_tag_end: usize,
    pub close_tag_start: usize,
}

/// Find the region for `tag_name` starting at or after line `start`.
///
/// The depth counter seeds at the first opening occurrence of the tag at or
/// after `start`; each later opening of the same name increments it, each
/// closing decrements it, and the occurrence that returns it to zero ends
/// the region. Matching is case-insensitive and name-boundary aware, so
/// `li` never matches `<link`. Self-closing occurrences are ignored.
///
/// Returns `None` when `start` is out of bounds, when no opening tag is
/// found, when the opening tag does not terminate on its own line, or when
/// the document ends before the depth returns to zero. The last case is
/// malformed markup and callers surface it rather than approximating a
/// region.
pub fn locate(lines: &[String], start: usize, tag_name: &str) -> Option<Region> {
    if start >= lines.len() {
        return None;
    }
    let needle = tag_name.to_ascii_lowercase();
    let mut depth = 0usize;
    let mut seeded = false;
    let mut region_start = start;
    let mut open_tag_end = 0usize;

    for (li, line) in lines.iter().enumerate().skip(start) {
        for tok in scanner::scan_line(line) {
            if tok.name != needle || !tok.has_name_boundary(line) {
                continue;
            }
            match tok.kind {
                TagKind::Open => {
                    if tok.self_closing {
                        continue;
                    }
                    if seeded {
                        depth += 1;
                    } else {
                        seeded = true;
                        region_start = li;
                        open_tag_end = tok.gt?;
                        depth = 1;
                    }
                }
                TagKind::Close => {
                    if !seeded {
                        continue;
                    }
                    depth -= 1;
                    if depth == 0 {
                        return Some(Region {
                            tag_name: needle,
                            start_line: region_start,
                            end_line: li,
                            open_tag_end,
                            close_tag_start: tok.start,
                        });
                    }
                }
            }
        }
    }

    None
}

//! Edit classification and line rewriting.
//!
//! `replace` is the decision point of the engine: given a target line and
//! pre-sanitized replacement text it decides whether the edit is a same-line
//! substitution, a promotable multiline region that collapses to one line,
//! or a complex region the caller must route to a whole-region editor. The
//! mutated line array and the original span travel back in the outcome so
//! the caller can record history and push the inverse.

use serde::{Deserialize, Serialize};

use crate::marker;
use crate::region::{self, Region};
use crate::scanner;

/// Tags whose multiline regions may be collapsed onto the start line when
/// the inner content is plain text.
const PROMOTABLE_TAGS: &[&str] = &["caption", "dd", "dt", "li", "td", "th"];

/// Why an edit attempt could not be classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnsupportedReason {
    /// No qualifying opening tag on the requested line.
    NoOpeningTag,
    /// No balanced closing tag before the end of the document.
    NoClosingTag,
}

/// Result of an edit attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EditOutcome {
    /// The region sat on one line; the text between its tags was replaced.
    SingleLine {
        line: usize,
        /// The original full line.
        inverse: String,
    },
    /// A multiline text-only region was collapsed onto its start line.
    Promoted {
        start_line: usize,
        /// Number of lines the region occupied before the collapse.
        removed: usize,
        /// The original lines of the region.
        inverse: Vec<String>,
    },
    /// Complex multiline region. Nothing was mutated; the caller routes to
    /// a whole-region edit path with these bounds and this content.
    Deferred { region: Region, original: Vec<String> },
    /// No region to edit; nothing was mutated.
    Unsupported { reason: UnsupportedReason },
}

/// Rewrite the region starting at line `start` (0-based) with
/// `new_content`, which the caller has already sanitized.
///
/// The line array is mutated only for the `SingleLine` and `Promoted`
/// outcomes; `Deferred` and `Unsupported` leave it untouched.
pub fn replace(lines: &mut Vec<String>, start: usize, new_content: &str) -> EditOutcome {
    let tag = match lines.get(start).and_then(|l| marker::first_markable_tag(l)) {
        Some(tok) => tok,
        None => {
            return EditOutcome::Unsupported {
                reason: UnsupportedReason::NoOpeningTag,
            }
        }
    };

    let region = match region::locate(lines, start, &tag.name) {
        Some(r) => r,
        None => {
            return EditOutcome::Unsupported {
                reason: UnsupportedReason::NoClosingTag,
            }
        }
    };

    if region.start_line == region.end_line {
        let line = &lines[region.start_line];
        let rewritten = format!(
            "{}{}{}",
            &line[..=region.open_tag_end],
            new_content,
            &line[region.close_tag_start..]
        );
        let inverse = std::mem::replace(&mut lines[region.start_line], rewritten);
        return EditOutcome::SingleLine {
            line: region.start_line,
            inverse,
        };
    }

    if PROMOTABLE_TAGS.contains(&tag.name.as_str()) && inner_text_is_plain(lines, &region) {
        let collapsed = format!(
            "{}{}{}",
            &lines[region.start_line][..=region.open_tag_end],
            new_content,
            &lines[region.end_line][region.close_tag_start..]
        );
        let removed = region.end_line - region.start_line + 1;
        let inverse: Vec<String> = lines
            .splice(
                region.start_line..=region.end_line,
                std::iter::once(collapsed),
            )
            .collect();
        return EditOutcome::Promoted {
            start_line: region.start_line,
            removed,
            inverse,
        };
    }

    let original = lines[region.start_line..=region.end_line].to_vec();
    EditOutcome::Deferred { region, original }
}

// A multiline region is plain when the text strictly between the outer
// opening `>` and the closing `<` carries no markup other than explicit
// line-break tags.
fn inner_text_is_plain(lines: &[String], region: &Region) -> bool {
    let mut segments: Vec<&str> = Vec::new();
    segments.push(&lines[region.start_line][region.open_tag_end + 1..]);
    for line in &lines[region.start_line + 1..region.end_line] {
        segments.push(line);
    }
    segments.push(&lines[region.end_line][..region.close_tag_start]);

    segments
        .iter()
        .all(|s| scanner::scan_line(s).iter().all(|t| t.name == "br"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_replace_single_line() {
        let mut lines = doc(&["<b>old</b>"]);
        let outcome = replace(&mut lines, 0, "new");
        assert_eq!(lines, doc(&["<b>new</b>"]));
        assert_eq!(
            outcome,
            EditOutcome::SingleLine {
                line: 0,
                inverse: "<b>old</b>".to_string(),
            }
        );
    }

    #[test]
    fn test_replace_keeps_attributes() {
        let mut lines = doc(&["  <td class=\"num\">42</td>"]);
        replace(&mut lines, 0, "43");
        assert_eq!(lines, doc(&["  <td class=\"num\">43</td>"]));
    }

    #[test]
    fn test_replace_targets_first_markable_tag() {
        let mut lines = doc(&["<div><p>old</p></div>"]);
        replace(&mut lines, 0, "new");
        assert_eq!(lines, doc(&["<div><p>new</p></div>"]));
    }

    #[test]
    fn test_replace_single_line_preserves_same_name_siblings() {
        let mut lines = doc(&["<tr><td>one</td><td>two</td><td>three</td></tr>"]);
        let outcome = replace(&mut lines, 0, "ONE");
        assert_eq!(lines, doc(&["<tr><td>ONE</td><td>two</td><td>three</td></tr>"]));
        assert_eq!(
            outcome,
            EditOutcome::SingleLine {
                line: 0,
                inverse: "<tr><td>one</td><td>two</td><td>three</td></tr>".to_string(),
            }
        );
    }

    #[test]
    fn test_replace_single_line_spans_nested_same_name() {
        let mut lines = doc(&["<li><ul><li>a</li></ul></li>"]);
        let outcome = replace(&mut lines, 0, "flat");
        assert_eq!(lines, doc(&["<li>flat</li>"]));
        assert!(matches!(outcome, EditOutcome::SingleLine { .. }));
    }

    #[test]
    fn test_replace_no_opening_tag() {
        let mut lines = doc(&["plain text"]);
        let outcome = replace(&mut lines, 0, "new");
        assert_eq!(
            outcome,
            EditOutcome::Unsupported {
                reason: UnsupportedReason::NoOpeningTag,
            }
        );
        assert_eq!(lines, doc(&["plain text"]));
    }

    #[test]
    fn test_replace_no_closing_tag() {
        let mut lines = doc(&["<li>dangling", "text"]);
        let outcome = replace(&mut lines, 0, "new");
        assert_eq!(
            outcome,
            EditOutcome::Unsupported {
                reason: UnsupportedReason::NoClosingTag,
            }
        );
    }

    #[test]
    fn test_replace_promotes_simple_multiline() {
        let mut lines = doc(&["  <li class=\"a\">", "    first", "    second", "  </li>"]);
        let outcome = replace(&mut lines, 0, "joined");
        assert_eq!(lines, doc(&["  <li class=\"a\">joined</li>"]));
        match outcome {
            EditOutcome::Promoted {
                start_line,
                removed,
                inverse,
            } => {
                assert_eq!(start_line, 0);
                assert_eq!(removed, 4);
                assert_eq!(inverse.len(), 4);
                assert_eq!(inverse[1], "    first");
            }
            other => panic!("expected promotion, got {:?}", other),
        }
    }

    #[test]
    fn test_replace_promotion_allows_line_break_tags() {
        let mut lines = doc(&["<td>", "one<br>", "two<br />", "</td>"]);
        let outcome = replace(&mut lines, 0, "merged");
        assert_eq!(lines, doc(&["<td>merged</td>"]));
        assert!(matches!(outcome, EditOutcome::Promoted { .. }));
    }

    #[test]
    fn test_replace_defers_nested_markup() {
        let original = doc(&["<li>", "  <b>bold</b>", "</li>"]);
        let mut lines = original.clone();
        let outcome = replace(&mut lines, 0, "new");
        assert_eq!(lines, original);
        match outcome {
            EditOutcome::Deferred { region, original } => {
                assert_eq!(region.start_line, 0);
                assert_eq!(region.end_line, 2);
                assert_eq!(original.len(), 3);
            }
            other => panic!("expected deferral, got {:?}", other),
        }
    }

    #[test]
    fn test_replace_defers_non_promotable_tag() {
        let original = doc(&["<p>", "  text", "</p>"]);
        let mut lines = original.clone();
        let outcome = replace(&mut lines, 0, "new");
        assert_eq!(lines, original);
        assert!(matches!(outcome, EditOutcome::Deferred { .. }));
    }

    #[test]
    fn test_replace_out_of_bounds_line() {
        let mut lines = doc(&["<li>a</li>"]);
        let outcome = replace(&mut lines, 9, "new");
        assert_eq!(
            outcome,
            EditOutcome::Unsupported {
                reason: UnsupportedReason::NoOpeningTag,
            }
        );
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let mut lines = doc(&["<b>old</b>"]);
        let outcome = replace(&mut lines, 0, "new");

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["kind"], "SingleLine");
        assert_eq!(json["inverse"], "<b>old</b>");

        let back: EditOutcome = serde_json::from_value(json).unwrap();
        assert_eq!(back, outcome);
    }
}

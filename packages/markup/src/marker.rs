//! Line marker indexing and sanitizing.
//!
//! The indexer annotates each editable opening tag with its 1-based source
//! line number so the rendering layer can address regions by line. The
//! sanitizer strips those markers (and any editor-only attributes) before
//! content is persisted or fed back into the locator. Both are total
//! functions: unparseable lines pass through unchanged.

use crate::scanner::{self, TagKind, TagToken};

/// Attribute carrying the 1-based source line number of the tag.
pub const MARKER_ATTR: &str = "data-edit-line";

/// Attribute the editor layer toggles on the region currently being edited.
pub const ACTIVE_ATTR: &str = "data-edit-active";

/// Tags that never receive a marker: structural and container elements,
/// head-only machinery, and void elements with no text content.
const EXCLUDED_TAGS: &[&str] = &[
    "area", "base", "body", "br", "col", "colgroup", "div", "dl", "form",
    "head", "hr", "html", "iframe", "img", "input", "link", "meta",
    "noscript", "ol", "script", "source", "style", "table", "tbody", "tfoot",
    "thead", "tr", "track", "ul", "wbr",
];

fn is_excluded(name: &str) -> bool {
    // Doctype declarations and comments keep their `!` prefix in the scanner.
    name.starts_with('!') || EXCLUDED_TAGS.contains(&name)
}

/// First tag on the line that qualifies for a marker: an opening tag with a
/// genuine name boundary whose name is not in the excluded set.
pub fn first_markable_tag(line: &str) -> Option<TagToken> {
    scanner::scan_line(line)
        .into_iter()
        .filter(|t| t.kind == TagKind::Open)
        .find(|t| t.has_name_boundary(line) && !is_excluded(&t.name))
}

/// Annotate each line's first qualifying opening tag with the line's 1-based
/// number. Lines that already carry a marker pass through untouched, so the
/// function is idempotent.
pub fn index(content: &str) -> String {
    let mut out = String::with_capacity(content.len() + 64);
    for (i, line) in content.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if line.contains(MARKER_ATTR) {
            out.push_str(line);
            continue;
        }
        match first_markable_tag(line) {
            Some(tok) => {
                out.push_str(&line[..tok.name_end]);
                out.push_str(&format!(" {}=\"{}\"", MARKER_ATTR, i + 1));
                out.push_str(&line[tok.name_end..]);
            }
            None => out.push_str(line),
        }
    }
    out
}

/// Remove every marker and editor-only attribute from the content.
///
/// Total and idempotent; safe to call on already-clean content. Must run
/// before content is persisted or re-enters the locator, otherwise markers
/// accumulate across edit cycles.
pub fn sanitize(content: &str) -> String {
    let cleaned = strip_attribute(content, MARKER_ATTR);
    strip_attribute(&cleaned, ACTIVE_ATTR)
}

// Removes `attr` together with its value and the whitespace run in front of
// it, at every occurrence that sits on an attribute boundary: preceded by
// whitespace and followed by `=`, `/`, `>` or end of input. Occurrences
// embedded in longer names or in running text are left alone.
fn strip_attribute(content: &str, attr: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    while let Some(pos) = rest.find(attr) {
        let before = &rest[..pos];
        let after_name = &rest[pos + attr.len()..];

        let preceded = before.ends_with(|c: char| c.is_whitespace());
        let bounded = matches!(
            after_name.chars().next(),
            None | Some('=') | Some('>') | Some('/')
        );

        if !(preceded && bounded) {
            out.push_str(&rest[..pos + attr.len()]);
            rest = after_name;
            continue;
        }

        out.push_str(before.trim_end());

        rest = match after_name.strip_prefix('=') {
            Some(value) => consume_attr_value(value),
            None => after_name,
        };
    }
    out.push_str(rest);
    out
}

// Skips a quoted (`"…"` or `'…'`) or bare attribute value and returns the
// remainder. An unterminated quote swallows the rest of the input rather
// than failing.
fn consume_attr_value(s: &str) -> &str {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, q)) if q == '"' || q == '\'' => {
            for (i, c) in chars {
                if c == q {
                    return &s[i + 1..];
                }
            }
            ""
        }
        Some(_) => {
            for (i, c) in s.char_indices() {
                if c.is_whitespace() || c == '>' || c == '/' {
                    return &s[i..];
                }
            }
            ""
        }
        None => "",
    }
}

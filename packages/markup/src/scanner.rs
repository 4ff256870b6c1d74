//! Line-oriented tag scanner.
//!
//! A small explicit state machine, not a parser: it walks one line of markup
//! and reports every tag-shaped token it finds. Quoted attribute values are
//! tracked so a `>` inside `title="a > b"` does not terminate the tag. Names
//! are lowercased on the way out; callers compare against lowercase needles.

/// Kind of tag occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Open,
    Close,
}

/// One tag occurrence on a scanned line. All offsets are byte offsets into
/// the line.
#[derive(Debug, Clone, PartialEq)]
pub struct TagToken {
    /// Tag name, lowercased. Doctype and comment openers keep their `!`
    /// prefix (`!doctype`, `!--`).
    pub name: String,

    pub kind: TagKind,

    /// Offset of the `<`.
    pub start: usize,

    /// Offset just past the last name character.
    pub name_end: usize,

    /// Offset of the terminating `>`, when it falls on this line.
    pub gt: Option<usize>,

    /// `true` when a `/` immediately precedes the terminating `>`.
    pub self_closing: bool,
}

impl TagToken {
    /// Whether the character after the name is a genuine boundary
    /// (whitespace, `>`, `/` or end-of-line), so `<li` is a real `li` and
    /// not a truncated read of `<linput`.
    pub fn has_name_boundary(&self, line: &str) -> bool {
        match line[self.name_end..].chars().next() {
            None => true,
            Some(c) => c.is_whitespace() || c == '>' || c == '/',
        }
    }
}

enum State {
    Text,
    // Inside a tag, optionally inside a quoted attribute value.
    InTag { quote: Option<char> },
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '!'
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '!'
}

/// Scan one line and return every tag token on it, in order.
///
/// Tags whose `>` falls on a later line are reported with `gt: None`; the
/// scanner never carries state across lines.
pub fn scan_line(line: &str) -> Vec<TagToken> {
    let mut tokens = Vec::new();
    let mut state = State::Text;
    let mut current: Option<TagToken> = None;
    let mut prev_non_ws: Option<char> = None;

    let mut chars = line.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match state {
            State::Text => {
                if c != '<' {
                    continue;
                }
                let (kind, name_from) = match chars.peek() {
                    Some(&(_, '/')) => {
                        chars.next();
                        (TagKind::Close, i + 2)
                    }
                    Some(&(_, c2)) if is_name_start(c2) => (TagKind::Open, i + 1),
                    _ => continue,
                };
                let mut name_end = name_from;
                while let Some(&(j, c2)) = chars.peek() {
                    if is_name_char(c2) {
                        name_end = j + c2.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                if name_end == name_from {
                    // `</>` or `</ li>` is not a tag token.
                    continue;
                }
                current = Some(TagToken {
                    name: line[name_from..name_end].to_ascii_lowercase(),
                    kind,
                    start: i,
                    name_end,
                    gt: None,
                    self_closing: false,
                });
                state = State::InTag { quote: None };
                prev_non_ws = None;
            }
            State::InTag { quote } => match quote {
                Some(q) => {
                    if c == q {
                        state = State::InTag { quote: None };
                    }
                }
                None => {
                    if c == '"' || c == '\'' {
                        state = State::InTag { quote: Some(c) };
                    } else if c == '>' {
                        if let Some(mut tok) = current.take() {
                            tok.gt = Some(i);
                            tok.self_closing = prev_non_ws == Some('/');
                            tokens.push(tok);
                        }
                        state = State::Text;
                    } else if !c.is_whitespace() {
                        prev_non_ws = Some(c);
                    }
                }
            },
        }
    }

    // A tag left open at end-of-line is still reported; its `>` is unknown.
    if let Some(tok) = current.take() {
        tokens.push(tok);
    }

    tokens
}

/// First opening tag on the line, if any.
pub fn first_open_tag(line: &str) -> Option<TagToken> {
    scan_line(line)
        .into_iter()
        .find(|t| t.kind == TagKind::Open)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_simple_pair() {
        let tokens = scan_line("<li>item</li>");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].name, "li");
        assert_eq!(tokens[0].kind, TagKind::Open);
        assert_eq!(tokens[0].start, 0);
        assert_eq!(tokens[0].gt, Some(3));
        assert_eq!(tokens[1].name, "li");
        assert_eq!(tokens[1].kind, TagKind::Close);
        assert_eq!(tokens[1].start, 8);
    }

    #[test]
    fn test_names_are_lowercased() {
        let tokens = scan_line("<LI>item</Li>");
        assert_eq!(tokens[0].name, "li");
        assert_eq!(tokens[1].name, "li");
    }

    #[test]
    fn test_gt_inside_quoted_attribute_is_ignored() {
        let tokens = scan_line(r#"<td title="a > b">x</td>"#);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].gt, Some(17));
        assert_eq!(&r#"<td title="a > b">x</td>"#[17..18], ">");
    }

    #[test]
    fn test_single_quoted_attribute() {
        let tokens = scan_line("<td title='a > b'>x</td>");
        assert_eq!(tokens[0].gt, Some(17));
    }

    #[test]
    fn test_link_is_not_li() {
        let tokens = scan_line("<link rel=\"stylesheet\">");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].name, "link");
    }

    #[test]
    fn test_name_boundary() {
        let line = "<li@broken>";
        let tok = first_open_tag(line).unwrap();
        assert_eq!(tok.name, "li");
        assert!(!tok.has_name_boundary(line));

        let line = "<li>";
        let tok = first_open_tag(line).unwrap();
        assert!(tok.has_name_boundary(line));
    }

    #[test]
    fn test_self_closing() {
        let tokens = scan_line("<br/> and <br /> and <hr>");
        assert!(tokens[0].self_closing);
        assert!(tokens[1].self_closing);
        assert!(!tokens[2].self_closing);
    }

    #[test]
    fn test_unterminated_tag_has_no_gt() {
        let tokens = scan_line("<td class=\"wide\"");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].gt, None);
    }

    #[test]
    fn test_stray_angle_is_not_a_tag() {
        assert!(scan_line("3 < 4 and 5 > 4").is_empty());
        assert!(scan_line("</>").is_empty());
    }

    #[test]
    fn test_doctype_and_comment_keep_bang() {
        let tokens = scan_line("<!DOCTYPE html>");
        assert_eq!(tokens[0].name, "!doctype");
        let tokens = scan_line("<!-- note -->");
        assert_eq!(tokens[0].name, "!--");
    }

    #[test]
    fn test_text_before_tag() {
        let tokens = scan_line("总 value: <b>7</b>");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].name, "b");
    }
}

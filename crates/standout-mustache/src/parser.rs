//! Recursive-descent compiler from template source to a [`Node`] tree.
//!
//! The parser alternates text reads and tag reads on a [`Cursor`] and
//! dispatches each tag on its leading sigil:
//!
//! | Sigil | Tag |
//! |-------|-----|
//! | `!` | comment, dropped |
//! | `#` `^` | section / inverted section, parsed recursively up to its close |
//! | `/` | section close |
//! | `>` | partial |
//! | `=` | delimiter change, e.g. `{{=<% %>=}}` |
//! | `{` `&` | unescaped variable |
//! | anything else | escaped variable |
//!
//! Whitespace before a standalone tag is dropped along with its line break,
//! so a line holding only a section tag leaves no blank line behind.

use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{Cursor, Scan};
use crate::tag::Node;

/// A compiled document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Parsed {
    pub nodes: Vec<Node>,
    /// Delimiters active when parsing finished.
    pub delimiters: (String, String),
}

/// The section a recursive parse call is collecting children for.
struct OpenSection<'s> {
    name: &'s str,
    line: usize,
}

pub(crate) fn parse(source: &str) -> Result<Parsed, ParseError> {
    let mut cursor = Cursor::new(source);
    let nodes = parse_block(&mut cursor, None)?;
    let (open, close) = cursor.delimiters();
    let delimiters = (open.to_string(), close.to_string());

    tracing::debug!(
        bytes = source.len(),
        nodes = nodes.len(),
        lines = cursor.line(),
        "compiled template"
    );

    Ok(Parsed { nodes, delimiters })
}

/// Parses nodes until the close tag of `section`, or until end of input at
/// the top level.
fn parse_block(
    cursor: &mut Cursor<'_>,
    section: Option<&OpenSection<'_>>,
) -> Result<Vec<Node>, ParseError> {
    let mut nodes = Vec::new();

    loop {
        let span = match cursor.read_text() {
            Scan::Tag(span) => span,
            Scan::End(tail) => {
                return match section {
                    None => {
                        push_text(&mut nodes, tail);
                        Ok(nodes)
                    }
                    Some(open) => Err(ParseError::new(
                        open.line,
                        ParseErrorKind::UnclosedSection(open.name.to_string()),
                    )),
                };
            }
        };

        push_text(&mut nodes, span.text);
        let tag = cursor.read_tag(span.may_standalone)?;
        if !tag.standalone {
            push_text(&mut nodes, span.padding);
        }

        let body = tag.body;
        match body.as_bytes()[0] {
            b'!' => {}
            sigil @ (b'#' | b'^') => {
                let open = OpenSection {
                    name: body[1..].trim(),
                    line: tag.line,
                };
                let children = parse_block(cursor, Some(&open))?;
                nodes.push(Node::Section {
                    name: open.name.to_string(),
                    inverted: sigil == b'^',
                    line: open.line,
                    children,
                });
            }
            b'/' => {
                let name = body[1..].trim();
                return match section {
                    None => Err(ParseError::new(
                        tag.line,
                        ParseErrorKind::UnmatchedCloseTag,
                    )),
                    Some(open) if open.name != name => Err(ParseError::new(
                        tag.line,
                        ParseErrorKind::InterleavedCloseTag(name.to_string()),
                    )),
                    Some(_) => Ok(nodes),
                };
            }
            b'>' => nodes.push(Node::Partial {
                name: body[1..].trim().to_string(),
                indent: span.padding.to_string(),
            }),
            b'=' => change_delimiters(cursor, body, tag.line)?,
            b'{' => {
                let inner = &body[1..];
                let name = inner.strip_suffix('}').unwrap_or(inner).trim();
                nodes.push(Node::Variable {
                    name: name.to_string(),
                    escape: false,
                });
            }
            b'&' => nodes.push(Node::Variable {
                name: body[1..].trim().to_string(),
                escape: false,
            }),
            _ => nodes.push(Node::Variable {
                name: body.to_string(),
                escape: true,
            }),
        }
    }
}

/// Applies a `{{=open close=}}` tag to the cursor.
///
/// A body without two whitespace-separated parts leaves the delimiters as
/// they were.
fn change_delimiters(cursor: &mut Cursor<'_>, body: &str, line: usize) -> Result<(), ParseError> {
    let inner = body
        .strip_prefix('=')
        .and_then(|rest| rest.strip_suffix('='))
        .ok_or_else(|| ParseError::new(line, ParseErrorKind::InvalidDelimiters))?
        .trim();

    if let Some((open, close)) = inner.split_once(char::is_whitespace) {
        let close = close.trim_start();
        if !close.is_empty() {
            cursor.set_delimiters(open, close);
        }
    }
    Ok(())
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    match nodes.last_mut() {
        Some(Node::Text(prev)) => prev.push_str(text),
        _ => nodes.push(Node::Text(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Node {
        Node::Text(s.into())
    }

    fn var(name: &str) -> Node {
        Node::Variable {
            name: name.into(),
            escape: true,
        }
    }

    fn raw(name: &str) -> Node {
        Node::Variable {
            name: name.into(),
            escape: false,
        }
    }

    fn kind(source: &str) -> ParseErrorKind {
        parse(source).unwrap_err().kind
    }

    #[test]
    fn plain_text_only() {
        let parsed = parse("just text").unwrap();
        assert_eq!(parsed.nodes, vec![text("just text")]);
    }

    #[test]
    fn empty_source() {
        assert!(parse("").unwrap().nodes.is_empty());
    }

    #[test]
    fn variables_escaped_and_raw() {
        let parsed = parse("{{a}} {{{b}}} {{& c }} {{{ d }}}").unwrap();
        assert_eq!(
            parsed.nodes,
            vec![
                var("a"),
                text(" "),
                raw("b"),
                text(" "),
                raw("c"),
                text(" "),
                raw("d"),
            ]
        );
    }

    #[test]
    fn comment_dropped() {
        let parsed = parse("a{{! ignore me }}b").unwrap();
        assert_eq!(parsed.nodes, vec![text("ab")]);
    }

    #[test]
    fn nested_sections() {
        let parsed = parse("{{#outer}}{{^inner}}x{{/inner}}{{/outer}}").unwrap();
        assert_eq!(
            parsed.nodes,
            vec![Node::Section {
                name: "outer".into(),
                inverted: false,
                line: 1,
                children: vec![Node::Section {
                    name: "inner".into(),
                    inverted: true,
                    line: 1,
                    children: vec![text("x")],
                }],
            }]
        );
    }

    #[test]
    fn standalone_section_lines_removed() {
        let parsed = parse("start\n  {{#s}}\nbody\n  {{/s}}\nend").unwrap();
        assert_eq!(
            parsed.nodes,
            vec![
                text("start\n"),
                Node::Section {
                    name: "s".into(),
                    inverted: false,
                    line: 2,
                    children: vec![text("body\n")],
                },
                text("end"),
            ]
        );
    }

    #[test]
    fn inline_section_keeps_padding() {
        let parsed = parse("  {{#s}}x{{/s}}\n").unwrap();
        assert_eq!(parsed.nodes[0], text("  "));
    }

    #[test]
    fn standalone_partial_captures_indent() {
        let parsed = parse("a\n  {{> item }}\nb").unwrap();
        assert_eq!(
            parsed.nodes,
            vec![
                text("a\n"),
                Node::Partial {
                    name: "item".into(),
                    indent: "  ".into(),
                },
                text("b"),
            ]
        );
    }

    #[test]
    fn delimiter_change() {
        let parsed = parse("{{=<% %>=}}<% name %>{{literal}}").unwrap();
        assert_eq!(parsed.nodes, vec![var("name"), text("{{literal}}")]);
        assert_eq!(parsed.delimiters, ("<%".to_string(), "%>".to_string()));
    }

    #[test]
    fn delimiter_change_splits_on_whitespace_run() {
        let parsed = parse("{{= [[   ]] =}}[[x]]").unwrap();
        assert_eq!(parsed.nodes, vec![var("x")]);
    }

    #[test]
    fn delimiter_change_with_one_part_is_ignored() {
        let parsed = parse("{{=oops=}}{{x}}").unwrap();
        assert_eq!(parsed.nodes, vec![var("x")]);
    }

    #[test]
    fn section_records_opening_line() {
        let parsed = parse("\n\n{{#s}}x{{/s}}").unwrap();
        match &parsed.nodes[1] {
            Node::Section { line, .. } => assert_eq!(*line, 3),
            other => panic!("expected section, got {:?}", other),
        }
    }

    #[test]
    fn error_unclosed_section_reports_open_line() {
        let err = parse("a\n{{#items}}\nb\nc").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.kind, ParseErrorKind::UnclosedSection("items".into()));
    }

    #[test]
    fn error_unmatched_close() {
        assert_eq!(kind("x{{/items}}"), ParseErrorKind::UnmatchedCloseTag);
    }

    #[test]
    fn error_interleaved_close() {
        assert_eq!(
            kind("{{#a}}{{#b}}{{/a}}{{/b}}"),
            ParseErrorKind::InterleavedCloseTag("a".into())
        );
    }

    #[test]
    fn error_empty_tag() {
        assert_eq!(kind("{{  }}"), ParseErrorKind::EmptyTag);
    }

    #[test]
    fn error_unmatched_open() {
        assert_eq!(kind("Hello {{name"), ParseErrorKind::UnmatchedOpenTag);
    }

    #[test]
    fn error_invalid_delimiters() {
        assert_eq!(kind("{{=<% %>}}"), ParseErrorKind::InvalidDelimiters);
        assert_eq!(kind("{{=}}"), ParseErrorKind::InvalidDelimiters);
    }
}

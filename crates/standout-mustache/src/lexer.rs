//! Cursor over template source.
//!
//! The cursor owns the whole parse position state: byte offset, line counter
//! and the active delimiter pair. The parser drives it with three reads:
//! [`Cursor::read_text`] up to the next open delimiter, [`Cursor::read_tag`]
//! up to the matching close delimiter, and the underlying
//! [`Cursor::read_until`] scan both are built on.

use crate::error::{ParseError, ParseErrorKind};

/// Leading characters of tags that may stand alone on a line.
pub(crate) const BLOCK_SIGILS: &str = "#^/<>=!";

pub(crate) const DEFAULT_OPEN: &str = "{{";
pub(crate) const DEFAULT_CLOSE: &str = "}}";

/// Text read up to an open delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TextSpan<'a> {
    /// Text before the padding.
    pub text: &'a str,
    /// Spaces and tabs between the start of the line and the tag. Empty
    /// unless `may_standalone`.
    pub padding: &'a str,
    /// Only whitespace precedes the tag on its line.
    pub may_standalone: bool,
}

/// Result of scanning for the next tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scan<'a> {
    /// An open delimiter was found; the cursor sits just past it.
    Tag(TextSpan<'a>),
    /// No further tag. Carries the remaining text.
    End(&'a str),
}

/// The body of a tag, delimiters stripped and trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TagRead<'a> {
    pub body: &'a str,
    /// The tag is alone on its line and its line break was consumed.
    pub standalone: bool,
    /// Line the tag ended on, before any line break was consumed.
    pub line: usize,
}

pub(crate) struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    open: String,
    close: String,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            open: DEFAULT_OPEN.to_string(),
            close: DEFAULT_CLOSE.to_string(),
        }
    }

    pub(crate) fn line(&self) -> usize {
        self.line
    }

    pub(crate) fn delimiters(&self) -> (&str, &str) {
        (&self.open, &self.close)
    }

    pub(crate) fn set_delimiters(&mut self, open: &str, close: &str) {
        self.open = open.to_string();
        self.close = close.to_string();
    }

    /// Scans forward for `marker`.
    ///
    /// On success returns the text from the current position through the end
    /// of the marker and moves past it, counting the newlines skipped. When
    /// the marker never occurs, returns the remaining tail as the error and
    /// leaves the cursor where it was.
    pub(crate) fn read_until(&mut self, marker: &str) -> Result<&'a str, &'a str> {
        let rest = &self.src[self.pos..];
        match rest.find(marker) {
            Some(offset) => {
                let end = offset + marker.len();
                self.line += rest[..offset].bytes().filter(|b| *b == b'\n').count();
                self.pos += end;
                Ok(&rest[..end])
            }
            None => Err(rest),
        }
    }

    /// Reads the text before the next open delimiter.
    pub(crate) fn read_text(&mut self) -> Scan<'a> {
        let start = self.pos;
        let open = self.open.clone();
        if let Err(tail) = self.read_until(&open) {
            self.pos = self.src.len();
            return Scan::End(tail);
        }

        let bytes = self.src.as_bytes();
        let tag_start = self.pos - open.len();
        let mut i = tag_start;
        while i > start && matches!(bytes[i - 1], b' ' | b'\t') {
            i -= 1;
        }

        if i == 0 || bytes[i - 1] == b'\n' {
            Scan::Tag(TextSpan {
                text: &self.src[start..i],
                padding: &self.src[i..tag_start],
                may_standalone: true,
            })
        } else {
            Scan::Tag(TextSpan {
                text: &self.src[start..tag_start],
                padding: "",
                may_standalone: false,
            })
        }
    }

    /// Reads a tag body up to the close delimiter.
    ///
    /// A tag opening with `{` is read up to `}` followed by the close
    /// delimiter, so `{{{name}}}` yields the body `{name}`.
    pub(crate) fn read_tag(&mut self, may_standalone: bool) -> Result<TagRead<'a>, ParseError> {
        let close = self.close.clone();
        let marker = if self.src[self.pos..].starts_with('{') {
            format!("}}{close}")
        } else {
            close.clone()
        };

        let raw = self
            .read_until(&marker)
            .map_err(|_| ParseError::new(self.line, ParseErrorKind::UnmatchedOpenTag))?;
        let body = raw[..raw.len() - close.len()].trim();
        if body.is_empty() {
            return Err(ParseError::new(self.line, ParseErrorKind::EmptyTag));
        }

        let line = self.line;
        let standalone = may_standalone
            && body.starts_with(|c: char| BLOCK_SIGILS.contains(c))
            && self.skip_line_end();

        Ok(TagRead {
            body,
            standalone,
            line,
        })
    }

    /// Consumes trailing spaces/tabs and one line break if nothing else
    /// remains on the current line.
    fn skip_line_end(&mut self) -> bool {
        let bytes = self.src.as_bytes();
        let eol = bytes[self.pos..]
            .iter()
            .position(|b| !matches!(b, b' ' | b'\t'))
            .map_or(bytes.len(), |offset| self.pos + offset);

        match &bytes[eol..] {
            [] => {
                self.pos = eol;
                true
            }
            [b'\n', ..] => {
                self.pos = eol + 1;
                self.line += 1;
                true
            }
            [b'\r', b'\n', ..] => {
                self.pos = eol + 2;
                self.line += 1;
                true
            }
            _ => false,
        }
    }
}

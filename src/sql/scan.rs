//! Scanner primitives shared by both tokenizers.
//!
//! Each primitive receives the text and the byte offset of the construct's
//! opening delimiter and returns an [`Extent`]: the offset just past the
//! closing delimiter, or the length of the text when the construct runs off
//! the end. None of them fail; deciding what an unclosed construct means is
//! up to the caller.

/// Where a skipped construct ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    /// Offset one past the construct (or the text length when unclosed).
    pub end: usize,
    /// False when the text ended before the closing delimiter.
    pub closed: bool,
}

impl Extent {
    const fn closed(end: usize) -> Self {
        Self { end, closed: true }
    }

    const fn open(end: usize) -> Self {
        Self { end, closed: false }
    }
}

/// A construct that can be left open at the end of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Construct {
    #[display("string literal")]
    StringLiteral,
    #[display("quoted identifier")]
    QuotedIdentifier,
    #[display("bracketed identifier")]
    BracketedIdentifier,
    #[display("block comment")]
    BlockComment,
    #[display("here document")]
    HereDocument,
}

impl Construct {
    /// The delimiter that would close the construct.
    pub const fn closing(self) -> &'static str {
        match self {
            Construct::StringLiteral => "'",
            Construct::QuotedIdentifier => "\"",
            Construct::BracketedIdentifier => "]",
            Construct::BlockComment => "*/",
            Construct::HereDocument => "$$",
        }
    }
}

/// Characters that make up identifiers, keywords and variable names.
pub fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

pub(crate) fn char_at(text: &str, idx: usize) -> Option<char> {
    text.get(idx..).and_then(|rest| rest.chars().next())
}

/// Skips a `'...'` or `"..."` construct starting at `start`.
///
/// A doubled delimiter (`''` inside `'...'`) is an escaped delimiter and does
/// not close the construct.
pub fn quoted(text: &str, start: usize) -> Extent {
    let bytes = text.as_bytes();
    let quote = bytes[start];
    let mut idx = start + 1;
    while idx < bytes.len() {
        if bytes[idx] == quote {
            if bytes.get(idx + 1) == Some(&quote) {
                idx += 2;
                continue;
            }
            return Extent::closed(idx + 1);
        }
        idx += 1;
    }
    Extent::open(bytes.len())
}

/// Skips a `[...]` identifier; `]]` inside it is an escaped `]`.
pub fn bracketed(text: &str, start: usize) -> Extent {
    let bytes = text.as_bytes();
    let mut idx = start + 1;
    while idx < bytes.len() {
        if bytes[idx] == b']' {
            if bytes.get(idx + 1) == Some(&b']') {
                idx += 2;
                continue;
            }
            return Extent::closed(idx + 1);
        }
        idx += 1;
    }
    Extent::open(bytes.len())
}

/// Skips a `--` comment up to (not including) the newline.
///
/// A line comment is always closed; running into the end of the text simply
/// ends the line.
pub fn line_comment(text: &str, start: usize) -> Extent {
    let end = text[start..]
        .find('\n')
        .map_or(text.len(), |offset| start + offset);
    Extent::closed(end)
}

/// Skips a `/* ... */` comment. Comments do not nest.
pub fn block_comment(text: &str, start: usize) -> Extent {
    match text[start + 2..].find("*/") {
        Some(offset) => Extent::closed(start + 2 + offset + 2),
        None => Extent::open(text.len()),
    }
}

/// Skips a variable reference: the sigil at `start` plus a maximal run of
/// identifier characters. Always closed.
pub fn variable(text: &str, start: usize) -> Extent {
    let sigil_len = char_at(text, start).map_or(1, char::len_utf8);
    let body = start + sigil_len;
    let end = text[body..]
        .char_indices()
        .find(|&(_, ch)| !is_ident_char(ch))
        .map_or(text.len(), |(offset, _)| body + offset);
    Extent::closed(end)
}

/// Skips a `$$ ... $$` here-document.
pub fn here_document(text: &str, start: usize) -> Extent {
    match text[start + 2..].find("$$") {
        Some(offset) => Extent::closed(start + 2 + offset + 2),
        None => Extent::open(text.len()),
    }
}

/// True when `text[idx..]` starts a `--` comment.
pub(crate) fn starts_line_comment(text: &str, idx: usize) -> bool {
    text.as_bytes().get(idx..idx + 2) == Some(b"--")
}

/// True when `text[idx..]` starts a `/*` comment.
pub(crate) fn starts_block_comment(text: &str, idx: usize) -> bool {
    text.as_bytes().get(idx..idx + 2) == Some(b"/*")
}

//! Token model tying a keyword-stream `TokenKind` to its source span.
//!
//! Offsets are byte offsets into the buffer handed to the tokenizer, so the
//! boundary detector can report exactly where the terminator sits.
use crate::sql::{keyword::Keyword, token_kind::TokenKind};

/// A keyword-stream token covering `sql[start..end]`.
///
/// Placeholders cover the whole literal, identifier or variable they stand
/// for, quotes included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub const fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }

    /// Bytes of source the token covers.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn word(&self) -> Option<&str> {
        self.kind.word()
    }

    pub fn is_word(&self, expected: &str) -> bool {
        self.kind.is_word(expected)
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind.is_keyword(keyword)
    }

    pub fn is_terminator(&self) -> bool {
        self.kind.is_terminator()
    }

    pub const fn span(&self) -> (usize, usize) {
        (self.start, self.end)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.kind.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::token_kind::Placeholder;

    #[test]
    fn punctuation_is_one_byte() {
        let t = Token::new(TokenKind::Punct(','), 5, 6);
        assert_eq!(t.len(), 1);
        assert!(!t.is_empty());
        assert_eq!(t.span(), (5, 6));
    }

    #[test]
    fn placeholder_spans_whole_construct() {
        let t = Token::new(TokenKind::Placeholder(Placeholder::StringLiteral), 0, 9);
        assert_eq!(t.len(), 9);
        assert_eq!(t.word(), None);
        assert_eq!(t.to_string(), Placeholder::STRING_LITERAL);
    }

    #[test]
    fn words_match_keywords() {
        let t = Token::new(TokenKind::Word("END".into()), 0, 3);
        assert!(t.is_keyword(Keyword::End));
        assert!(t.is_word("end"));
        assert!(!t.is_terminator());
    }
}

//! Token kind definitions for the keyword tokenizer.
//!
//! The keyword stream only has to be good enough to find keywords and the
//! statement terminator, so the content of literals, quoted identifiers and
//! variables is dropped and replaced with a [`Placeholder`]. Comments and
//! whitespace produce nothing at all.

use crate::sql::keyword::Keyword;

/// Stands in for a construct whose content does not matter to keyword
/// matching; only the fact that something occupied the span does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Placeholder {
    /// `'...'` or a `$$ ... $$` here-document.
    #[display("__STRING_LITERAL__")]
    StringLiteral,
    /// `"..."` or `[...]`.
    #[display("__QUOTED_IDENTIFIER__")]
    QuotedIdentifier,
    /// `@name`, or `$name` when dollar quoting is enabled.
    #[display("__VARIABLE__")]
    Variable,
}

impl Placeholder {
    pub const STRING_LITERAL: &'static str = "__STRING_LITERAL__";
    pub const QUOTED_IDENTIFIER: &'static str = "__QUOTED_IDENTIFIER__";
    pub const VARIABLE: &'static str = "__VARIABLE__";

    pub const fn as_str(self) -> &'static str {
        match self {
            Placeholder::StringLiteral => Self::STRING_LITERAL,
            Placeholder::QuotedIdentifier => Self::QUOTED_IDENTIFIER,
            Placeholder::Variable => Self::VARIABLE,
        }
    }
}

/// Classification for a token produced by the keyword tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Keyword or identifier, case-normalized per the tokenizer options.
    Word(String),
    /// The configured statement terminator.
    Terminator(char),
    /// Opaque stand-in for a literal, quoted identifier or variable.
    Placeholder(Placeholder),
    /// Any other single character (`(`, `,`, `*`, ...).
    Punct(char),
}

impl TokenKind {
    /// The word text if this is a `Word`.
    pub fn word(&self) -> Option<&str> {
        match self {
            TokenKind::Word(w) => Some(w.as_str()),
            _ => None,
        }
    }

    /// True if this is a word spelled like `expected`, ignoring ASCII case.
    pub fn is_word(&self, expected: &str) -> bool {
        self.word().is_some_and(|w| w.eq_ignore_ascii_case(expected))
    }

    /// True if this is a word spelling the given keyword.
    pub fn is_keyword(&self, kw: Keyword) -> bool {
        self.is_word(kw.as_str())
    }

    pub fn is_terminator(&self) -> bool {
        matches!(self, TokenKind::Terminator(_))
    }

    pub fn is_punct(&self, ch: char) -> bool {
        matches!(self, TokenKind::Punct(c) if *c == ch)
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Word(w) => f.write_str(w),
            TokenKind::Terminator(ch) | TokenKind::Punct(ch) => write!(f, "{ch}"),
            TokenKind::Placeholder(p) => f.write_str(p.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_detection_ignores_case() {
        let tk = TokenKind::Word("begin".into());
        assert!(tk.is_keyword(Keyword::Begin));
        assert!(!tk.is_keyword(Keyword::End));
        assert!(TokenKind::Word("BEGIN".into()).is_word("Begin"));
    }

    #[test]
    fn word_access() {
        assert_eq!(TokenKind::Word("T1".into()).word(), Some("T1"));
        assert_eq!(TokenKind::Punct('(').word(), None);
        assert!(!TokenKind::Placeholder(Placeholder::StringLiteral).is_word(Placeholder::STRING_LITERAL));
    }

    #[test]
    fn terminator_and_punct() {
        assert!(TokenKind::Terminator(';').is_terminator());
        assert!(!TokenKind::Punct(';').is_terminator());
        assert!(TokenKind::Punct('(').is_punct('('));
        assert!(!TokenKind::Punct('(').is_punct(')'));
    }

    #[test]
    fn display_uses_sentinels() {
        assert_eq!(
            TokenKind::Placeholder(Placeholder::Variable).to_string(),
            "__VARIABLE__"
        );
        assert_eq!(Placeholder::QuotedIdentifier.to_string(), Placeholder::QUOTED_IDENTIFIER);
        assert_eq!(TokenKind::Terminator('/').to_string(), "/");
        assert_eq!(TokenKind::Word("SELECT".into()).to_string(), "SELECT");
    }
}

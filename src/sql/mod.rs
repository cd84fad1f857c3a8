//! Lenient SQL scanning: just enough lexing to find statement boundaries.
//!
//! Nothing here parses SQL. The goal is to step over every construct that can
//! hide a terminator (string literals, quoted and bracketed identifiers,
//! variables, comments) and to surface keywords so the analyzers can follow
//! scripting blocks.
//!
//! Modules:
//! - `scan`       : Cursor-based primitives that skip one construct each.
//! - `keyword`    : The keywords the analyzers react to.
//! - `token_kind` : Classification of keyword-stream tokens, incl. placeholders.
//! - `token`      : Token struct pairing a `TokenKind` with its span.
//! - `tokenizer`  : `KeywordTokenizer` with pushback, peek and `skip_words`.
//! - `analyzer`   : Per-dialect terminator analysis on top of the tokenizer.
//!
//! Example:
//! ```rust
//! use sqlsh::sql::prelude::*;
//!
//! let mut tokens = KeywordTokenizer::new("select 'a;b' from t;", ';');
//! assert!(tokens.next().is_some_and(|t| t.is_word("SELECT")));
//! assert!(AnsiAnalyzer.is_terminated("select 'a;b' from t;", ';'));
//! ```
//!
//! NOTE: The tokenizer never fails. Input that ends inside a literal or a
//! block comment is reported through `unclosed()` rather than as an error,
//! because for an interactive console that simply means "keep reading".

pub mod analyzer;
pub mod keyword;
pub mod scan;
pub mod token;
pub mod token_kind;
pub mod tokenizer;

pub use analyzer::{Analysis, Analyzer, AnalyzerKind, AnsiAnalyzer, SnowflakeAnalyzer};
pub use keyword::Keyword;
pub use scan::Construct;
pub use token::Token;
pub use token_kind::{Placeholder, TokenKind};
pub use tokenizer::{Case, KeywordTokenizer, Options};

/// Convenience prelude re-exporting the most commonly used items.
pub mod prelude {
    pub use super::{
        Analyzer, AnalyzerKind, AnsiAnalyzer, Construct, Keyword, KeywordTokenizer, Placeholder,
        SnowflakeAnalyzer, Token, TokenKind,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn tokenize_and_analyze() {
        let sql = "select [a;b], @c from t; -- trailing";
        let words: Vec<String> = KeywordTokenizer::new(sql, ';')
            .filter_map(|t| t.word().map(str::to_string))
            .collect();
        assert_eq!(words, ["SELECT", "FROM", "T"]);
        assert_eq!(AnsiAnalyzer.analyze(sql, ';').terminator, Some(23));
    }

    #[test]
    fn prelude_import_works() {
        let mut tokens = KeywordTokenizer::new("BEGIN", ';');
        assert!(tokens.peek().is_some_and(|t| t.is_keyword(Keyword::Begin)));
        assert_eq!(AnalyzerKind::default().analyzer().name(), "ANSI SQL");
    }
}

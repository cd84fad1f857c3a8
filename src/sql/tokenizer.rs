use crate::{
    sql::{
        scan::{self, Construct, char_at, is_ident_char},
        token::Token,
        token_kind::{Placeholder, TokenKind},
    },
    trace,
};

/// How words are normalized before being returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Case {
    #[default]
    Upper,
    Lower,
    Preserve,
}

impl Case {
    fn apply(self, word: &str) -> String {
        match self {
            Case::Upper => word.to_uppercase(),
            Case::Lower => word.to_lowercase(),
            Case::Preserve => word.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub terminator: char,
    pub case: Case,
    /// Recognize `$name` variables and `$$ ... $$` here-documents.
    pub dollar_quoting: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self::new(';')
    }
}

impl Options {
    pub const fn new(terminator: char) -> Self {
        Self {
            terminator,
            case: Case::Upper,
            dollar_quoting: false,
        }
    }

    pub const fn with_case(mut self, case: Case) -> Self {
        self.case = case;
        self
    }

    pub const fn with_dollar_quoting(mut self, dollar_quoting: bool) -> Self {
        self.dollar_quoting = dollar_quoting;
        self
    }
}

/// Walks a SQL buffer yielding keywords and the statement terminator while
/// stepping over everything that could hide a terminator.
///
/// Behavior:
/// - Whitespace, `--` comments and `/* */` comments produce no tokens.
/// - The terminator is returned on its own, even when it would otherwise be
///   an identifier character.
/// - String literals, quoted or bracketed identifiers and variables come back
///   as a [`Placeholder`] covering the whole construct.
/// - Runs of `[letters, digits, _]` come back as case-normalized words; any
///   other character comes back alone as punctuation.
///
/// Tokens can be pushed back with [`unget`](Self::unget), which gives the
/// analyzers arbitrary lookahead. Never fails: a construct left open at the
/// end of the buffer is recorded and reported by [`unclosed`](Self::unclosed).
///
/// Complexity: O(n) over the buffer, each byte is visited once.
#[derive(Debug, Clone)]
pub struct KeywordTokenizer<'a> {
    sql: &'a str,
    idx: usize,
    options: Options,
    pushback: Vec<Token>,
    unclosed: Option<Construct>,
}

impl<'a> KeywordTokenizer<'a> {
    /// Tokenizer with default options and the given terminator.
    pub fn new(sql: &'a str, terminator: char) -> Self {
        Self::with_options(sql, Options::new(terminator))
    }

    pub fn with_options(sql: &'a str, options: Options) -> Self {
        Self {
            sql,
            idx: 0,
            options,
            pushback: Vec::new(),
            unclosed: None,
        }
    }

    /// Rebinds the tokenizer to a new buffer, keeping its options.
    pub fn reset(&mut self, sql: &'a str) {
        self.sql = sql;
        self.idx = 0;
        self.pushback.clear();
        self.unclosed = None;
    }

    pub fn options(&self) -> Options {
        self.options
    }

    /// Scan cursor. Pushed back tokens are not accounted for.
    pub fn cursor(&self) -> usize {
        self.idx
    }

    /// The construct that ran to the end of the buffer without closing.
    pub fn unclosed(&self) -> Option<Construct> {
        self.unclosed
    }

    /// Pushes a previously returned token back; it is the next one returned.
    pub fn unget(&mut self, token: Token) {
        self.pushback.push(token);
    }

    /// The next token without consuming it.
    pub fn peek(&mut self) -> Option<Token> {
        let token = self.next()?;
        self.pushback.push(token.clone());
        Some(token)
    }

    /// Consumes `expected` words in order, all or nothing.
    ///
    /// On the first mismatch every token read by this call is pushed back so
    /// the stream reads exactly as it did before, and `false` is returned.
    pub fn skip_words<W: AsRef<str>>(&mut self, expected: &[W]) -> bool {
        let mut matched = Vec::with_capacity(expected.len());
        for word in expected {
            match self.next() {
                Some(token) if token.is_word(word.as_ref()) => matched.push(token),
                mismatch => {
                    self.pushback.extend(mismatch);
                    self.pushback.extend(matched.into_iter().rev());
                    return false;
                }
            }
        }
        true
    }

    /// Consumes whatever is left of the buffer.
    pub fn drain(&mut self) {
        while self.next().is_some() {}
    }

    fn skip_insignificant(&mut self) {
        while let Some(ch) = char_at(self.sql, self.idx) {
            if ch == self.options.terminator {
                break;
            }
            if ch.is_whitespace() {
                self.idx += ch.len_utf8();
            } else if scan::starts_line_comment(self.sql, self.idx) {
                self.idx = scan::line_comment(self.sql, self.idx).end;
            } else if scan::starts_block_comment(self.sql, self.idx) {
                let extent = scan::block_comment(self.sql, self.idx);
                self.record(extent, Construct::BlockComment);
            } else {
                break;
            }
        }
    }

    fn record(&mut self, extent: scan::Extent, construct: Construct) {
        if !extent.closed {
            self.unclosed = Some(construct);
        }
        self.idx = extent.end;
    }

    fn placeholder(&mut self, extent: scan::Extent, construct: Construct, kind: Placeholder) -> TokenKind {
        self.record(extent, construct);
        TokenKind::Placeholder(kind)
    }

    fn scan(&mut self) -> Option<Token> {
        self.skip_insignificant();
        let start = self.idx;
        let ch = char_at(self.sql, start)?;

        let kind = match ch {
            _ if ch == self.options.terminator => {
                self.idx += ch.len_utf8();
                TokenKind::Terminator(ch)
            }
            '\'' => {
                let extent = scan::quoted(self.sql, start);
                self.placeholder(extent, Construct::StringLiteral, Placeholder::StringLiteral)
            }
            '"' => {
                let extent = scan::quoted(self.sql, start);
                self.placeholder(extent, Construct::QuotedIdentifier, Placeholder::QuotedIdentifier)
            }
            '[' => {
                let extent = scan::bracketed(self.sql, start);
                self.placeholder(extent, Construct::BracketedIdentifier, Placeholder::QuotedIdentifier)
            }
            '@' => {
                self.idx = scan::variable(self.sql, start).end;
                TokenKind::Placeholder(Placeholder::Variable)
            }
            '$' if self.options.dollar_quoting => {
                if char_at(self.sql, start + 1) == Some('$') {
                    let extent = scan::here_document(self.sql, start);
                    self.placeholder(extent, Construct::HereDocument, Placeholder::StringLiteral)
                } else {
                    self.idx = scan::variable(self.sql, start).end;
                    TokenKind::Placeholder(Placeholder::Variable)
                }
            }
            _ if !is_ident_char(ch) => {
                self.idx += ch.len_utf8();
                TokenKind::Punct(ch)
            }
            _ => {
                let sql = self.sql;
                let rest = &sql[start..];
                let len = rest
                    .char_indices()
                    .find(|&(_, c)| !is_ident_char(c) || c == self.options.terminator)
                    .map_or(rest.len(), |(offset, _)| offset);
                self.idx = start + len;
                TokenKind::Word(self.options.case.apply(&rest[..len]))
            }
        };

        Some(Token::new(kind, start, self.idx))
    }
}

impl Iterator for KeywordTokenizer<'_> {
    type Item = Token;

    /// Returns pushed back tokens first, then scans.
    fn next(&mut self) -> Option<Token> {
        if let Some(token) = self.pushback.pop() {
            return Some(token);
        }
        let token = self.scan()?;
        trace!(?token, "keyword token");
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn kinds(sql: &str, options: Options) -> Vec<TokenKind> {
        KeywordTokenizer::with_options(sql, options)
            .map(|t| t.kind)
            .collect()
    }

    fn word(w: &str) -> TokenKind {
        TokenKind::Word(w.into())
    }

    #[test]
    fn terminator_inside_string_is_skipped() {
        let sql = "select 'a;b' from t;";
        let tokens: Vec<Token> = KeywordTokenizer::new(sql, ';').collect();
        let terminators: Vec<&Token> = tokens.iter().filter(|t| t.is_terminator()).collect();
        assert_eq!(terminators.len(), 1);
        assert_eq!(terminators[0].start, sql.len() - 1);
        assert_eq!(
            tokens.iter().map(|t| t.kind.clone()).collect::<Vec<_>>(),
            vec![
                word("SELECT"),
                TokenKind::Placeholder(Placeholder::StringLiteral),
                word("FROM"),
                word("T"),
                TokenKind::Terminator(';'),
            ]
        );
    }

    #[test]
    fn doubled_quote_is_one_placeholder() {
        let sql = "'O''Brien' x";
        let mut tokenizer = KeywordTokenizer::new(sql, ';');
        let token = tokenizer.next().unwrap();
        assert_eq!(token.kind, TokenKind::Placeholder(Placeholder::StringLiteral));
        assert_eq!(token.span(), (0, 10));
        assert_eq!(tokenizer.cursor(), 10);
        assert_eq!(tokenizer.unclosed(), None);
    }

    #[rstest]
    #[case("-- a;\nselect;", vec![word("SELECT"), TokenKind::Terminator(';')])]
    #[case("/* a; */ x;", vec![word("X"), TokenKind::Terminator(';')])]
    #[case("a - b / c", vec![word("A"), TokenKind::Punct('-'), word("B"), TokenKind::Punct('/'), word("C")])]
    #[case("[x;y] \"z;\" @v;", vec![
        TokenKind::Placeholder(Placeholder::QuotedIdentifier),
        TokenKind::Placeholder(Placeholder::QuotedIdentifier),
        TokenKind::Placeholder(Placeholder::Variable),
        TokenKind::Terminator(';'),
    ])]
    #[case("count(*)", vec![word("COUNT"), TokenKind::Punct('('), TokenKind::Punct('*'), TokenKind::Punct(')')])]
    #[case("t1.c_2", vec![word("T1"), TokenKind::Punct('.'), word("C_2")])]
    #[case("", vec![])]
    #[case("   \n\t", vec![])]
    fn keyword_stream(#[case] sql: &str, #[case] expected: Vec<TokenKind>) {
        assert_eq!(kinds(sql, Options::default()), expected);
    }

    #[rstest]
    #[case("'open", Construct::StringLiteral)]
    #[case("select \"open", Construct::QuotedIdentifier)]
    #[case("[open", Construct::BracketedIdentifier)]
    #[case("x; /* open", Construct::BlockComment)]
    fn reports_unclosed_constructs(#[case] sql: &str, #[case] construct: Construct) {
        let mut tokenizer = KeywordTokenizer::new(sql, ';');
        tokenizer.drain();
        assert_eq!(tokenizer.unclosed(), Some(construct));
        assert_eq!(tokenizer.cursor(), sql.len());
    }

    #[test]
    fn dangling_line_comment_is_not_unclosed() {
        let mut tokenizer = KeywordTokenizer::new("select 1 -- done", ';');
        tokenizer.drain();
        assert_eq!(tokenizer.unclosed(), None);
    }

    #[test]
    fn terminator_that_is_an_identifier_character() {
        assert_eq!(
            kinds("abc", Options::new('b')),
            vec![word("A"), TokenKind::Terminator('b'), word("C")]
        );
    }

    #[test]
    fn terminator_that_starts_a_comment() {
        assert_eq!(
            kinds("x -- y", Options::new('-')),
            vec![
                word("X"),
                TokenKind::Terminator('-'),
                TokenKind::Terminator('-'),
                word("Y")
            ]
        );
    }

    #[rstest]
    #[case(Case::Upper, "SELECT")]
    #[case(Case::Lower, "select")]
    #[case(Case::Preserve, "SeLeCt")]
    fn case_normalization(#[case] case: Case, #[case] expected: &str) {
        assert_eq!(
            kinds("SeLeCt", Options::default().with_case(case)),
            vec![word(expected)]
        );
    }

    #[test]
    fn unicode_identifiers_are_words() {
        assert_eq!(
            kinds("café; ü", Options::default()),
            vec![word("CAFÉ"), TokenKind::Terminator(';'), word("Ü")]
        );
    }

    #[test]
    fn dollar_quoting_only_when_enabled() {
        let sql = "$$ a; $$ $x;";
        assert_eq!(
            kinds(sql, Options::default().with_dollar_quoting(true)),
            vec![
                TokenKind::Placeholder(Placeholder::StringLiteral),
                TokenKind::Placeholder(Placeholder::Variable),
                TokenKind::Terminator(';'),
            ]
        );
        assert_eq!(
            kinds(sql, Options::default()),
            vec![
                TokenKind::Punct('$'),
                TokenKind::Punct('$'),
                word("A"),
                TokenKind::Terminator(';'),
                TokenKind::Punct('$'),
                TokenKind::Punct('$'),
                TokenKind::Punct('$'),
                word("X"),
                TokenKind::Terminator(';'),
            ]
        );
    }

    #[test]
    fn unclosed_here_document() {
        let mut tokenizer =
            KeywordTokenizer::with_options("$$ a;", Options::default().with_dollar_quoting(true));
        tokenizer.drain();
        assert_eq!(tokenizer.unclosed(), Some(Construct::HereDocument));
    }

    #[test]
    fn peek_does_not_advance() {
        let mut tokenizer = KeywordTokenizer::new("select x", ';');
        let first = tokenizer.peek();
        let second = tokenizer.peek();
        assert_eq!(first, second);
        assert_eq!(tokenizer.next(), first);
        assert!(tokenizer.next().unwrap().is_word("X"));
        assert_eq!(tokenizer.peek(), None);
    }

    #[test]
    fn unget_is_lifo() {
        let mut tokenizer = KeywordTokenizer::new("a b c", ';');
        let a = tokenizer.next().unwrap();
        let b = tokenizer.next().unwrap();
        tokenizer.unget(b.clone());
        tokenizer.unget(a.clone());
        assert_eq!(tokenizer.next(), Some(a));
        assert_eq!(tokenizer.next(), Some(b));
        assert!(tokenizer.next().unwrap().is_word("C"));
    }

    #[test]
    fn skip_restores_stream_on_mismatch() {
        let mut tokenizer = KeywordTokenizer::new("SELECT X", ';');
        assert!(!tokenizer.skip_words(&["SELECT", "FROM"]));
        assert!(tokenizer.peek().unwrap().is_word("SELECT"));
        assert!(tokenizer.next().unwrap().is_word("SELECT"));
        assert!(tokenizer.next().unwrap().is_word("X"));
        assert_eq!(tokenizer.next(), None);
    }

    #[test]
    fn skip_restores_stream_at_end_of_input() {
        let mut tokenizer = KeywordTokenizer::new("or", ';');
        assert!(!tokenizer.skip_words(&["OR", "REPLACE"]));
        assert!(tokenizer.next().unwrap().is_word("OR"));
        assert_eq!(tokenizer.next(), None);
    }

    #[test]
    fn skip_consumes_on_match() {
        let mut tokenizer = KeywordTokenizer::new("create or replace procedure", ';');
        assert!(tokenizer.skip_words(&["CREATE"]));
        assert!(tokenizer.skip_words(&["or", "Replace"]));
        assert!(!tokenizer.skip_words(&["SECURE"]));
        assert!(tokenizer.next().unwrap().is_word("PROCEDURE"));
    }

    #[test]
    fn reset_rebinds_and_clears_state() {
        let mut tokenizer = KeywordTokenizer::new("'open", ';');
        let token = tokenizer.next().unwrap();
        tokenizer.unget(token);
        tokenizer.reset("done;");
        assert_eq!(tokenizer.unclosed(), None);
        assert_eq!(tokenizer.cursor(), 0);
        assert!(tokenizer.next().unwrap().is_word("DONE"));
        assert!(tokenizer.next().unwrap().is_terminator());
    }
}

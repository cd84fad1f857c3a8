//! Terminator analyzers.
//!
//! An analyzer decides where (if anywhere) a buffer's statement terminator
//! sits. Plain SQL only needs the terminator to be outside literals and
//! comments; scripting dialects also nest terminated statements inside
//! blocks, and those terminators must not end the batch.
use crate::sql::{
    keyword::Keyword,
    scan::Construct,
    token::Token,
    tokenizer::{KeywordTokenizer, Options},
};
use std::str::FromStr;

/// Outcome of analyzing one buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Analysis {
    /// Byte offset of the terminator that ends the statement.
    pub terminator: Option<usize>,
    /// A construct still open at the end of the buffer.
    pub unclosed: Option<Construct>,
}

impl Analysis {
    pub fn is_terminated(&self) -> bool {
        self.terminator.is_some()
    }
}

pub trait Analyzer {
    fn name(&self) -> &'static str;

    /// Locates the statement terminator in `sql`. Always scans the whole
    /// buffer so `unclosed` reflects all of it.
    fn analyze(&self, sql: &str, terminator: char) -> Analysis;

    fn is_terminated(&self, sql: &str, terminator: char) -> bool {
        self.analyze(sql, terminator).is_terminated()
    }
}

fn finish(mut tokens: KeywordTokenizer<'_>, terminator: Option<usize>) -> Analysis {
    tokens.drain();
    Analysis {
        terminator,
        unclosed: tokens.unclosed(),
    }
}

/// The terminator is the first one outside a string, quoted identifier,
/// variable name or comment.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiAnalyzer;

impl Analyzer for AnsiAnalyzer {
    fn name(&self) -> &'static str {
        "ANSI SQL"
    }

    fn analyze(&self, sql: &str, terminator: char) -> Analysis {
        let mut tokens = KeywordTokenizer::new(sql, terminator);
        let position = tokens.find(Token::is_terminator).map(|t| t.start);
        finish(tokens, position)
    }
}

/// Snowflake SQL including Snowflake Scripting blocks.
///
/// A block can only appear in two places: as an anonymous block that opens
/// the batch with `DECLARE` or `BEGIN`, or as the body of a
/// `CREATE PROCEDURE ... AS` whose language is SQL. Terminators inside such
/// blocks are statement separators of the script, not of the batch.
/// `$$ ... $$` bodies are opaque literals.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnowflakeAnalyzer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Case,
    If,
    Do,
    Loop,
    Repeat,
    Begin,
}

impl Analyzer for SnowflakeAnalyzer {
    fn name(&self) -> &'static str {
        "Snowflake"
    }

    fn analyze(&self, sql: &str, terminator: char) -> Analysis {
        let mut tokens =
            KeywordTokenizer::with_options(sql, Options::new(terminator).with_dollar_quoting(true));

        if opens_anonymous_block(&mut tokens) && !seek_end_of_script(&mut tokens) {
            return finish(tokens, None);
        }

        while let Some(token) = tokens.next() {
            if token.is_terminator() {
                return finish(tokens, Some(token.start));
            }
            if token.is_keyword(Keyword::Create) {
                skip_create(&mut tokens);
            }
        }
        finish(tokens, None)
    }
}

fn keyword(token: &Token) -> Option<Keyword> {
    token.word().and_then(Keyword::from_word)
}

fn peek_keyword(tokens: &mut KeywordTokenizer<'_>) -> Option<Keyword> {
    tokens.peek().as_ref().and_then(keyword)
}

/// Consumes the next token if it is `kw`.
fn next_is(tokens: &mut KeywordTokenizer<'_>, kw: Keyword) -> bool {
    tokens.skip_words(&[kw])
}

fn opens_anonymous_block(tokens: &mut KeywordTokenizer<'_>) -> bool {
    let Some(first) = tokens.next() else {
        return false;
    };
    let opens = match keyword(&first) {
        Some(Keyword::Declare) => true,
        Some(Keyword::Begin) => is_begin_block(tokens),
        _ => false,
    };
    tokens.unget(first);
    opens
}

/// Called with `BEGIN` consumed; rules out `BEGIN TRANSACTION` and friends.
fn is_begin_block(tokens: &mut KeywordTokenizer<'_>) -> bool {
    !peek_keyword(tokens).is_some_and(|kw| Keyword::BEGIN_TRANSACTION.contains(&kw))
}

/// `CREATE` has been consumed. Skips over a procedure header and, when the
/// body is a SQL block, the block itself.
fn skip_create(tokens: &mut KeywordTokenizer<'_>) {
    // CREATE [ OR REPLACE ] [ SECURE ] [ TEMP | TEMPORARY ] PROCEDURE
    tokens.skip_words(&[Keyword::Or, Keyword::Replace]);
    tokens.skip_words(&[Keyword::Secure]);
    if !tokens.skip_words(&[Keyword::Temp]) {
        tokens.skip_words(&[Keyword::Temporary]);
    }

    // Functions cannot hold a naked block.
    if next_is(tokens, Keyword::Function) || !next_is(tokens, Keyword::Procedure) {
        return;
    }

    let mut is_sql = true;
    let mut found_as = false;
    while let Some(token) = tokens.next() {
        if token.is_terminator() {
            tokens.unget(token);
            return;
        }
        match keyword(&token) {
            Some(Keyword::Execute) => {
                next_is(tokens, Keyword::As);
            }
            Some(Keyword::Language) => {
                is_sql = tokens.next().is_some_and(|t| t.is_keyword(Keyword::Sql));
            }
            Some(Keyword::As) => {
                found_as = true;
                break;
            }
            _ => {}
        }
    }

    if found_as
        && is_sql
        && matches!(peek_keyword(tokens), Some(Keyword::Declare | Keyword::Begin))
    {
        seek_end_of_script(tokens);
    }
}

/// Consumes a script up to the `END` closing its outermost block. False when
/// the buffer ends first.
fn seek_end_of_script(tokens: &mut KeywordTokenizer<'_>) -> bool {
    let mut blocks: Vec<Block> = Vec::new();

    while let Some(token) = tokens.next() {
        let Some(kw) = keyword(&token) else {
            continue;
        };
        match kw {
            Keyword::Create => skip_create(tokens),
            // CASE [ (expr) ] WHEN ... END [ CASE ]
            Keyword::Case => {
                skip_parens(tokens);
                if next_is(tokens, Keyword::When) {
                    blocks.push(Block::Case);
                }
            }
            Keyword::Begin => {
                if is_begin_block(tokens) {
                    blocks.push(Block::Begin);
                }
            }
            // IF (expr) ... END IF
            Keyword::If => {
                if skip_parens(tokens) {
                    blocks.push(Block::If);
                }
            }
            // { FOR | WHILE } ... DO ... END { FOR | WHILE }
            Keyword::Do => blocks.push(Block::Do),
            // [ { FOR | WHILE } ... ] LOOP ... END LOOP
            Keyword::Loop => blocks.push(Block::Loop),
            // REPEAT ... UNTIL (expr) END REPEAT
            Keyword::Repeat => blocks.push(Block::Repeat),
            Keyword::End => {
                let Some(&block) = blocks.last() else {
                    continue;
                };
                if closes(block, tokens) {
                    blocks.pop();
                    if blocks.is_empty() {
                        return true;
                    }
                }
            }
            // A DECLARE section must be followed by the block it declares for.
            Keyword::Declare => {
                if !seek_begin(tokens) {
                    return false;
                }
            }
            _ => {}
        }
    }

    blocks.is_empty()
}

/// `END` has been consumed; consumes whatever qualifies it for `block`.
fn closes(block: Block, tokens: &mut KeywordTokenizer<'_>) -> bool {
    match block {
        Block::Case => {
            next_is(tokens, Keyword::Case);
            true
        }
        Block::If => next_is(tokens, Keyword::If),
        Block::Repeat => next_is(tokens, Keyword::Repeat),
        Block::Do => next_is(tokens, Keyword::For) || next_is(tokens, Keyword::While),
        Block::Loop => next_is(tokens, Keyword::Loop),
        Block::Begin => !matches!(
            peek_keyword(tokens),
            Some(Keyword::If | Keyword::Case | Keyword::For | Keyword::Loop)
        ),
    }
}

/// Skips a parenthesized expression including nested parens. Leaves the
/// stream untouched when it does not start with `(`.
fn skip_parens(tokens: &mut KeywordTokenizer<'_>) -> bool {
    match tokens.next() {
        Some(token) if token.kind.is_punct('(') => {}
        other => {
            if let Some(token) = other {
                tokens.unget(token);
            }
            return false;
        }
    }

    let mut depth = 1usize;
    for token in tokens.by_ref() {
        if token.kind.is_punct('(') {
            depth += 1;
        } else if token.kind.is_punct(')') {
            depth -= 1;
            if depth == 0 {
                return true;
            }
        }
    }
    false
}

/// Scans forward to a block-opening `BEGIN` and leaves it unread.
fn seek_begin(tokens: &mut KeywordTokenizer<'_>) -> bool {
    while let Some(token) = tokens.next() {
        if token.is_keyword(Keyword::Begin) && is_begin_block(tokens) {
            tokens.unget(token);
            return true;
        }
    }
    false
}

/// Analyzer selection, as named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, derive_more::Display)]
pub enum AnalyzerKind {
    #[default]
    #[display("ansi")]
    Ansi,
    #[display("snowflake")]
    Snowflake,
}

impl AnalyzerKind {
    pub fn analyzer(self) -> &'static dyn Analyzer {
        match self {
            AnalyzerKind::Ansi => &AnsiAnalyzer,
            AnalyzerKind::Snowflake => &SnowflakeAnalyzer,
        }
    }
}

impl FromStr for AnalyzerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ansi" => Ok(AnalyzerKind::Ansi),
            "snowflake" => Ok(AnalyzerKind::Snowflake),
            other => Err(format!("unknown analyzer {other:?}, expected ansi or snowflake")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("select 1;", Some(8))]
    #[case("select ';'", None)]
    #[case("select 1; select 2;", Some(8))]
    #[case("select 1 -- ;", None)]
    #[case("select /* ; */ 1", None)]
    #[case("BEGIN\n  SELECT 1;\nEND", Some(16))]
    fn ansi_finds_first_terminator(#[case] sql: &str, #[case] expected: Option<usize>) {
        assert_eq!(AnsiAnalyzer.analyze(sql, ';').terminator, expected);
    }

    #[test]
    fn ansi_reports_unclosed_after_terminator() {
        let analysis = AnsiAnalyzer.analyze("select 1; select 'x", ';');
        assert_eq!(analysis.terminator, Some(8));
        assert_eq!(analysis.unclosed, Some(Construct::StringLiteral));
    }

    #[test]
    fn ansi_honors_custom_terminator() {
        assert!(AnsiAnalyzer.is_terminated("select 1 /", '/'));
        assert!(!AnsiAnalyzer.is_terminated("select 1;", '/'));
    }

    /// Scripts that must not be terminated as written but are once a
    /// terminator is appended.
    #[rstest]
    #[case("BEGIN\n  SELECT 1;\nEND")]
    #[case("BEGIN\n  BEGIN\n    SELECT 1;\n  END;\nEND")]
    #[case("DECLARE\n  x INT := 1;\nBEGIN\n  RETURN x;\nEND")]
    #[case("BEGIN\n  IF (x > 1) THEN\n    RETURN 1;\n  END IF;\n  RETURN 2;\nEND")]
    #[case("BEGIN\n  FOR i IN 1 TO 3 DO\n    x := x + i;\n  END FOR;\nEND")]
    #[case("BEGIN\n  WHILE (x < 3) DO\n    x := x + 1;\n  END WHILE;\nEND")]
    #[case("BEGIN\n  LOOP\n    BREAK;\n  END LOOP;\nEND")]
    #[case("BEGIN\n  REPEAT\n    x := x + 1;\n  UNTIL (x > 3)\n  END REPEAT;\nEND")]
    #[case("BEGIN\n  CASE (v)\n    WHEN 1 THEN RETURN 'a;';\n    ELSE RETURN 'b';\n  END CASE;\nEND")]
    #[case("begin\n  select case when a then 1 else 2 end;\nend")]
    #[case("CREATE OR REPLACE PROCEDURE p()\nRETURNS INT\nLANGUAGE SQL\nAS\nBEGIN\n  RETURN 1;\nEND")]
    #[case("CREATE PROCEDURE p() RETURNS INT LANGUAGE SQL EXECUTE AS CALLER AS BEGIN RETURN 1; END")]
    #[case("CREATE SECURE TEMPORARY PROCEDURE p() RETURNS INT AS DECLARE x INT; BEGIN RETURN x; END")]
    #[case("CREATE PROCEDURE p() RETURNS INT LANGUAGE SQL AS $$ BEGIN RETURN 1; END $$")]
    #[case("CREATE PROCEDURE p() RETURNS INT LANGUAGE PYTHON AS 'x;'")]
    #[case("CREATE FUNCTION f() RETURNS INT AS 'select 1'")]
    fn snowflake_blocks_hide_terminators(#[case] sql: &str) {
        assert!(
            !SnowflakeAnalyzer.is_terminated(sql, ';'),
            "should not be terminated: {sql}"
        );
        let terminated = format!("{sql};");
        assert_eq!(
            SnowflakeAnalyzer.analyze(&terminated, ';').terminator,
            Some(sql.len()),
            "should be terminated: {terminated}"
        );
    }

    #[rstest]
    #[case("BEGIN TRANSACTION;")]
    #[case("begin work;")]
    #[case("select 1;")]
    #[case("CREATE PROCEDURE p;")]
    #[case("CREATE TABLE t (a int);")]
    fn snowflake_plain_statements(#[case] sql: &str) {
        assert_eq!(
            SnowflakeAnalyzer.analyze(sql, ';').terminator,
            Some(sql.len() - 1)
        );
    }

    #[rstest]
    #[case("DECLARE x INT;")]
    #[case("DECLARE x INT; BEGIN TRANSACTION;")]
    #[case("BEGIN BEGIN SELECT 1; END;")]
    #[case("BEGIN IF (x THEN RETURN 1; END IF; END;")]
    fn snowflake_unfinished_scripts(#[case] sql: &str) {
        assert!(!SnowflakeAnalyzer.is_terminated(sql, ';'), "{sql}");
    }

    #[rstest]
    #[case("CREATE FUNCTION f() RETURNS INT AS BEGIN; select 1;")]
    #[case("create or replace secure function f() as declare;")]
    fn snowflake_functions_never_open_blocks(#[case] sql: &str) {
        let first = sql.find(';');
        assert_eq!(SnowflakeAnalyzer.analyze(sql, ';').terminator, first, "{sql}");
    }

    #[test]
    fn snowflake_reports_unclosed_here_document() {
        let analysis = SnowflakeAnalyzer.analyze("CREATE PROCEDURE p() AS $$ BEGIN", ';');
        assert_eq!(analysis.unclosed, Some(Construct::HereDocument));
        assert!(!analysis.is_terminated());
    }

    #[test]
    fn analyzer_kind_selection() {
        assert_eq!("ansi".parse::<AnalyzerKind>(), Ok(AnalyzerKind::Ansi));
        assert_eq!(" Snowflake ".parse::<AnalyzerKind>(), Ok(AnalyzerKind::Snowflake));
        assert!("oracle".parse::<AnalyzerKind>().is_err());
        assert_eq!(AnalyzerKind::Snowflake.to_string(), "snowflake");
        assert_eq!(AnalyzerKind::Ansi.analyzer().name(), "ANSI SQL");
        assert_eq!(AnalyzerKind::Snowflake.analyzer().name(), "Snowflake");
    }
}

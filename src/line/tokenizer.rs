use std::{borrow::Cow, sync::Arc};

use crate::{
    debug,
    error::{CommandLineError, ErrorKind},
    line::{
        expand::Expand,
        token::{Fd, Token, TokenKind},
    },
    sql::scan::{self, char_at},
    trace,
};

/// Configures a [`LineTokenizer`].
#[derive(Clone)]
pub struct Builder<'e> {
    line: String,
    terminator: Option<char>,
    retain_double_quotes: bool,
    retain_initial_escape: bool,
    expander: Option<&'e dyn Expand>,
}

impl<'e> Builder<'e> {
    /// Character that ends the statement; scanning stops right after it.
    pub fn terminator(mut self, terminator: char) -> Self {
        self.terminator = Some(terminator);
        self
    }

    /// Keep the surrounding `"` of double-quoted text in the word.
    pub fn retain_double_quotes(mut self, retain: bool) -> Self {
        self.retain_double_quotes = retain;
        self
    }

    /// Keep a `\` that starts the first word of the line.
    pub fn retain_initial_escape(mut self, retain: bool) -> Self {
        self.retain_initial_escape = retain;
        self
    }

    pub fn expander<'x>(self, expander: &'x dyn Expand) -> Builder<'x> {
        Builder {
            line: self.line,
            terminator: self.terminator,
            retain_double_quotes: self.retain_double_quotes,
            retain_initial_escape: self.retain_initial_escape,
            expander: Some(expander),
        }
    }

    pub fn build(self) -> LineTokenizer<'e> {
        LineTokenizer {
            line: Arc::from(self.line),
            idx: 0,
            terminator: self.terminator,
            retain_double_quotes: self.retain_double_quotes,
            retain_initial_escape: self.retain_initial_escape,
            expander: self.expander,
            emitted: 0,
            done: false,
        }
    }
}

/// Splits a command line into words, redirections, pipes and the
/// terminator.
///
/// Behavior:
/// - Whitespace separates words; quoted and unquoted segments that touch
///   join into one word (`a'b c'd` is the single word `ab cd`).
/// - `'...'` and `"..."` use the doubled-delimiter escape. A `\` outside
///   quotes takes the next character literally.
/// - `[N]>[>]file`, `N>&M`, `>[>]+[N]` and `| rest` become their own tokens.
/// - The terminator, when configured, ends the scan; the text after it is
///   left for [`remainder`](Self::remainder).
///
/// The first error ends the scan: the iterator yields it once and then
/// nothing.
pub struct LineTokenizer<'e> {
    line: Arc<str>,
    idx: usize,
    terminator: Option<char>,
    retain_double_quotes: bool,
    retain_initial_escape: bool,
    expander: Option<&'e dyn Expand>,
    emitted: usize,
    done: bool,
}

impl LineTokenizer<'static> {
    /// A tokenizer with no terminator and no variable expansion.
    pub fn new(line: impl Into<String>) -> Self {
        Self::builder(line).build()
    }

    pub fn builder(line: impl Into<String>) -> Builder<'static> {
        Builder {
            line: line.into(),
            terminator: None,
            retain_double_quotes: false,
            retain_initial_escape: true,
            expander: None,
        }
    }
}

impl<'e> LineTokenizer<'e> {
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Byte offset of the next character to be scanned.
    pub fn cursor(&self) -> usize {
        self.idx
    }

    /// The part of the line not consumed yet; after a terminator this is the
    /// text following it.
    pub fn remainder(&self) -> &str {
        &self.line[self.idx..]
    }

    /// Scans every token up to the end of the line or the terminator.
    pub fn tokenize(self) -> Result<Vec<Token>, CommandLineError> {
        self.collect()
    }

    pub fn next_token(&mut self) -> Result<Option<Token>, CommandLineError> {
        if self.done {
            return Ok(None);
        }
        self.skip_whitespace();
        let Some(ch) = self.peek() else {
            self.done = true;
            return Ok(None);
        };

        let start = self.idx;
        let kind = match self.scan(ch) {
            Ok(kind) => kind,
            Err(err) => {
                self.done = true;
                debug!(%err, "rejected command line");
                return Err(err);
            }
        };
        self.emitted += 1;

        let token = Token::new(kind, &self.line, start);
        trace!(%token, position = start, "line token");
        Ok(Some(token))
    }

    fn scan(&mut self, ch: char) -> Result<TokenKind, CommandLineError> {
        if Some(ch) == self.terminator {
            self.idx += ch.len_utf8();
            self.done = true;
            return Ok(TokenKind::Terminator(ch));
        }

        match ch {
            '>' => self.redirect(None),
            '|' => self.pipe(),
            _ if self.starts_fd_prefix(ch) => {
                self.idx += 1;
                self.redirect(ch.to_digit(10).and_then(|d| Fd::new(d as u8)))
            }
            _ => self.word(false).map(TokenKind::Word),
        }
    }

    /// A single digit immediately followed by `>`.
    fn starts_fd_prefix(&self, ch: char) -> bool {
        ch.is_ascii_digit() && char_at(&self.line, self.idx + 1) == Some('>')
    }

    /// Called with the cursor on the `>`.
    fn redirect(&mut self, fd: Option<Fd>) -> Result<TokenKind, CommandLineError> {
        let op = self.idx;
        self.idx += 1;
        let append = self.eat('>');

        if !append && self.eat('&') {
            let new_fd = self.descriptor()?;
            return Ok(TokenKind::FdDup {
                old_fd: fd.unwrap_or(Fd::STDOUT),
                new_fd,
            });
        }

        if self.eat('+') {
            if fd.is_some() {
                return Err(self.error(
                    ErrorKind::MalformedRedirect,
                    "Session redirection does not take a file descriptor",
                    op,
                ));
            }
            let session = match self.peek() {
                Some(c) if c.is_ascii_digit() => Some(self.number("Session number")?),
                _ => None,
            };
            return Ok(TokenKind::SessionRedirect {
                session: session.filter(|&id| id > 0),
                append,
            });
        }

        self.skip_whitespace();
        let at = self.idx;
        let filename = match self.peek() {
            Some(c) if self.starts_word(c) => self.word(true)?,
            _ => String::new(),
        };
        if filename.is_empty() {
            return Err(self.error(
                ErrorKind::MalformedRedirect,
                "Expected a target filename following redirection",
                at,
            ));
        }

        Ok(TokenKind::RedirectOut {
            fd: fd.unwrap_or(Fd::STDOUT),
            filename,
            append,
        })
    }

    /// The right-hand side of `>&`.
    fn descriptor(&mut self) -> Result<u32, CommandLineError> {
        self.skip_whitespace();
        if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
            return Err(self.error(
                ErrorKind::MalformedRedirect,
                "Expected a number following file descriptor duplication token '>&'",
                self.idx,
            ));
        }
        self.number("File descriptor")
    }

    fn number(&mut self, what: &str) -> Result<u32, CommandLineError> {
        let start = self.idx;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.idx += 1;
        }
        self.line[start..self.idx].parse().map_err(|_| {
            self.error(
                ErrorKind::MalformedRedirect,
                format!("{what} out of range"),
                start,
            )
        })
    }

    fn pipe(&mut self) -> Result<TokenKind, CommandLineError> {
        self.idx += 1;
        self.skip_whitespace();
        if self.idx >= self.line.len() {
            return Err(self.error(
                ErrorKind::Syntax,
                "Expected a command following '|'",
                self.idx,
            ));
        }
        let command = self.line[self.idx..].to_string();
        self.idx = self.line.len();
        Ok(TokenKind::Pipe(command))
    }

    /// Scans one word. A redirect target never keeps its quotes or an
    /// initial escape.
    fn word(&mut self, filename: bool) -> Result<String, CommandLineError> {
        let start = self.idx;
        let mut text = String::new();

        if !filename && self.retain_initial_escape && self.emitted == 0 && self.peek() == Some('\\')
        {
            text.push('\\');
            self.idx += 1;
        }

        while let Some(ch) = self.peek() {
            match ch {
                '\'' => self.single_quoted(&mut text)?,
                '"' => self.double_quoted(&mut text, !filename && self.retain_double_quotes)?,
                _ if self.is_word_char(ch) => self.unquoted(&mut text)?,
                _ => break,
            }
        }

        if self.idx == start {
            let message = match self.peek() {
                Some(ch) => format!("Unexpected character '{ch}'"),
                None => "Unexpected end of line".to_string(),
            };
            return Err(self.error(ErrorKind::Syntax, message, start));
        }
        Ok(text)
    }

    fn unquoted(&mut self, text: &mut String) -> Result<(), CommandLineError> {
        let mut from = self.idx;
        while let Some(ch) = self.peek() {
            if ch == '\\' {
                text.push_str(&self.expand(&self.line[from..self.idx]));
                let backslash = self.idx;
                self.idx += 1;
                let Some(escaped) = self.peek() else {
                    return Err(self.error(
                        ErrorKind::Syntax,
                        "Expected character following '\\'",
                        backslash,
                    ));
                };
                text.push(escaped);
                self.idx += escaped.len_utf8();
                from = self.idx;
            } else if self.is_word_char(ch) {
                self.idx += ch.len_utf8();
            } else {
                break;
            }
        }
        text.push_str(&self.expand(&self.line[from..self.idx]));
        Ok(())
    }

    fn single_quoted(&mut self, text: &mut String) -> Result<(), CommandLineError> {
        let body = self.quoted_body("Closing single quote not found")?;
        text.push_str(&body.replace("''", "'"));
        Ok(())
    }

    fn double_quoted(&mut self, text: &mut String, retain: bool) -> Result<(), CommandLineError> {
        let body = self.quoted_body("Closing double quote not found")?;
        let body = body.replace("\"\"", "\"");
        let expanded = self.expand(&body);
        if retain {
            text.push('"');
            text.push_str(&expanded);
            text.push('"');
        } else {
            text.push_str(&expanded);
        }
        Ok(())
    }

    /// Skips the quoted construct under the cursor and returns the text
    /// between its delimiters, still escaped.
    fn quoted_body(&mut self, unclosed: &str) -> Result<String, CommandLineError> {
        let start = self.idx;
        let extent = scan::quoted(&self.line, start);
        if !extent.closed {
            return Err(self.error(ErrorKind::UnterminatedLiteral, unclosed, start));
        }
        self.idx = extent.end;
        Ok(self.line[start + 1..extent.end - 1].to_string())
    }

    fn expand<'s>(&self, raw: &'s str) -> Cow<'s, str> {
        match self.expander {
            Some(expander) => expander.expand(raw),
            None => Cow::Borrowed(raw),
        }
    }

    fn is_word_char(&self, ch: char) -> bool {
        !ch.is_whitespace()
            && Some(ch) != self.terminator
            && !matches!(ch, '\'' | '"' | '|' | '<' | '>' | '&')
    }

    fn starts_word(&self, ch: char) -> bool {
        ch == '\'' || ch == '"' || self.is_word_char(ch)
    }

    fn peek(&self) -> Option<char> {
        char_at(&self.line, self.idx)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.idx += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek().filter(|c| c.is_whitespace()) {
            self.idx += ch.len_utf8();
        }
    }

    fn error(
        &self,
        kind: ErrorKind,
        message: impl Into<String>,
        position: usize,
    ) -> CommandLineError {
        CommandLineError::new(kind, message, position, &*self.line)
    }
}

impl Iterator for LineTokenizer<'_> {
    type Item = Result<Token, CommandLineError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

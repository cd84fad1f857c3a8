//! Command line tokens.
//!
//! Every token remembers the line it came from and where on that line it
//! started, so a caller can point at it in a diagnostic long after the
//! tokenizer is gone. Tokens built by hand (not scanned) have no position.
use std::sync::Arc;

/// A file descriptor written as the single digit left of `>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub struct Fd(u8);

impl Fd {
    pub const STDOUT: Fd = Fd(1);
    pub const STDERR: Fd = Fd(2);

    /// `None` unless `fd` fits in one digit.
    pub const fn new(fd: u8) -> Option<Self> {
        if fd <= 9 { Some(Fd(fd)) } else { None }
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A plain word; quotes and escapes already resolved.
    Word(String),
    /// End of the statement.
    Terminator(char),
    /// `| command`: everything after the pipe, unparsed.
    Pipe(String),
    /// `[fd]>[>]filename`.
    RedirectOut {
        fd: Fd,
        filename: String,
        append: bool,
    },
    /// `old>&new`.
    FdDup { old_fd: Fd, new_fd: u32 },
    /// `>[>]+[N]`; `None` targets the current session.
    SessionRedirect { session: Option<u32>, append: bool },
}

impl TokenKind {
    pub fn word(&self) -> Option<&str> {
        match self {
            TokenKind::Word(w) => Some(w.as_str()),
            _ => None,
        }
    }

    pub fn is_terminator(&self) -> bool {
        matches!(self, TokenKind::Terminator(_))
    }
}

/// Characters that can appear in a rendered word without quoting.
fn is_plain(ch: char) -> bool {
    ch.is_alphanumeric() || "_-./:,@%+=*?!#~^()[]{}".contains(ch)
}

/// Renders a redirect target; a leading `+` would read back as a session
/// redirect.
fn quote_target(filename: &str) -> String {
    if filename.starts_with('+') {
        return format!("'{}'", filename.replace('\'', "''"));
    }
    quote_word(filename)
}

/// Renders `text` so that scanning it again yields the same word.
pub fn quote_word(text: &str) -> String {
    if !text.is_empty() && text.chars().all(is_plain) {
        return text.to_string();
    }
    format!("'{}'", text.replace('\'', "''"))
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let arrows = |append: bool| if append { ">>" } else { ">" };
        match self {
            TokenKind::Word(w) => f.write_str(&quote_word(w)),
            TokenKind::Terminator(ch) => write!(f, "{ch}"),
            TokenKind::Pipe(command) => write!(f, "| {command}"),
            TokenKind::RedirectOut {
                fd,
                filename,
                append,
            } => write!(f, "{fd}{}{}", arrows(*append), quote_target(filename)),
            TokenKind::FdDup { old_fd, new_fd } => write!(f, "{old_fd}>&{new_fd}"),
            TokenKind::SessionRedirect { session, append } => {
                write!(f, "{}+", arrows(*append))?;
                match session {
                    Some(id) => write!(f, "{id}"),
                    None => Ok(()),
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    line: Arc<str>,
    position: Option<usize>,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, line: &Arc<str>, position: usize) -> Self {
        Self {
            kind,
            line: Arc::clone(line),
            position: Some(position),
        }
    }

    /// A token that did not come from scanning a line.
    pub fn synthetic(kind: TokenKind) -> Self {
        Self {
            kind,
            line: Arc::from(""),
            position: None,
        }
    }

    /// The full line the token was scanned from.
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Byte offset of the token's first character on its line.
    pub fn position(&self) -> Option<usize> {
        self.position
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.kind.fmt(f)
    }
}

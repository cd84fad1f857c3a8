#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Syntax error: {0}")]
    Syntax(#[from] CommandLineError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T = ()> = std::result::Result<T, Error>;

impl From<confique::Error> for Error {
    fn from(value: confique::Error) -> Self {
        Error::Config(value.to_string())
    }
}

/// Classification of a command line that could not be tokenized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ErrorKind {
    /// A quote was opened but never closed.
    #[display("unterminated literal")]
    UnterminatedLiteral,
    /// Bad file descriptor or missing redirect target.
    #[display("malformed redirect")]
    MalformedRedirect,
    /// Something that cannot be classified at its position.
    #[display("syntax error")]
    Syntax,
}

/// A positioned problem found while tokenizing a command line.
///
/// Carries the original line so a console can point at the offending
/// character without keeping the input around itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (at position {position})")]
pub struct CommandLineError {
    pub kind: ErrorKind,
    pub message: String,
    pub position: usize,
    pub line: String,
}

impl CommandLineError {
    pub fn new(
        kind: ErrorKind,
        message: impl Into<String>,
        position: usize,
        line: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            position,
            line: line.into(),
        }
    }

    /// Renders the line with a `^` under the offending character.
    ///
    /// `position` is a byte offset, the caret column counts characters.
    pub fn caret(&self) -> String {
        let column = self
            .line
            .get(..self.position.min(self.line.len()))
            .map_or(self.position, |head| head.chars().count());
        format!("{}\n{}^", self.line, " ".repeat(column))
    }
}

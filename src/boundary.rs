use crate::{
    sql::{AnalyzerKind, Construct},
    trace,
};

/// Why a buffer is ready to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// The statement ends at this byte offset.
    Terminator(usize),
    /// The line under the caret is a `\` command.
    Command,
    /// Multi-line input is off; every line runs as entered.
    SingleLine,
}

/// Why the console should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    Empty,
    /// Input stopped inside a literal, identifier or comment.
    Unclosed(Construct),
    NoTerminator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Complete(Boundary),
    Incomplete(Pending),
}

impl Verdict {
    pub fn is_complete(&self) -> bool {
        matches!(self, Verdict::Complete(_))
    }
}

/// Decides whether an accumulated input buffer is ready to execute.
///
/// Rules, first match wins:
/// 1. multi-line input disabled: complete;
/// 2. blank buffer: incomplete;
/// 3. a literal, identifier or comment left open: incomplete, even when a
///    terminator appears earlier;
/// 4. a terminator at or before the caret: complete;
/// 5. the line holding the caret starts with `\`: complete;
/// 6. otherwise incomplete.
///
/// Holds no state between calls and scans the buffer once, so calling it on
/// every keystroke is fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryDetector {
    terminator: char,
    multi_line: bool,
    analyzer: AnalyzerKind,
}

impl Default for BoundaryDetector {
    fn default() -> Self {
        Self::new(';')
    }
}

impl BoundaryDetector {
    pub const fn new(terminator: char) -> Self {
        Self {
            terminator,
            multi_line: true,
            analyzer: AnalyzerKind::Ansi,
        }
    }

    pub const fn with_multi_line(mut self, multi_line: bool) -> Self {
        self.multi_line = multi_line;
        self
    }

    pub const fn with_analyzer(mut self, analyzer: AnalyzerKind) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub const fn terminator(&self) -> char {
        self.terminator
    }

    pub const fn multi_line(&self) -> bool {
        self.multi_line
    }

    pub const fn analyzer(&self) -> AnalyzerKind {
        self.analyzer
    }

    /// `cursor` is a byte offset into `buffer`; offsets past the end are
    /// treated as the end.
    pub fn detect(&self, buffer: &str, cursor: usize) -> Verdict {
        let verdict = self.judge(buffer, cursor);
        trace!(?verdict, cursor, len = buffer.len(), "input boundary");
        verdict
    }

    fn judge(&self, buffer: &str, cursor: usize) -> Verdict {
        if !self.multi_line {
            return Verdict::Complete(Boundary::SingleLine);
        }
        if buffer.trim().is_empty() {
            return Verdict::Incomplete(Pending::Empty);
        }

        let analysis = self.analyzer.analyzer().analyze(buffer, self.terminator);
        if let Some(construct) = analysis.unclosed {
            return Verdict::Incomplete(Pending::Unclosed(construct));
        }
        if let Some(pos) = analysis.terminator.filter(|&pos| pos <= cursor) {
            return Verdict::Complete(Boundary::Terminator(pos));
        }
        if line_at(buffer, cursor).trim_start().starts_with('\\') {
            return Verdict::Complete(Boundary::Command);
        }
        Verdict::Incomplete(Pending::NoTerminator)
    }
}

/// The line of `buffer` containing byte offset `cursor`.
pub fn line_at(buffer: &str, cursor: usize) -> &str {
    let mut cursor = cursor.min(buffer.len());
    while !buffer.is_char_boundary(cursor) {
        cursor -= 1;
    }
    let start = buffer[..cursor].rfind('\n').map_or(0, |idx| idx + 1);
    let end = buffer[cursor..]
        .find('\n')
        .map_or(buffer.len(), |idx| cursor + idx);
    &buffer[start..end]
}

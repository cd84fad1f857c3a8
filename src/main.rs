use std::io::{self, BufRead, Write};

use sqlsh::{
    Boundary, BoundaryDetector, Config, Pending, Result, Verdict, line_at,
    line::{Variables, render},
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut console = Console::new(Config::from_env()?)?;
    console.run(io::stdin().lock(), io::stdout().lock())
}

/// Reads statements line by line and prints what each one tokenizes to.
/// Nothing is executed.
struct Console {
    config: Config,
    detector: BoundaryDetector,
    variables: Variables,
    buffer: String,
}

impl Console {
    fn new(config: Config) -> Result<Self> {
        let detector = config.detector()?;
        info!(
            terminator = %detector.terminator(),
            analyzer = %detector.analyzer(),
            multi_line = detector.multi_line(),
            "console ready"
        );
        Ok(Self {
            config,
            detector,
            variables: Variables::new().with_environment(),
            buffer: String::new(),
        })
    }

    fn run(&mut self, input: impl BufRead, mut out: impl Write) -> Result {
        self.prompt(&mut out, None)?;
        for line in input.lines() {
            let line = line?;
            if !self.buffer.is_empty() {
                self.buffer.push('\n');
            }
            self.buffer.push_str(&line);

            match self.detector.detect(&self.buffer, self.buffer.len()) {
                Verdict::Complete(boundary) => {
                    self.submit(boundary, &mut out)?;
                    self.buffer.clear();
                    self.prompt(&mut out, None)?;
                }
                Verdict::Incomplete(Pending::Empty) => {
                    self.buffer.clear();
                    self.prompt(&mut out, None)?;
                }
                Verdict::Incomplete(pending) => self.prompt(&mut out, Some(pending))?,
            }
        }

        if !self.buffer.trim().is_empty() {
            warn!(buffer = %self.buffer, "discarding unfinished input");
        }
        writeln!(out)?;
        Ok(())
    }

    /// `N> ` numbering buffer lines, with the missing delimiter when input
    /// stopped inside a literal or comment.
    fn prompt(&self, out: &mut impl Write, pending: Option<Pending>) -> Result {
        let number = if self.buffer.is_empty() {
            1
        } else {
            self.buffer.lines().count() + 1
        };
        match pending {
            Some(Pending::Unclosed(construct)) => {
                write!(out, "{number}{}> ", construct.closing())?
            }
            _ => write!(out, "{number}> ")?,
        }
        out.flush()?;
        Ok(())
    }

    fn submit(&self, boundary: Boundary, out: &mut impl Write) -> Result {
        debug!(?boundary, "submitting buffer");
        match boundary {
            Boundary::Terminator(pos) => {
                let after = pos + self.detector.terminator().len_utf8();
                writeln!(out, "statement: {}", self.buffer[..pos].trim())?;
                self.tokens("args", &self.buffer[after..], out)
            }
            Boundary::Command => {
                let command = line_at(&self.buffer, self.buffer.len());
                let pending = self.buffer[..self.buffer.len() - command.len()].trim();
                if !pending.is_empty() {
                    writeln!(out, "statement: {pending}")?;
                }
                self.tokens("command", command, out)
            }
            Boundary::SingleLine => {
                let line = self.buffer.trim();
                if line.starts_with('\\') {
                    self.tokens("command", line, out)
                } else {
                    writeln!(out, "statement: {line}")?;
                    Ok(())
                }
            }
        }
    }

    /// Prints the line's tokens, or the caret diagnostic if it does not
    /// tokenize. A bad line is dropped, never fatal.
    fn tokens(&self, label: &str, line: &str, out: &mut impl Write) -> Result {
        if line.trim().is_empty() {
            return Ok(());
        }
        let tokenizer = self
            .config
            .line_tokenizer(line)?
            .expander(&self.variables)
            .build();
        match tokenizer.tokenize() {
            Ok(tokens) => writeln!(out, "{label}: {}", render(&tokens))?,
            Err(err) => {
                warn!(%err, "discarding line");
                writeln!(out, "error: {}\n{}", err.message, err.caret())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confique::Config as _;

    fn transcript(input: &str) -> String {
        let config = Config::builder().load().unwrap();
        let mut console = Console::new(config).unwrap();
        let mut out = Vec::new();
        console.run(input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn statements_span_lines() {
        let out = transcript("select 'a;\nb' from t; >out.txt\n");
        assert!(out.starts_with("1> 2'> "), "{out}");
        assert!(out.contains("statement: select 'a;\nb' from t\n"), "{out}");
        assert!(out.contains("args: 1>out.txt\n"), "{out}");
    }

    #[test]
    fn commands_run_without_terminator() {
        let out = transcript("\\echo hi 2>&1\n");
        assert!(out.contains("command: '\\echo' hi 2>&1\n"), "{out}");
    }

    #[test]
    fn bad_command_line_is_reported() {
        let out = transcript("\\echo a |\n\\echo b\n");
        assert!(
            out.contains("error: Expected a command following '|'\n\\echo a |\n         ^\n"),
            "{out}"
        );
        assert!(out.contains("command: '\\echo' b\n"), "{out}");
    }

    #[test]
    fn blank_lines_reset_the_prompt() {
        let out = transcript("\n\nselect 1\n");
        assert_eq!(out, "1> 1> 1> 2> \n");
    }
}

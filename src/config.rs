use crate::{
    boundary::BoundaryDetector,
    error::{Error, Result},
    line::{Builder, LineTokenizer},
    sql::AnalyzerKind,
};
use confique::Config as _;

#[derive(Debug, confique::Config)]
pub struct Config {
    /// Statement terminator, exactly one character.
    #[config(env = "SQLSH_TERMINATOR", default = ";")]
    pub terminator: String,
    /// When disabled every line is executed as soon as it is entered.
    #[config(env = "SQLSH_MULTI_LINE", default = true)]
    pub multi_line: bool,
    /// `ansi` or `snowflake`.
    #[config(env = "SQLSH_ANALYZER", default = "ansi")]
    pub analyzer: String,
    #[config(env = "SQLSH_RETAIN_DOUBLE_QUOTES", default = false)]
    pub retain_double_quotes: bool,
    /// Keep the `\` in front of a command name, e.g. `\echo`.
    #[config(env = "SQLSH_RETAIN_INITIAL_ESCAPE", default = true)]
    pub retain_initial_escape: bool,
}

impl Config {
    /// Loads the configuration from the current environment.
    pub fn from_env() -> Result<Self> {
        let config = Self::builder().env().load()?;
        config.terminator()?;
        config.analyzer_kind()?;
        Ok(config)
    }

    pub fn terminator(&self) -> Result<char> {
        let mut chars = self.terminator.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) if !ch.is_whitespace() => Ok(ch),
            _ => Err(Error::Config(format!(
                "terminator must be a single non-whitespace character, got {:?}",
                self.terminator
            ))),
        }
    }

    pub fn analyzer_kind(&self) -> Result<AnalyzerKind> {
        self.analyzer.parse().map_err(Error::Config)
    }

    /// Boundary detector configured for this session.
    pub fn detector(&self) -> Result<BoundaryDetector> {
        Ok(BoundaryDetector::new(self.terminator()?)
            .with_multi_line(self.multi_line)
            .with_analyzer(self.analyzer_kind()?))
    }

    /// Line tokenizer settings for this session, ready for an expander.
    pub fn line_tokenizer(&self, line: impl Into<String>) -> Result<Builder<'static>> {
        Ok(LineTokenizer::builder(line)
            .terminator(self.terminator()?)
            .retain_double_quotes(self.retain_double_quotes)
            .retain_initial_escape(self.retain_initial_escape))
    }
}

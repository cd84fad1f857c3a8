//! Shell-style tokenizing of a single command line.
//!
//! Where the `sql` module only looks for statement boundaries, this module
//! produces the tokens a command dispatcher acts on: words, output
//! redirections, descriptor duplication, session redirects, pipes and the
//! terminator.
//!
//! Example:
//! ```rust
//! use sqlsh::line::{Fd, LineTokenizer, TokenKind};
//!
//! let tokens = LineTokenizer::new("\\go 2>&1 | more").tokenize().unwrap();
//! assert_eq!(tokens[1].kind, TokenKind::FdDup { old_fd: Fd::STDERR, new_fd: 1 });
//! assert_eq!(sqlsh::line::render(&tokens), "'\\go' 2>&1 | more");
//! ```

use itertools::Itertools;

pub mod expand;
pub mod token;
pub mod tokenizer;

pub use expand::{Expand, Variables};
pub use token::{Fd, Token, TokenKind, quote_word};
pub use tokenizer::{Builder, LineTokenizer};

/// Joins the renderings of `tokens` with single spaces.
///
/// Scanning the result again yields tokens of the same kinds.
pub fn render(tokens: &[Token]) -> String {
    tokens.iter().join(" ")
}

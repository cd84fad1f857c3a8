//! Variable expansion for command line words.
use std::borrow::Cow;
use std::collections::HashMap;

use crate::sql::scan::is_ident_char;

/// Expands references inside unquoted and double-quoted text.
///
/// Implementations must not fail: an unknown reference expands to whatever
/// the implementation deems sensible (usually nothing).
pub trait Expand {
    fn expand<'s>(&self, text: &'s str) -> Cow<'s, str>;
}

impl<F> Expand for F
where
    F: Fn(&str) -> Option<String>,
{
    fn expand<'s>(&self, text: &'s str) -> Cow<'s, str> {
        substitute(text, |name| self(name))
    }
}

/// Shell-style `$name` / `${name}` expansion from a table of variables.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    values: HashMap<String, String>,
    environment: bool,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Falls back to the process environment for names not set here.
    pub fn with_environment(mut self) -> Self {
        self.environment = true;
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.values
            .get(name)
            .cloned()
            .or_else(|| self.environment.then(|| std::env::var(name).ok()).flatten())
    }
}

impl Expand for Variables {
    fn expand<'s>(&self, text: &'s str) -> Cow<'s, str> {
        substitute(text, |name| self.get(name))
    }
}

/// Replaces each reference in `text` with `lookup(name)`, or nothing.
///
/// A `$` not followed by a name, or a `${` without its `}`, stays literal.
/// Substituted values are not scanned again.
fn substitute<'s>(text: &'s str, lookup: impl Fn(&str) -> Option<String>) -> Cow<'s, str> {
    if !text.contains('$') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(dollar) = rest.find('$') {
        out.push_str(&rest[..dollar]);
        let after = &rest[dollar + 1..];

        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(close) => (&braced[..close], close + 2),
                None => ("", 0),
            }
        } else {
            let len = after
                .char_indices()
                .find(|&(_, ch)| !is_ident_char(ch))
                .map_or(after.len(), |(offset, _)| offset);
            (&after[..len], len)
        };

        if consumed == 0 || name.is_empty() {
            out.push('$');
            rest = after;
            continue;
        }
        if let Some(value) = lookup(name) {
            out.push_str(&value);
        }
        rest = &after[consumed..];
    }
    out.push_str(rest);
    Cow::Owned(out)
}

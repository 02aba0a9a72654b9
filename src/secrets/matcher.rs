//! Glob-style name matching for document discovery.
//!
//! Patterns are matched against a document's own name, never against the path
//! that leads to it. Supported syntax:
//! - `*` any run of characters, including none
//! - `?` exactly one character
//! - `[abc]`, `[a-z]` a character class; `[!abc]` or `[^abc]` negates it
//!
//! Everything else matches literally. Patterns compile to an anchored regex.

use crate::secrets::error::{Result, StoreError};
use regex::Regex;

/// Compiled name pattern.
#[derive(Debug, Clone)]
pub struct NameMatcher {
    pattern: String,
    regex: Regex,
}

impl NameMatcher {
    /// Compile a glob pattern.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Pattern`] for an empty pattern, an unterminated
    /// character class, or a class the regex engine rejects (e.g. `[z-a]`).
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Err(StoreError::pattern(pattern, "pattern cannot be empty"));
        }

        let translated = glob_to_regex(pattern)?;
        let regex =
            Regex::new(&translated).map_err(|e| StoreError::pattern(pattern, e.to_string()))?;

        Ok(Self { pattern: pattern.to_string(), regex })
    }

    /// Whether `name` matches the whole pattern.
    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

fn glob_to_regex(pattern: &str) -> Result<String> {
    let mut out = String::with_capacity(pattern.len() * 2 + 2);
    out.push('^');

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => {
                out.push('[');
                if matches!(chars.peek(), Some('!') | Some('^')) {
                    chars.next();
                    out.push('^');
                }

                let mut closed = false;
                let mut first = true;
                for c in chars.by_ref() {
                    if c == ']' && !first {
                        closed = true;
                        break;
                    }
                    first = false;
                    if c == '-' {
                        out.push('-');
                    } else {
                        out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
                    }
                }

                if !closed {
                    return Err(StoreError::pattern(pattern, "unterminated character class"));
                }
                out.push(']');
            }
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }

    out.push('$');
    Ok(out)
}

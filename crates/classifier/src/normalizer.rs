//! Whitelist normalization
//!
//! Removes tokens that must never be compared against the index.

use std::collections::HashSet;

/// Case-insensitive set of allowed tokens
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    tokens: HashSet<String>,
}

impl Whitelist {
    /// Build from configured entries; blank entries are ignored
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = entries
            .into_iter()
            .map(|e| e.as_ref().trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { tokens }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(&token.to_lowercase())
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Drop whitelisted tokens and re-join the rest with single spaces
pub fn normalize(text: &str, whitelist: &Whitelist) -> String {
    text.split_whitespace()
        .filter(|token| !whitelist.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

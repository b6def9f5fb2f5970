//! Token value objects
//!
//! A `TokenMap` is composed from layered sources. Later layers override
//! earlier ones on key collision: built-in < local < custom.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Default placeholder prefix
pub const DEFAULT_TOKEN_PREFIX: &str = "<<";
/// Default placeholder suffix
pub const DEFAULT_TOKEN_SUFFIX: &str = ">>";

/// Delimiters wrapping a token name inside a parameter file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDelimiters {
    pub prefix: String,
    pub suffix: String,
}

impl TokenDelimiters {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// Render the placeholder for a token name
    pub fn wrap(&self, name: &str) -> String {
        format!("{}{}{}", self.prefix, name, self.suffix)
    }

    /// Both delimiters must be non-empty, otherwise every bare token name
    /// would be a placeholder.
    pub fn is_valid(&self) -> bool {
        !self.prefix.is_empty() && !self.suffix.is_empty()
    }
}

impl Default for TokenDelimiters {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_PREFIX, DEFAULT_TOKEN_SUFFIX)
    }
}

/// Where a token value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenSource {
    /// Run context (scope identifiers, tenant, deployment principal)
    BuiltIn,
    /// Named tokens from settings
    Local,
    /// Tokens passed by the caller
    Custom,
}

/// Immutable mapping from token name to replacement value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenMap {
    entries: BTreeMap<String, (String, TokenSource)>,
}

impl TokenMap {
    pub fn builder() -> TokenMapBuilder {
        TokenMapBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|(v, _)| v.as_str())
    }

    pub fn source_of(&self, name: &str) -> Option<TokenSource> {
        self.entries.get(name).map(|(_, s)| *s)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(name, value)` pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(k, (v, _))| (k.as_str(), v.as_str()))
    }
}

/// Builder collecting token layers
///
/// Layers may be added in any order; `build` applies them by source
/// precedence, not by insertion order.
#[derive(Debug, Default)]
pub struct TokenMapBuilder {
    layers: Vec<(TokenSource, String, String)>,
}

impl TokenMapBuilder {
    pub fn insert(
        mut self,
        source: TokenSource,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.layers.push((source, name.into(), value.into()));
        self
    }

    pub fn extend<I, K, V>(mut self, source: TokenSource, tokens: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in tokens {
            self.layers.push((source, name.into(), value.into()));
        }
        self
    }

    pub fn build(mut self) -> TokenMap {
        // Stable sort keeps insertion order within a source.
        self.layers.sort_by_key(|(source, _, _)| *source);

        let mut entries = BTreeMap::new();
        for (source, name, value) in self.layers {
            if name.is_empty() {
                continue;
            }
            entries.insert(name, (value, source));
        }
        TokenMap { entries }
    }
}

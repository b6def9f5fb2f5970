//! Token substitution
//!
//! Single left-to-right pass: a replaced value is never scanned again, so a
//! value that happens to contain another placeholder stays literal.
//! Placeholders with no value in the map are left verbatim.

use std::collections::BTreeMap;

use crate::domain::value_objects::{TokenDelimiters, TokenMap};

/// Result of substituting tokens in one piece of content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenReplacement {
    pub content: String,
    /// Occurrences replaced per token name
    pub replaced: BTreeMap<String, usize>,
    /// Placeholder names found without a value, in order of first appearance
    pub unresolved: Vec<String>,
}

impl TokenReplacement {
    pub fn total_replaced(&self) -> usize {
        self.replaced.values().sum()
    }
}

/// Replace every `prefix + name + suffix` whose name is in `tokens`
pub fn replace_tokens(
    content: &str,
    tokens: &TokenMap,
    delimiters: &TokenDelimiters,
) -> TokenReplacement {
    let prefix = delimiters.prefix.as_str();
    let suffix = delimiters.suffix.as_str();

    let mut replaced = BTreeMap::new();
    let mut unresolved: Vec<String> = Vec::new();

    if !delimiters.is_valid() {
        return TokenReplacement {
            content: content.to_string(),
            replaced,
            unresolved,
        };
    }

    let mut out = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find(prefix) {
        out.push_str(&rest[..start]);
        let after = &rest[start + prefix.len()..];

        if let Some(end) = after.find(suffix) {
            let name = &after[..end];
            if let Some(value) = tokens.get(name) {
                out.push_str(value);
                *replaced.entry(name.to_string()).or_insert(0) += 1;
                rest = &after[end + suffix.len()..];
                continue;
            }
            if looks_like_token(name) && !unresolved.iter().any(|u| u == name) {
                unresolved.push(name.to_string());
            }
        }

        // Not a known placeholder: keep one character and rescan from the next.
        let tail = &rest[start..];
        let step = tail.chars().next().map(char::len_utf8).unwrap_or(1);
        out.push_str(&tail[..step]);
        rest = &tail[step..];
    }
    out.push_str(rest);

    TokenReplacement {
        content: out,
        replaced,
        unresolved,
    }
}

fn looks_like_token(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

//! Product-name normalization into comparable keys.
//!
//! A [`NormalizedKey`] is what the linker compares. Two listings of the same
//! cut from different chains ("אנטריקוט בקר טרי 1 ק\"ג" and
//! "אנטריקוט בקר 1 קג") should come out identical or nearly so, which means
//! dropping everything that varies between retailers for the same product:
//! pack sizes, unit abbreviations, freshness adjectives, bracketed notes.
//!
//! Steps, applied in order:
//! 1. lowercase;
//! 2. drop bracketed and parenthetical content;
//! 3. turn digits and the separators `- ( ) [ ] .` into spaces, delete quote
//!    marks (`"`, `'`, gershayim and geresh) so abbreviations like `ק"ג`
//!    collapse to a single token;
//! 4. drop noise tokens;
//! 5. collapse whitespace and trim.
//!
//! Noise words are matched as whole tokens after step 3, so every output is a
//! fixed point: normalizing a key again returns the same key.

use std::collections::HashSet;

use basar_core::Knowledge;
use regex::Regex;

/// Lowercase, noise-stripped product name used for similarity comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in characters, not bytes. Hebrew letters are two bytes each.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    /// Whether the key is long enough to be matched reliably.
    #[must_use]
    pub fn is_matchable(&self, min_len: usize) -> bool {
        !self.is_empty() && self.char_len() >= min_len
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ').filter(|t| !t.is_empty())
    }
}

impl std::fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Converts raw product names into [`NormalizedKey`]s.
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    noise: HashSet<String>,
    bracketed: Regex,
}

impl NameNormalizer {
    /// Builds a normalizer with the given noise words. Each word is folded
    /// the same way names are (lowercased, quotes removed), so `ק״ג` in the
    /// list also matches `ק"ג` and `קג` in names.
    #[must_use]
    pub fn new<S: AsRef<str>>(noise_words: &[S]) -> Self {
        let mut noise = HashSet::new();
        for word in noise_words {
            let folded = fold_characters(&word.as_ref().to_lowercase());
            let mut parts = folded.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(token), None) => {
                    noise.insert(token.to_string());
                }
                _ => {
                    tracing::warn!(word = word.as_ref(), "ignoring noise word that does not fold to one token");
                }
            }
        }

        Self {
            noise,
            bracketed: Regex::new(r"[(\[][^)\]]*[)\]]").expect("valid bracket regex"),
        }
    }

    #[must_use]
    pub fn from_knowledge(knowledge: &Knowledge) -> Self {
        Self::new(&knowledge.noise_words)
    }

    /// Normalizes a product name. Empty or whitespace-only input yields an
    /// empty key rather than an error.
    #[must_use]
    pub fn normalize(&self, name: &str) -> NormalizedKey {
        if name.trim().is_empty() {
            return NormalizedKey(String::new());
        }

        let lower = name.to_lowercase();
        let unbracketed = self.bracketed.replace_all(&lower, " ");
        let folded = fold_characters(&unbracketed);

        let key = folded
            .split_whitespace()
            .filter(|token| !self.noise.contains(*token))
            .collect::<Vec<_>>()
            .join(" ");

        NormalizedKey(key)
    }

    #[must_use]
    pub fn is_noise(&self, token: &str) -> bool {
        self.noise.contains(token)
    }
}

/// Quote marks glue abbreviations together (`ק"ג`, `יח'`), so they are
/// deleted outright rather than turned into separators.
fn is_quote(c: char) -> bool {
    matches!(c, '"' | '\'' | '\u{05F4}' | '\u{05F3}')
}

fn is_separator(c: char) -> bool {
    c.is_numeric() || matches!(c, '-' | '(' | ')' | '[' | ']' | '.')
}

fn fold_characters(s: &str) -> String {
    s.chars()
        .filter(|c| !is_quote(*c))
        .map(|c| if is_separator(c) { ' ' } else { c })
        .collect()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;

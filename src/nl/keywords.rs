//! Ordered trigger-phrase tables.
//!
//! A [`KeywordTable`] maps keys (intents or topics) to lists of lowercase
//! trigger phrases. Entry order is priority order: lookups walk the entries
//! front to back and the first key with a matching phrase wins. Tables are
//! validated at construction: a phrase may appear only once in a whole
//! table, and a key only once.

use std::collections::HashSet;
use std::fmt::Debug;

use crate::types::{EngineError, Result};

/// An ordered phrase table keyed by `K`.
#[derive(Debug, Clone)]
pub struct KeywordTable<K> {
    name: String,
    entries: Vec<(K, Vec<String>)>,
}

impl<K: Copy + Eq + Debug> KeywordTable<K> {
    /// Build a table, lowercasing and trimming phrases.
    ///
    /// Fails on an empty phrase, a phrase repeated anywhere in the table, or
    /// a repeated key.
    pub fn new(name: &str, entries: Vec<(K, Vec<String>)>) -> Result<Self> {
        let mut seen_phrases: HashSet<String> = HashSet::new();
        let mut seen_keys: Vec<K> = Vec::new();
        let mut cleaned = Vec::with_capacity(entries.len());

        for (key, phrases) in entries {
            if seen_keys.contains(&key) {
                return Err(EngineError::DuplicateKey {
                    table: name.to_string(),
                    key: format!("{:?}", key),
                });
            }
            seen_keys.push(key);

            let mut list = Vec::with_capacity(phrases.len());
            for phrase in phrases {
                let phrase = phrase.trim().to_lowercase();
                if phrase.is_empty() {
                    return Err(EngineError::EmptyPhrase { table: name.to_string() });
                }
                if !seen_phrases.insert(phrase.clone()) {
                    return Err(EngineError::DuplicatePhrase {
                        table: name.to_string(),
                        phrase,
                    });
                }
                list.push(phrase);
            }
            cleaned.push((key, list));
        }

        Ok(KeywordTable { name: name.to_string(), entries: cleaned })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Keys in priority order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    /// Phrases for `key`, in declared order. Empty if the key is absent.
    pub fn phrases(&self, key: K) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, p)| p.as_slice())
            .unwrap_or(&[])
    }

    /// True if `normalized` contains any phrase of `key` as a substring.
    pub fn matches(&self, key: K, normalized: &str) -> bool {
        self.phrases(key).iter().any(|p| normalized.contains(p.as_str()))
    }

    /// The first phrase of `key` found in `normalized`.
    pub fn matched_phrase(&self, key: K, normalized: &str) -> Option<&str> {
        self.phrases(key)
            .iter()
            .find(|p| normalized.contains(p.as_str()))
            .map(String::as_str)
    }

    /// First key, in table order, with a phrase contained in `normalized`.
    pub fn first_match(&self, normalized: &str) -> Option<K> {
        self.entries
            .iter()
            .find(|(_, phrases)| phrases.iter().any(|p| normalized.contains(p.as_str())))
            .map(|(k, _)| *k)
    }

    /// Like [`first_match`](Self::first_match), but ignores `excluded` and
    /// blanks out every occurrence of its phrases first, so text that belongs
    /// to `excluded` cannot match another key through a shorter phrase.
    pub fn first_match_excluding(&self, normalized: &str, excluded: K) -> Option<K> {
        let mut masked = normalized.to_string();
        let mut own: Vec<&String> = self.phrases(excluded).iter().collect();
        // Longest first, so "encrypt traffic" is blanked before "encrypt".
        own.sort_by(|a, b| b.len().cmp(&a.len()));
        for phrase in own {
            masked = masked.replace(phrase.as_str(), &" ".repeat(phrase.len()));
        }

        self.entries
            .iter()
            .filter(|(k, _)| *k != excluded)
            .find(|(_, phrases)| phrases.iter().any(|p| masked.contains(p.as_str())))
            .map(|(k, _)| *k)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

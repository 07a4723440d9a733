//! Immutable syllable table — the syllable ↔ phoneme-pair bijection.
//!
//! Every syllable maps to exactly one `(left, right)` pair and no two
//! syllables share a pair.  The table keeps the order its entries were
//! supplied in; everything downstream (pair index construction, greedy
//! tie-breaks, fallback batching) depends on that order being stable.
//!
//! Three views are exposed:
//!
//! | View                   | Shape                              |
//! |------------------------|------------------------------------|
//! | [`SyllableIndex::pair_of`]            | syllable → `(left, right)` |
//! | [`SyllableIndex::syllables_by_left`]  | left → `[syllable…]`       |
//! | [`SyllableIndex::syllables_by_right`] | right → `[syllable…]`      |

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::{ReclistError, Result};

/// The onset / coda decomposition of one syllable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhonemePair {
    pub left: String,
    pub right: String,
}

impl PhonemePair {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self { left: left.into(), right: right.into() }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Phoneme → syllables view
// ─────────────────────────────────────────────────────────────────────────────

/// Syllables grouped by one phoneme, in first-seen order for both the keys
/// and the members of each group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhonemeGroups(IndexMap<String, Vec<String>>);

impl PhonemeGroups {
    fn push(&mut self, phoneme: &str, syllable: &str) {
        self.0
            .entry(phoneme.to_string())
            .or_default()
            .push(syllable.to_string());
    }

    /// Syllables sharing `phoneme`, or an empty slice.
    pub fn get(&self, phoneme: &str) -> &[String] {
        self.0.get(phoneme).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Phonemes in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SyllableIndex
// ─────────────────────────────────────────────────────────────────────────────

/// Read-only syllable table.  Built once, shared freely (`Send + Sync`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyllableIndex {
    entries: Vec<(String, PhonemePair)>,
    by_syllable: HashMap<String, usize>,
    by_pair: HashMap<PhonemePair, usize>,
    by_left: PhonemeGroups,
    by_right: PhonemeGroups,
}

impl SyllableIndex {
    /// Build the index from `(syllable, pair)` entries in table order.
    ///
    /// Fails with [`ReclistError::EmptyTable`] when no entries are given and
    /// rejects duplicate syllables or duplicate pairs.
    pub fn new<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, PhonemePair)>,
        S: Into<String>,
    {
        let mut index = Self {
            entries: Vec::new(),
            by_syllable: HashMap::new(),
            by_pair: HashMap::new(),
            by_left: PhonemeGroups::default(),
            by_right: PhonemeGroups::default(),
        };

        for (syllable, pair) in entries {
            let syllable = syllable.into();
            if index.by_syllable.contains_key(&syllable) {
                return Err(ReclistError::DuplicateSyllable(syllable));
            }
            if let Some(&other) = index.by_pair.get(&pair) {
                return Err(ReclistError::DuplicatePair {
                    first: index.entries[other].0.clone(),
                    second: syllable,
                    left: pair.left,
                    right: pair.right,
                });
            }

            let pos = index.entries.len();
            index.by_left.push(&pair.left, &syllable);
            index.by_right.push(&pair.right, &syllable);
            index.by_syllable.insert(syllable.clone(), pos);
            index.by_pair.insert(pair.clone(), pos);
            index.entries.push((syllable, pair));
        }

        if index.entries.is_empty() {
            return Err(ReclistError::EmptyTable);
        }
        Ok(index)
    }

    /// Convenience constructor from `(syllable, left, right)` string triples.
    pub fn from_triples<'a, I>(triples: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str, &'a str)>,
    {
        Self::new(
            triples
                .into_iter()
                .map(|(s, l, r)| (s.to_string(), PhonemePair::new(l, r))),
        )
    }

    pub fn pair_of(&self, syllable: &str) -> Result<&PhonemePair> {
        self.by_syllable
            .get(syllable)
            .map(|&i| &self.entries[i].1)
            .ok_or_else(|| ReclistError::UnknownSyllable(syllable.to_string()))
    }

    pub fn reverse_lookup(&self, left: &str, right: &str) -> Result<&str> {
        let key = PhonemePair::new(left, right);
        self.by_pair
            .get(&key)
            .map(|&i| self.entries[i].0.as_str())
            .ok_or(ReclistError::UnknownPair { left: key.left, right: key.right })
    }

    pub fn syllables_by_left(&self) -> &PhonemeGroups {
        &self.by_left
    }

    pub fn syllables_by_right(&self) -> &PhonemeGroups {
        &self.by_right
    }

    pub fn contains(&self, syllable: &str) -> bool {
        self.by_syllable.contains_key(syllable)
    }

    /// Entries in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PhonemePair)> {
        self.entries.iter().map(|(s, p)| (s.as_str(), p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; construction rejects empty tables.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

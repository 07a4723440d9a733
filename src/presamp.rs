//! `presamp.ini` conversion.
//!
//! Only the two sections that describe the syllable inventory are read:
//!
//! ```text
//! [VOWEL]
//! a=a=あ,か,さ=100        vowel = display name = syllables = volume
//! [CONSONANT]
//! k=か,き,く=0            consonant = syllables = flag
//! ```
//!
//! Every syllable listed under a vowel takes that vowel as its right phoneme.
//! Its left phoneme is the consonant group that lists it, or the vowel itself
//! when no group does (bare vowels).  Other sections are ignored.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::{
    error::{ReclistError, Result},
    table::{PhonemePair, SyllableIndex},
};

/// Version written into the `[VERSION]` section.
const PRESAMP_VERSION: &str = "1.7";
/// Volume column written for every vowel line.
const DEFAULT_VOLUME: &str = "100";
/// Flag column written for every consonant line.
const DEFAULT_CONSONANT_FLAG: &str = "0";

static RE_SECTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[([^\]]+)\]$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Vowel,
    Consonant,
    Other,
}

fn split_syllables(field: &str) -> impl Iterator<Item = &str> {
    field.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn malformed(line: usize, message: impl Into<String>) -> ReclistError {
    ReclistError::Dictionary { line, message: message.into() }
}

/// Parse presamp.ini text into a syllable table.
///
/// Syllables that would duplicate an existing `(left, right)` pair are
/// skipped with a warning, since presamp files commonly list alternate
/// spellings of the same sound.
pub fn parse(text: &str) -> Result<SyllableIndex> {
    let mut section = Section::Other;
    // (syllable, vowel) in first-listed order
    let mut vowel_entries: Vec<(String, String)> = Vec::new();
    let mut consonant_of: HashMap<String, String> = HashMap::new();

    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }

        if let Some(caps) = RE_SECTION.captures(line) {
            section = match caps[1].trim().to_ascii_uppercase().as_str() {
                "VOWEL" => Section::Vowel,
                "CONSONANT" => Section::Consonant,
                _ => Section::Other,
            };
            continue;
        }

        let fields: Vec<&str> = line.split('=').map(str::trim).collect();
        match section {
            Section::Vowel => {
                if fields.len() < 3 || fields[0].is_empty() {
                    return Err(malformed(line_no, "expected vowel=name=syllables[=volume]"));
                }
                for syllable in split_syllables(fields[2]) {
                    vowel_entries.push((syllable.to_string(), fields[0].to_string()));
                }
            }
            Section::Consonant => {
                if fields.len() < 2 || fields[0].is_empty() {
                    return Err(malformed(line_no, "expected consonant=syllables[=flag]"));
                }
                for syllable in split_syllables(fields[1]) {
                    if let Some(prev) = consonant_of.get(syllable) {
                        if prev != fields[0] {
                            return Err(malformed(
                                line_no,
                                format!("'{}' listed under consonants '{}' and '{}'", syllable, prev, fields[0]),
                            ));
                        }
                        continue;
                    }
                    consonant_of.insert(syllable.to_string(), fields[0].to_string());
                }
            }
            Section::Other => {}
        }
    }

    let mut seen_pairs: HashMap<PhonemePair, String> = HashMap::new();
    let mut entries = Vec::with_capacity(vowel_entries.len());
    for (syllable, vowel) in vowel_entries {
        let left = consonant_of.get(&syllable).cloned().unwrap_or_else(|| vowel.clone());
        let pair = PhonemePair { left, right: vowel };
        if let Some(first) = seen_pairs.get(&pair) {
            warn!(%syllable, %first, left = %pair.left, right = %pair.right, "skipping syllable with duplicate pair");
            continue;
        }
        seen_pairs.insert(pair.clone(), syllable.clone());
        entries.push((syllable, pair));
    }

    SyllableIndex::new(entries)
}

/// Render a table as presamp.ini text.
pub fn render(table: &SyllableIndex) -> String {
    let mut out = String::new();
    out.push_str(&format!("[VERSION]\n{PRESAMP_VERSION}\n"));

    out.push_str("[VOWEL]\n");
    for (vowel, syllables) in table.syllables_by_right().iter() {
        out.push_str(&format!("{vowel}={vowel}={}={DEFAULT_VOLUME}\n", syllables.join(",")));
    }

    out.push_str("[CONSONANT]\n");
    for (consonant, syllables) in table.syllables_by_left().iter() {
        let members: Vec<&str> = syllables
            .iter()
            .map(String::as_str)
            .filter(|s| table.pair_of(s).is_ok_and(|p| p.left != p.right))
            .collect();
        if members.is_empty() {
            continue;
        }
        out.push_str(&format!("{consonant}={}={DEFAULT_CONSONANT_FLAG}\n", members.join(",")));
    }
    out
}

pub fn load(path: &Path) -> anyhow::Result<SyllableIndex> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read presamp: {}", path.display()))?;
    parse(&text).with_context(|| format!("Invalid presamp: {}", path.display()))
}

pub fn save(table: &SyllableIndex, path: &Path) -> anyhow::Result<()> {
    std::fs::write(path, render(table))
        .with_context(|| format!("Cannot write presamp: {}", path.display()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

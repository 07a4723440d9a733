//! JSON syllable dictionary.
//!
//! ```json
//! { "ka": ["k", "a"], "ki": ["k", "i"], "a": ["a", "a"] }
//! ```
//!
//! Key order is table order.  serde_json is built with `preserve_order`, so
//! reading and writing keep the order of the file.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::table::{PhonemePair, SyllableIndex};

/// Parse a dictionary from JSON text.
pub fn parse(text: &str) -> Result<SyllableIndex> {
    let map: Map<String, Value> =
        serde_json::from_str(text).context("Dictionary must be a JSON object")?;

    let mut entries = Vec::with_capacity(map.len());
    for (syllable, value) in map {
        let (left, right): (String, String) = serde_json::from_value(value)
            .with_context(|| format!("Entry '{}' must be a [left, right] pair", syllable))?;
        entries.push((syllable, PhonemePair { left, right }));
    }

    Ok(SyllableIndex::new(entries)?)
}

/// Render `table` as pretty-printed JSON.
pub fn to_json(table: &SyllableIndex) -> Result<String> {
    let map: Map<String, Value> = table
        .iter()
        .map(|(syllable, pair)| {
            (
                syllable.to_string(),
                Value::Array(vec![
                    Value::String(pair.left.clone()),
                    Value::String(pair.right.clone()),
                ]),
            )
        })
        .collect();
    serde_json::to_string_pretty(&Value::Object(map)).context("Failed to serialise dictionary")
}

pub fn load(path: &Path) -> Result<SyllableIndex> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read dictionary: {}", path.display()))?;
    parse(&text).with_context(|| format!("Invalid dictionary: {}", path.display()))
}

pub fn save(table: &SyllableIndex, path: &Path) -> Result<()> {
    let json = to_json(table)?;
    std::fs::write(path, json)
        .with_context(|| format!("Cannot write dictionary: {}", path.display()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

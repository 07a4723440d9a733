//! Public entry point: validate options, build lines, render the template.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    builder::{BuildParams, GenerationStats, Line, LineBuilder, Policy, Usage},
    error::{ReclistError, Result},
    table::SyllableIndex,
    timing::{line_beats, synthesize, Mode, TemplateLine},
};

/// Shortest accepted line.
pub const MIN_LINE_LENGTH: usize = 2;
/// Longest accepted line.
pub const MAX_LINE_LENGTH: usize = 8;

// ─────────────────────────────────────────────────────────────────────────────
// Options
// ─────────────────────────────────────────────────────────────────────────────

/// Generation parameters.  Deserialises from a JSON config where every field
/// is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    pub mode: Mode,
    pub policy: Policy,
    /// Guide-track tempo in beats per minute.
    pub bpm: u32,
    /// Syllables per line, `2..=8`.
    pub max_length: usize,
    /// Prefer patterns with three equal pivots in a row.
    pub sss_first: bool,
    /// Candidate patterns examined per in-turn attempt.
    pub iter_depth: usize,
    /// Padding syllables the in-turn tier may add in total.
    pub max_redundancy: usize,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Cvvc,
            policy: Policy::Default,
            bpm: 120,
            max_length: 6,
            sss_first: false,
            iter_depth: 100,
            max_redundancy: 50,
        }
    }
}

impl GenerateOptions {
    /// Read options from a JSON file; missing fields keep their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Cannot read config: {}", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_LINE_LENGTH..=MAX_LINE_LENGTH).contains(&self.max_length) {
            return Err(ReclistError::ParameterRange {
                name: "max_length",
                value: i64::try_from(self.max_length).unwrap_or(i64::MAX),
                expected: "2..=8",
            });
        }
        if self.bpm == 0 {
            return Err(ReclistError::ParameterRange {
                name: "bpm",
                value: 0,
                expected: "a positive tempo",
            });
        }
        Ok(())
    }

    fn build_params(&self) -> BuildParams {
        BuildParams {
            max_length: self.max_length,
            policy: self.policy,
            sss_first: self.sss_first,
            iter_depth: self.iter_depth,
            max_redundancy: self.max_redundancy,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Result
// ─────────────────────────────────────────────────────────────────────────────

/// Everything one generation produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub lines: Vec<Line>,
    pub stats: GenerationStats,
    pub usage: Usage,
    pub template: Vec<TemplateLine>,
}

impl Generation {
    /// Recording script, one line name per entry.
    pub fn script_lines(&self) -> Vec<String> {
        self.lines.iter().map(Line::name).collect()
    }

    /// oto.ini template lines for every recorded line, in order.
    pub fn oto_lines(&self) -> Vec<String> {
        self.template.iter().flat_map(TemplateLine::oto_lines).collect()
    }

    /// Guide-track length covering every line, in beats.
    pub fn guide_beats(&self) -> usize {
        self.lines.iter().map(line_beats).max().unwrap_or(0)
    }

    /// Total syllable slots across all lines, padding included.
    pub fn slot_count(&self) -> usize {
        self.lines.iter().map(Line::len).sum()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Generator
// ─────────────────────────────────────────────────────────────────────────────

/// Reclist generator over one immutable syllable table.
///
/// `generate` keeps all run state local, so a generator can be shared and
/// called repeatedly; identical options yield identical output.
#[derive(Debug, Clone)]
pub struct Generator {
    table: SyllableIndex,
}

impl Generator {
    pub fn new(table: SyllableIndex) -> Self {
        Self { table }
    }

    pub fn generate(&self, options: &GenerateOptions) -> Result<Generation> {
        options.validate()?;

        let out = LineBuilder::new(&self.table, options.build_params()).run()?;
        let template = synthesize(&out.lines, options.bpm, options.mode);

        info!(
            lines = out.lines.len(),
            perfect = out.stats.perfect_fluent,
            in_turn = out.stats.in_turn_fluent,
            not_fluent = out.stats.not_fluent,
            redundancy = out.stats.redundancy,
            "reclist generated"
        );

        Ok(Generation { lines: out.lines, stats: out.stats, usage: out.usage, template })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> Generator {
        Generator::new(
            SyllableIndex::from_triples([("ka", "k", "a"), ("ta", "t", "a"), ("sa", "s", "a")])
                .unwrap(),
        )
    }

    #[test]
    fn test_defaults() {
        let o = GenerateOptions::default();
        assert_eq!(o.max_length, 6);
        assert_eq!(o.max_redundancy, 50);
        assert_eq!(o.bpm, 120);
        assert!(o.validate().is_ok());
    }

    #[test]
    fn test_max_length_out_of_range() {
        let g = generator();
        for bad in [0, 1, 9] {
            let o = GenerateOptions { max_length: bad, ..Default::default() };
            assert!(matches!(
                g.generate(&o),
                Err(ReclistError::ParameterRange { name: "max_length", .. })
            ));
        }
    }

    #[test]
    fn test_huge_max_length_reported_saturated() {
        let o = GenerateOptions { max_length: usize::MAX, ..Default::default() };
        assert_eq!(
            o.validate().unwrap_err(),
            ReclistError::ParameterRange { name: "max_length", value: i64::MAX, expected: "2..=8" }
        );
    }

    #[test]
    fn test_guide_beats_use_longest_line() {
        let o = GenerateOptions { max_length: 3, ..Default::default() };
        // Lead-in, three syllables, release.
        assert_eq!(generator().generate(&o).unwrap().guide_beats(), 5);
    }

    #[test]
    fn test_zero_bpm_rejected() {
        let o = GenerateOptions { bpm: 0, ..Default::default() };
        assert!(generator().generate(&o).is_err());
    }

    #[test]
    fn test_generate_outputs() {
        let g = generator();
        let o = GenerateOptions { max_length: 3, ..Default::default() };
        let out = g.generate(&o).unwrap();
        assert_eq!(out.script_lines(), vec!["ka_ta_sa"]);
        assert_eq!(out.stats.perfect_fluent, 1);
        assert_eq!(out.template.len(), 1);
        assert_eq!(out.oto_lines().len(), 6);
        assert!(out.oto_lines()[0].starts_with("ka_ta_sa.wav=- ka,"));
    }

    #[test]
    fn test_repeated_calls_are_independent() {
        let g = generator();
        let o = GenerateOptions { max_length: 3, ..Default::default() };
        let first = g.generate(&o).unwrap();
        let second = g.generate(&o).unwrap();
        assert_eq!(first, second);
        assert_eq!(second.stats.perfect_fluent, 1);
    }

    #[test]
    fn test_options_from_partial_json() {
        let o: GenerateOptions =
            serde_json::from_str(r#"{"mode": "VCV", "max_length": 4, "policy": "NO_IN_TURN"}"#)
                .unwrap();
        assert_eq!(o.mode, Mode::Vcv);
        assert_eq!(o.policy, Policy::NoInTurn);
        assert_eq!(o.max_length, 4);
        assert_eq!(o.max_redundancy, 50);
    }
}

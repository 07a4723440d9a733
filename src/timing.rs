//! oto.ini template synthesis.
//!
//! Each line is assumed to be sung one syllable per beat against a guide
//! track, after a one-beat lead-in.  Walking the line's segments with a beat
//! cursor gives the time of every onset, transition and release; each one
//! becomes an oto entry whose parameters are fixed fractions of a beat.
//!
//! | Segment      | CVVC alias | VCV alias | Beat cost |
//! |--------------|------------|-----------|-----------|
//! | `Head`       | `- ka`     | `- ka`    | 1         |
//! | `Transition` | `a k`      | —         | 0         |
//! | `Body`       | `ka`       | `a ka`    | 1         |
//! | `Tail`       | `a -`      | `a -`     | 1         |
//! | `Rest`       | —          | —         | 1         |
//!
//! `VCV_WITH_VC` emits the VCV aliases plus the CVVC `a k` transitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::builder::{Line, Segment};

/// Silent beats before the first syllable of every line.
pub const LEAD_IN_BEATS: f64 = 1.0;

/// Consonant lead before a syllable's beat (preutterance), in beats.
const PREUTTERANCE_BEATS: f64 = 0.25;
/// Crossfade region at the start of each entry, in beats.
const OVERLAP_BEATS: f64 = 0.05;
/// Portion of the preceding vowel included in VC / VCV / tail entries.
const VOWEL_LEAD_BEATS: f64 = 0.25;
/// Fixed (unstretched) region after the preutterance, in beats.
const FIXED_BEATS: f64 = 0.25;
/// Usable length after the preutterance, in beats.
const SPAN_BEATS: f64 = 0.5;

/// Pair semantics used for aliasing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Mode {
    #[default]
    #[serde(rename = "CVVC")]
    #[cfg_attr(feature = "cli", value(name = "CVVC"))]
    Cvvc,
    #[serde(rename = "VCV")]
    #[cfg_attr(feature = "cli", value(name = "VCV"))]
    Vcv,
    #[serde(rename = "VCV_WITH_VC")]
    #[cfg_attr(feature = "cli", value(name = "VCV_WITH_VC"))]
    VcvWithVc,
}

impl Mode {
    fn vc_aliases(self) -> bool {
        matches!(self, Mode::Cvvc | Mode::VcvWithVc)
    }

    fn vcv_aliases(self) -> bool {
        matches!(self, Mode::Vcv | Mode::VcvWithVc)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Template types
// ─────────────────────────────────────────────────────────────────────────────

/// One oto.ini entry; every time value is in milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct OtoEntry {
    pub alias: String,
    pub offset: f64,
    pub consonant: f64,
    /// Negative: measured from `offset`.
    pub cutoff: f64,
    pub preutterance: f64,
    pub overlap: f64,
}

/// All entries for one recorded line.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLine {
    pub name: String,
    pub entries: Vec<OtoEntry>,
}

impl TemplateLine {
    pub fn file_name(&self) -> String {
        format!("{}.wav", self.name)
    }

    /// Phoneme boundary times (offset + preutterance) in recording order.
    pub fn boundaries(&self) -> Vec<f64> {
        self.entries.iter().map(|e| round_ms(e.offset + e.preutterance)).collect()
    }

    /// `NAME.wav=alias,offset,consonant,cutoff,preutterance,overlap` lines.
    pub fn oto_lines(&self) -> Vec<String> {
        let file = self.file_name();
        self.entries.iter().map(|e| format!("{file}={e}")).collect()
    }
}

impl fmt::Display for OtoEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{}",
            self.alias, self.offset, self.consonant, self.cutoff, self.preutterance, self.overlap
        )
    }
}

fn round_ms(ms: f64) -> f64 {
    (ms * 1000.0).round() / 1000.0
}

/// Build an entry from its raw quantities, rounding every field.
fn entry(alias: String, offset: f64, preutterance: f64, fixed: f64, span: f64, overlap: f64) -> OtoEntry {
    OtoEntry {
        alias,
        offset: round_ms(offset),
        consonant: round_ms(preutterance + fixed),
        cutoff: round_ms(-(preutterance + span)),
        preutterance: round_ms(preutterance),
        overlap: round_ms(overlap),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Synthesis
// ─────────────────────────────────────────────────────────────────────────────

/// Duration of one beat in milliseconds.
pub fn beat_ms(bpm: u32) -> f64 {
    60_000.0 / f64::from(bpm)
}

/// Beats `line` occupies on the guide grid: the lead-in plus one beat for
/// every segment except transitions.
pub fn line_beats(line: &Line) -> usize {
    let sung = line
        .segments
        .iter()
        .filter(|s| !matches!(s, Segment::Transition { .. }))
        .count();
    LEAD_IN_BEATS as usize + sung
}

/// Render the oto template for `lines` at `bpm`.
///
/// `bpm` must be non-zero; the generator validates it before calling.
pub fn synthesize(lines: &[Line], bpm: u32, mode: Mode) -> Vec<TemplateLine> {
    let beat = beat_ms(bpm);
    lines.iter().map(|line| template_line(line, beat, mode)).collect()
}

fn template_line(line: &Line, beat: f64, mode: Mode) -> TemplateLine {
    let pre = PREUTTERANCE_BEATS * beat;
    let lead = VOWEL_LEAD_BEATS * beat;
    let overlap = OVERLAP_BEATS * beat;

    let mut cursor = LEAD_IN_BEATS;
    let mut prev_right: Option<&str> = None;
    let mut entries = Vec::new();

    for segment in &line.segments {
        let at = cursor * beat;
        match segment {
            Segment::Head(syllable) => {
                entries.push(entry(
                    format!("- {syllable}"),
                    at - pre,
                    pre,
                    FIXED_BEATS * beat,
                    SPAN_BEATS * beat,
                    overlap,
                ));
                cursor += 1.0;
            }
            Segment::Transition { right, left } => {
                if mode.vc_aliases() {
                    entries.push(entry(
                        format!("{right} {left}"),
                        at - pre - lead,
                        lead,
                        pre / 2.0,
                        pre,
                        overlap,
                    ));
                }
                prev_right = Some(right.as_str());
            }
            Segment::Body(syllable) => {
                match prev_right.filter(|_| mode.vcv_aliases()) {
                    Some(right) => entries.push(entry(
                        format!("{right} {syllable}"),
                        at - pre - lead,
                        pre + lead,
                        FIXED_BEATS * beat,
                        SPAN_BEATS * beat,
                        overlap,
                    )),
                    None => entries.push(entry(
                        syllable.clone(),
                        at - pre,
                        pre,
                        FIXED_BEATS * beat,
                        SPAN_BEATS * beat,
                        overlap,
                    )),
                }
                cursor += 1.0;
            }
            Segment::Tail(right) => {
                entries.push(entry(
                    format!("{right} -"),
                    at - lead,
                    lead,
                    FIXED_BEATS * beat / 2.0,
                    SPAN_BEATS * beat,
                    overlap,
                ));
                cursor += 1.0;
            }
            Segment::Rest => cursor += 1.0,
        }
    }

    TemplateLine { name: line.name(), entries }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{Fluency, Slot};

    fn ka_ta() -> Line {
        Line {
            slots: vec![
                Slot { syllable: "ka".into(), padding: false },
                Slot { syllable: "ta".into(), padding: false },
            ],
            segments: vec![
                Segment::Head("ka".into()),
                Segment::Transition { right: "a".into(), left: "t".into() },
                Segment::Body("ta".into()),
                Segment::Tail("a".into()),
            ],
            fluency: Fluency::Perfect,
        }
    }

    #[test]
    fn test_beat_ms() {
        assert_eq!(beat_ms(120), 500.0);
        assert_eq!(beat_ms(60), 1000.0);
    }

    #[test]
    fn test_cvvc_entries_at_120_bpm() {
        let t = synthesize(&[ka_ta()], 120, Mode::Cvvc);
        assert_eq!(t.len(), 1);
        assert_eq!(
            t[0].oto_lines(),
            vec![
                "ka_ta.wav=- ka,375,250,-375,125,25",
                "ka_ta.wav=a t,750,187.5,-250,125,25",
                "ka_ta.wav=ta,875,250,-375,125,25",
                "ka_ta.wav=a -,1375,187.5,-375,125,25",
            ]
        );
    }

    #[test]
    fn test_boundaries_follow_beats() {
        let t = synthesize(&[ka_ta()], 120, Mode::Cvvc);
        assert_eq!(t[0].boundaries(), vec![500.0, 875.0, 1000.0, 1500.0]);
    }

    #[test]
    fn test_vcv_aliases() {
        let t = synthesize(&[ka_ta()], 120, Mode::Vcv);
        let aliases: Vec<&str> = t[0].entries.iter().map(|e| e.alias.as_str()).collect();
        assert_eq!(aliases, vec!["- ka", "a ta", "a -"]);

        let t = synthesize(&[ka_ta()], 120, Mode::VcvWithVc);
        let aliases: Vec<&str> = t[0].entries.iter().map(|e| e.alias.as_str()).collect();
        assert_eq!(aliases, vec!["- ka", "a t", "a ta", "a -"]);
    }

    #[test]
    fn test_rest_advances_without_entry() {
        let line = Line {
            slots: vec![
                Slot { syllable: "ka".into(), padding: false },
                Slot { syllable: "ta".into(), padding: false },
            ],
            segments: vec![
                Segment::Head("ka".into()),
                Segment::Tail("a".into()),
                Segment::Head("ta".into()),
                Segment::Rest,
            ],
            fluency: Fluency::NotFluent,
        };
        let t = synthesize(&[line], 60, Mode::Cvvc);
        assert_eq!(t[0].entries.len(), 3);
        // Lead-in, ka, release: ta starts on beat 3.
        assert_eq!(t[0].entries[2].alias, "- ta");
        assert_eq!(t[0].entries[2].offset, 2750.0);
    }

    #[test]
    fn test_line_beats() {
        assert_eq!(line_beats(&ka_ta()), 4);

        // Two isolated syllables take two beats each.
        let line = Line {
            slots: vec![
                Slot { syllable: "ka".into(), padding: false },
                Slot { syllable: "ta".into(), padding: false },
            ],
            segments: vec![
                Segment::Head("ka".into()),
                Segment::Tail("a".into()),
                Segment::Head("ta".into()),
                Segment::Rest,
            ],
            fluency: Fluency::NotFluent,
        };
        assert_eq!(line_beats(&line), 5);

        // The last onset plus its own beat still fits the line's beats.
        let t = synthesize(&[line.clone()], 60, Mode::Cvvc);
        let last = *t[0].boundaries().last().unwrap();
        assert!(last + beat_ms(60) <= line_beats(&line) as f64 * beat_ms(60));
    }

    #[test]
    fn test_deterministic() {
        let a = synthesize(&[ka_ta()], 97, Mode::Cvvc);
        let b = synthesize(&[ka_ta()], 97, Mode::Cvvc);
        assert_eq!(a, b);
    }
}

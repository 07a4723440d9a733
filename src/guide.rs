//! Metronome guide track for recording sessions.
//!
//! Lines are sung one syllable per beat after a lead-in (see
//! [`crate::timing`]); the guide clicks every beat so the singer lands on the
//! same grid the oto template assumes.  Lead-in beats click higher.  Size a
//! guide with [`crate::timing::line_beats`] of the longest line.

use std::{f32::consts::TAU, path::Path};

use anyhow::{Context, Result};
use tracing::info;

use crate::timing::{beat_ms, LEAD_IN_BEATS};

/// Guide sample rate.
pub const GUIDE_SAMPLE_RATE: u32 = 44_100;

/// Click length in seconds.
const CLICK_SECONDS: f32 = 0.03;
const CLICK_HZ: f32 = 1_000.0;
const LEAD_IN_CLICK_HZ: f32 = 1_500.0;
const CLICK_AMPLITUDE: f32 = 0.8;

/// Render `beats` clicks at `bpm` as mono samples in `[-1, 1]`.
///
/// The first [`LEAD_IN_BEATS`] beats use the lead-in pitch.
pub fn click_track(bpm: u32, beats: usize) -> Vec<f32> {
    if bpm == 0 || beats == 0 {
        return Vec::new();
    }
    let beat_samples = (beat_ms(bpm) / 1000.0 * f64::from(GUIDE_SAMPLE_RATE)).round() as usize;
    let click_samples = ((CLICK_SECONDS * GUIDE_SAMPLE_RATE as f32) as usize).min(beat_samples);
    let lead_in = LEAD_IN_BEATS as usize;

    let mut audio = vec![0.0f32; beat_samples * beats];
    for beat in 0..beats {
        let hz = if beat < lead_in { LEAD_IN_CLICK_HZ } else { CLICK_HZ };
        let start = beat * beat_samples;
        for i in 0..click_samples {
            let t = i as f32 / GUIDE_SAMPLE_RATE as f32;
            // Linear decay keeps the click from popping at its tail.
            let envelope = 1.0 - i as f32 / click_samples as f32;
            audio[start + i] = CLICK_AMPLITUDE * envelope * (TAU * hz * t).sin();
        }
    }
    audio
}

/// Write a 16-bit PCM mono guide WAV.
pub fn write_guide(path: &Path, bpm: u32, beats: usize) -> Result<()> {
    let audio = click_track(bpm, beats);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: GUIDE_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Cannot create WAV: {}", path.display()))?;
    for &s in &audio {
        let s16 = (s * i16::MAX as f32).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
        writer.write_sample(s16).context("WAV write error")?;
    }
    writer.finalize().context("WAV finalise error")?;
    info!(beats, bpm, path = %path.display(), "guide track written");
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

//! # reclist
//!
//! Recording-list generator for CVVC / VCV voicebanks.
//!
//! Given a syllable table, where each syllable is a `(left, right)` phoneme
//! pair, build a short recording script that covers every syllable, chains
//! as many as possible through shared phonemes, and emits the matching
//! oto.ini template.
//!
//! ## Quick start
//!
//! ```no_run
//! use reclist::{dictionary, GenerateOptions, Generator};
//!
//! let table = dictionary::load(std::path::Path::new("syllables.json")).unwrap();
//! let generation = Generator::new(table)
//!     .generate(&GenerateOptions::default())
//!     .unwrap();
//!
//! for line in generation.script_lines() {
//!     println!("{line}");
//! }
//! ```
//!
//! ## Pipeline
//! 1. **Pair inventory** — every syllable becomes an uncombined `(left, right)` pair.
//! 2. **Perfect-fluent lines** — full-length lines sharing one pivot phoneme.
//! 3. **In-turn lines** — leftover groups woven together by a label pattern,
//!    padded with already-recorded syllables within a budget.
//! 4. **Fallback** — whatever is left, recorded as isolated syllables.
//! 5. **Timing** — one beat per syllable → oto.ini template entries.
//!
//! ## Dictionary formats
//! | Module         | Format                                   |
//! |----------------|------------------------------------------|
//! | [`dictionary`] | JSON object `{ "ka": ["k", "a"], … }`    |
//! | [`presamp`]    | legacy `presamp.ini` `[VOWEL]`/`[CONSONANT]` |

pub mod builder;
pub mod dictionary;
pub mod error;
pub mod generator;
pub mod guide;
pub mod pairs;
pub mod pattern;
pub mod presamp;
pub mod table;
pub mod timing;

// ─── Re-exports for convenience ─────────────────────────────────────────────

pub use builder::{Fluency, GenerationStats, Line, Policy, Segment};
pub use error::ReclistError;
pub use generator::{GenerateOptions, Generation, Generator};
pub use table::{PhonemePair, SyllableIndex};
pub use timing::{Mode, TemplateLine};

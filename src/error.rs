//! Error type shared by the table, the generator and the dictionary readers.

use thiserror::Error;

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, ReclistError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReclistError {
    /// The syllable table has no entries.
    #[error("syllable table is empty")]
    EmptyTable,

    /// A lookup named a syllable that is not in the table.
    #[error("unknown syllable '{0}'")]
    UnknownSyllable(String),

    /// No syllable maps to the requested `(left, right)` pair.
    #[error("no syllable maps to the pair ({left}, {right})")]
    UnknownPair { left: String, right: String },

    /// The same syllable identifier was listed twice.
    #[error("syllable '{0}' is defined more than once")]
    DuplicateSyllable(String),

    /// Two syllables share an identical `(left, right)` pair.
    #[error("syllables '{first}' and '{second}' share the pair ({left}, {right})")]
    DuplicatePair {
        first: String,
        second: String,
        left: String,
        right: String,
    },

    /// A generation parameter is outside its accepted range.
    #[error("{name} = {value} is out of range, expected {expected}")]
    ParameterRange {
        name: &'static str,
        value: i64,
        expected: &'static str,
    },

    /// A dictionary file could not be interpreted.
    #[error("dictionary format error at line {line}: {message}")]
    Dictionary { line: usize, message: String },
}

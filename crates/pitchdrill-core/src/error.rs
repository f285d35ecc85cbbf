//! Error types for the exercise engine.

use thiserror::Error;

use crate::pitch::{CODE_MAX, CODE_MIN, OCTAVE_MAX, OCTAVE_MIN};

/// A MIDI key code could not be resolved to a pitch class and octave.
///
/// Codes below [`CODE_MIN`] fall into the reserved bottom octaves of the
/// raw code space; codes above [`CODE_MAX`] are beyond the supported
/// octave span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("MIDI code {code} is outside the playable range {CODE_MIN}..={CODE_MAX}")]
pub struct DecodeError {
    /// The offending code.
    pub code: u8,
}

/// The configured range and allow-list yield no notes to ask.
///
/// This is a valid terminal state of the settings (for example an empty
/// allow-list, or an inverted range), not a programming error. Callers
/// surface it to the user and leave prior state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no eligible notes in the configured range; widen the range or allow more pitch classes")]
pub struct NoEligibleNotesError;

/// A persisted settings value could not be parsed.
///
/// Parsing always fails fast; falling back to defaults is the caller's
/// decision, never the parser's.
#[derive(Debug, Error)]
pub enum ConfigParseError {
    /// A stored pitch-class name is not one of the 12 note names.
    #[error("unknown pitch class {name:?} in field {field:?}")]
    UnknownPitchClass {
        /// The unparseable value.
        name: String,
        /// The settings field it came from.
        field: &'static str,
    },

    /// A stored relative-mode name is not recognized.
    #[error("unknown relative mode {name:?}")]
    UnknownRelativeMode {
        /// The unparseable value.
        name: String,
    },

    /// A stored octave is outside the supported span.
    #[error("octave {octave} in field {field:?} is outside {OCTAVE_MIN}..={OCTAVE_MAX}")]
    OctaveOutOfRange {
        /// The offending octave.
        octave: u8,
        /// The settings field it came from.
        field: &'static str,
    },

    /// A stored MIDI channel is not in 0..=15.
    #[error("MIDI channel {channel} is outside 0..=15")]
    ChannelOutOfRange {
        /// The offending channel.
        channel: u8,
    },

    /// The settings file could not be read or written.
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid JSON for the expected shape.
    #[error("settings JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

//! Relative (interval) mode: playing a reference note alongside the cue.

use serde::{Deserialize, Serialize};

use crate::pitch::{KeyboardNote, PitchClass};

/// How the reference note is ordered against the cue during playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativeMode {
    /// No reference note; only the cue is played.
    None,
    /// The lower of the two notes plays first.
    Ascending,
    /// The higher of the two notes plays first.
    Descending,
    /// First-vs-second ordering is chosen at random per cue.
    Random,
}

impl RelativeMode {
    /// Returns the mode as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            RelativeMode::None => "none",
            RelativeMode::Ascending => "ascending",
            RelativeMode::Descending => "descending",
            RelativeMode::Random => "random",
        }
    }
}

impl std::fmt::Display for RelativeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RelativeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(RelativeMode::None),
            "ascending" | "asc" => Ok(RelativeMode::Ascending),
            "descending" | "desc" => Ok(RelativeMode::Descending),
            "random" => Ok(RelativeMode::Random),
            _ => Err(format!("unknown relative mode: {}", s)),
        }
    }
}

/// Configuration for relative mode.
///
/// When `mode` is not [`RelativeMode::None`] and a reference pitch is
/// set, a reference note is derived and played alongside each cue. A
/// missing reference octave means "use the cue's octave".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativeSpec {
    /// Playback ordering of reference vs cue.
    pub mode: RelativeMode,
    /// Pitch class of the reference note.
    pub reference_pitch: Option<PitchClass>,
    /// Octave of the reference note; defaults to the cue's octave.
    pub reference_octave: Option<u8>,
}

impl RelativeSpec {
    /// Derives the reference note to play for a given cue.
    ///
    /// Returns `None` when relative mode is off or no reference pitch is
    /// configured.
    pub fn reference_note(&self, cue: &KeyboardNote) -> Option<KeyboardNote> {
        if self.mode == RelativeMode::None {
            return None;
        }
        let pitch = self.reference_pitch?;
        let octave = self.reference_octave.unwrap_or(cue.octave);
        Some(KeyboardNote::from_parts(pitch, octave))
    }
}

impl Default for RelativeSpec {
    fn default() -> Self {
        RelativeSpec {
            mode: RelativeMode::None,
            reference_pitch: None,
            reference_octave: None,
        }
    }
}

//! Conversion between MIDI key codes and (pitch class, octave) pairs.

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::pitch::class::PitchClass;

/// Codes below this are the reserved bottom two octaves of the raw
/// 0-127 code space; C in octave 1 sits exactly here.
pub const BASE_OFFSET: u8 = 24;

/// Lowest octave the codec models.
pub const OCTAVE_MIN: u8 = 1;

/// Highest octave the codec models (B8 = code 119).
pub const OCTAVE_MAX: u8 = 8;

/// Lowest playable code (C1).
pub const CODE_MIN: u8 = BASE_OFFSET;

/// Highest playable code (B8).
pub const CODE_MAX: u8 = 119;

/// Encodes a pitch class and octave into a MIDI key code.
///
/// Codes increase monotonically with octave, then with semitone offset
/// within an octave. Octaves outside [`OCTAVE_MIN`]..=[`OCTAVE_MAX`] are
/// clamped into the playable code range.
///
/// # Examples
/// ```
/// use pitchdrill_core::pitch::{encode, PitchClass};
///
/// assert_eq!(encode(PitchClass::C, 1), 24);
/// assert_eq!(encode(PitchClass::C, 2), 36);
/// assert_eq!(encode(PitchClass::B, 3), 59);
/// ```
pub fn encode(pitch_class: PitchClass, octave: u8) -> u8 {
    let code = pitch_class.offset() as i32 + (octave as i32 - 1) * 12 + BASE_OFFSET as i32;
    code.clamp(CODE_MIN as i32, CODE_MAX as i32) as u8
}

/// Decodes a MIDI key code into its pitch class and octave.
///
/// Fails when `code` falls outside the playable range, i.e. in the
/// reserved bottom octaves or above B8.
///
/// # Examples
/// ```
/// use pitchdrill_core::pitch::{decode, PitchClass};
///
/// assert_eq!(decode(36).unwrap(), (PitchClass::C, 2));
/// assert!(decode(21).is_err());
/// ```
pub fn decode(code: u8) -> Result<(PitchClass, u8), DecodeError> {
    if !(CODE_MIN..=CODE_MAX).contains(&code) {
        return Err(DecodeError { code });
    }
    let octave = code / 12 - 1;
    let offset = code % 12;
    // Offsets are always 0-11 here; the lookup guards the arithmetic anyway.
    let pitch_class = PitchClass::from_offset(offset).ok_or(DecodeError { code })?;
    Ok((pitch_class, octave))
}

/// A resolved pitch: pitch class, octave, and the MIDI code that encodes
/// them.
///
/// The three fields always agree (`code == encode(pitch_class, octave)`).
/// "No note" is represented as `Option<KeyboardNote>` rather than a
/// sentinel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardNote {
    /// The chromatic note name.
    pub pitch_class: PitchClass,
    /// The octave number (1-8).
    pub octave: u8,
    /// The MIDI key code.
    pub code: u8,
}

impl KeyboardNote {
    /// Resolves a MIDI key code into a note.
    pub fn from_code(code: u8) -> Result<Self, DecodeError> {
        let (pitch_class, octave) = decode(code)?;
        Ok(KeyboardNote {
            pitch_class,
            octave,
            code,
        })
    }

    /// Builds a note from a pitch class and octave.
    pub fn from_parts(pitch_class: PitchClass, octave: u8) -> Self {
        let code = encode(pitch_class, octave);
        KeyboardNote {
            pitch_class,
            octave,
            code,
        }
    }
}

impl std::fmt::Display for KeyboardNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.pitch_class, self.octave)
    }
}

//! Pitch classes, the MIDI note codec, and resolved keyboard notes.
//!
//! This module provides deterministic conversion between MIDI key codes
//! and (pitch class, octave) pairs. The bottom two octaves of the raw
//! 0-127 code space are reserved, so C in octave 1 maps to code 24 and
//! codes below that are not playable notes.

mod class;
mod codec;


// Re-export all public items to preserve API
pub use class::{PitchClass, PITCH_CLASS_COUNT};

pub use codec::{
    decode, encode, KeyboardNote, BASE_OFFSET, CODE_MAX, CODE_MIN, OCTAVE_MAX, OCTAVE_MIN,
};

//! Range specification and eligible-code computation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::pitch::{encode, PitchClass};

/// Which notes the player wants to be quizzed on.
///
/// The range covers the inclusive code span from
/// `encode(start_pitch, start_octave)` to `encode(end_pitch, end_octave)`;
/// within that span only the allowed pitch classes are eligible. An
/// inverted range or an empty allow-list is valid and simply yields no
/// eligible notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSpec {
    /// Pitch class of the lowest note in the range.
    pub start_pitch: PitchClass,
    /// Octave of the lowest note in the range.
    pub start_octave: u8,
    /// Pitch class of the highest note in the range.
    pub end_pitch: PitchClass,
    /// Octave of the highest note in the range.
    pub end_octave: u8,
    /// Pitch classes eligible to be asked, in any octave of the span.
    pub allowed_pitch_classes: BTreeSet<PitchClass>,
    /// When true, a guess only has to match the cue's pitch class; the
    /// octave is ignored.
    pub allow_octave_mismatch: bool,
}

impl RangeSpec {
    /// MIDI code of the range start.
    pub fn start_code(&self) -> u8 {
        encode(self.start_pitch, self.start_octave)
    }

    /// MIDI code of the range end.
    pub fn end_code(&self) -> u8 {
        encode(self.end_pitch, self.end_octave)
    }
}

impl Default for RangeSpec {
    /// C2..B3, white keys only, octave mismatches tolerated.
    fn default() -> Self {
        RangeSpec {
            start_pitch: PitchClass::C,
            start_octave: 2,
            end_pitch: PitchClass::B,
            end_octave: 3,
            allowed_pitch_classes: PitchClass::NATURALS.into_iter().collect(),
            allow_octave_mismatch: true,
        }
    }
}

/// Computes the sorted set of MIDI codes eligible to be asked.
///
/// Builds the cross product of the allowed pitch classes and the octave
/// span, encodes each candidate, and retains only the codes inside the
/// inclusive start/end span. Deterministic; sampling is the caller's job.
///
/// # Examples
/// ```
/// use std::collections::BTreeSet;
/// use pitchdrill_core::{compute_eligible, PitchClass, RangeSpec};
///
/// let spec = RangeSpec {
///     allowed_pitch_classes: BTreeSet::from([PitchClass::C]),
///     ..RangeSpec::default()
/// };
/// assert_eq!(compute_eligible(&spec), vec![36, 48]);
/// ```
pub fn compute_eligible(spec: &RangeSpec) -> Vec<u8> {
    let start = spec.start_code();
    let end = spec.end_code();

    let mut codes: Vec<u8> = spec
        .allowed_pitch_classes
        .iter()
        .flat_map(|&pc| {
            (spec.start_octave..=spec.end_octave).map(move |octave| encode(pc, octave))
        })
        .filter(|&code| code >= start && code <= end)
        .collect();

    codes.sort_unstable();
    codes.dedup();
    codes
}

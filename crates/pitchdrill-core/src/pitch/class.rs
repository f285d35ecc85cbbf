//! The 12 chromatic pitch classes and their fixed lookup table.

use serde::{Deserialize, Serialize};

/// Number of pitch classes in an octave.
pub const PITCH_CLASS_COUNT: usize = 12;

/// One of the 12 chromatic note names, independent of octave.
///
/// The discriminant is the semitone offset within an octave (C = 0,
/// B = 11). Descriptive fields (display name, white-key flag) live in a
/// fixed table indexed by that offset rather than on the variants
/// themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PitchClass {
    /// C
    #[serde(rename = "C")]
    C = 0,
    /// C sharp / D flat
    #[serde(rename = "C#")]
    CSharp = 1,
    /// D
    #[serde(rename = "D")]
    D = 2,
    /// D sharp / E flat
    #[serde(rename = "D#")]
    DSharp = 3,
    /// E
    #[serde(rename = "E")]
    E = 4,
    /// F
    #[serde(rename = "F")]
    F = 5,
    /// F sharp / G flat
    #[serde(rename = "F#")]
    FSharp = 6,
    /// G
    #[serde(rename = "G")]
    G = 7,
    /// G sharp / A flat
    #[serde(rename = "G#")]
    GSharp = 8,
    /// A
    #[serde(rename = "A")]
    A = 9,
    /// A sharp / B flat
    #[serde(rename = "A#")]
    ASharp = 10,
    /// B
    #[serde(rename = "B")]
    B = 11,
}

/// Descriptive fields for one pitch class.
struct PitchClassInfo {
    name: &'static str,
    natural: bool,
}

/// Lookup table indexed by semitone offset 0-11.
const PITCH_CLASS_TABLE: [PitchClassInfo; PITCH_CLASS_COUNT] = [
    PitchClassInfo { name: "C", natural: true },
    PitchClassInfo { name: "C#", natural: false },
    PitchClassInfo { name: "D", natural: true },
    PitchClassInfo { name: "D#", natural: false },
    PitchClassInfo { name: "E", natural: true },
    PitchClassInfo { name: "F", natural: true },
    PitchClassInfo { name: "F#", natural: false },
    PitchClassInfo { name: "G", natural: true },
    PitchClassInfo { name: "G#", natural: false },
    PitchClassInfo { name: "A", natural: true },
    PitchClassInfo { name: "A#", natural: false },
    PitchClassInfo { name: "B", natural: true },
];

impl PitchClass {
    /// All pitch classes in ascending semitone order.
    pub const ALL: [PitchClass; PITCH_CLASS_COUNT] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// The seven natural (white-key) pitch classes.
    pub const NATURALS: [PitchClass; 7] = [
        PitchClass::C,
        PitchClass::D,
        PitchClass::E,
        PitchClass::F,
        PitchClass::G,
        PitchClass::A,
        PitchClass::B,
    ];

    /// Returns the semitone offset within an octave (0-11).
    pub fn offset(self) -> u8 {
        self as u8
    }

    /// Returns the display name (e.g. `"C#"`).
    pub fn name(self) -> &'static str {
        PITCH_CLASS_TABLE[self as usize].name
    }

    /// Returns true for the seven white-key pitch classes.
    pub fn is_natural(self) -> bool {
        PITCH_CLASS_TABLE[self as usize].natural
    }

    /// Looks up the pitch class for a semitone offset.
    ///
    /// Returns `None` when `offset` is 12 or greater.
    pub fn from_offset(offset: u8) -> Option<PitchClass> {
        PitchClass::ALL.get(offset as usize).copied()
    }
}

impl std::fmt::Display for PitchClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for PitchClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PitchClass::ALL
            .iter()
            .copied()
            .find(|pc| pc.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown pitch class: {}", s))
    }
}

//! Persisted settings: a flat record of primitive values.
//!
//! Settings live on disk as a single JSON object of strings, ints, and
//! bools keyed by field name, mirroring how the trainer's configuration
//! store hands them over. Parsing into [`RangeSpec`]/[`RelativeSpec`]
//! fails fast on bad values; deciding to fall back to defaults after a
//! failed load is the application's call, never this module's.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigParseError;
use crate::pitch::{PitchClass, OCTAVE_MAX, OCTAVE_MIN};
use crate::range::RangeSpec;
use crate::relative::{RelativeMode, RelativeSpec};

/// Raw persisted settings, one primitive value per field.
///
/// `allowed_pitch_classes` is stored as a comma-separated list of note
/// names (e.g. `"C,D#,G"`), the way the original trainer persisted its
/// allow-list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Pitch-class name of the range start.
    pub start_pitch: String,
    /// Octave of the range start.
    pub start_octave: u8,
    /// Pitch-class name of the range end.
    pub end_pitch: String,
    /// Octave of the range end.
    pub end_octave: u8,
    /// Comma-separated pitch-class names eligible to be asked.
    pub allowed_pitch_classes: String,
    /// Whether a guess may be in any octave of the cue's pitch class.
    pub allow_octave_mismatch: bool,
    /// Relative mode name: none | ascending | descending | random.
    pub relative_mode: String,
    /// Pitch-class name of the relative reference note, if any.
    pub relative_pitch: Option<String>,
    /// Octave of the reference note; absent means "cue's octave".
    pub relative_octave: Option<u8>,
    /// MIDI key that triggers a new cue.
    pub request_code: u8,
    /// MIDI key that replays the outstanding cue.
    pub replay_code: u8,
    /// MIDI channel cues are played on.
    pub channel: u8,
    /// Velocity cues are played with.
    pub velocity: u8,
    /// How long each cue note sounds, in milliseconds.
    pub note_duration_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            start_pitch: "C".to_string(),
            start_octave: 2,
            end_pitch: "B".to_string(),
            end_octave: 3,
            allowed_pitch_classes: "C,D,E,F,G,A,B".to_string(),
            allow_octave_mismatch: true,
            relative_mode: "none".to_string(),
            relative_pitch: None,
            relative_octave: None,
            // The two lowest keys of an 88-key keyboard, safely below
            // the playable code range.
            request_code: 21,
            replay_code: 23,
            channel: 4,
            velocity: 93,
            note_duration_ms: 1000,
        }
    }
}

fn parse_pitch(name: &str, field: &'static str) -> Result<PitchClass, ConfigParseError> {
    name.parse()
        .map_err(|_| ConfigParseError::UnknownPitchClass {
            name: name.to_string(),
            field,
        })
}

fn check_octave(octave: u8, field: &'static str) -> Result<u8, ConfigParseError> {
    if (OCTAVE_MIN..=OCTAVE_MAX).contains(&octave) {
        Ok(octave)
    } else {
        Err(ConfigParseError::OctaveOutOfRange { octave, field })
    }
}

impl Settings {
    /// Parses the range fields into a [`RangeSpec`].
    pub fn range_spec(&self) -> Result<RangeSpec, ConfigParseError> {
        let mut allowed = BTreeSet::new();
        for name in self
            .allowed_pitch_classes
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            allowed.insert(parse_pitch(name, "allowed_pitch_classes")?);
        }

        Ok(RangeSpec {
            start_pitch: parse_pitch(&self.start_pitch, "start_pitch")?,
            start_octave: check_octave(self.start_octave, "start_octave")?,
            end_pitch: parse_pitch(&self.end_pitch, "end_pitch")?,
            end_octave: check_octave(self.end_octave, "end_octave")?,
            allowed_pitch_classes: allowed,
            allow_octave_mismatch: self.allow_octave_mismatch,
        })
    }

    /// Parses the relative-mode fields into a [`RelativeSpec`].
    pub fn relative_spec(&self) -> Result<RelativeSpec, ConfigParseError> {
        let mode: RelativeMode =
            self.relative_mode
                .parse()
                .map_err(|_| ConfigParseError::UnknownRelativeMode {
                    name: self.relative_mode.clone(),
                })?;
        let reference_pitch = match &self.relative_pitch {
            Some(name) => Some(parse_pitch(name, "relative_pitch")?),
            None => None,
        };
        let reference_octave = match self.relative_octave {
            Some(octave) => Some(check_octave(octave, "relative_octave")?),
            None => None,
        };
        Ok(RelativeSpec {
            mode,
            reference_pitch,
            reference_octave,
        })
    }

    /// Validates the MIDI channel field.
    pub fn checked_channel(&self) -> Result<u8, ConfigParseError> {
        if self.channel <= 15 {
            Ok(self.channel)
        } else {
            Err(ConfigParseError::ChannelOutOfRange {
                channel: self.channel,
            })
        }
    }

    /// Writes the range fields back from a [`RangeSpec`].
    pub fn put_range(&mut self, range: &RangeSpec) {
        self.start_pitch = range.start_pitch.to_string();
        self.start_octave = range.start_octave;
        self.end_pitch = range.end_pitch.to_string();
        self.end_octave = range.end_octave;
        self.allowed_pitch_classes = range
            .allowed_pitch_classes
            .iter()
            .map(|pc| pc.name())
            .collect::<Vec<_>>()
            .join(",");
        self.allow_octave_mismatch = range.allow_octave_mismatch;
    }

    /// Writes the relative-mode fields back from a [`RelativeSpec`].
    pub fn put_relative(&mut self, relative: &RelativeSpec) {
        self.relative_mode = relative.mode.to_string();
        self.relative_pitch = relative.reference_pitch.map(|pc| pc.name().to_string());
        self.relative_octave = relative.reference_octave;
    }
}

/// Settings bound to a file, saved back on every change.
#[derive(Debug)]
pub struct SettingsFile {
    path: PathBuf,
    /// The current settings values.
    pub settings: Settings,
}

impl SettingsFile {
    /// Loads settings from `path`.
    ///
    /// A missing file yields defaults (first run). An unreadable or
    /// unparseable file is an error; the caller decides whether to fall
    /// back.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigParseError> {
        let path = path.into();
        let settings = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Settings::default(),
            Err(err) => return Err(err.into()),
        };
        Ok(SettingsFile { path, settings })
    }

    /// Creates a settings file with default values, not yet saved.
    pub fn with_defaults(path: impl Into<PathBuf>) -> Self {
        SettingsFile {
            path: path.into(),
            settings: Settings::default(),
        }
    }

    /// The file the settings persist to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saves the current settings to disk.
    pub fn save(&self) -> Result<(), ConfigParseError> {
        let text = serde_json::to_string_pretty(&self.settings)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_settings_parse() {
        let settings = Settings::default();
        let range = settings.range_spec().unwrap();
        assert_eq!(range, RangeSpec::default());
        let relative = settings.relative_spec().unwrap();
        assert_eq!(relative, RelativeSpec::default());
        assert_eq!(settings.checked_channel().unwrap(), 4);
    }

    #[test]
    fn test_unknown_pitch_name_fails_fast() {
        let settings = Settings {
            start_pitch: "Q".to_string(),
            ..Settings::default()
        };
        let err = settings.range_spec().unwrap_err();
        assert!(matches!(
            err,
            ConfigParseError::UnknownPitchClass { ref name, field: "start_pitch" } if name == "Q"
        ));
    }

    #[test]
    fn test_bad_allow_list_entry_fails_fast() {
        let settings = Settings {
            allowed_pitch_classes: "C,X,G".to_string(),
            ..Settings::default()
        };
        assert!(settings.range_spec().is_err());
    }

    #[test]
    fn test_empty_allow_list_is_valid() {
        let settings = Settings {
            allowed_pitch_classes: String::new(),
            ..Settings::default()
        };
        let range = settings.range_spec().unwrap();
        assert!(range.allowed_pitch_classes.is_empty());
    }

    #[test]
    fn test_octave_out_of_span_fails() {
        let settings = Settings {
            end_octave: 9,
            ..Settings::default()
        };
        assert!(matches!(
            settings.range_spec().unwrap_err(),
            ConfigParseError::OctaveOutOfRange { octave: 9, field: "end_octave" }
        ));
    }

    #[test]
    fn test_unknown_relative_mode_fails() {
        let settings = Settings {
            relative_mode: "sideways".to_string(),
            ..Settings::default()
        };
        assert!(matches!(
            settings.relative_spec().unwrap_err(),
            ConfigParseError::UnknownRelativeMode { .. }
        ));
    }

    #[test]
    fn test_channel_out_of_range_fails() {
        let settings = Settings {
            channel: 16,
            ..Settings::default()
        };
        assert!(settings.checked_channel().is_err());
    }

    #[test]
    fn test_put_range_round_trips() {
        let mut settings = Settings::default();
        let mut range = RangeSpec::default();
        range.allowed_pitch_classes =
            [PitchClass::C, PitchClass::DSharp].into_iter().collect();
        range.start_octave = 3;
        settings.put_range(&range);
        assert_eq!(settings.allowed_pitch_classes, "C,D#");
        assert_eq!(settings.range_spec().unwrap(), range);
    }

    #[test]
    fn test_put_relative_round_trips() {
        let mut settings = Settings::default();
        let relative = RelativeSpec {
            mode: RelativeMode::Ascending,
            reference_pitch: Some(PitchClass::C),
            reference_octave: None,
        };
        settings.put_relative(&relative);
        assert_eq!(settings.relative_spec().unwrap(), relative);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut file = SettingsFile::with_defaults(&path);
        file.settings.start_octave = 3;
        file.save().unwrap();

        let reloaded = SettingsFile::load(&path).unwrap();
        assert_eq!(reloaded.settings, file.settings);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let file = SettingsFile::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(file.settings, Settings::default());
    }

    #[test]
    fn test_corrupt_file_is_an_error_not_a_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{\"start_pitch\": 12").unwrap();
        assert!(SettingsFile::load(&path).is_err());
    }
}

//! Classification of incoming key events.

use crate::message::{MidiCommand, ShortMessage};

/// The reserved transport keys.
///
/// These are injected constants, not business logic: they default to the
/// two lowest keys of an 88-key keyboard (below the playable code
/// range), but a keyboard with a different layout can remap them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlCodes {
    /// Key that requests a new cue.
    pub request: u8,
    /// Key that replays the outstanding cue.
    pub replay: u8,
}

impl Default for ControlCodes {
    fn default() -> Self {
        ControlCodes {
            request: 21,
            replay: 23,
        }
    }
}

/// What an incoming raw event asks the application to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Draw and play a new cue.
    RequestCue,
    /// Replay the outstanding cue.
    ReplayCue,
    /// Validate this code as a guess.
    Guess(u8),
    /// Nothing; not a key release we act on.
    Ignored,
}

/// Maps raw MIDI input to transport controls or guesses.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputRouter {
    controls: ControlCodes,
}

impl InputRouter {
    /// Creates a router with the given transport keys.
    pub fn new(controls: ControlCodes) -> Self {
        InputRouter { controls }
    }

    /// Classifies one raw MIDI event.
    ///
    /// Only key releases act: a release of a reserved control key is a
    /// transport action, any other release is a guess. Key presses are
    /// deliberately a no-op for now (reserved for velocity-sensitive
    /// features that never shipped), as are non-note messages.
    pub fn classify(&self, raw: &[u8]) -> InputAction {
        let msg = match ShortMessage::parse(raw) {
            Some(msg) => msg,
            None => return InputAction::Ignored,
        };

        match msg.command {
            MidiCommand::NoteOn => InputAction::Ignored,
            MidiCommand::NoteOff if msg.code == self.controls.request => InputAction::RequestCue,
            MidiCommand::NoteOff if msg.code == self.controls.replay => InputAction::ReplayCue,
            MidiCommand::NoteOff => InputAction::Guess(msg.code),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn router() -> InputRouter {
        InputRouter::default()
    }

    #[test]
    fn test_control_keys_trigger_transport() {
        assert_eq!(router().classify(&[0x80, 21, 0]), InputAction::RequestCue);
        assert_eq!(router().classify(&[0x80, 23, 0]), InputAction::ReplayCue);
    }

    #[test]
    fn test_other_releases_are_guesses() {
        assert_eq!(router().classify(&[0x80, 48, 0]), InputAction::Guess(48));
        // Zero-velocity note-on counts as a release too.
        assert_eq!(router().classify(&[0x90, 48, 0]), InputAction::Guess(48));
    }

    #[test]
    fn test_key_presses_are_ignored() {
        assert_eq!(router().classify(&[0x90, 48, 100]), InputAction::Ignored);
        assert_eq!(router().classify(&[0x90, 21, 100]), InputAction::Ignored);
    }

    #[test]
    fn test_non_note_messages_are_ignored() {
        assert_eq!(router().classify(&[0xb0, 64, 127]), InputAction::Ignored);
        assert_eq!(router().classify(&[0xf8]), InputAction::Ignored);
        assert_eq!(router().classify(&[]), InputAction::Ignored);
    }

    #[test]
    fn test_remapped_controls() {
        let router = InputRouter::new(ControlCodes {
            request: 108,
            replay: 106,
        });
        assert_eq!(router.classify(&[0x80, 108, 0]), InputAction::RequestCue);
        assert_eq!(router.classify(&[0x80, 21, 0]), InputAction::Guess(21));
    }
}

//! MIDI short messages: the note-on/note-off wire shape.

/// Status nibble for note-on.
pub const NOTE_ON_STATUS: u8 = 0x90;

/// Status nibble for note-off.
pub const NOTE_OFF_STATUS: u8 = 0x80;

/// The two channel-voice commands this trainer cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MidiCommand {
    /// Key pressed / note started.
    NoteOn,
    /// Key released / note stopped.
    NoteOff,
}

impl MidiCommand {
    /// Builds the status byte for this command on a channel.
    pub fn status(self, channel: u8) -> u8 {
        let nibble = match self {
            MidiCommand::NoteOn => NOTE_ON_STATUS,
            MidiCommand::NoteOff => NOTE_OFF_STATUS,
        };
        nibble | (channel & 0x0f)
    }
}

/// A three-byte channel-voice message: command, channel, key code,
/// velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortMessage {
    /// Note on or note off.
    pub command: MidiCommand,
    /// MIDI channel 0-15.
    pub channel: u8,
    /// MIDI key code 0-127.
    pub code: u8,
    /// Key velocity 0-127.
    pub velocity: u8,
}

impl ShortMessage {
    /// Builds a note-on message.
    pub fn note_on(channel: u8, code: u8, velocity: u8) -> Self {
        ShortMessage {
            command: MidiCommand::NoteOn,
            channel,
            code,
            velocity,
        }
    }

    /// Builds a note-off message.
    pub fn note_off(channel: u8, code: u8, velocity: u8) -> Self {
        ShortMessage {
            command: MidiCommand::NoteOff,
            channel,
            code,
            velocity,
        }
    }

    /// Serializes to the raw three-byte wire form.
    pub fn to_bytes(&self) -> [u8; 3] {
        [
            self.command.status(self.channel),
            self.code & 0x7f,
            self.velocity & 0x7f,
        ]
    }

    /// Parses a raw MIDI event into a short message.
    ///
    /// Returns `None` for anything other than a channel-voice note
    /// message (running status is not handled). A note-on with velocity
    /// zero is normalized to a note-off, which is how most keyboards
    /// signal a key release.
    pub fn parse(raw: &[u8]) -> Option<ShortMessage> {
        if raw.len() < 3 {
            return None;
        }
        let status = raw[0] & 0xf0;
        let channel = raw[0] & 0x0f;
        let code = raw[1];
        let velocity = raw[2];

        let command = match status {
            NOTE_ON_STATUS if velocity == 0 => MidiCommand::NoteOff,
            NOTE_ON_STATUS => MidiCommand::NoteOn,
            NOTE_OFF_STATUS => MidiCommand::NoteOff,
            _ => return None,
        };

        Some(ShortMessage {
            command,
            channel,
            code,
            velocity,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_status_bytes() {
        assert_eq!(MidiCommand::NoteOn.status(0), 0x90);
        assert_eq!(MidiCommand::NoteOn.status(4), 0x94);
        assert_eq!(MidiCommand::NoteOff.status(15), 0x8f);
    }

    #[test]
    fn test_to_bytes() {
        let msg = ShortMessage::note_on(4, 60, 93);
        assert_eq!(msg.to_bytes(), [0x94, 60, 93]);
        let msg = ShortMessage::note_off(4, 60, 93);
        assert_eq!(msg.to_bytes(), [0x84, 60, 93]);
    }

    #[test]
    fn test_parse_round_trips() {
        let msg = ShortMessage::note_on(2, 48, 100);
        assert_eq!(ShortMessage::parse(&msg.to_bytes()), Some(msg));
        let msg = ShortMessage::note_off(9, 36, 0);
        assert_eq!(ShortMessage::parse(&msg.to_bytes()), Some(msg));
    }

    #[test]
    fn test_zero_velocity_note_on_is_a_release() {
        let parsed = ShortMessage::parse(&[0x93, 60, 0]).unwrap();
        assert_eq!(parsed.command, MidiCommand::NoteOff);
        assert_eq!(parsed.channel, 3);
        assert_eq!(parsed.code, 60);
    }

    #[test]
    fn test_non_note_messages_are_rejected() {
        // Control change, program change, short buffers.
        assert_eq!(ShortMessage::parse(&[0xb0, 7, 100]), None);
        assert_eq!(ShortMessage::parse(&[0xc0, 5]), None);
        assert_eq!(ShortMessage::parse(&[0x90, 60]), None);
        assert_eq!(ShortMessage::parse(&[]), None);
    }
}

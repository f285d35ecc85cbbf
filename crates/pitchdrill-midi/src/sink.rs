//! The output seam: where scheduled messages leave the process.

use thiserror::Error;

use crate::message::ShortMessage;

/// A note send failed at the device boundary.
///
/// Playback failures are recoverable and user-visible ("check your MIDI
/// device"); they never touch the exercise state, only the sound is
/// missing.
#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    /// The device rejected or dropped a send.
    #[error("MIDI send failed: {0}")]
    Send(String),

    /// The playback worker is gone, so the plan was dropped.
    #[error("playback worker is not running")]
    WorkerGone,
}

/// Destination for scheduled note messages.
///
/// The sequencer drives a sink from exactly one worker thread, so
/// implementations do not need to be thread-safe, only `Send`.
pub trait MidiSink {
    /// Delivers one message to the device.
    fn send(&mut self, msg: &ShortMessage) -> Result<(), PlaybackError>;
}

impl MidiSink for midir::MidiOutputConnection {
    fn send(&mut self, msg: &ShortMessage) -> Result<(), PlaybackError> {
        midir::MidiOutputConnection::send(self, &msg.to_bytes())
            .map_err(|err| PlaybackError::Send(err.to_string()))
    }
}

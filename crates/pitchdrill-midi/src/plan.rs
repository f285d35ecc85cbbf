//! Timed playback plans and the relative-mode ordering policy.
//!
//! Plans are built synchronously and deterministically (randomness is
//! injected), then handed to the sequencer worker for execution. This
//! keeps every ordering decision testable without touching a device or
//! a clock.

use std::time::Duration;

use rand::{Rng, RngCore};

use pitchdrill_core::pitch::KeyboardNote;
use pitchdrill_core::relative::{RelativeMode, RelativeSpec};

use crate::message::ShortMessage;

/// How scheduled notes are voiced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackParams {
    /// MIDI channel to play on.
    pub channel: u8,
    /// Note-on velocity.
    pub velocity: u8,
    /// How long each note sounds before its note-off.
    pub note_duration: Duration,
}

impl Default for PlaybackParams {
    fn default() -> Self {
        PlaybackParams {
            channel: 4,
            velocity: 93,
            note_duration: Duration::from_millis(1000),
        }
    }
}

/// One message with its offset from the plan's start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedMessage {
    /// Offset from the shared t=0 of the plan.
    pub at: Duration,
    /// The message to send.
    pub msg: ShortMessage,
    /// Groups a note-off with its note-on: an off whose on failed to
    /// send is skipped.
    pub note_id: u32,
}

/// An ordered batch of timed sends, sorted by offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackPlan {
    /// Events in execution order; each note's on precedes its off.
    pub events: Vec<TimedMessage>,
}

impl PlaybackPlan {
    /// True when there is nothing to send.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Schedules an on/off pair per entry, each at its own offset from a
/// shared t=0.
///
/// A `None` note is a valid non-playable placeholder and contributes no
/// events.
pub fn plan_sequence(
    entries: &[(Duration, Option<KeyboardNote>)],
    params: &PlaybackParams,
) -> PlaybackPlan {
    let mut events = Vec::with_capacity(entries.len() * 2);
    let mut note_id = 0u32;
    for &(offset, note) in entries {
        let note = match note {
            Some(note) => note,
            None => continue,
        };
        events.push(TimedMessage {
            at: offset,
            msg: ShortMessage::note_on(params.channel, note.code, params.velocity),
            note_id,
        });
        events.push(TimedMessage {
            at: offset + params.note_duration,
            msg: ShortMessage::note_off(params.channel, note.code, params.velocity),
            note_id,
        });
        note_id += 1;
    }
    // Stable sort: a note's on stays ahead of its off even at equal
    // offsets.
    events.sort_by_key(|ev| ev.at);
    PlaybackPlan { events }
}

/// Schedules a single note at t=0.
pub fn plan_single(note: Option<KeyboardNote>, params: &PlaybackParams) -> PlaybackPlan {
    plan_sequence(&[(Duration::ZERO, note)], params)
}

/// Schedules a cue, with its reference note when relative mode is on.
///
/// Ordering policy: ascending mode plays the reference first when the
/// cue's pitch class is the same or higher; descending mode plays the
/// reference first when the cue's pitch class is lower; in every other
/// case the cue comes first and the reference second. Random mode flips
/// a fair coin per call. The second note starts one note duration after
/// the first.
pub fn plan_cue(
    cue: KeyboardNote,
    relative: &RelativeSpec,
    params: &PlaybackParams,
    rng: &mut dyn RngCore,
) -> PlaybackPlan {
    let reference = match relative.reference_note(&cue) {
        Some(reference) => reference,
        None => return plan_single(Some(cue), params),
    };

    let reference_first = match relative.mode {
        RelativeMode::None => return plan_single(Some(cue), params),
        RelativeMode::Ascending => cue.pitch_class.offset() >= reference.pitch_class.offset(),
        RelativeMode::Descending => cue.pitch_class.offset() < reference.pitch_class.offset(),
        RelativeMode::Random => rng.gen_bool(0.5),
    };

    let (first, second) = if reference_first {
        (reference, cue)
    } else {
        (cue, reference)
    };
    plan_sequence(
        &[
            (Duration::ZERO, Some(first)),
            (params.note_duration, Some(second)),
        ],
        params,
    )
}

//! Pitchdrill MIDI Boundary
//!
//! Everything that touches MIDI bytes lives here: the short-message
//! model, the sink trait the sequencer plays into, the playback plan
//! builder (including relative-mode ordering), the single-worker
//! sequencer that executes plans with real delays, classification of
//! incoming key events, and midir-backed device helpers.
//!
//! The exercise logic itself is in `pitchdrill-core`; this crate only
//! moves notes in and out of the world.
//!
//! # Modules
//!
//! - [`message`]: note-on/note-off short messages and raw byte parsing
//! - [`sink`]: the [`MidiSink`] trait and playback errors
//! - [`plan`]: timed playback plans and the relative-mode ordering policy
//! - [`sequencer`]: the single-worker delayed-send executor
//! - [`router`]: classification of incoming key events
//! - [`devices`]: midir port enumeration and connect-by-name

pub mod devices;
pub mod message;
pub mod plan;
pub mod router;
pub mod sequencer;
pub mod sink;

// Re-export commonly used types at the crate root
pub use devices::{open_input, open_output, DeviceError};
pub use message::{MidiCommand, ShortMessage};
pub use plan::{plan_cue, plan_sequence, plan_single, PlaybackParams, PlaybackPlan, TimedMessage};
pub use router::{ControlCodes, InputAction, InputRouter};
pub use sequencer::PlaybackSequencer;
pub use sink::{MidiSink, PlaybackError};

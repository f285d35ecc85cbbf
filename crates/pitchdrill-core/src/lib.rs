//! Pitchdrill Exercise Engine
//!
//! This crate holds the pure logic of the ear trainer: converting between
//! MIDI key codes and (pitch class, octave) pairs, computing the set of
//! practiceable notes from a configured range, and driving the
//! ask/guess/validate cycle.
//!
//! # Overview
//!
//! A drill session revolves around three pieces:
//!
//! - **Codec**: MIDI key codes map to [`KeyboardNote`]s. The two lowest
//!   octaves of the raw 0-127 code space are reserved, so the playable
//!   range starts at code 24 (C in octave 1).
//! - **Range**: a [`RangeSpec`] describes which pitch classes and octaves
//!   the player wants to be quizzed on; [`compute_eligible`] turns it into
//!   the concrete code set.
//! - **Engine**: the [`ExerciseEngine`] draws a random cue from the
//!   eligible set, accepts guesses, and validates them either exactly or
//!   per pitch class only.
//!
//! # Example
//!
//! ```
//! use pitchdrill_core::{ExerciseEngine, GuessResult, RangeSpec, RelativeSpec};
//! use pitchdrill_core::rng::create_rng;
//!
//! let mut engine = ExerciseEngine::with_rng(
//!     RangeSpec::default(),
//!     RelativeSpec::default(),
//!     Box::new(create_rng(42)),
//! );
//!
//! let cue = engine.request_new_cue().unwrap();
//! assert_eq!(engine.submit_guess(cue.code).unwrap(), GuessResult::Correct);
//! ```
//!
//! # Modules
//!
//! - [`pitch`]: pitch classes, note codec, [`KeyboardNote`]
//! - [`range`]: range specification and eligible-code computation
//! - [`engine`]: the exercise state machine
//! - [`relative`]: relative (interval) mode specification
//! - [`settings`]: persisted settings model and parsing
//! - [`rng`]: deterministic RNG construction
//! - [`error`]: error types

pub mod engine;
pub mod error;
pub mod pitch;
pub mod range;
pub mod relative;
pub mod rng;
pub mod settings;

// Re-export commonly used types at the crate root
pub use engine::{ExerciseEngine, GuessResult, Phase};
pub use error::{ConfigParseError, DecodeError, NoEligibleNotesError};
pub use pitch::{decode, encode, KeyboardNote, PitchClass, BASE_OFFSET, CODE_MAX, CODE_MIN};
pub use range::{compute_eligible, RangeSpec};
pub use relative::{RelativeMode, RelativeSpec};
pub use settings::{Settings, SettingsFile};

//! The exercise state machine: ask, guess, validate.

use rand::{Rng, RngCore};

use crate::error::{DecodeError, NoEligibleNotesError};
use crate::pitch::KeyboardNote;
use crate::range::{compute_eligible, RangeSpec};
use crate::relative::RelativeSpec;
use crate::rng::entropy_rng;

/// Where the exercise currently stands.
///
/// The phase is derived from the cue and guess rather than stored: a
/// missing cue always means idle, so the two can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No cue outstanding.
    Idle,
    /// A cue has been played and awaits a guess.
    Cued,
    /// A guess has been recorded against the outstanding cue (an
    /// incorrect guess leaves the cue in place for another try).
    Guessed,
}

/// Outcome of a submitted guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessResult {
    /// The guess matched the cue; the cue is cleared.
    Correct,
    /// The guess did not match; the cue is retained for a retry.
    Incorrect,
    /// There was no cue to validate against; the guess was recorded for
    /// display only.
    Ignored,
}

/// Drives the ask/guess/validate cycle.
///
/// The engine owns the current cue and guess and a cached vector of
/// eligible MIDI codes, rebuilt eagerly on every range mutation (settings
/// change rarely; cue draws read the set constantly). Randomness is
/// injectable for deterministic tests and defaults to an entropy-seeded
/// PCG32.
///
/// The engine is purely logical: playback and persistence are the
/// caller's collaborators. Callers that mutate it from several threads
/// put it behind a single mutex; no operation blocks.
pub struct ExerciseEngine {
    range: RangeSpec,
    relative: RelativeSpec,
    eligible: Vec<u8>,
    cue: Option<KeyboardNote>,
    guess: Option<KeyboardNote>,
    rng: Box<dyn RngCore + Send>,
}

impl ExerciseEngine {
    /// Creates an engine with an entropy-seeded RNG.
    pub fn new(range: RangeSpec, relative: RelativeSpec) -> Self {
        Self::with_rng(range, relative, Box::new(entropy_rng()))
    }

    /// Creates an engine with an injected RNG (see
    /// [`crate::rng::create_rng`] for a seeded source).
    pub fn with_rng(
        range: RangeSpec,
        relative: RelativeSpec,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        let eligible = compute_eligible(&range);
        ExerciseEngine {
            range,
            relative,
            eligible,
            cue: None,
            guess: None,
            rng,
        }
    }

    /// The current range specification.
    pub fn range(&self) -> &RangeSpec {
        &self.range
    }

    /// The current relative-mode specification.
    pub fn relative(&self) -> &RelativeSpec {
        &self.relative
    }

    /// The cached eligible codes, sorted ascending.
    pub fn eligible_codes(&self) -> &[u8] {
        &self.eligible
    }

    /// The outstanding cue, if any.
    pub fn cue(&self) -> Option<KeyboardNote> {
        self.cue
    }

    /// The most recent guess, if any.
    pub fn guess(&self) -> Option<KeyboardNote> {
        self.guess
    }

    /// The current phase of the exercise.
    pub fn phase(&self) -> Phase {
        match (&self.cue, &self.guess) {
            (None, _) => Phase::Idle,
            (Some(_), None) => Phase::Cued,
            (Some(_), Some(_)) => Phase::Guessed,
        }
    }

    /// Replaces the range and rebuilds the eligible set synchronously.
    pub fn set_range(&mut self, range: RangeSpec) {
        self.range = range;
        self.eligible = compute_eligible(&self.range);
    }

    /// Replaces the relative-mode specification.
    pub fn set_relative(&mut self, relative: RelativeSpec) {
        self.relative = relative;
    }

    /// Draws a new cue uniformly at random from the eligible set.
    ///
    /// Clears any previous guess and returns the note for playback. The
    /// draw is uniform over the eligible set as it stands right now, so
    /// repeated calls are independent and reproducible under a seeded
    /// RNG.
    pub fn request_new_cue(&mut self) -> Result<KeyboardNote, NoEligibleNotesError> {
        if self.eligible.is_empty() {
            return Err(NoEligibleNotesError);
        }
        let code = self.eligible[self.rng.gen_range(0..self.eligible.len())];
        // Eligible codes come out of the encoder, so they always decode.
        let note = KeyboardNote::from_code(code).expect("eligible code decodes");
        self.cue = Some(note);
        self.guess = None;
        Ok(note)
    }

    /// Returns the outstanding cue for replay, without any transition.
    ///
    /// `None` means there is nothing to replay; callers treat that as a
    /// no-op, not an error.
    pub fn replay_cue(&self) -> Option<KeyboardNote> {
        self.cue
    }

    /// Records and validates a guess against the outstanding cue.
    ///
    /// With no cue outstanding the guess is recorded for display only
    /// and the result is [`GuessResult::Ignored`]. A correct guess
    /// clears the cue; an incorrect one retains it so the player can
    /// retry. The engine never auto-advances.
    pub fn submit_guess(&mut self, code: u8) -> Result<GuessResult, DecodeError> {
        let note = KeyboardNote::from_code(code)?;
        self.guess = Some(note);

        let cue = match self.cue {
            Some(cue) => cue,
            None => return Ok(GuessResult::Ignored),
        };

        let matched = if self.range.allow_octave_mismatch {
            note.pitch_class == cue.pitch_class
        } else {
            note.code == cue.code
        };

        if matched {
            self.cue = None;
            Ok(GuessResult::Correct)
        } else {
            Ok(GuessResult::Incorrect)
        }
    }
}

impl std::fmt::Debug for ExerciseEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExerciseEngine")
            .field("range", &self.range)
            .field("relative", &self.relative)
            .field("eligible", &self.eligible)
            .field("cue", &self.cue)
            .field("guess", &self.guess)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::pitch::{encode, PitchClass};
    use crate::rng::create_rng;

    fn engine_with(range: RangeSpec, seed: u32) -> ExerciseEngine {
        ExerciseEngine::with_rng(range, RelativeSpec::default(), Box::new(create_rng(seed)))
    }

    fn c_only(allow_octave_mismatch: bool) -> RangeSpec {
        RangeSpec {
            allowed_pitch_classes: BTreeSet::from([PitchClass::C]),
            allow_octave_mismatch,
            ..RangeSpec::default()
        }
    }

    #[test]
    fn test_empty_eligible_set_fails_to_cue() {
        let range = RangeSpec {
            allowed_pitch_classes: BTreeSet::new(),
            ..RangeSpec::default()
        };
        let mut engine = engine_with(range, 1);
        assert_eq!(engine.request_new_cue(), Err(NoEligibleNotesError));
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn test_cue_draw_transitions_to_cued() {
        let mut engine = engine_with(c_only(false), 3);
        let cue = engine.request_new_cue().unwrap();
        assert_eq!(engine.phase(), Phase::Cued);
        assert_eq!(engine.cue(), Some(cue));
        assert_eq!(engine.guess(), None);
        assert!(engine.eligible_codes().contains(&cue.code));
    }

    #[test]
    fn test_octave_mismatch_allowed_matches_by_pitch_class() {
        let mut engine = engine_with(c_only(true), 5);
        let cue = engine.request_new_cue().unwrap();
        assert_eq!(cue.pitch_class, PitchClass::C);

        // Any octave of C counts, including ones outside the drill range.
        let other_octave = if cue.octave == 2 { 3 } else { 2 };
        let guess = encode(PitchClass::C, other_octave);
        assert_eq!(engine.submit_guess(guess).unwrap(), GuessResult::Correct);
        assert_eq!(engine.cue(), None);
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn test_exact_mode_rejects_wrong_octave() {
        let mut engine = engine_with(c_only(false), 5);
        let cue = engine.request_new_cue().unwrap();

        let other_octave = if cue.octave == 2 { 3 } else { 2 };
        let wrong = encode(cue.pitch_class, other_octave);
        assert_eq!(engine.submit_guess(wrong).unwrap(), GuessResult::Incorrect);
        // Cue retained for a retry.
        assert_eq!(engine.cue(), Some(cue));
        assert_eq!(engine.phase(), Phase::Guessed);

        assert_eq!(engine.submit_guess(cue.code).unwrap(), GuessResult::Correct);
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn test_wrong_pitch_class_is_incorrect() {
        let mut engine = engine_with(c_only(true), 11);
        engine.request_new_cue().unwrap();
        let guess = encode(PitchClass::FSharp, 2);
        assert_eq!(engine.submit_guess(guess).unwrap(), GuessResult::Incorrect);
    }

    #[test]
    fn test_guess_without_cue_is_ignored_but_recorded() {
        let mut engine = engine_with(c_only(true), 2);
        let guess = encode(PitchClass::D, 3);
        assert_eq!(engine.submit_guess(guess).unwrap(), GuessResult::Ignored);
        assert_eq!(engine.guess().map(|n| n.code), Some(guess));
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn test_guess_after_correct_is_ignored_until_new_cue() {
        let mut engine = engine_with(c_only(true), 8);
        let cue = engine.request_new_cue().unwrap();
        assert_eq!(engine.submit_guess(cue.code).unwrap(), GuessResult::Correct);
        assert_eq!(
            engine.submit_guess(cue.code).unwrap(),
            GuessResult::Ignored
        );
    }

    #[test]
    fn test_malformed_guess_code_fails_decode() {
        let mut engine = engine_with(c_only(true), 8);
        engine.request_new_cue().unwrap();
        let before = engine.guess();
        assert!(engine.submit_guess(21).is_err());
        // A malformed guess leaves prior state untouched.
        assert_eq!(engine.guess(), before);
        assert_eq!(engine.phase(), Phase::Cued);
    }

    #[test]
    fn test_replay_returns_cue_without_transition() {
        let mut engine = engine_with(c_only(true), 4);
        assert_eq!(engine.replay_cue(), None);
        let cue = engine.request_new_cue().unwrap();
        assert_eq!(engine.replay_cue(), Some(cue));
        assert_eq!(engine.phase(), Phase::Cued);
    }

    #[test]
    fn test_set_range_rebuilds_eligible_set() {
        let mut engine = engine_with(c_only(true), 4);
        assert_eq!(engine.eligible_codes().len(), 2);
        engine.set_range(RangeSpec {
            allowed_pitch_classes: BTreeSet::from([PitchClass::C, PitchClass::G]),
            ..RangeSpec::default()
        });
        assert_eq!(engine.eligible_codes().len(), 4);
    }

    #[test]
    fn test_seeded_draws_cover_the_eligible_set() {
        let mut engine = engine_with(c_only(true), 1234);
        assert_eq!(engine.eligible_codes().len(), 2);

        let mut seen: HashMap<u8, u32> = HashMap::new();
        for _ in 0..1000 {
            let cue = engine.request_new_cue().unwrap();
            *seen.entry(cue.code).or_default() += 1;
        }
        assert_eq!(seen.len(), 2);
        assert!(seen.values().all(|&n| n > 0));
    }

    #[test]
    fn test_seeded_draws_are_reproducible() {
        let draws = |seed| {
            let mut engine = engine_with(RangeSpec::default(), seed);
            (0..16)
                .map(|_| engine.request_new_cue().unwrap().code)
                .collect::<Vec<_>>()
        };
        assert_eq!(draws(99), draws(99));
        assert_ne!(draws(99), draws(100));
    }
}

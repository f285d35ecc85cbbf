//! Run command: an interactive drill session.
//!
//! Two event sources drive one engine: the MIDI input callback (guesses
//! and the reserved transport keys) and this thread's command prompt
//! (transport plus settings changes). Both serialize on a single mutex
//! around the engine; nothing holds the lock across a blocking call.

use std::io::{self, BufRead};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use rand::RngCore;

use pitchdrill_core::error::ConfigParseError;
use pitchdrill_core::pitch::{PitchClass, OCTAVE_MAX, OCTAVE_MIN};
use pitchdrill_core::rng::{create_rng, entropy_rng};
use pitchdrill_core::{
    ExerciseEngine, GuessResult, RangeSpec, RelativeMode, RelativeSpec, SettingsFile,
};
use pitchdrill_midi::devices::{open_input, open_output};
use pitchdrill_midi::plan::{plan_cue, PlaybackParams};
use pitchdrill_midi::router::{ControlCodes, InputAction, InputRouter};
use pitchdrill_midi::sequencer::PlaybackSequencer;

/// Runs a drill session until `quit` or end of stdin.
pub fn run(
    config: &str,
    input: Option<&str>,
    output: Option<&str>,
    seed: Option<u32>,
) -> Result<ExitCode> {
    let (settings_file, range, relative) = load_settings(config);
    let settings = &settings_file.settings;

    let params = PlaybackParams {
        channel: settings.channel,
        velocity: settings.velocity,
        note_duration: Duration::from_millis(settings.note_duration_ms),
    };
    let router = InputRouter::new(ControlCodes {
        request: settings.request_code,
        replay: settings.replay_code,
    });

    let out_conn = open_output(output).context("Failed to open MIDI output")?;
    let sequencer = Arc::new(
        PlaybackSequencer::spawn(out_conn, |err| {
            log::error!("{}; check your MIDI device", err);
        })
        .context("Failed to start playback worker")?,
    );

    let rng: Box<dyn RngCore + Send> = match seed {
        Some(seed) => Box::new(create_rng(seed)),
        None => Box::new(entropy_rng()),
    };
    let engine = Arc::new(Mutex::new(ExerciseEngine::with_rng(range, relative, rng)));

    // The input callback runs on midir's thread; give it its own clones
    // and its own ordering RNG.
    let engine_in = Arc::clone(&engine);
    let sequencer_in = Arc::clone(&sequencer);
    let mut rng_in: Box<dyn RngCore + Send> = match seed {
        Some(seed) => Box::new(create_rng(seed.wrapping_add(1))),
        None => Box::new(entropy_rng()),
    };
    let _in_conn = open_input(input, move |bytes| {
        match router.classify(bytes) {
            InputAction::RequestCue => request_cue(&engine_in, &sequencer_in, &params, &mut rng_in),
            InputAction::ReplayCue => replay_cue(&engine_in, &sequencer_in, &params, &mut rng_in),
            InputAction::Guess(code) => submit_guess(&engine_in, code),
            InputAction::Ignored => {}
        }
    })
    .context("Failed to open MIDI input")?;

    println!(
        "{} keys {} (new note) and {} (replay) on your keyboard drive the drill",
        "ready:".green().bold(),
        settings.request_code,
        settings.replay_code,
    );
    print_help();

    let mut session = Session {
        engine,
        sequencer,
        params,
        settings_file,
        rng: match seed {
            Some(seed) => Box::new(create_rng(seed.wrapping_add(2))),
            None => Box::new(entropy_rng()),
        },
    };

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(SessionCommand::Quit) => break,
            Ok(command) => session.apply(command),
            Err(msg) => println!("{} {}", "?".yellow().bold(), msg),
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Loads settings, falling back to defaults when the file or any field
/// in it is unusable. The parse itself never defaults silently.
fn load_settings(path: &str) -> (SettingsFile, RangeSpec, RelativeSpec) {
    match try_load_settings(path) {
        Ok(loaded) => loaded,
        Err(err) => {
            log::error!(
                "settings file {} is unusable ({}); starting from defaults",
                path,
                err
            );
            (
                SettingsFile::with_defaults(path),
                RangeSpec::default(),
                RelativeSpec::default(),
            )
        }
    }
}

fn try_load_settings(
    path: &str,
) -> Result<(SettingsFile, RangeSpec, RelativeSpec), ConfigParseError> {
    let file = SettingsFile::load(path)?;
    let range = file.settings.range_spec()?;
    let relative = file.settings.relative_spec()?;
    file.settings.checked_channel()?;
    Ok((file, range, relative))
}

fn request_cue(
    engine: &Mutex<ExerciseEngine>,
    sequencer: &PlaybackSequencer,
    params: &PlaybackParams,
    rng: &mut Box<dyn RngCore + Send>,
) {
    let mut engine = engine.lock().unwrap();
    match engine.request_new_cue() {
        Ok(cue) => {
            let plan = plan_cue(cue, engine.relative(), params, rng.as_mut());
            drop(engine);
            println!("{}", "new note played, your turn".cyan());
            if let Err(err) = sequencer.play(plan) {
                log::error!("{}; check your MIDI device", err);
            }
        }
        Err(err) => println!("{} {}", "cannot ask:".yellow(), err),
    }
}

fn replay_cue(
    engine: &Mutex<ExerciseEngine>,
    sequencer: &PlaybackSequencer,
    params: &PlaybackParams,
    rng: &mut Box<dyn RngCore + Send>,
) {
    let engine = engine.lock().unwrap();
    match engine.replay_cue() {
        Some(cue) => {
            // Replay includes the reference note, like the first play.
            let plan = plan_cue(cue, engine.relative(), params, rng.as_mut());
            drop(engine);
            if let Err(err) = sequencer.play(plan) {
                log::error!("{}; check your MIDI device", err);
            }
        }
        None => println!("{}", "nothing to replay".dimmed()),
    }
}

fn submit_guess(engine: &Mutex<ExerciseEngine>, code: u8) {
    let mut engine = engine.lock().unwrap();
    let result = engine.submit_guess(code);
    let shown = engine
        .guess()
        .map(|note| note.to_string())
        .unwrap_or_default();
    match result {
        Ok(GuessResult::Correct) => println!("{}  {}", shown.bold(), "correct!".green().bold()),
        Ok(GuessResult::Incorrect) => println!("{}  {}", shown.bold(), "try again".red()),
        Ok(GuessResult::Ignored) => println!("{}", shown.dimmed()),
        Err(err) => log::debug!("ignoring key {}: {}", code, err),
    }
}

/// A line typed at the session prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionCommand {
    NewCue,
    Replay,
    Show,
    Help,
    Quit,
    /// Restrict the allow-list, e.g. `allow C,E,G`.
    Allow(Vec<PitchClass>),
    /// Move the range, e.g. `range C2 B4`.
    Range {
        start: (PitchClass, u8),
        end: (PitchClass, u8),
    },
    /// Toggle octave-insensitive matching.
    Octaves(bool),
    /// Set relative mode, e.g. `mode asc C` or `mode none`.
    Mode(RelativeSpec),
}

fn parse_command(line: &str) -> Result<SessionCommand, String> {
    let mut words = line.split_whitespace();
    let head = words.next().unwrap_or_default().to_ascii_lowercase();
    let rest: Vec<&str> = words.collect();

    match (head.as_str(), rest.as_slice()) {
        ("n" | "new", []) => Ok(SessionCommand::NewCue),
        ("r" | "replay", []) => Ok(SessionCommand::Replay),
        ("s" | "show", []) => Ok(SessionCommand::Show),
        ("h" | "help" | "?", []) => Ok(SessionCommand::Help),
        ("q" | "quit" | "exit", []) => Ok(SessionCommand::Quit),
        ("allow", [list]) => {
            let mut classes = Vec::new();
            for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                classes.push(name.parse::<PitchClass>()?);
            }
            Ok(SessionCommand::Allow(classes))
        }
        ("range", [start, end]) => Ok(SessionCommand::Range {
            start: parse_note_token(start)?,
            end: parse_note_token(end)?,
        }),
        ("octaves", ["on"]) => Ok(SessionCommand::Octaves(true)),
        ("octaves", ["off"]) => Ok(SessionCommand::Octaves(false)),
        ("mode", ["none"]) => Ok(SessionCommand::Mode(RelativeSpec::default())),
        ("mode", [mode, reference]) => {
            let mode: RelativeMode = mode.parse()?;
            let (pitch, octave) = parse_reference_token(reference)?;
            Ok(SessionCommand::Mode(RelativeSpec {
                mode,
                reference_pitch: Some(pitch),
                reference_octave: octave,
            }))
        }
        _ => Err(format!("unrecognized command: {}", line.trim())),
    }
}

/// Parses a note token like `C2` or `F#3`.
fn parse_note_token(token: &str) -> Result<(PitchClass, u8), String> {
    let split = token
        .char_indices()
        .last()
        .map(|(at, _)| token.split_at(at))
        .ok_or_else(|| format!("expected a note like C2, got {:?}", token))?;
    let (name, digit) = split;
    let octave: u8 = digit
        .parse()
        .map_err(|_| format!("expected a note like C2, got {:?}", token))?;
    if !(OCTAVE_MIN..=OCTAVE_MAX).contains(&octave) {
        return Err(format!(
            "octave {} is outside {}..={}",
            octave, OCTAVE_MIN, OCTAVE_MAX
        ));
    }
    Ok((name.parse()?, octave))
}

/// Parses a reference token: either a bare pitch class (`C`, meaning
/// "the cue's octave") or a full note (`C3`).
fn parse_reference_token(token: &str) -> Result<(PitchClass, Option<u8>), String> {
    if let Ok(pitch) = token.parse::<PitchClass>() {
        return Ok((pitch, None));
    }
    let (pitch, octave) = parse_note_token(token)?;
    Ok((pitch, Some(octave)))
}

struct Session {
    engine: Arc<Mutex<ExerciseEngine>>,
    sequencer: Arc<PlaybackSequencer>,
    params: PlaybackParams,
    settings_file: SettingsFile,
    rng: Box<dyn RngCore + Send>,
}

impl Session {
    fn apply(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::NewCue => {
                request_cue(&self.engine, &self.sequencer, &self.params, &mut self.rng)
            }
            SessionCommand::Replay => {
                replay_cue(&self.engine, &self.sequencer, &self.params, &mut self.rng)
            }
            SessionCommand::Show => self.show(),
            SessionCommand::Help => print_help(),
            SessionCommand::Quit => {}
            SessionCommand::Allow(classes) => self.update_range(|range| {
                range.allowed_pitch_classes = classes.into_iter().collect();
            }),
            SessionCommand::Range { start, end } => self.update_range(|range| {
                range.start_pitch = start.0;
                range.start_octave = start.1;
                range.end_pitch = end.0;
                range.end_octave = end.1;
            }),
            SessionCommand::Octaves(allow) => self.update_range(|range| {
                range.allow_octave_mismatch = allow;
            }),
            SessionCommand::Mode(relative) => {
                let mut engine = self.engine.lock().unwrap();
                engine.set_relative(relative);
                drop(engine);
                self.settings_file.settings.put_relative(&relative);
                self.persist();
            }
        }
    }

    /// Applies a range mutation, rebuilds the eligible set, persists.
    fn update_range(&mut self, mutate: impl FnOnce(&mut RangeSpec)) {
        let mut engine = self.engine.lock().unwrap();
        let mut range = engine.range().clone();
        mutate(&mut range);
        engine.set_range(range.clone());
        let eligible = engine.eligible_codes().len();
        drop(engine);

        self.settings_file.settings.put_range(&range);
        self.persist();
        if eligible == 0 {
            println!(
                "{}",
                "warning: no notes are eligible with these settings".yellow()
            );
        } else {
            println!("{} eligible notes", eligible);
        }
    }

    fn persist(&self) {
        if let Err(err) = self.settings_file.save() {
            log::warn!(
                "could not save settings to {}: {}",
                self.settings_file.path().display(),
                err
            );
        }
    }

    fn show(&self) {
        let engine = self.engine.lock().unwrap();
        let range = engine.range();
        println!(
            "range {}{}..{}{}  allow {}  octaves {}  mode {}  eligible {}",
            range.start_pitch,
            range.start_octave,
            range.end_pitch,
            range.end_octave,
            range
                .allowed_pitch_classes
                .iter()
                .map(|pc| pc.name())
                .collect::<Vec<_>>()
                .join(","),
            if range.allow_octave_mismatch {
                "any"
            } else {
                "exact"
            },
            engine.relative().mode,
            engine.eligible_codes().len(),
        );
    }
}

fn print_help() {
    println!(
        "{}",
        "commands: n(ew) r(eplay) s(how) q(uit) | allow C,E,G | range C2 B4 | \
         octaves on|off | mode none|asc|desc|random [C|C3]"
            .dimmed()
    );
}

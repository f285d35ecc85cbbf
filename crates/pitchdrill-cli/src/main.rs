//! Pitchdrill CLI - a MIDI ear trainer
//!
//! This binary wires the exercise engine to real MIDI devices: cues play
//! on an output port, guesses arrive from a keyboard on an input port,
//! and a small command prompt covers settings changes.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

mod commands;
mod logger;

/// Pitchdrill - MIDI Ear Trainer
#[derive(Parser)]
#[command(name = "pitchdrill")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available MIDI input and output ports
    Devices,

    /// Run an interactive drill session
    Run {
        /// Path to the settings file
        #[arg(short, long, default_value = "pitchdrill.json")]
        config: String,

        /// MIDI input port name (default: first available)
        #[arg(long)]
        input: Option<String>,

        /// MIDI output port name (default: first available)
        #[arg(long)]
        output: Option<String>,

        /// Seed for reproducible cue draws
        #[arg(long)]
        seed: Option<u32>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    let result = match cli.command {
        Commands::Devices => commands::devices::run(),
        Commands::Run {
            config,
            input,
            output,
            seed,
        } => commands::run::run(&config, input.as_deref(), output.as_deref(), seed),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::FAILURE
        }
    }
}

//! Devices command: list MIDI ports.

use anyhow::{Context, Result};
use colored::Colorize;
use std::process::ExitCode;

use pitchdrill_midi::devices::{list_inputs, list_outputs};

/// Prints every available MIDI input and output port.
pub fn run() -> Result<ExitCode> {
    let inputs = list_inputs().context("Failed to list MIDI input ports")?;
    let outputs = list_outputs().context("Failed to list MIDI output ports")?;

    println!("{}", "Inputs:".cyan().bold());
    print_ports(&inputs);
    println!("{}", "Outputs:".cyan().bold());
    print_ports(&outputs);

    Ok(ExitCode::SUCCESS)
}

fn print_ports(names: &[String]) {
    if names.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for name in names {
        println!("  {}", name);
    }
}

//! midir-backed device helpers: enumerate ports, connect by name.
//!
//! Device choice persists as a port name; reopening looks the name up
//! again, so unplugging and replugging a keyboard keeps working as long
//! as the name is stable. A vanished name is an error the caller
//! surfaces; it never silently grabs a different device.

use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use thiserror::Error;

/// A MIDI device could not be listed or opened.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The MIDI backend failed to initialize.
    #[error("MIDI init failed: {0}")]
    Init(String),

    /// No ports of the requested direction exist.
    #[error("no MIDI {0} ports available")]
    NoPorts(&'static str),

    /// The remembered port name is gone.
    #[error("MIDI port {name:?} not found")]
    PortNotFound {
        /// The name that was looked up.
        name: String,
    },

    /// Connecting to the port failed.
    #[error("MIDI connect failed: {0}")]
    Connect(String),
}

/// Lists the names of all MIDI output ports.
pub fn list_outputs() -> Result<Vec<String>, DeviceError> {
    let out = MidiOutput::new("pitchdrill")
        .map_err(|err| DeviceError::Init(err.to_string()))?;
    Ok(out
        .ports()
        .iter()
        .filter_map(|port| out.port_name(port).ok())
        .collect())
}

/// Lists the names of all MIDI input ports.
pub fn list_inputs() -> Result<Vec<String>, DeviceError> {
    let input = MidiInput::new("pitchdrill")
        .map_err(|err| DeviceError::Init(err.to_string()))?;
    Ok(input
        .ports()
        .iter()
        .filter_map(|port| input.port_name(port).ok())
        .collect())
}

/// Opens a MIDI output connection.
///
/// With a name, connects to exactly that port; without one, takes the
/// first available port.
pub fn open_output(name: Option<&str>) -> Result<MidiOutputConnection, DeviceError> {
    let out = MidiOutput::new("pitchdrill")
        .map_err(|err| DeviceError::Init(err.to_string()))?;
    let ports = out.ports();
    let port = select_port(&ports, name, "output", |port| out.port_name(port).ok())?;
    out.connect(port, "pitchdrill-out")
        .map_err(|err| DeviceError::Connect(err.to_string()))
}

/// Opens a MIDI input connection, delivering every raw event to
/// `callback`.
///
/// The callback runs on midir's input thread; keep it short and hand the
/// bytes off to the router.
pub fn open_input<F>(
    name: Option<&str>,
    mut callback: F,
) -> Result<MidiInputConnection<()>, DeviceError>
where
    F: FnMut(&[u8]) + Send + 'static,
{
    let mut input = MidiInput::new("pitchdrill")
        .map_err(|err| DeviceError::Init(err.to_string()))?;
    input.ignore(Ignore::None);
    let ports = input.ports();
    let port = select_port(&ports, name, "input", |port| input.port_name(port).ok())?;

    input
        .connect(
            port,
            "pitchdrill-in",
            move |_timestamp, bytes, _| callback(bytes),
            (),
        )
        .map_err(|err| DeviceError::Connect(err.to_string()))
}

fn select_port<'p, P>(
    ports: &'p [P],
    name: Option<&str>,
    direction: &'static str,
    port_name: impl Fn(&P) -> Option<String>,
) -> Result<&'p P, DeviceError> {
    match name {
        Some(wanted) => ports
            .iter()
            .find(|port| port_name(port).as_deref() == Some(wanted))
            .ok_or_else(|| DeviceError::PortNotFound {
                name: wanted.to_string(),
            }),
        None => ports.first().ok_or(DeviceError::NoPorts(direction)),
    }
}

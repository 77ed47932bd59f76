use std::error::Error;
use std::sync::Arc;

use midir::{
    Ignore, MidiIO, MidiInput, MidiInputConnection, MidiOutput,
    MidiOutputConnection,
};
use parking_lot::Mutex;

use super::transport::{Transport, TransportError};
use crate::core::prelude::*;
use crate::runtime::clock::SharedClock;
use crate::surface::control_surface::ControlSurface;

/// Launchpad Mini MK3.
pub const DEFAULT_PORT: &str = "LPMiniMK3 MIDI";
/// Older Launchpad Minis. Tried after [`DEFAULT_PORT`] when no port is given.
pub const LEGACY_PORT: &str = "LaunchpadMini";

const INPUT_CLIENT: &str = "padsim-in";
const OUTPUT_CLIENT: &str = "padsim-out";

fn port_candidates(name: &str) -> Vec<&str> {
    if name == DEFAULT_PORT {
        vec![DEFAULT_PORT, LEGACY_PORT]
    } else {
        vec![name]
    }
}

/// Port names vary by platform ("LPMiniMK3 MIDI", "LPMiniMK3 MIDI Out",
/// "Launchpad Mini MK3 LPMiniMK3 MIDI In", ...) so match on a substring.
/// Candidates are tried in order; the first matching port wins.
fn select_port(names: &[String], name: &str) -> Option<usize> {
    port_candidates(name).into_iter().find_map(|candidate| {
        names.iter().position(|port| port.contains(candidate))
    })
}

/// Returns the port and its full name as reported by the backend.
fn find_port<T: MidiIO>(
    io: &T,
    name: &str,
) -> Result<(T::Port, String), TransportError> {
    let mut ports = io.ports();
    let mut names: Vec<String> = ports
        .iter()
        .map(|p| io.port_name(p).unwrap_or_default())
        .collect();

    let index = select_port(&names, name)
        .ok_or_else(|| TransportError::PortNotFound(name.to_string()))?;

    Ok((ports.swap_remove(index), names.swap_remove(index)))
}

pub struct MidiOut {
    port: String,
    connection: Mutex<MidiOutputConnection>,
}

impl MidiOut {
    pub fn connect(port: &str) -> Result<Self, TransportError> {
        let midi_out = MidiOutput::new(OUTPUT_CLIENT)
            .map_err(|e| TransportError::Init(e.to_string()))?;
        let (out_port, name) = find_port(&midi_out, port)?;
        let connection = midi_out
            .connect(&out_port, OUTPUT_CLIENT)
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        debug!("Connected output: {}", name);

        Ok(Self {
            port: name,
            connection: Mutex::new(connection),
        })
    }

    pub fn port(&self) -> &str {
        &self.port
    }
}

impl Transport for MidiOut {
    fn send(&self, message: &[u8]) -> Result<(), TransportError> {
        trace!("MIDI out ({}): {:02X?}", self.port, message);
        self.connection
            .lock()
            .send(message)
            .map_err(|e| TransportError::Send(e.to_string()))
    }
}

/// Keeps the input callback alive; dropping it closes the port.
pub struct MidiIn {
    port: String,
    _connection: MidiInputConnection<()>,
}

impl MidiIn {
    pub fn connect<F>(port: &str, callback: F) -> Result<Self, TransportError>
    where
        F: Fn(u64, &[u8]) + Send + 'static,
    {
        let midi_in = MidiInput::new(INPUT_CLIENT)
            .map_err(|e| TransportError::Init(e.to_string()))?;
        let (in_port, name) = find_port(&midi_in, port)?;

        let connection = midi_in
            .connect(
                &in_port,
                INPUT_CLIENT,
                move |stamp, message, _| callback(stamp, message),
                (),
            )
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        debug!("Connected input: {}", name);

        Ok(Self {
            port: name,
            _connection: connection,
        })
    }

    pub fn port(&self) -> &str {
        &self.port
    }
}

/// A control surface attached to real hardware. The input connection lives
/// as long as this value does.
pub struct MidiSurface {
    pub surface: ControlSurface,
    pub input: MidiIn,
}

/// Open both directions of `port` and take over the device. Any failure to
/// open the port is returned; the surface is useless without it.
pub fn connect(
    port: &str,
    clock: SharedClock,
) -> Result<MidiSurface, TransportError> {
    let output = MidiOut::connect(port)?;
    let output_name = output.port().to_string();
    let surface = ControlSurface::new(Arc::new(output), clock);
    let dispatcher = surface.dispatcher();

    match MidiIn::connect(port, move |stamp, message| {
        dispatcher.dispatch(stamp, message)
    }) {
        Ok(input) => {
            info!("Attached to {} (in: {})", output_name, input.port());
            Ok(MidiSurface { surface, input })
        }
        Err(err) => {
            surface.shutdown();
            Err(err)
        }
    }
}

pub type PortIndexAndName = (usize, String);

pub fn list_input_ports() -> Result<Vec<PortIndexAndName>, Box<dyn Error>> {
    let mut midi_in = MidiInput::new("padsim-list-input")?;
    midi_in.ignore(Ignore::None);
    let mut ports = vec![];
    for (i, p) in midi_in.ports().iter().enumerate() {
        ports.push((i, midi_in.port_name(p)?));
    }
    Ok(ports)
}

pub fn list_output_ports() -> Result<Vec<PortIndexAndName>, Box<dyn Error>> {
    let midi_out = MidiOutput::new("padsim-list-output")?;
    let mut ports = vec![];
    for (i, p) in midi_out.ports().iter().enumerate() {
        ports.push((i, midi_out.port_name(p)?));
    }
    Ok(ports)
}

pub fn print_ports() -> Result<(), Box<dyn Error>> {
    println!("\nAvailable input ports:");
    for (index, port_name) in list_input_ports()? {
        println!("    {}: {}", index, port_name);
    }

    println!("\nAvailable output ports:");
    for (index, port_name) in list_output_ports()? {
        println!("    {}: {}", index, port_name);
    }

    println!();

    Ok(())
}

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::core::prelude::*;
use crate::surface::codec::Outbound;
use crate::surface::pad::{LightState, PadAddress};

/// Outbound half of a byte-message channel to the surface. Inbound messages
/// arrive through a callback handed to whatever opened the port, see
/// [`crate::io::midi::connect`].
pub trait Transport: Send + Sync {
    fn send(&self, message: &[u8]) -> Result<(), TransportError>;
}

#[derive(Debug)]
pub enum TransportError {
    Init(String),
    PortNotFound(String),
    Connect(String),
    Send(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(reason) => {
                write!(f, "Unable to initialize MIDI client: {}", reason)
            }
            Self::PortNotFound(port) => {
                write!(f, "Unable to find MIDI port: {}", port)
            }
            Self::Connect(reason) => {
                write!(f, "Unable to connect to MIDI port: {}", reason)
            }
            Self::Send(reason) => write!(f, "Unable to send message: {}", reason),
        }
    }
}

impl std::error::Error for TransportError {}

/// In-memory transport that records every message. Used by tests and the
/// `--simulate` mode of the binary, where no hardware is attached.
#[derive(Debug, Default)]
pub struct SimulatedTransport {
    sent: Mutex<Vec<Vec<u8>>>,
    failing: AtomicBool,
}

impl SimulatedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// While failing, sends return an error and nothing is recorded.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn take_sent(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut *self.sent.lock())
    }

    pub fn outbound(&self) -> Vec<Outbound> {
        self.sent
            .lock()
            .iter()
            .filter_map(|message| Outbound::decode(message))
            .collect()
    }

    /// Replays every light command sent so far and returns the resulting
    /// state of each pad that was ever touched.
    pub fn pad_states(&self) -> HashMap<PadAddress, LightState> {
        let mut states = HashMap::default();
        for message in self.outbound() {
            if let Outbound::Light(light) = message {
                states.insert(light.address, light);
            }
        }
        states
    }

    /// Pads whose most recent light command left them on.
    pub fn lit_pads(&self) -> HashMap<PadAddress, LightState> {
        let mut states = self.pad_states();
        states.retain(|_, light| light.is_lit());
        states
    }
}

impl Transport for SimulatedTransport {
    fn send(&self, message: &[u8]) -> Result<(), TransportError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::Send("simulated failure".to_string()));
        }
        trace!("simulated send: {:02X?}", message);
        self.sent.lock().push(message.to_vec());
        Ok(())
    }
}

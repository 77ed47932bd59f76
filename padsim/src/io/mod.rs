pub mod midi;
pub mod transport;

pub use transport::{SimulatedTransport, Transport, TransportError};

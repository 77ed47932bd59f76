pub mod core;
pub mod io;
pub mod motion;
pub mod prelude;
pub mod runtime;
pub mod sim;
pub mod surface;

pub use crate::io::midi::{MidiSurface, connect};

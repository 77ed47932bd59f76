pub mod codec;
pub mod control_surface;
pub mod pad;

pub use codec::{DeviceMode, Outbound};
pub use control_surface::{ControlSurface, Dispatcher, SurfaceOutput};
pub use pad::{LightState, PadAddress, PadError, PaletteIndex};

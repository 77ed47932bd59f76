pub use crate::core::config::{
    AnimationConfig, ConfigError, LevelConfig, ScrollConfig, SimConfig,
};
pub use crate::core::logging::init_logger;
pub use crate::core::logging::{debug, error, info, trace, warn};
pub use crate::core::util::{HashMap, HashSet, wait_until};
pub use crate::io::midi::{MidiSurface, connect};
pub use crate::io::{SimulatedTransport, Transport, TransportError};
pub use crate::motion::{AmbientAnimation, RandomWalk};
pub use crate::runtime::clock::{
    Clock, ManualClock, SharedClock, SystemClock,
};
pub use crate::runtime::emitter::{
    DocumentSink, Emitter, TickReport, VecSink,
};
pub use crate::runtime::events::{
    EmitterCommand, EmitterCommandReceiver, EmitterCommandSender,
    command_channel,
};
pub use crate::sim::*;
pub use crate::surface::*;
pub use crate::ternary;

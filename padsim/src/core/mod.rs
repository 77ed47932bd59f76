pub mod config;
pub mod logging;
pub mod prelude;
pub mod util;

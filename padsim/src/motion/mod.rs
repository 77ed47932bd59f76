pub mod ambient;

pub use ambient::*;

pub mod clock;
pub mod emitter;
pub mod events;

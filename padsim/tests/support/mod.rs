use std::env;
use std::sync::Arc;
use std::time::Duration;

use padsim::prelude::*;

pub fn midi_tests_enabled() -> bool {
    matches!(
        env::var("PADSIM_RUN_MIDI_TESTS")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "1" | "true" | "yes" | "on"
    )
}

pub struct Harness {
    pub surface: ControlSurface,
    pub transport: Arc<SimulatedTransport>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new() -> Self {
        let transport = SimulatedTransport::new();
        let clock = Arc::new(ManualClock::new());
        let surface = ControlSurface::new(transport.clone(), clock.clone());
        Self {
            surface,
            transport,
            clock,
        }
    }

    pub fn press(&self, pad: u8) {
        self.surface.dispatch(0, &[0x90, pad, 0x7F]);
    }

    pub fn release(&self, pad: u8) {
        self.surface.dispatch(0, &[0x90, pad, 0x00]);
    }

    /// Keep advancing the manual clock by `step` until `done` holds.
    pub fn drive<F: Fn() -> bool>(&self, step: Duration, done: F) {
        let finished = wait_until(Duration::from_secs(5), || {
            if done() {
                return true;
            }
            self.clock.advance(step);
            false
        });
        assert!(finished, "background work did not settle");
    }
}

pub fn pad(value: u8) -> PadAddress {
    PadAddress::new(value).expect("expected a grid pad")
}

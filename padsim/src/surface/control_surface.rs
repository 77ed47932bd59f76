use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::RwLock;

use super::codec::{self, DeviceMode};
use super::pad::{LightState, PadAddress, PaletteIndex};
use crate::core::prelude::*;
use crate::io::transport::Transport;
use crate::runtime::clock::SharedClock;

pub type PadHandler = Box<dyn Fn() + Send + Sync>;

type HandlerMap = HashMap<PadAddress, Vec<PadHandler>>;

/// Pad press registry. Cloning shares the same registry, which is how the
/// inbound side of a transport gets hold of it.
#[derive(Clone, Default)]
pub struct Dispatcher {
    handlers: Arc<RwLock<HandlerMap>>,
}

impl Dispatcher {
    fn register(&self, address: PadAddress, handler: PadHandler) {
        self.handlers.write().entry(address).or_default().push(handler);
    }

    /// Decode one inbound message and run every handler registered for the
    /// pressed pad, in registration order. Handlers must not register new
    /// handlers.
    pub fn dispatch(&self, stamp: u64, message: &[u8]) {
        trace!("MIDI message: {}, {:02X?}", stamp, message);

        let Some(address) = codec::decode_inbound_event(message) else {
            return;
        };

        let handlers = self.handlers.read();
        match handlers.get(&address) {
            Some(handlers) => {
                debug!("Pad {} pressed", address);
                for handler in handlers {
                    handler();
                }
            }
            None => trace!("No handlers for pad {}", address),
        }
    }
}

/// Write side of the surface. Cheap to clone; handlers and animation
/// threads each hold one.
#[derive(Clone)]
pub struct SurfaceOutput {
    transport: Arc<dyn Transport>,
    clock: SharedClock,
}

impl SurfaceOutput {
    pub fn new(transport: Arc<dyn Transport>, clock: SharedClock) -> Self {
        Self { transport, clock }
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    fn send(&self, message: &[u8]) {
        if let Err(err) = self.transport.send(message) {
            warn!("Dropped message {:02X?}: {}", message, err);
        }
    }

    pub fn light(&self, light: LightState) {
        self.send(&codec::encode_light(light));
    }

    pub fn light_pad(&self, address: PadAddress, color: PaletteIndex, pulse: bool) {
        self.light(LightState::new(address, color, pulse));
    }

    pub fn clear_pad(&self, address: PadAddress) {
        self.light(LightState::off(address));
    }

    pub fn clear_pads<'a, I>(&self, addresses: I)
    where
        I: IntoIterator<Item = &'a PadAddress>,
    {
        for address in addresses {
            self.clear_pad(*address);
        }
    }

    pub fn clear_all(&self) {
        for address in PadAddress::grid() {
            self.clear_pad(address);
        }
    }

    pub fn set_mode(&self, mode: DeviceMode) {
        self.send(&codec::encode_set_mode(mode));
    }

    pub fn stop_scrolling(&self) {
        self.send(&codec::encode_scroll_text(
            "",
            PaletteIndex::WHITE,
            codec::DEFAULT_SCROLL_SPEED,
        ));
    }

    /// Start scrolling `text` and stop it again once `duration` has passed.
    /// Returns immediately; the stop is sent from a detached thread. A later
    /// call does not cancel an earlier pending stop.
    pub fn scroll_text(
        &self,
        text: &str,
        color: PaletteIndex,
        duration: Duration,
        speed: u8,
    ) {
        self.send(&codec::encode_scroll_text(text, color, speed));

        let output = self.clone();
        let spawned = thread::Builder::new()
            .name("scroll-stop".to_string())
            .spawn(move || {
                output.clock.sleep(duration);
                output.stop_scrolling();
            });

        if let Err(err) = spawned {
            warn!("Unable to schedule scroll stop, stopping now: {}", err);
            self.stop_scrolling();
        }
    }
}

/// Owns the transport's write side and the pad press registry.
pub struct ControlSurface {
    output: SurfaceOutput,
    dispatcher: Dispatcher,
}

impl ControlSurface {
    /// Takes over the device by switching it to programmer mode.
    pub fn new(transport: Arc<dyn Transport>, clock: SharedClock) -> Self {
        let output = SurfaceOutput::new(transport, clock);
        output.set_mode(DeviceMode::Programmer);
        info!("Surface switched to {} mode", DeviceMode::Programmer);

        Self {
            output,
            dispatcher: Dispatcher::default(),
        }
    }

    /// Register `handler` for presses of `address`. Earlier registrations
    /// for the same pad are kept and run first.
    pub fn on_pad<F>(&self, address: PadAddress, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.dispatcher.register(address, Box::new(handler));
    }

    pub fn dispatch(&self, stamp: u64, message: &[u8]) {
        self.dispatcher.dispatch(stamp, message);
    }

    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    pub fn output(&self) -> SurfaceOutput {
        self.output.clone()
    }

    pub fn light_pad(&self, address: PadAddress, color: PaletteIndex, pulse: bool) {
        self.output.light_pad(address, color, pulse);
    }

    pub fn clear_pad(&self, address: PadAddress) {
        self.output.clear_pad(address);
    }

    pub fn clear_all(&self) {
        self.output.clear_all();
    }

    pub fn scroll_text(
        &self,
        text: &str,
        color: PaletteIndex,
        duration: Duration,
        speed: u8,
    ) {
        self.output.scroll_text(text, color, duration, speed);
    }

    /// Hand the device back to live mode. Send failures are logged only;
    /// this runs while the process is going down.
    pub fn shutdown(&self) {
        info!("Shutting down, resetting surface to {} mode", DeviceMode::Live);
        self.output.set_mode(DeviceMode::Live);
    }
}

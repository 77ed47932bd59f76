//! Decorative random walks over the pads no entity uses.
//!
//! Pressing any reserved pad starts a session from that pad: a single lit
//! pad wanders around the reserved region, drifting through the palette,
//! and the whole region is cleared when the session ends.
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::config::AnimationConfig;
use crate::core::prelude::*;
use crate::surface::control_surface::{ControlSurface, SurfaceOutput};
use crate::surface::pad::{LightState, PadAddress, PaletteIndex};

/// One column either way, one row either way.
pub const STEP_OFFSETS: [i16; 4] = [1, -1, 10, -10];

/// Position and color of a single wandering light.
#[derive(Clone, Debug)]
pub struct RandomWalk {
    reserved: Arc<HashSet<PadAddress>>,
    current: PadAddress,
    previous: Option<PadAddress>,
    color: PaletteIndex,
    max_retries: usize,
}

impl RandomWalk {
    pub fn new(
        reserved: Arc<HashSet<PadAddress>>,
        start: PadAddress,
        color: PaletteIndex,
        max_retries: usize,
    ) -> Self {
        Self {
            reserved,
            current: start,
            previous: None,
            color,
            max_retries,
        }
    }

    pub fn current(&self) -> PadAddress {
        self.current
    }

    pub fn previous(&self) -> Option<PadAddress> {
        self.previous
    }

    pub fn color(&self) -> PaletteIndex {
        self.color
    }

    pub fn light(&self) -> LightState {
        LightState::new(self.current, self.color, false)
    }

    /// Move to a neighboring reserved pad other than the one just left and
    /// nudge the color by one palette step.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> LightState {
        match self.next_address(rng) {
            Some(next) => {
                self.previous = Some(self.current);
                self.current = next;
            }
            None => {
                // Dead end (the only neighbor is where we came from). Hold
                // for a step; the way back is open on the next one.
                trace!("Walk holding at {}", self.current);
                self.previous = Some(self.current);
            }
        }

        let delta = ternary!(rng.random_bool(0.5), 1, -1);
        self.color = self.color.drift(delta);

        self.light()
    }

    fn next_address<R: Rng>(&self, rng: &mut R) -> Option<PadAddress> {
        for _ in 0..self.max_retries {
            let offset = STEP_OFFSETS[rng.random_range(0..STEP_OFFSETS.len())];
            let Some(candidate) = self.current.offset(offset) else {
                continue;
            };
            if self.reserved.contains(&candidate)
                && Some(candidate) != self.previous
            {
                return Some(candidate);
            }
        }
        None
    }
}

/// Installs a trigger on every reserved pad and runs one session per
/// trigger at a time. Sessions from different triggers overlap freely.
pub struct AmbientAnimation {
    output: SurfaceOutput,
    reserved: Arc<HashSet<PadAddress>>,
    config: AnimationConfig,
    running: Mutex<HashSet<PadAddress>>,
    seeds: Mutex<StdRng>,
}

impl AmbientAnimation {
    pub fn install(
        surface: &ControlSurface,
        reserved: &[PadAddress],
        config: AnimationConfig,
    ) -> Arc<Self> {
        let seeds = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };

        let animation = Arc::new(Self {
            output: surface.output(),
            reserved: Arc::new(reserved.iter().copied().collect()),
            config,
            running: Mutex::new(HashSet::default()),
            seeds: Mutex::new(seeds),
        });

        for &pad in reserved {
            let animation = animation.clone();
            surface.on_pad(pad, move || {
                animation.trigger(pad);
            });
        }

        debug!("Ambient animation armed on {} pads", reserved.len());

        animation
    }

    pub fn reserved(&self) -> &HashSet<PadAddress> {
        &self.reserved
    }

    pub fn is_running(&self, trigger: PadAddress) -> bool {
        self.running.lock().contains(&trigger)
    }

    pub fn running_count(&self) -> usize {
        self.running.lock().len()
    }

    /// Start a session from `trigger` on its own thread. Returns `false`
    /// when a session for this trigger is still in flight or `trigger` is
    /// not a reserved pad.
    pub fn trigger(self: &Arc<Self>, trigger: PadAddress) -> bool {
        if !self.reserved.contains(&trigger) {
            return false;
        }
        if !self.running.lock().insert(trigger) {
            debug!("Animation from {} already running", trigger);
            return false;
        }

        let rng = StdRng::seed_from_u64(self.seeds.lock().random());
        let animation = self.clone();
        let spawned = thread::Builder::new()
            .name(format!("ambient-{}", trigger))
            .spawn(move || {
                animation.run_session(trigger, rng);
                animation.running.lock().remove(&trigger);
            });

        match spawned {
            Ok(_) => true,
            Err(err) => {
                warn!("Unable to start animation from {}: {}", trigger, err);
                self.running.lock().remove(&trigger);
                false
            }
        }
    }

    fn run_session(&self, trigger: PadAddress, mut rng: StdRng) {
        let clock = self.output.clock().clone();
        let started = clock.elapsed();
        let duration = self.config.duration();
        let step = self.config.step();

        let color = PaletteIndex::new(rng.random_range(1..=PaletteIndex::MAX));
        let mut walk = RandomWalk::new(
            self.reserved.clone(),
            trigger,
            color,
            self.config.max_retries,
        );

        debug!("Animation from {} started", trigger);
        self.output.light(walk.light());

        while clock.elapsed().saturating_sub(started) < duration {
            clock.sleep(step);
            self.output.light(walk.step(&mut rng));
        }

        self.output.clear_pads(self.reserved.iter());
        debug!("Animation from {} finished", trigger);
    }
}

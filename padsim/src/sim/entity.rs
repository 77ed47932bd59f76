use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::document::MetricDocument;
use super::history::History;
use super::layout::{PadLayout, base_layout};
use super::level::{Level, LevelTable};
use crate::core::prelude::*;
use crate::surface::control_surface::{ControlSurface, SurfaceOutput};
use crate::surface::pad::PadError;

#[derive(Debug, Default)]
struct EntityState {
    level: Level,
    history: History,
    last_timestamp: Option<DateTime<Utc>>,
}

struct EntityInner {
    ordinal: usize,
    name: String,
    layout: PadLayout,
    levels: Arc<LevelTable>,
    output: SurfaceOutput,
    state: Mutex<EntityState>,
}

/// One simulated host. Its level is picked from the grid and sampled into
/// a rolling history every time a document is taken.
///
/// Clones share state; the pad handlers installed by [`Entity::new`] hold
/// clones.
#[derive(Clone)]
pub struct Entity {
    inner: Arc<EntityInner>,
}

impl Entity {
    pub fn new(
        ordinal: usize,
        surface: &ControlSurface,
        levels: Arc<LevelTable>,
    ) -> Result<Self, PadError> {
        let layout = base_layout(ordinal)?;
        let entity = Self {
            inner: Arc::new(EntityInner {
                ordinal,
                name: format!("host-{}", ordinal + 1),
                layout,
                levels,
                output: surface.output(),
                state: Mutex::new(EntityState::default()),
            }),
        };

        for level in Level::ALL {
            let handler = entity.clone();
            surface.on_pad(entity.inner.layout.input(level), move || {
                handler.select(level)
            });
        }

        debug!(
            "Created {} on inputs {:?}",
            entity.inner.name, entity.inner.layout.inputs
        );

        Ok(entity)
    }

    pub fn ordinal(&self) -> usize {
        self.inner.ordinal
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn layout(&self) -> &PadLayout {
        &self.inner.layout
    }

    pub fn level(&self) -> Level {
        self.inner.state.lock().level
    }

    pub fn value(&self) -> f64 {
        self.inner.levels.value(self.level())
    }

    pub fn history(&self) -> Vec<Level> {
        self.inner.state.lock().history.to_vec()
    }

    pub fn status(&self) -> String {
        format!("{}: c:{}", self.inner.name, self.value())
    }

    /// Switch to `level` and redraw the level indicator. Selecting the
    /// current level again still redraws.
    pub fn select(&self, level: Level) {
        let mut state = self.inner.state.lock();
        state.level = level;
        debug!("{} -> {}", self.inner.name, level);
        self.render_level(level);
    }

    /// Sample the current level into history, redraw the history row and
    /// return a document for the current level.
    pub fn next_document(&self) -> MetricDocument {
        let mut state = self.inner.state.lock();
        let level = state.level;
        state.history.push(level);
        self.render_history(&state.history);

        let now = self.inner.output.clock().now();
        let timestamp = match state.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };
        state.last_timestamp = Some(timestamp);

        MetricDocument::new(
            timestamp,
            self.inner.name.clone(),
            self.inner.levels.value(level),
        )
    }

    fn render_level(&self, level: Level) {
        let inner = &self.inner;
        inner.output.clear_pads(&inner.layout.inputs);
        for active in level.up_to() {
            let address = inner.layout.input(active);
            inner.output.light(inner.levels.light(active, address));
        }
    }

    /// Unfilled slots are left as they are.
    fn render_history(&self, history: &History) {
        let inner = &self.inner;
        for (address, level) in inner.layout.history.iter().zip(history.iter())
        {
            inner.output.light(inner.levels.light(level, *address));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::io::transport::SimulatedTransport;
    use crate::runtime::clock::{Clock, ManualClock};
    use crate::sim::level::LevelSpec;
    use crate::surface::pad::{PadAddress, PaletteIndex};

    struct Fixture {
        surface: ControlSurface,
        transport: Arc<SimulatedTransport>,
        clock: Arc<ManualClock>,
    }

    fn fixture() -> Fixture {
        let transport = SimulatedTransport::new();
        let clock = Arc::new(ManualClock::new());
        let surface = ControlSurface::new(transport.clone(), clock.clone());
        transport.take_sent();
        Fixture {
            surface,
            transport,
            clock,
        }
    }

    fn quarter_table() -> Arc<LevelTable> {
        Arc::new(LevelTable::new([
            LevelSpec::new(0.0, PaletteIndex::BLUE, false),
            LevelSpec::new(0.25, PaletteIndex::GREEN, false),
            LevelSpec::new(0.5, PaletteIndex::YELLOW, false),
            LevelSpec::new(0.75, PaletteIndex::RED, false),
            LevelSpec::new(1.0, PaletteIndex::RED, true),
        ]))
    }

    fn press(surface: &ControlSurface, pad: PadAddress) {
        surface.dispatch(0, &[0x90, pad.value(), 0x7F]);
    }

    #[test]
    fn starts_at_lowest_level() {
        let f = fixture();
        let entity = Entity::new(1, &f.surface, quarter_table()).unwrap();
        assert_eq!(entity.name(), "host-2");
        assert_eq!(entity.level(), Level::Idle);
        assert!(entity.history().is_empty());
        assert!(f.transport.sent().is_empty());
    }

    #[test]
    fn pressing_level_three_lights_four_pads() {
        let f = fixture();
        let table = quarter_table();
        let entity = Entity::new(0, &f.surface, table.clone()).unwrap();

        press(&f.surface, PadAddress::new(41).unwrap());

        assert_eq!(entity.level(), Level::High);
        let lit = f.transport.lit_pads();
        assert_eq!(lit.len(), 4);
        for level in Level::High.up_to() {
            let pad = entity.layout().input(level);
            assert_eq!(lit.get(&pad), Some(&table.light(level, pad)));
        }
        assert!(!lit.contains_key(&entity.layout().input(Level::Critical)));

        assert_eq!(entity.next_document().value, 0.75);
    }

    #[test]
    fn every_level_lights_exactly_up_to_itself() {
        let f = fixture();
        let table = quarter_table();
        let entity = Entity::new(2, &f.surface, table.clone()).unwrap();

        for level in Level::ALL.into_iter().rev() {
            press(&f.surface, entity.layout().input(level));

            let lit = f.transport.lit_pads();
            for other in Level::ALL {
                let pad = entity.layout().input(other);
                if other <= level {
                    assert_eq!(lit.get(&pad), Some(&table.light(other, pad)));
                } else {
                    assert!(!lit.contains_key(&pad), "{} lit", other);
                }
            }
        }
    }

    #[test]
    fn redundant_press_still_renders() {
        let f = fixture();
        let entity = Entity::new(0, &f.surface, quarter_table()).unwrap();
        press(&f.surface, entity.layout().input(Level::Low));
        let first = f.transport.take_sent();
        press(&f.surface, entity.layout().input(Level::Low));
        assert_eq!(f.transport.take_sent(), first);
    }

    #[test]
    fn presses_do_not_touch_history() {
        let f = fixture();
        let entity = Entity::new(0, &f.surface, quarter_table()).unwrap();
        for level in Level::ALL {
            press(&f.surface, entity.layout().input(level));
        }
        assert!(entity.history().is_empty());
    }

    #[test]
    fn entities_only_react_to_their_own_pads() {
        let f = fixture();
        let a = Entity::new(0, &f.surface, quarter_table()).unwrap();
        let b = Entity::new(1, &f.surface, quarter_table()).unwrap();

        press(&f.surface, b.layout().input(Level::Critical));
        assert_eq!(a.level(), Level::Idle);
        assert_eq!(b.level(), Level::Critical);
    }

    #[test]
    fn next_document_records_and_renders_history() {
        let f = fixture();
        let table = quarter_table();
        let entity = Entity::new(0, &f.surface, table.clone()).unwrap();

        entity.next_document();
        entity.select(Level::Critical);
        f.transport.take_sent();
        let document = entity.next_document();

        assert_eq!(document.entity, "host-1");
        assert_eq!(document.value, 1.0);
        assert_eq!(entity.history(), vec![Level::Idle, Level::Critical]);

        let history = &entity.layout().history;
        let lit = f.transport.lit_pads();
        assert_eq!(lit.len(), 2, "empty history slots stay untouched");
        assert_eq!(lit[&history[0]], table.light(Level::Idle, history[0]));
        assert_eq!(lit[&history[1]], table.light(Level::Critical, history[1]));
    }

    #[test]
    fn history_scrolls_after_eight_documents() {
        let f = fixture();
        let entity = Entity::new(0, &f.surface, quarter_table()).unwrap();

        entity.select(Level::Critical);
        entity.next_document();
        entity.select(Level::Idle);
        for _ in 0..8 {
            entity.next_document();
        }

        assert_eq!(entity.history(), vec![Level::Idle; 8]);
    }

    #[test]
    fn timestamps_never_go_backwards() {
        let f = fixture();
        let entity = Entity::new(0, &f.surface, quarter_table()).unwrap();

        let mut previous = entity.next_document().timestamp;
        for step in [0, 250, 0, 1000] {
            f.clock.advance(Duration::from_millis(step));
            let document = entity.next_document();
            assert!(document.timestamp >= previous);
            previous = document.timestamp;
        }
        assert_eq!(previous, f.clock.now());
    }

    #[test]
    fn value_tracks_configured_table() {
        let f = fixture();
        let table = quarter_table();
        let entity = Entity::new(0, &f.surface, table.clone()).unwrap();
        for level in Level::ALL {
            entity.select(level);
            assert_eq!(entity.next_document().value, table.value(level));
        }
        assert_eq!(entity.status(), "host-1: c:1");
    }
}

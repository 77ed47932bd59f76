pub mod document;
pub mod entity;
pub mod history;
pub mod layout;
pub mod level;

pub use document::MetricDocument;
pub use entity::Entity;
pub use history::{HISTORY_CAPACITY, History};
pub use layout::{MAX_ENTITIES, PadLayout, base_layout, reserved_pads};
pub use level::{Level, LevelSpec, LevelTable};

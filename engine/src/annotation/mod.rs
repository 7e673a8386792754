//! Drawing annotations: tools, hit-testing, resize rules and the interaction engine.

pub mod constraints;
pub mod draft;
pub mod engine;
pub mod hit_test;
pub mod history;
pub mod orders;
pub mod tool;

pub use draft::Draft;
pub use engine::{AnnotationEngine, InteractionMode, Modifiers, PointerButton, PointerEvent};
pub use hit_test::{Handle, Hit, LineHandle, RectHandle, Side};
pub use history::History;
pub use orders::{NoOrders, OrderRecord, OrderSource, OrderStatus};
pub use tool::{ActiveTool, DraftKind};

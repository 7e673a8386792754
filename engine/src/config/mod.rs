// Engine configuration
pub mod settings;

pub use settings::{AggregationSettings, DrawingStyles, EngineSettings, InteractionSettings};

// Engine library root
// Aggregation, playback and annotation logic for the replay chart.

pub mod aggregation;
pub mod annotation;
pub mod chart;
pub mod config;
pub mod data;
pub mod error;
pub mod playback;
pub mod store;

pub use error::{EngineError, EngineResult};

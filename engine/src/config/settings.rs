// Engine settings, loaded from the bundled default JSON or a user file
use serde::Deserialize;
use shared::{PositionStyle, ShapeStyle, TrendlineStyle};
use std::path::Path;

use crate::error::EngineError;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EngineSettings {
    #[serde(default)]
    pub aggregation: AggregationSettings,
    #[serde(default)]
    pub interaction: InteractionSettings,
    #[serde(default)]
    pub styles: DrawingStyles,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AggregationSettings {
    /// Candles folded per chunk before streaming aggregation yields.
    pub chunk_size: usize,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self { chunk_size: 5000 }
    }
}

/// Pixel tolerances and limits used by the annotation engine.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct InteractionSettings {
    pub handle_radius: f64,
    pub handle_epsilon: f64,
    pub trendline_hit_px: f64,
    pub min_level_gap_px: f64,
    pub min_position_width_px: f64,
    /// Time span given to a position drafted without horizontal movement.
    pub min_position_span_secs: i64,
    /// Duplicates are shifted by this fraction of their reference price.
    pub duplicate_price_fraction: f64,
    pub history_limit: usize,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            handle_radius: 6.0,
            handle_epsilon: 2.0,
            trendline_hit_px: 8.0,
            min_level_gap_px: 12.0,
            min_position_width_px: 12.0,
            min_position_span_secs: 60,
            duplicate_price_fraction: 0.001,
            history_limit: 100,
        }
    }
}

impl InteractionSettings {
    pub fn handle_hit_radius(&self) -> f64 {
        self.handle_radius + self.handle_epsilon
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct DrawingStyles {
    pub rectangle: ShapeStyle,
    pub trendline: TrendlineStyle,
    pub position: PositionStyle,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            aggregation: AggregationSettings::default(),
            interaction: InteractionSettings::default(),
            styles: DrawingStyles::default(),
        }
    }
}

impl EngineSettings {
    /// Loads the settings bundled with the crate.
    pub fn load_default() -> Result<Self, EngineError> {
        let config_str = include_str!("../../config/default.json");
        Self::from_json(config_str)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "Loading engine settings");
        Self::from_json(&config_str)
    }

    pub fn from_json(config_str: &str) -> Result<Self, EngineError> {
        let settings: EngineSettings = serde_json::from_str(config_str)
            .map_err(|e| EngineError::ConfigError(format!("invalid settings JSON: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), EngineError> {
        if self.aggregation.chunk_size == 0 {
            return Err(EngineError::ConfigError("aggregation.chunk_size must be greater than 0".into()));
        }
        if self.interaction.handle_radius < 0.0 || self.interaction.min_level_gap_px < 0.0 {
            return Err(EngineError::ConfigError("pixel tolerances must not be negative".into()));
        }
        if self.interaction.min_position_span_secs <= 0 {
            return Err(EngineError::ConfigError(
                "interaction.min_position_span_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

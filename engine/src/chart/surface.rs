//! The rendering capability the engine drives but does not implement.

use shared::ChartTime;

/// Visible horizontal range in logical (bar index) units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogicalRange {
    pub from: f64,
    pub to: f64,
}

impl LogicalRange {
    pub const fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }

    pub fn shifted(self, delta: f64) -> Self {
        Self { from: self.from + delta, to: self.to + delta }
    }

    pub fn span(&self) -> f64 {
        self.to - self.from
    }
}

/// Visible vertical range in price units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn shifted(self, delta: f64) -> Self {
        Self { min: self.min + delta, max: self.max + delta }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Maps chart coordinates to pixels and back, and exposes the visible ranges.
///
/// `None` always means "outside what is currently rendered", never an error.
/// Callers skip the point or interaction when they get it.
pub trait RenderSurface {
    fn time_to_coordinate(&self, time: i64) -> Option<f64>;
    fn price_to_coordinate(&self, price: f64) -> Option<f64>;
    /// Native time at `x`; may be a number, a date string or a business day.
    fn coordinate_to_time(&self, x: f64) -> Option<ChartTime>;
    fn coordinate_to_price(&self, y: f64) -> Option<f64>;
    fn coordinate_to_logical(&self, x: f64) -> Option<f64>;

    fn visible_logical_range(&self) -> Option<LogicalRange>;
    fn set_visible_logical_range(&mut self, range: LogicalRange);
    fn visible_price_range(&self) -> Option<PriceRange>;
    fn set_visible_price_range(&mut self, range: PriceRange);
    /// Times of the first and last rendered bars inside the viewport.
    fn visible_time_range(&self) -> Option<(i64, i64)>;

    /// Routes further events for `pointer_id` to the chart until released.
    fn capture_pointer(&mut self, _pointer_id: u32) {}
    fn release_pointer(&mut self, _pointer_id: u32) {}
}

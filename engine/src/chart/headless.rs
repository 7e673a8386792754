//! A rendering surface without a screen.
//!
//! Bars sit at evenly spaced logical indices and both axes map linearly onto
//! a fixed viewport. Times before the first bar or after the last one are
//! reported as unavailable, like a real chart outside its rendered data.

use shared::ChartTime;

use super::surface::{LogicalRange, PriceRange, RenderSurface};

#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    width: f64,
    height: f64,
    time_origin: i64,
    bar_secs: i64,
    bar_count: usize,
    logical: LogicalRange,
    prices: PriceRange,
    captured: Option<u32>,
}

impl HeadlessSurface {
    /// `bar_count` bars of `bar_secs` seconds starting at `time_origin`, all visible.
    pub fn new(width: f64, height: f64, time_origin: i64, bar_secs: i64, bar_count: usize) -> Self {
        let last = bar_count.saturating_sub(1) as f64;
        Self {
            width,
            height,
            time_origin,
            bar_secs: bar_secs.max(1),
            bar_count,
            logical: LogicalRange::new(0.0, last.max(1.0)),
            prices: PriceRange::new(0.0, 1.0),
            captured: None,
        }
    }

    pub fn with_logical_range(mut self, range: LogicalRange) -> Self {
        self.logical = range;
        self
    }

    pub fn with_price_range(mut self, range: PriceRange) -> Self {
        self.prices = range;
        self
    }

    pub fn captured_pointer(&self) -> Option<u32> {
        self.captured
    }

    fn last_index(&self) -> Option<f64> {
        self.bar_count.checked_sub(1).map(|i| i as f64)
    }

    fn logical_to_x(&self, logical: f64) -> Option<f64> {
        let span = self.logical.span();
        if span <= 0.0 {
            return None;
        }
        Some((logical - self.logical.from) / span * self.width)
    }

    fn x_to_logical(&self, x: f64) -> Option<f64> {
        if self.width <= 0.0 {
            return None;
        }
        Some(self.logical.from + x / self.width * self.logical.span())
    }

    fn time_at(&self, index: f64) -> i64 {
        self.time_origin + index as i64 * self.bar_secs
    }
}

impl RenderSurface for HeadlessSurface {
    fn time_to_coordinate(&self, time: i64) -> Option<f64> {
        let last = self.last_index()?;
        let logical = (time - self.time_origin) as f64 / self.bar_secs as f64;
        if logical < 0.0 || logical > last {
            return None;
        }
        self.logical_to_x(logical)
    }

    fn price_to_coordinate(&self, price: f64) -> Option<f64> {
        let span = self.prices.span();
        if span <= 0.0 {
            return None;
        }
        Some((self.prices.max - price) / span * self.height)
    }

    fn coordinate_to_time(&self, x: f64) -> Option<ChartTime> {
        let last = self.last_index()?;
        let index = self.x_to_logical(x)?.round();
        if index < 0.0 || index > last {
            return None;
        }
        Some(ChartTime::Timestamp(self.time_at(index) as f64))
    }

    fn coordinate_to_price(&self, y: f64) -> Option<f64> {
        if self.height <= 0.0 {
            return None;
        }
        Some(self.prices.max - y / self.height * self.prices.span())
    }

    fn coordinate_to_logical(&self, x: f64) -> Option<f64> {
        self.x_to_logical(x)
    }

    fn visible_logical_range(&self) -> Option<LogicalRange> {
        Some(self.logical)
    }

    fn set_visible_logical_range(&mut self, range: LogicalRange) {
        self.logical = range;
    }

    fn visible_price_range(&self) -> Option<PriceRange> {
        Some(self.prices)
    }

    fn set_visible_price_range(&mut self, range: PriceRange) {
        self.prices = range;
    }

    fn visible_time_range(&self) -> Option<(i64, i64)> {
        let last = self.last_index()?;
        let first = self.logical.from.ceil().max(0.0);
        let end = self.logical.to.floor().min(last);
        if first > end {
            return None;
        }
        Some((self.time_at(first), self.time_at(end)))
    }

    fn capture_pointer(&mut self, pointer_id: u32) {
        self.captured = Some(pointer_id);
    }

    fn release_pointer(&mut self, pointer_id: u32) {
        if self.captured == Some(pointer_id) {
            self.captured = None;
        }
    }
}

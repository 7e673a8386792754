//! Chart annotations: rectangles, trendlines and simulated positions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a drawing, unique within a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrawingId(Uuid);

impl DrawingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DrawingId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DrawingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A location in chart space: seconds since the epoch and a price.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartPoint {
    pub time: i64,
    pub price: f64,
}

impl ChartPoint {
    pub const fn new(time: i64, price: f64) -> Self {
        Self { time, price }
    }

    pub fn translate(self, dt: i64, dp: f64) -> Self {
        Self { time: self.time + dt, price: self.price + dp }
    }
}

/// A location in pixel space, origin at the top-left of the chart pane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: PixelPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    pub border_color: String,
    pub fill_color: String,
    pub line_width: f32,
    #[serde(default)]
    pub line_style: LineStyle,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            border_color: "#2962ff".to_string(),
            fill_color: "rgba(41, 98, 255, 0.15)".to_string(),
            line_width: 1.0,
            line_style: LineStyle::Solid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendlineStyle {
    pub color: String,
    pub line_width: f32,
    #[serde(default)]
    pub line_style: LineStyle,
}

impl Default for TrendlineStyle {
    fn default() -> Self {
        Self { color: "#f7a600".to_string(), line_width: 2.0, line_style: LineStyle::Solid }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionStyle {
    pub profit_fill: String,
    pub loss_fill: String,
    pub entry_color: String,
    pub line_width: f32,
}

impl Default for PositionStyle {
    fn default() -> Self {
        Self {
            profit_fill: "rgba(38, 166, 154, 0.2)".to_string(),
            loss_fill: "rgba(239, 83, 80, 0.2)".to_string(),
            entry_color: "#787b86".to_string(),
            line_width: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub id: DrawingId,
    pub start: ChartPoint,
    pub end: ChartPoint,
    pub style: ShapeStyle,
}

impl Rectangle {
    /// Builds a rectangle with `start` holding the minimum time and price.
    pub fn normalized(id: DrawingId, a: ChartPoint, b: ChartPoint, style: ShapeStyle) -> Self {
        let (start, end) = normalize_corners(a, b);
        Self { id, start, end, style }
    }
}

/// Orders two corners so `start.time <= end.time` and `start.price <= end.price`.
pub fn normalize_corners(a: ChartPoint, b: ChartPoint) -> (ChartPoint, ChartPoint) {
    (
        ChartPoint::new(a.time.min(b.time), a.price.min(b.price)),
        ChartPoint::new(a.time.max(b.time), a.price.max(b.price)),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trendline {
    pub id: DrawingId,
    pub start: ChartPoint,
    pub end: ChartPoint,
    #[serde(default)]
    pub extend_left: bool,
    #[serde(default)]
    pub extend_right: bool,
    pub style: TrendlineStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionKind {
    Long,
    Short,
}

/// The three horizontal lines of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionLevel {
    Entry,
    TakeProfit,
    StopLoss,
}

/// A simulated trade. `start`/`end` is the bounding box, `entry` the fill point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: DrawingId,
    pub kind: PositionKind,
    pub entry: ChartPoint,
    pub start: ChartPoint,
    pub end: ChartPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<f64>,
    pub style: PositionStyle,
}

impl Position {
    pub fn level(&self, level: PositionLevel) -> Option<f64> {
        match level {
            PositionLevel::Entry => Some(self.entry.price),
            PositionLevel::TakeProfit => self.take_profit,
            PositionLevel::StopLoss => self.stop_loss,
        }
    }

    pub fn set_level(&mut self, level: PositionLevel, price: f64) {
        match level {
            PositionLevel::Entry => self.entry.price = price,
            PositionLevel::TakeProfit => self.take_profit = Some(price),
            PositionLevel::StopLoss => self.stop_loss = Some(price),
        }
    }

    /// Levels that are currently defined, entry first.
    pub fn defined_levels(&self) -> Vec<(PositionLevel, f64)> {
        [PositionLevel::Entry, PositionLevel::TakeProfit, PositionLevel::StopLoss]
            .into_iter()
            .filter_map(|level| self.level(level).map(|price| (level, price)))
            .collect()
    }

    /// Whether stop-loss, entry and take-profit sit in the order the side requires.
    pub fn levels_ordered(&self) -> bool {
        let entry = self.entry.price;
        let (below, above) = match self.kind {
            PositionKind::Long => (self.stop_loss, self.take_profit),
            PositionKind::Short => (self.take_profit, self.stop_loss),
        };
        below.map_or(true, |b| b <= entry) && above.map_or(true, |a| entry <= a)
    }

    /// Stretches the bounding box vertically so it spans exactly the defined levels.
    pub fn fit_box_to_levels(&mut self) {
        let prices = self.defined_levels();
        let low = prices.iter().map(|(_, p)| *p).fold(f64::INFINITY, f64::min);
        let high = prices.iter().map(|(_, p)| *p).fold(f64::NEG_INFINITY, f64::max);
        if self.start.time > self.end.time {
            std::mem::swap(&mut self.start.time, &mut self.end.time);
        }
        self.start.price = low;
        self.end.price = high;
        self.entry.time = self.start.time;
    }

    /// Whether the bounding box encloses every defined level.
    pub fn box_encloses_levels(&self) -> bool {
        let low = self.start.price.min(self.end.price);
        let high = self.start.price.max(self.end.price);
        self.defined_levels().iter().all(|(_, p)| *p >= low && *p <= high)
    }
}

/// Every annotation kind the chart knows about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Drawing {
    Rectangle(Rectangle),
    Trendline(Trendline),
    Position(Position),
}

impl Drawing {
    pub fn id(&self) -> DrawingId {
        match self {
            Drawing::Rectangle(d) => d.id,
            Drawing::Trendline(d) => d.id,
            Drawing::Position(d) => d.id,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Drawing::Rectangle(_) => "rectangle",
            Drawing::Trendline(_) => "trendline",
            Drawing::Position(_) => "position",
        }
    }

    pub fn as_position(&self) -> Option<&Position> {
        match self {
            Drawing::Position(p) => Some(p),
            _ => None,
        }
    }

    pub fn start(&self) -> ChartPoint {
        match self {
            Drawing::Rectangle(d) => d.start,
            Drawing::Trendline(d) => d.start,
            Drawing::Position(d) => d.start,
        }
    }

    pub fn end(&self) -> ChartPoint {
        match self {
            Drawing::Rectangle(d) => d.end,
            Drawing::Trendline(d) => d.end,
            Drawing::Position(d) => d.end,
        }
    }

    /// A copy shifted by `dt` seconds and `dp` price units.
    pub fn translated(&self, dt: i64, dp: f64) -> Drawing {
        let mut moved = self.clone();
        match &mut moved {
            Drawing::Rectangle(d) => {
                d.start = d.start.translate(dt, dp);
                d.end = d.end.translate(dt, dp);
            }
            Drawing::Trendline(d) => {
                d.start = d.start.translate(dt, dp);
                d.end = d.end.translate(dt, dp);
            }
            Drawing::Position(d) => {
                d.start = d.start.translate(dt, dp);
                d.end = d.end.translate(dt, dp);
                d.entry = d.entry.translate(dt, dp);
                d.stop_loss = d.stop_loss.map(|p| p + dp);
                d.take_profit = d.take_profit.map(|p| p + dp);
            }
        }
        moved
    }

    /// A copy carrying a fresh identifier.
    pub fn with_new_id(&self) -> Drawing {
        let id = DrawingId::new();
        let mut copy = self.clone();
        match &mut copy {
            Drawing::Rectangle(d) => d.id = id,
            Drawing::Trendline(d) => d.id = id,
            Drawing::Position(d) => d.id = id,
        }
        copy
    }

    /// The price the duplicate nudge is scaled from.
    pub fn reference_price(&self) -> f64 {
        match self {
            Drawing::Rectangle(d) => d.end.price,
            Drawing::Trendline(d) => d.start.price,
            Drawing::Position(d) => d.entry.price,
        }
    }
}

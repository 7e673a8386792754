pub mod drawing;
pub mod models;
pub mod utils;

pub use drawing::{
    normalize_corners, ChartPoint, Drawing, DrawingId, LineStyle, PixelPoint, Position, PositionKind, PositionLevel,
    PositionStyle, Rectangle, ShapeStyle, Trendline, TrendlineStyle,
};
pub use models::{Candle, MarketData, TimeFrame};
pub use utils::ChartTime;

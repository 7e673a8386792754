//! Chart point <-> pixel conversion with extrapolation past the rendered data.

use shared::{Candle, ChartPoint, PixelPoint};

use super::surface::RenderSurface;

/// Converts through a [`RenderSurface`], falling back to linear projection
/// when the surface cannot place a time (e.g. a drawing that starts before
/// the first rendered bar).
pub struct CoordinateConverter<'a> {
    surface: &'a dyn RenderSurface,
    candles: &'a [Candle],
}

impl<'a> CoordinateConverter<'a> {
    pub fn new(surface: &'a dyn RenderSurface, candles: &'a [Candle]) -> Self {
        Self { surface, candles }
    }

    pub fn to_canvas(&self, point: ChartPoint) -> Option<PixelPoint> {
        let y = self.surface.price_to_coordinate(point.price).filter(|y| y.is_finite())?;
        let x = self.time_to_x(point.time).filter(|x| x.is_finite())?;
        Some(PixelPoint::new(x, y))
    }

    pub fn to_chart(&self, pixel: PixelPoint) -> Option<ChartPoint> {
        let price = self.surface.coordinate_to_price(pixel.y).filter(|p| p.is_finite())?;
        let time = self.surface.coordinate_to_time(pixel.x)?.to_timestamp()?;
        Some(ChartPoint::new(time, price))
    }

    /// Pixel y of `price`, if the surface can place it.
    pub fn price_to_y(&self, price: f64) -> Option<f64> {
        self.surface.price_to_coordinate(price).filter(|y| y.is_finite())
    }

    /// Pixel x of `time`, extrapolated when outside the rendered range.
    pub fn time_to_x(&self, time: i64) -> Option<f64> {
        if let Some(x) = self.surface.time_to_coordinate(time).filter(|x| x.is_finite()) {
            return Some(x);
        }
        let ((t0, x0), (t1, x1)) = self.reference_pairs()?;
        let pixels_per_sec = (x1 - x0) / (t1 - t0) as f64;
        Some(x0 + (time - t0) as f64 * pixels_per_sec)
    }

    /// Two distinct (time, x) anchors: visible range edges first, then the dataset ends.
    fn reference_pairs(&self) -> Option<((i64, f64), (i64, f64))> {
        let visible = self.surface.visible_time_range();
        let dataset = match (self.candles.first(), self.candles.last()) {
            (Some(first), Some(last)) => Some((first.time, last.time)),
            _ => None,
        };
        [visible, dataset].into_iter().flatten().find_map(|(t0, t1)| {
            if t0 == t1 {
                return None;
            }
            let x0 = self.surface.time_to_coordinate(t0).filter(|x| x.is_finite())?;
            let x1 = self.surface.time_to_coordinate(t1).filter(|x| x.is_finite())?;
            Some(((t0, x0), (t1, x1)))
        })
    }
}

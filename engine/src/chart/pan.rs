//! Background panning: one drag translates both visible ranges.

use shared::PixelPoint;

use super::surface::{LogicalRange, PriceRange, RenderSurface};

/// Visible ranges as a pair, the unit a pan session works in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRanges {
    pub logical: LogicalRange,
    pub prices: PriceRange,
}

#[derive(Debug, Clone, Copy)]
struct PanSession {
    origin: PixelPoint,
    start: ViewRanges,
}

#[derive(Debug, Default)]
pub struct PanController {
    session: Option<PanSession>,
    baseline: Option<ViewRanges>,
}

impl PanController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Ranges the last completed pan settled on.
    pub fn baseline(&self) -> Option<ViewRanges> {
        self.baseline
    }

    /// Captures the current ranges. Returns `false` if the surface has none to pan.
    pub fn start(&mut self, surface: &dyn RenderSurface, origin: PixelPoint) -> bool {
        let (Some(logical), Some(prices)) = (surface.visible_logical_range(), surface.visible_price_range()) else {
            tracing::debug!("Pan ignored: surface exposes no visible range");
            return false;
        };
        self.session = Some(PanSession { origin, start: ViewRanges { logical, prices } });
        true
    }

    /// Moves the view so the point under `origin` follows the pointer to `current`.
    pub fn update(&mut self, surface: &mut dyn RenderSurface, current: PixelPoint) -> Option<ViewRanges> {
        let session = self.session?;
        let logical_delta = match (
            surface.coordinate_to_logical(session.origin.x),
            surface.coordinate_to_logical(current.x),
        ) {
            (Some(from), Some(to)) if (from - to).is_finite() => from - to,
            _ => 0.0,
        };
        let price_delta = match (
            surface.coordinate_to_price(session.origin.y),
            surface.coordinate_to_price(current.y),
        ) {
            (Some(from), Some(to)) if (from - to).is_finite() => from - to,
            _ => 0.0,
        };

        let ranges = ViewRanges {
            logical: session.start.logical.shifted(logical_delta),
            prices: session.start.prices.shifted(price_delta),
        };
        surface.set_visible_logical_range(ranges.logical);
        surface.set_visible_price_range(ranges.prices);
        Some(ranges)
    }

    /// Drops the session without touching the baseline.
    pub fn abort(&mut self) {
        self.session = None;
    }

    /// Ends the session and records where the view came to rest.
    pub fn end(&mut self, surface: &dyn RenderSurface) -> Option<ViewRanges> {
        self.session.take()?;
        let settled = match (surface.visible_logical_range(), surface.visible_price_range()) {
            (Some(logical), Some(prices)) => Some(ViewRanges { logical, prices }),
            _ => None,
        };
        if settled.is_some() {
            self.baseline = settled;
        }
        settled
    }
}

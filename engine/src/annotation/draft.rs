//! In-progress drawings and what they commit to.

use shared::{
    ChartPoint, Drawing, DrawingId, Position, PositionKind, PositionStyle, Rectangle, Trendline,
};

use super::tool::DraftKind;
use crate::config::DrawingStyles;

#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    /// Carried over to the committed drawing so previews keep a stable id.
    pub id: DrawingId,
    pub kind: DraftKind,
    pub start: ChartPoint,
    pub end: ChartPoint,
}

impl Draft {
    pub fn new(kind: DraftKind, start: ChartPoint) -> Self {
        Self { id: DrawingId::new(), kind, start, end: start }
    }

    /// Moves the free end. `horizontal` pins a trendline to its start price.
    pub fn update_end(&mut self, mut point: ChartPoint, horizontal: bool) {
        if horizontal && self.kind == DraftKind::Trendline {
            point.price = self.start.price;
        }
        self.end = point;
    }

    pub fn has_movement(&self) -> bool {
        self.start.time != self.end.time || self.start.price != self.end.price
    }

    pub fn to_drawing(&self, styles: &DrawingStyles, min_span_secs: i64) -> Drawing {
        match self.kind {
            DraftKind::Rectangle => {
                Drawing::Rectangle(Rectangle::normalized(self.id, self.start, self.end, styles.rectangle.clone()))
            }
            DraftKind::Trendline => Drawing::Trendline(Trendline {
                id: self.id,
                start: self.start,
                end: self.end,
                extend_left: false,
                extend_right: false,
                style: styles.trendline.clone(),
            }),
            DraftKind::Position(kind) => Drawing::Position(position_from_extremes(
                self.id,
                kind,
                self.start,
                self.end,
                styles.position.clone(),
                min_span_secs,
            )),
        }
    }
}

/// Builds a position from a dragged box.
///
/// Entry sits on the near price extreme for the side and take-profit on the
/// far one; stop-loss goes half that distance past the entry, a 2:1 reward to
/// risk. A box without width gets `min_span_secs` so it stays visible.
pub fn position_from_extremes(
    id: DrawingId,
    kind: PositionKind,
    a: ChartPoint,
    b: ChartPoint,
    style: PositionStyle,
    min_span_secs: i64,
) -> Position {
    let low = a.price.min(b.price);
    let high = a.price.max(b.price);
    let (entry, take_profit) = match kind {
        PositionKind::Long => (low, high),
        PositionKind::Short => (high, low),
    };
    let stop_loss = entry - (take_profit - entry) / 2.0;

    let t0 = a.time.min(b.time);
    let mut t1 = a.time.max(b.time);
    if t1 == t0 {
        t1 = t0 + min_span_secs;
    }

    let mut position = Position {
        id,
        kind,
        entry: ChartPoint::new(t0, entry),
        start: ChartPoint::new(t0, low),
        end: ChartPoint::new(t1, high),
        stop_loss: Some(stop_loss),
        take_profit: Some(take_profit),
        style,
    };
    position.fit_box_to_levels();
    position
}

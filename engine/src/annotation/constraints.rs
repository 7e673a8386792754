//! Resize rules for each drawing kind.
//!
//! Every function works from the pre-gesture snapshot plus the total pointer
//! delta of the gesture, so repeated frames never accumulate drift.

use shared::{normalize_corners, ChartPoint, Drawing, Position, PositionKind, PositionLevel, Rectangle, Trendline};

use super::hit_test::{Handle, LineHandle, RectHandle, Side};
use crate::chart::CoordinateConverter;
use crate::config::InteractionSettings;

/// Limits a candidate level so the side's ordering holds.
///
/// Long: take-profit is floored at `max(entry, stop_loss)`, stop-loss capped at
/// `min(entry, take_profit)`, entry kept between them. Short mirrors this.
pub fn clamp_level(position: &Position, level: PositionLevel, candidate: f64) -> f64 {
    let entry = position.entry.price;
    let sl = position.stop_loss;
    let tp = position.take_profit;
    match (position.kind, level) {
        (PositionKind::Long, PositionLevel::TakeProfit) => candidate.max(entry.max(sl.unwrap_or(entry))),
        (PositionKind::Long, PositionLevel::StopLoss) => candidate.min(entry.min(tp.unwrap_or(entry))),
        (PositionKind::Long, PositionLevel::Entry) => {
            candidate.max(sl.unwrap_or(f64::NEG_INFINITY)).min(tp.unwrap_or(f64::INFINITY))
        }
        (PositionKind::Short, PositionLevel::TakeProfit) => candidate.min(entry.min(sl.unwrap_or(entry))),
        (PositionKind::Short, PositionLevel::StopLoss) => candidate.max(entry.max(tp.unwrap_or(entry))),
        (PositionKind::Short, PositionLevel::Entry) => {
            candidate.max(tp.unwrap_or(f64::NEG_INFINITY)).min(sl.unwrap_or(f64::INFINITY))
        }
    }
}

/// Whether `moved` keeps at least `min_gap_px` of vertical room to every other level.
/// Levels that cannot be placed on screen count as too close.
pub fn level_spacing_ok(
    position: &Position,
    moved: PositionLevel,
    converter: &CoordinateConverter<'_>,
    min_gap_px: f64,
) -> bool {
    let Some(moved_y) = position.level(moved).and_then(|p| converter.price_to_y(p)) else {
        return false;
    };
    position
        .defined_levels()
        .into_iter()
        .filter(|(level, _)| *level != moved)
        .all(|(_, price)| converter.price_to_y(price).map_or(false, |y| (y - moved_y).abs() >= min_gap_px))
}

/// Signed box width in pixels must reach `min_width_px`; a crossed box fails.
pub fn position_width_ok(position: &Position, converter: &CoordinateConverter<'_>, min_width_px: f64) -> bool {
    match (converter.time_to_x(position.start.time), converter.time_to_x(position.end.time)) {
        (Some(left), Some(right)) => right - left >= min_width_px,
        _ => false,
    }
}

pub fn resize_rectangle(snapshot: &Rectangle, handle: RectHandle, dt: i64, dp: f64) -> Rectangle {
    let (lo, hi) = normalize_corners(snapshot.start, snapshot.end);
    let (start, end) = match handle {
        RectHandle::MidLeft => {
            let (a, b) = order(lo.time + dt, hi.time);
            (ChartPoint::new(a, lo.price), ChartPoint::new(b, hi.price))
        }
        RectHandle::MidRight => {
            let (a, b) = order(lo.time, hi.time + dt);
            (ChartPoint::new(a, lo.price), ChartPoint::new(b, hi.price))
        }
        corner => {
            let dragged = corner.chart_point(lo, hi).translate(dt, dp);
            normalize_corners(dragged, opposite(corner).chart_point(lo, hi))
        }
    };
    Rectangle { start, end, ..snapshot.clone() }
}

fn order(a: i64, b: i64) -> (i64, i64) {
    (a.min(b), a.max(b))
}

fn opposite(handle: RectHandle) -> RectHandle {
    match handle {
        RectHandle::TopLeft => RectHandle::BottomRight,
        RectHandle::TopRight => RectHandle::BottomLeft,
        RectHandle::BottomLeft => RectHandle::TopRight,
        RectHandle::BottomRight => RectHandle::TopLeft,
        RectHandle::MidLeft => RectHandle::MidRight,
        RectHandle::MidRight => RectHandle::MidLeft,
    }
}

pub fn resize_trendline(snapshot: &Trendline, handle: LineHandle, dt: i64, dp: f64) -> Trendline {
    let mut line = snapshot.clone();
    match handle {
        LineHandle::Start => line.start = snapshot.start.translate(dt, dp),
        LineHandle::End => line.end = snapshot.end.translate(dt, dp),
    }
    line
}

/// Drags one level handle of a position.
///
/// The vertical part moves `level`. A candidate past its ordering bound lands
/// on the bound; any other candidate is dropped if it crowds another level. the horizontal part moves the box edge on `side` (dropped if the box
/// would get too narrow). A dropped part keeps the value from `current`.
pub fn resize_position(
    current: &Position,
    snapshot: &Position,
    level: PositionLevel,
    side: Side,
    dt: i64,
    dp: f64,
    converter: &CoordinateConverter<'_>,
    settings: &InteractionSettings,
) -> Position {
    let mut next = current.clone();

    if let Some(base) = snapshot.level(level) {
        let candidate = base + dp;
        let clamped = clamp_level(&next, level, candidate);
        let mut trial = next.clone();
        trial.set_level(level, clamped);
        // a candidate pinned to its bound is always taken
        if clamped != candidate || level_spacing_ok(&trial, level, converter, settings.min_level_gap_px) {
            next = trial;
        } else {
            tracing::debug!(?level, "Level update rejected: too close to another level");
        }
    }

    let mut trial = next.clone();
    match side {
        Side::Left => trial.start.time = snapshot.start.time + dt,
        Side::Right => trial.end.time = snapshot.end.time + dt,
    }
    if position_width_ok(&trial, converter, settings.min_position_width_px) {
        next = trial;
    } else {
        tracing::debug!(?side, "Edge update rejected: position box too narrow");
    }

    next.fit_box_to_levels();
    next
}

/// Applies a handle drag to `current`, measured from `snapshot`.
pub fn resize(
    current: &Drawing,
    snapshot: &Drawing,
    handle: Handle,
    dt: i64,
    dp: f64,
    converter: &CoordinateConverter<'_>,
    settings: &InteractionSettings,
) -> Drawing {
    match (current, snapshot, handle) {
        (_, Drawing::Rectangle(rect), Handle::Rect(h)) => Drawing::Rectangle(resize_rectangle(rect, h, dt, dp)),
        (_, Drawing::Trendline(line), Handle::Line(h)) => Drawing::Trendline(resize_trendline(line, h, dt, dp)),
        (Drawing::Position(now), Drawing::Position(before), Handle::Level { level, side }) => {
            Drawing::Position(resize_position(now, before, level, side, dt, dp, converter, settings))
        }
        _ => current.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::surface::PriceRange;
    use crate::chart::HeadlessSurface;
    use shared::{DrawingId, PositionStyle, ShapeStyle};

    // 100px per 60s bar, 1 price unit = 1000px so 0.001 = 1px
    fn surface() -> HeadlessSurface {
        HeadlessSurface::new(1000.0, 500.0, 0, 60, 11).with_price_range(PriceRange::new(1.0, 1.5))
    }

    fn long() -> Position {
        Position {
            id: DrawingId::new(),
            kind: PositionKind::Long,
            entry: ChartPoint::new(120, 1.2),
            start: ChartPoint::new(120, 1.195),
            end: ChartPoint::new(360, 1.25),
            stop_loss: Some(1.195),
            take_profit: Some(1.25),
            style: PositionStyle::default(),
        }
    }

    fn short() -> Position {
        Position {
            kind: PositionKind::Short,
            stop_loss: Some(1.25),
            take_profit: Some(1.15),
            start: ChartPoint::new(120, 1.15),
            end: ChartPoint::new(360, 1.25),
            ..long()
        }
    }

    #[test]
    fn test_long_take_profit_floored_at_entry() {
        let p = long();
        assert_eq!(clamp_level(&p, PositionLevel::TakeProfit, 1.196), 1.2);
        assert_eq!(clamp_level(&p, PositionLevel::TakeProfit, 1.3), 1.3);
        assert_eq!(clamp_level(&p, PositionLevel::StopLoss, 1.21), 1.2);
        assert_eq!(clamp_level(&p, PositionLevel::Entry, 1.1), 1.195);
        assert_eq!(clamp_level(&p, PositionLevel::Entry, 1.4), 1.25);
    }

    #[test]
    fn test_short_mirrors_long() {
        let p = short();
        assert_eq!(clamp_level(&p, PositionLevel::TakeProfit, 1.21), 1.2);
        assert_eq!(clamp_level(&p, PositionLevel::StopLoss, 1.19), 1.2);
        assert_eq!(clamp_level(&p, PositionLevel::Entry, 1.3), 1.25);
        assert_eq!(clamp_level(&p, PositionLevel::Entry, 1.0), 1.15);
    }

    #[test]
    fn test_take_profit_drag_past_entry_lands_on_entry() {
        let surface = surface();
        let converter = CoordinateConverter::new(&surface, &[]);
        let settings = InteractionSettings::default();
        let p = long();
        let next = resize_position(&p, &p, PositionLevel::TakeProfit, Side::Right, 0, 1.196 - 1.25, &converter, &settings);
        assert_eq!(next.take_profit, Some(1.2));
        assert_eq!(next.end.price, 1.2);
        assert!(next.levels_ordered());

        // a short's stop-loss dragged under entry is capped at entry
        let s = short();
        let next = resize_position(&s, &s, PositionLevel::StopLoss, Side::Right, 0, 1.19 - 1.25, &converter, &settings);
        assert_eq!(next.stop_loss, Some(1.2));
        assert!(next.levels_ordered());
    }

    #[test]
    fn test_level_gap_enforced_in_pixels() {
        let surface = surface();
        let converter = CoordinateConverter::new(&surface, &[]);
        let settings = InteractionSettings::default();
        let p = long();
        // entry is at 1.2; 1.215 is 15px away, 1.205 only 5px
        let ok = resize_position(&p, &p, PositionLevel::TakeProfit, Side::Right, 0, 1.215 - 1.25, &converter, &settings);
        assert!((ok.take_profit.unwrap() - 1.215).abs() < 1e-9);
        assert!((ok.end.price - 1.215).abs() < 1e-9);
        let crowded = resize_position(&p, &p, PositionLevel::TakeProfit, Side::Right, 0, 1.205 - 1.25, &converter, &settings);
        assert_eq!(crowded.take_profit, Some(1.25));
    }

    #[test]
    fn test_rejected_frame_keeps_last_accepted_value() {
        let surface = surface();
        let converter = CoordinateConverter::new(&surface, &[]);
        let settings = InteractionSettings::default();
        let snapshot = long();
        let first = resize_position(&snapshot, &snapshot, PositionLevel::StopLoss, Side::Left, 0, -0.015, &converter, &settings);
        assert!((first.stop_loss.unwrap() - 1.18).abs() < 1e-9);
        // second frame of the same gesture tries to push stop-loss 4px under entry
        let second = resize_position(&first, &snapshot, PositionLevel::StopLoss, Side::Left, 0, 0.001, &converter, &settings);
        assert!((second.stop_loss.unwrap() - 1.18).abs() < 1e-9);
    }

    #[test]
    fn test_narrow_box_rejected() {
        let surface = surface();
        let converter = CoordinateConverter::new(&surface, &[]);
        let settings = InteractionSettings::default();
        let p = long();
        // right edge 360 -> 126 leaves 10px
        let next = resize_position(&p, &p, PositionLevel::Entry, Side::Right, -234, 0.0, &converter, &settings);
        assert_eq!(next.end.time, 360);
        // crossing over the left edge is rejected as well
        let crossed = resize_position(&p, &p, PositionLevel::Entry, Side::Right, -300, 0.0, &converter, &settings);
        assert_eq!(crossed.end.time, 360);
        let wider = resize_position(&p, &p, PositionLevel::Entry, Side::Left, -60, 0.0, &converter, &settings);
        assert_eq!((wider.start.time, wider.entry.time), (60, 60));
    }

    #[test]
    fn test_resize_keeps_long_and_short_ordering() {
        let surface = surface();
        let converter = CoordinateConverter::new(&surface, &[]);
        let settings = InteractionSettings::default();
        for snapshot in [long(), short()] {
            for level in [PositionLevel::Entry, PositionLevel::TakeProfit, PositionLevel::StopLoss] {
                let mut current = snapshot.clone();
                for step in -40..=40 {
                    let dp = step as f64 * 0.005;
                    current = resize_position(&current, &snapshot, level, Side::Left, 0, dp, &converter, &settings);
                    assert!(current.levels_ordered(), "{:?} {:?} dp={}", snapshot.kind, level, dp);
                    assert!(current.box_encloses_levels());
                }
            }
        }
    }

    #[test]
    fn test_rectangle_corner_drag_renormalises() {
        let rect = Rectangle::normalized(
            DrawingId::new(),
            ChartPoint::new(100, 1.0),
            ChartPoint::new(200, 2.0),
            ShapeStyle::default(),
        );
        // drag the top-right corner past the bottom-left one
        let next = resize_rectangle(&rect, RectHandle::TopRight, -150, -1.5);
        assert_eq!(next.start, ChartPoint::new(50, 0.5));
        assert_eq!(next.end, ChartPoint::new(100, 1.0));
        assert_eq!(next.id, rect.id);
    }

    #[test]
    fn test_rectangle_mid_handle_moves_time_only() {
        let rect = Rectangle::normalized(
            DrawingId::new(),
            ChartPoint::new(100, 1.0),
            ChartPoint::new(200, 2.0),
            ShapeStyle::default(),
        );
        let next = resize_rectangle(&rect, RectHandle::MidLeft, 30, 5.0);
        assert_eq!(next.start, ChartPoint::new(130, 1.0));
        assert_eq!(next.end, ChartPoint::new(200, 2.0));
        let crossed = resize_rectangle(&rect, RectHandle::MidRight, -150, 0.0);
        assert_eq!(crossed.start, ChartPoint::new(50, 1.0));
        assert_eq!(crossed.end, ChartPoint::new(100, 2.0));
    }

    #[test]
    fn test_trendline_endpoint_drag() {
        let line = Trendline {
            id: DrawingId::new(),
            start: ChartPoint::new(0, 1.0),
            end: ChartPoint::new(60, 2.0),
            extend_left: false,
            extend_right: true,
            style: Default::default(),
        };
        let next = resize_trendline(&line, LineHandle::End, 60, 0.5);
        assert_eq!(next.start, line.start);
        assert_eq!(next.end, ChartPoint::new(120, 2.5));
        assert!(next.extend_right);
    }
}

//! Pixel-space hit-testing of drawings and their resize handles.

use shared::{
    normalize_corners, ChartPoint, Drawing, DrawingId, PixelPoint, Position, PositionLevel, Rectangle, Trendline,
};
use std::collections::HashSet;

use crate::chart::CoordinateConverter;
use crate::config::InteractionSettings;

/// Rectangle handles, named for a chart whose price axis grows upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RectHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    MidLeft,
    MidRight,
}

impl RectHandle {
    pub const ALL: [RectHandle; 6] = [
        RectHandle::TopLeft,
        RectHandle::TopRight,
        RectHandle::BottomLeft,
        RectHandle::BottomRight,
        RectHandle::MidLeft,
        RectHandle::MidRight,
    ];

    /// Chart-space location of the handle on a normalised rectangle.
    pub fn chart_point(&self, lo: ChartPoint, hi: ChartPoint) -> ChartPoint {
        let mid = (lo.price + hi.price) / 2.0;
        match self {
            RectHandle::TopLeft => ChartPoint::new(lo.time, hi.price),
            RectHandle::TopRight => ChartPoint::new(hi.time, hi.price),
            RectHandle::BottomLeft => ChartPoint::new(lo.time, lo.price),
            RectHandle::BottomRight => ChartPoint::new(hi.time, lo.price),
            RectHandle::MidLeft => ChartPoint::new(lo.time, mid),
            RectHandle::MidRight => ChartPoint::new(hi.time, mid),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineHandle {
    Start,
    End,
}

/// Which time edge of a position box a level handle sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    Rect(RectHandle),
    Line(LineHandle),
    Level { level: PositionLevel, side: Side },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hit {
    Handle { id: DrawingId, handle: Handle },
    Body { id: DrawingId },
}

impl Hit {
    pub fn id(&self) -> DrawingId {
        match self {
            Hit::Handle { id, .. } | Hit::Body { id } => *id,
        }
    }
}

/// Every handle of `drawing` with its pixel location; empty if the drawing cannot be placed.
pub fn handle_points(drawing: &Drawing, converter: &CoordinateConverter<'_>) -> Vec<(Handle, PixelPoint)> {
    let points = match drawing {
        Drawing::Rectangle(rect) => rect_handles(rect, converter),
        Drawing::Trendline(line) => line_handles(line, converter),
        Drawing::Position(position) => level_handles(position, converter),
    };
    points.unwrap_or_default()
}

fn rect_handles(rect: &Rectangle, converter: &CoordinateConverter<'_>) -> Option<Vec<(Handle, PixelPoint)>> {
    let (lo, hi) = normalize_corners(rect.start, rect.end);
    RectHandle::ALL
        .iter()
        .map(|h| converter.to_canvas(h.chart_point(lo, hi)).map(|p| (Handle::Rect(*h), p)))
        .collect()
}

fn line_handles(line: &Trendline, converter: &CoordinateConverter<'_>) -> Option<Vec<(Handle, PixelPoint)>> {
    Some(vec![
        (Handle::Line(LineHandle::Start), converter.to_canvas(line.start)?),
        (Handle::Line(LineHandle::End), converter.to_canvas(line.end)?),
    ])
}

fn level_handles(position: &Position, converter: &CoordinateConverter<'_>) -> Option<Vec<(Handle, PixelPoint)>> {
    let left = converter.time_to_x(position.start.time)?;
    let right = converter.time_to_x(position.end.time)?;
    let mut handles = Vec::with_capacity(6);
    for (level, price) in position.defined_levels() {
        let y = converter.price_to_y(price)?;
        handles.push((Handle::Level { level, side: Side::Left }, PixelPoint::new(left, y)));
        handles.push((Handle::Level { level, side: Side::Right }, PixelPoint::new(right, y)));
    }
    Some(handles)
}

#[derive(Debug, Clone, Copy)]
struct PixelBox {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl PixelBox {
    fn spanning(a: PixelPoint, b: PixelPoint) -> Self {
        Self { left: a.x.min(b.x), right: a.x.max(b.x), top: a.y.min(b.y), bottom: a.y.max(b.y) }
    }

    fn contains(&self, p: PixelPoint) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }
}

/// Distance from `p` to the line through `a` and `b`, bounded at either end
/// unless that end is extended.
pub fn distance_to_line(p: PixelPoint, a: PixelPoint, b: PixelPoint, extend_back: bool, extend_forward: bool) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance_to(a);
    }
    let mut t = ((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq;
    if !extend_back {
        t = t.max(0.0);
    }
    if !extend_forward {
        t = t.min(1.0);
    }
    p.distance_to(PixelPoint::new(a.x + t * dx, a.y + t * dy))
}

pub fn body_contains(
    drawing: &Drawing,
    converter: &CoordinateConverter<'_>,
    point: PixelPoint,
    settings: &InteractionSettings,
) -> bool {
    match drawing {
        Drawing::Rectangle(rect) => match (converter.to_canvas(rect.start), converter.to_canvas(rect.end)) {
            (Some(a), Some(b)) => PixelBox::spanning(a, b).contains(point),
            _ => false,
        },
        Drawing::Trendline(line) => match (converter.to_canvas(line.start), converter.to_canvas(line.end)) {
            (Some(a), Some(b)) => {
                let (left, right) = if a.x <= b.x { (a, b) } else { (b, a) };
                distance_to_line(point, left, right, line.extend_left, line.extend_right) < settings.trendline_hit_px
            }
            _ => false,
        },
        Drawing::Position(position) => position_contains(position, converter, point),
    }
}

fn position_contains(position: &Position, converter: &CoordinateConverter<'_>, point: PixelPoint) -> bool {
    let (Some(a), Some(b)) = (converter.to_canvas(position.start), converter.to_canvas(position.end)) else {
        return false;
    };
    let bounds = PixelBox::spanning(a, b);
    if bounds.contains(point) {
        return true;
    }
    if point.x < bounds.left || point.x > bounds.right {
        return false;
    }
    let Some(entry_y) = converter.price_to_y(position.entry.price) else {
        return false;
    };
    [position.take_profit, position.stop_loss]
        .into_iter()
        .flatten()
        .filter_map(|price| converter.price_to_y(price))
        .any(|y| point.y >= entry_y.min(y) && point.y <= entry_y.max(y))
}

/// Topmost hit at `point`: handles win over bodies, later drawings over earlier ones.
/// Locked drawings are invisible to the pointer.
pub fn hit_test(
    drawings: &[Drawing],
    locked: &HashSet<DrawingId>,
    converter: &CoordinateConverter<'_>,
    point: PixelPoint,
    settings: &InteractionSettings,
) -> Option<Hit> {
    let radius = settings.handle_hit_radius();
    let candidates = || drawings.iter().rev().filter(|d| !locked.contains(&d.id()));

    for drawing in candidates() {
        let handle = handle_points(drawing, converter)
            .into_iter()
            .find(|(_, at)| at.distance_to(point) <= radius);
        if let Some((handle, _)) = handle {
            return Some(Hit::Handle { id: drawing.id(), handle });
        }
    }
    candidates()
        .find(|d| body_contains(d, converter, point, settings))
        .map(|d| Hit::Body { id: d.id() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::surface::PriceRange;
    use crate::chart::HeadlessSurface;
    use shared::{PositionKind, PositionStyle, ShapeStyle, TrendlineStyle};

    // 11 bars of 60s across 1000px (100px per bar), prices 0..10 across 500px
    fn surface() -> HeadlessSurface {
        HeadlessSurface::new(1000.0, 500.0, 0, 60, 11).with_price_range(PriceRange::new(0.0, 10.0))
    }

    fn rect() -> Drawing {
        Drawing::Rectangle(Rectangle::normalized(
            DrawingId::new(),
            ChartPoint::new(120, 6.0),
            ChartPoint::new(360, 2.0),
            ShapeStyle::default(),
        ))
    }

    fn line(extend_right: bool) -> Drawing {
        Drawing::Trendline(Trendline {
            id: DrawingId::new(),
            start: ChartPoint::new(60, 2.0),
            end: ChartPoint::new(180, 4.0),
            extend_left: false,
            extend_right,
            style: TrendlineStyle::default(),
        })
    }

    fn position() -> Drawing {
        Drawing::Position(Position {
            id: DrawingId::new(),
            kind: PositionKind::Long,
            entry: ChartPoint::new(300, 5.0),
            start: ChartPoint::new(300, 4.0),
            end: ChartPoint::new(480, 7.0),
            stop_loss: Some(4.0),
            take_profit: Some(7.0),
            style: PositionStyle::default(),
        })
    }

    #[test]
    fn test_every_handle_pixel_hits_its_handle() {
        let surface = surface();
        let converter = CoordinateConverter::new(&surface, &[]);
        let settings = InteractionSettings::default();
        for drawing in [rect(), line(false), position()] {
            let drawings = vec![drawing.clone()];
            for (handle, at) in handle_points(&drawing, &converter) {
                let hit = hit_test(&drawings, &HashSet::new(), &converter, at, &settings);
                assert_eq!(hit, Some(Hit::Handle { id: drawing.id(), handle }));
            }
        }
    }

    #[test]
    fn test_rect_handle_positions() {
        let surface = surface();
        let converter = CoordinateConverter::new(&surface, &[]);
        let handles = handle_points(&rect(), &converter);
        assert_eq!(handles.len(), 6);
        let top_left = handles.iter().find(|(h, _)| *h == Handle::Rect(RectHandle::TopLeft)).unwrap().1;
        assert!((top_left.x - 200.0).abs() < 1e-9);
        assert!((top_left.y - 200.0).abs() < 1e-9);
        let mid_right = handles.iter().find(|(h, _)| *h == Handle::Rect(RectHandle::MidRight)).unwrap().1;
        assert!((mid_right.x - 600.0).abs() < 1e-9);
        assert!((mid_right.y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_handle_radius_includes_epsilon() {
        let surface = surface();
        let converter = CoordinateConverter::new(&surface, &[]);
        let settings = InteractionSettings::default();
        let drawings = vec![line(false)];
        // start handle at (100, 400)
        let near = hit_test(&drawings, &HashSet::new(), &converter, PixelPoint::new(107.5, 400.0), &settings);
        assert!(matches!(near, Some(Hit::Handle { handle: Handle::Line(LineHandle::Start), .. })));
        let far = hit_test(&drawings, &HashSet::new(), &converter, PixelPoint::new(92.0, 420.0), &settings);
        assert_eq!(far, None);
    }

    #[test]
    fn test_trendline_body_and_extension() {
        let surface = surface();
        let converter = CoordinateConverter::new(&surface, &[]);
        let settings = InteractionSettings::default();
        // segment from (100, 400) to (300, 300); midpoint (200, 350)
        let plain = line(false);
        assert!(body_contains(&plain, &converter, PixelPoint::new(200.0, 355.0), &settings));
        assert!(!body_contains(&plain, &converter, PixelPoint::new(200.0, 370.0), &settings));
        // beyond the end only counts when extended
        assert!(!body_contains(&plain, &converter, PixelPoint::new(500.0, 200.0), &settings));
        assert!(body_contains(&line(true), &converter, PixelPoint::new(500.0, 200.0), &settings));
    }

    #[test]
    fn test_position_body_and_zones() {
        let surface = surface();
        let converter = CoordinateConverter::new(&surface, &[]);
        let settings = InteractionSettings::default();
        let pos = position();
        // box spans x 500..800, y 150..300
        assert!(body_contains(&pos, &converter, PixelPoint::new(650.0, 200.0), &settings));
        assert!(!body_contains(&pos, &converter, PixelPoint::new(850.0, 200.0), &settings));
        assert!(!body_contains(&pos, &converter, PixelPoint::new(650.0, 320.0), &settings));
    }

    #[test]
    fn test_position_zone_outside_box_still_hits() {
        let surface = surface();
        let converter = CoordinateConverter::new(&surface, &[]);
        let settings = InteractionSettings::default();
        let Drawing::Position(mut pos) = position() else { unreachable!() };
        // a box that no longer covers the take-profit zone
        pos.end.price = 5.5;
        let pos = Drawing::Position(pos);
        assert!(body_contains(&pos, &converter, PixelPoint::new(650.0, 170.0), &settings));
    }

    #[test]
    fn test_locked_drawings_are_skipped() {
        let surface = surface();
        let converter = CoordinateConverter::new(&surface, &[]);
        let settings = InteractionSettings::default();
        let pos = position();
        let drawings = vec![pos.clone()];
        let locked: HashSet<_> = [pos.id()].into_iter().collect();
        let inside = PixelPoint::new(650.0, 200.0);
        assert!(hit_test(&drawings, &HashSet::new(), &converter, inside, &settings).is_some());
        assert_eq!(hit_test(&drawings, &locked, &converter, inside, &settings), None);
        let handle = handle_points(&pos, &converter)[0].1;
        assert_eq!(hit_test(&drawings, &locked, &converter, handle, &settings), None);
    }

    #[test]
    fn test_topmost_drawing_wins() {
        let surface = surface();
        let converter = CoordinateConverter::new(&surface, &[]);
        let settings = InteractionSettings::default();
        let below = rect();
        let above = rect().with_new_id();
        let drawings = vec![below, above.clone()];
        let hit = hit_test(&drawings, &HashSet::new(), &converter, PixelPoint::new(400.0, 300.0), &settings);
        assert_eq!(hit, Some(Hit::Body { id: above.id() }));
    }
}

use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};
use synergy_atlas::{Connection, SynergyState};

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (10.0 * zoom).clamp(24.0, 120.0);
    let origin = rect.center() + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 60));

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn polyline_visible(rect: Rect, points: &[Pos2], padding: f32) -> bool {
    let bounds = Rect::from_points(points).expand(padding);
    bounds.intersects(rect)
}

/// Distance from `point` to the closest segment of `points`.
pub(super) fn polyline_distance(points: &[Pos2], point: Pos2) -> f32 {
    points
        .windows(2)
        .map(|segment| segment_distance(segment[0], segment[1], point))
        .fold(f32::INFINITY, f32::min)
}

fn segment_distance(start: Pos2, end: Pos2, point: Pos2) -> f32 {
    let along = end - start;
    let length_sq = along.length_sq();
    if length_sq <= f32::EPSILON {
        return start.distance(point);
    }
    let t = ((point - start).dot(along) / length_sq).clamp(0.0, 1.0);
    (start + along * t).distance(point)
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

pub(super) fn state_color(state: SynergyState) -> Color32 {
    match state {
        SynergyState::Pending => Color32::from_rgb(150, 160, 176),
        SynergyState::InRfp => Color32::from_rgb(103, 196, 255),
        SynergyState::Recommended => Color32::from_rgb(246, 206, 104),
        SynergyState::Approved => Color32::from_rgb(112, 214, 140),
        SynergyState::CounterOffer => Color32::from_rgb(241, 146, 94),
        SynergyState::Closed => Color32::from_rgb(92, 156, 120),
        SynergyState::Rejected => Color32::from_rgb(214, 92, 92),
    }
}

pub(super) fn connection_color(connection: &Connection) -> Color32 {
    match connection.synergy() {
        Some(record) => state_color(record.state),
        None => Color32::from_rgba_unmultiplied(120, 126, 136, 150),
    }
}

/// Line width for a connection of `strength` in `[0, 1]`.
pub(super) fn connection_width(strength: f32, zoom: f32) -> f32 {
    ((0.8 + strength.clamp(0.0, 1.0) * 3.2) * (zoom / 8.0).sqrt()).clamp(0.6, 6.5)
}

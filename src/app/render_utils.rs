use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

/// Fixed category -> color table; unknown source-language tags fall back to
/// a neutral gray so upstream can add languages without breaking rendering.
pub(super) fn category_color(category: &str) -> Color32 {
    match category {
        "python" => Color32::from_rgb(83, 141, 213),
        "javascript" => Color32::from_rgb(231, 198, 80),
        "typescript" => Color32::from_rgb(72, 118, 192),
        "javascript xml" => Color32::from_rgb(224, 164, 76),
        "typescript xml" => Color32::from_rgb(96, 170, 204),
        _ => Color32::from_rgb(140, 146, 152),
    }
}

/// Linear mix of `base` toward `overlay`; `amount` 0 keeps the base, 1 is
/// the overlay.
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
    painter.rect_filled(rect, 0.0, Color32::from_rgb(18, 22, 28));

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.left_top() + pan;

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(58, 68, 78, 60)),
        );
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment(
            [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(58, 68, 78, 60)),
        );
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    !(max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom())
}

/// World coordinates are canvas-pixel coordinates; pan/zoom are applied
/// around the canvas origin on top of them.
pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.left_top() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.left_top() - pan) / zoom
}

fn normalize_log(value: u64, min: u64, max: u64) -> f32 {
    let min = min.max(1) as f64;
    let max = (max as f64).max(min);
    let value = value.max(1) as f64;

    let denominator = max.ln() - min.ln();
    if denominator.abs() < f64::EPSILON {
        return 0.5;
    }

    ((value.ln() - min.ln()) / denominator).clamp(0.0, 1.0) as f32
}

/// Visual radius scaled by file size on a log curve, so one giant bundle
/// does not flatten everything else to the minimum.
pub(super) fn node_radius(size: u64, min: u64, max: u64) -> f32 {
    7.0 + (normalize_log(size, min, max) * 14.0)
}

/// Soft layered glow behind a highlighted node, three translucent rings of
/// falling alpha standing in for a radial gradient.
pub(super) fn draw_node_glow(painter: &Painter, position: Pos2, radius: f32, color: Color32) {
    for (scale, alpha) in [(2.4, 26), (1.8, 48), (1.3, 80)] {
        painter.circle_filled(
            position,
            radius * scale,
            Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_at_extremes_returns_the_endpoints() {
        let base = Color32::from_rgb(40, 80, 120);
        assert_eq!(blend_color(base, Color32::WHITE, 0.0), base);
        assert_eq!(blend_color(base, Color32::WHITE, 1.0), Color32::WHITE);
    }

    #[test]
    fn blend_toward_white_brightens_every_channel() {
        let base = Color32::from_rgb(40, 80, 120);
        let lit = blend_color(base, Color32::WHITE, 0.22);
        assert!(lit.r() > base.r());
        assert!(lit.g() > base.g());
        assert!(lit.b() > base.b());
        assert_eq!(lit.a(), 255);
    }
}

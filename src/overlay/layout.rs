use crate::settings::OverlaySettings;
use eframe::egui::{pos2, vec2, Pos2, Rect, Vec2};

/// Split `text` into two halves at `char_count / 2`. The first half is drawn
/// bottom-left, the second bottom-right. Odd lengths put the extra character
/// on the right.
pub fn split_halves(text: &str) -> (&str, &str) {
    let mid = text.chars().count() / 2;
    let byte_mid = text
        .char_indices()
        .nth(mid)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    text.split_at(byte_mid)
}

/// Window and text placement for one monitor, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayGeometry {
    /// Outer position of the window in screen coordinates.
    pub position: Pos2,
    pub size: Vec2,
    /// Area of the left half, relative to the window. Limited to the rows
    /// that stay on screen.
    pub left: Rect,
    /// Area of the right half, relative to the window.
    pub right: Rect,
}

impl OverlayGeometry {
    /// Strip spanning the monitor width, hanging `bottom_overhang` below the
    /// bottom edge.
    pub fn for_monitor(monitor_size: Vec2, settings: &OverlaySettings) -> Self {
        let width = monitor_size.x.max(0.0);
        let height = settings.height;
        let margin = settings.margin;
        let half_width = (width / 2.0 - 2.0 * margin).max(0.0);
        let visible_height = (height - settings.bottom_overhang).clamp(0.0, height);

        let position = pos2(
            margin,
            monitor_size.y - height + settings.bottom_overhang,
        );
        let left = Rect::from_min_size(pos2(margin, 0.0), vec2(half_width, visible_height));
        let right = Rect::from_min_size(
            pos2(width / 2.0 + margin, 0.0),
            vec2(half_width, visible_height),
        );

        Self {
            position,
            size: vec2(width, height),
            left,
            right,
        }
    }
}

use eframe::egui::Color32;
use palette::{named, Srgb};

// ---------------------------------------------------------------------------
// Fixed plot colours
// ---------------------------------------------------------------------------

pub fn left_pupil() -> Color32 {
    with_alpha(named::NAVY, 1.0)
}

pub fn right_pupil() -> Color32 {
    with_alpha(named::TEAL, 1.0)
}

/// Semi-transparent gray for marker lines.
pub fn marker_line() -> Color32 {
    with_alpha(named::GRAY, 0.4)
}

/// Slightly transparent white behind hover annotations.
pub fn annotation_fill() -> Color32 {
    with_alpha(named::WHITE, 0.9)
}

pub fn annotation_text() -> Color32 {
    with_alpha(named::BLACK, 1.0)
}

/// Convert a named sRGB colour with an opacity in `0.0..=1.0`.
fn with_alpha(color: Srgb<u8>, alpha: f32) -> Color32 {
    let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(color.red, color.green, color.blue, a)
}

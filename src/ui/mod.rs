//! egui rendering of a [`crate::view::RenderSnapshot`].

pub mod dashboard;
pub mod panels;
pub mod plot;

use eframe::egui::Color32;

use crate::color::Rgb8;

pub(crate) fn color32(rgb: Rgb8) -> Color32 {
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

/// Black or white, whichever reads better on `background`.
pub(crate) fn contrast_text(background: Rgb8) -> Color32 {
    let [r, g, b] = background.map(f32::from);
    if 0.299 * r + 0.587 * g + 0.114 * b > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

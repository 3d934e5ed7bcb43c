//! Color constants for figure decoration and UI elements.

use eframe::egui::Color32;

/// Frame stroke around an active figure.
pub const ACTIVE_FRAME: Color32 = Color32::from_rgb(86, 156, 214);

/// Background fill behind a figure viewport.
pub const FIGURE_BACKDROP: Color32 = Color32::from_rgb(24, 24, 26);

/// Border around an inactive figure viewport.
pub const FIGURE_BORDER: Color32 = Color32::from_rgb(60, 60, 64);

/// Caption text below a figure.
pub const CAPTION_TEXT: Color32 = Color32::from_rgba_premultiplied(200, 200, 200, 220);

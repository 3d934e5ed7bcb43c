//! Per-figure transform state and the zoom/pan coordinate math.
//!
//! Raster figures are drawn into a display rectangle scaled and offset from
//! the fitted base rectangle. Vector figures keep the same scale/offset state
//! but expose it as a viewBox: the rectangle of image coordinates visible
//! inside the fixed base frame. The viewBox dimensions are always the
//! original dimensions divided by the scale.

use crate::constants::{SCALE_MAX, SCALE_MIN};
use eframe::egui;

/// A rectangle of image coordinates (x, y, width, height).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl ViewBox {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// The full viewBox of an image with the given intrinsic size.
    pub fn from_size(w: f32, h: f32) -> Self {
        Self { x: 0.0, y: 0.0, w, h }
    }

    pub fn max_x(&self) -> f32 {
        self.x + self.w
    }

    pub fn max_y(&self) -> f32 {
        self.y + self.h
    }

    /// Overlapping region of two viewBoxes, or `None` if they are disjoint.
    pub fn intersect(&self, other: &ViewBox) -> Option<ViewBox> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let max_x = self.max_x().min(other.max_x());
        let max_y = self.max_y().min(other.max_y());
        (max_x > x && max_y > y).then(|| ViewBox::new(x, y, max_x - x, max_y - y))
    }

    /// Whether two viewBoxes are equal within a relative tolerance.
    pub fn approx_eq(&self, other: &ViewBox, relative_epsilon: f32) -> bool {
        let tolerance = self.w.max(self.h).max(1.0) * relative_epsilon;
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.w - other.w).abs() <= tolerance
            && (self.h - other.h).abs() <= tolerance
    }
}

/// Zoom/pan state of one active figure.
///
/// Created on activation, mutated by wheel/drag handlers, discarded on
/// deactivation. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureTransform {
    /// Scale factor relative to the fitted size, clamped to
    /// `SCALE_MIN..=SCALE_MAX`
    pub scale: f32,
    /// Translation from the fitted position, in screen pixels
    pub offset: egui::Vec2,
    /// Whether a drag is currently in progress
    pub dragging: bool,
}

impl Default for FigureTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: egui::Vec2::ZERO,
            dragging: false,
        }
    }
}

impl FigureTransform {
    /// Whether the figure is at its original, untransformed view.
    pub fn is_identity(&self) -> bool {
        self.scale == 1.0 && self.offset == egui::Vec2::ZERO
    }

    /// Restores the original view.
    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.offset = egui::Vec2::ZERO;
    }

    /// Applies a zoom step so the point under the cursor stays fixed.
    ///
    /// `cursor_from_center` is the cursor position relative to the viewport
    /// center. The image point currently under the cursor keeps its screen
    /// position across the scale change.
    pub fn zoom_toward(&mut self, factor: f32, cursor_from_center: egui::Vec2) {
        let new_scale = (self.scale * factor).clamp(SCALE_MIN, SCALE_MAX);
        let ratio = new_scale / self.scale;

        let image_point = cursor_from_center - self.offset;
        self.offset = cursor_from_center - image_point * ratio;
        self.scale = new_scale;
    }

    /// Applies a drag delta scaled by the configured pan speed.
    pub fn pan(&mut self, delta: egui::Vec2, pan_speed: f32) {
        self.offset += delta * pan_speed;
    }

    /// Scale from image units to screen pixels for the given viewport.
    pub fn pixels_per_unit(&self, viewport: egui::Vec2, logical: egui::Vec2) -> f32 {
        fit_scale(viewport, logical) * self.scale
    }

    /// Display rectangle for a raster figure inside its viewport.
    pub fn display_rect(&self, viewport: egui::Rect, logical: egui::Vec2) -> egui::Rect {
        let display_size = logical * self.pixels_per_unit(viewport.size(), logical);
        egui::Rect::from_center_size(viewport.center() + self.offset, display_size)
    }

    /// The viewBox visible inside the fixed base frame of a vector figure.
    ///
    /// Invariant: the returned dimensions are the original dimensions
    /// divided by the current scale.
    pub fn current_viewbox(&self, original: ViewBox, viewport: egui::Vec2) -> ViewBox {
        let logical = egui::vec2(original.w, original.h);
        let px_per_unit = self.pixels_per_unit(viewport, logical);

        let w = original.w / self.scale;
        let h = original.h / self.scale;
        let center_x = original.x + original.w * 0.5 - self.offset.x / px_per_unit;
        let center_y = original.y + original.h * 0.5 - self.offset.y / px_per_unit;

        ViewBox::new(center_x - w * 0.5, center_y - h * 0.5, w, h)
    }
}

/// Scale that fits `logical` inside `viewport` while preserving aspect.
pub fn fit_scale(viewport: egui::Vec2, logical: egui::Vec2) -> f32 {
    (viewport.x / logical.x).min(viewport.y / logical.y)
}

/// Base frame: the fitted rectangle at scale 1 with no offset.
pub fn base_frame(viewport: egui::Rect, logical: egui::Vec2) -> egui::Rect {
    let size = logical * fit_scale(viewport.size(), logical);
    egui::Rect::from_center_size(viewport.center(), size)
}

/// Projects a stale rasterization onto the current viewBox.
///
/// `rendered` is the viewBox a texture was rasterized for, `current` the
/// viewBox that should fill `frame`. Returns the screen rectangle to draw
/// into and the uv rectangle to sample from, or `None` when the texture
/// covers none of the current view.
pub fn project_onto(
    rendered: ViewBox,
    current: ViewBox,
    frame: egui::Rect,
) -> Option<(egui::Rect, egui::Rect)> {
    let visible = current.intersect(&rendered)?;

    let sx = frame.width() / current.w;
    let sy = frame.height() / current.h;
    let screen = egui::Rect::from_min_size(
        frame.min + egui::vec2((visible.x - current.x) * sx, (visible.y - current.y) * sy),
        egui::vec2(visible.w * sx, visible.h * sy),
    );

    let uv = egui::Rect::from_min_max(
        egui::pos2(
            (visible.x - rendered.x) / rendered.w,
            (visible.y - rendered.y) / rendered.h,
        ),
        egui::pos2(
            (visible.max_x() - rendered.x) / rendered.w,
            (visible.max_y() - rendered.y) / rendered.h,
        ),
    );

    Some((screen, uv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{Rect, pos2, vec2};

    const EPSILON: f32 = 1e-4;

    #[test]
    fn zoom_keeps_cursor_point_fixed() {
        let viewport = vec2(400.0, 300.0);
        let logical = vec2(200.0, 100.0);
        let cursor = vec2(50.0, 20.0);

        let mut transform = FigureTransform::default();
        transform.pan(vec2(-30.0, 10.0), 1.0);

        // Image point (relative to the image center) currently under the cursor.
        let px_before = transform.pixels_per_unit(viewport, logical);
        let image_point = (cursor - transform.offset) / px_before;

        transform.zoom_toward(1.5, cursor);

        let px_after = transform.pixels_per_unit(viewport, logical);
        let screen_after = transform.offset + image_point * px_after;
        assert!((screen_after - cursor).length() < EPSILON);
        assert!((transform.scale - 1.5).abs() < EPSILON);
    }

    #[test]
    fn zoom_clamps_to_bounds() {
        let mut transform = FigureTransform::default();
        transform.zoom_toward(1000.0, egui::Vec2::ZERO);
        assert_eq!(transform.scale, SCALE_MAX);

        transform.zoom_toward(1e-6, egui::Vec2::ZERO);
        assert_eq!(transform.scale, SCALE_MIN);
    }

    #[test]
    fn identity_viewbox_matches_original() {
        let transform = FigureTransform::default();
        let original = ViewBox::from_size(300.0, 200.0);
        let current = transform.current_viewbox(original, vec2(600.0, 400.0));
        assert!(current.approx_eq(&original, 1e-6));
    }

    #[test]
    fn viewbox_dimensions_are_original_over_scale() {
        let mut transform = FigureTransform::default();
        transform.zoom_toward(2.5, vec2(17.0, -40.0));
        transform.pan(vec2(12.0, 60.0), 1.5);

        let original = ViewBox::from_size(300.0, 200.0);
        let current = transform.current_viewbox(original, vec2(640.0, 480.0));
        assert!((current.w - original.w / transform.scale).abs() < EPSILON);
        assert!((current.h - original.h / transform.scale).abs() < EPSILON);
    }

    #[test]
    fn pan_shifts_viewbox_against_drag() {
        let viewport = vec2(600.0, 400.0);
        let original = ViewBox::from_size(300.0, 200.0);
        let mut transform = FigureTransform::default();

        let before = transform.current_viewbox(original, viewport);
        transform.pan(vec2(40.0, -20.0), 1.0);
        let after = transform.current_viewbox(original, viewport);

        let px = transform.pixels_per_unit(viewport, vec2(original.w, original.h));
        assert!((after.x - (before.x - 40.0 / px)).abs() < EPSILON);
        assert!((after.y - (before.y + 20.0 / px)).abs() < EPSILON);
    }

    #[test]
    fn reset_restores_identity() {
        let mut transform = FigureTransform::default();
        transform.zoom_toward(3.0, vec2(10.0, 10.0));
        transform.pan(vec2(5.0, 5.0), 2.0);
        assert!(!transform.is_identity());

        transform.reset();
        assert!(transform.is_identity());
    }

    #[test]
    fn project_identical_boxes_covers_frame() {
        let viewbox = ViewBox::from_size(100.0, 50.0);
        let frame = Rect::from_min_size(pos2(10.0, 20.0), vec2(200.0, 100.0));

        let (screen, uv) = project_onto(viewbox, viewbox, frame).expect("full overlap");
        assert!((screen.min - frame.min).length() < EPSILON);
        assert!((screen.max - frame.max).length() < EPSILON);
        assert!((uv.min - pos2(0.0, 0.0)).length() < EPSILON);
        assert!((uv.max - pos2(1.0, 1.0)).length() < EPSILON);
    }

    #[test]
    fn project_partial_overlap() {
        let rendered = ViewBox::from_size(100.0, 100.0);
        // Current view has panned half a view to the right.
        let current = ViewBox::new(50.0, 0.0, 100.0, 100.0);
        let frame = Rect::from_min_size(pos2(0.0, 0.0), vec2(200.0, 200.0));

        let (screen, uv) = project_onto(rendered, current, frame).expect("half overlap");
        // Left half of the frame shows the right half of the texture.
        assert!((screen.min.x - 0.0).abs() < EPSILON);
        assert!((screen.max.x - 100.0).abs() < EPSILON);
        assert!((uv.min.x - 0.5).abs() < EPSILON);
        assert!((uv.max.x - 1.0).abs() < EPSILON);
    }

    #[test]
    fn project_disjoint_is_none() {
        let rendered = ViewBox::from_size(100.0, 100.0);
        let current = ViewBox::new(200.0, 200.0, 50.0, 50.0);
        let frame = Rect::from_min_size(pos2(0.0, 0.0), vec2(100.0, 100.0));
        assert!(project_onto(rendered, current, frame).is_none());
    }
}

//! UI rendering for the document view and figure viewports.

use crate::assets::{AssetLoadState, DecodedFigure};
use crate::constants::{
    DEFAULT_FIGURE_HEIGHT, DOCUMENT_MARGIN, DOCUMENT_MAX_WIDTH, FIGURE_HEIGHT_MAX,
    FIGURE_HEIGHT_MIN, VECTOR_RERASTER_EPSILON,
};
use crate::transform::{self, FigureTransform, ViewBox};
use crate::{FigviewApp, colors};
use eframe::egui;
use figview::{Block, Figure};

/// What to draw for a figure, extracted from the asset cache so the cache
/// borrow ends before interaction mutates the app.
enum FigureContent {
    Loading,
    Error(String),
    Raster { logical: egui::Vec2 },
    Vector { original: ViewBox },
}

impl FigviewApp {
    /// Handles keyboard shortcuts for reset and zoom.
    pub fn handle_keyboard_input(&mut self, ctx: &egui::Context) {
        let zoom_speed = self.settings.zoom_speed;
        ctx.input(|i| {
            if i.key_pressed(egui::Key::Escape) {
                // Discarding the state restores every figure to its original view.
                self.activation.deactivate_all();
            }
            if i.key_pressed(egui::Key::Num0) {
                self.activation.reset_all();
            }
            if i.key_pressed(egui::Key::Plus) || i.key_pressed(egui::Key::Equals) {
                for transform in self.activation.transforms_mut() {
                    transform.zoom_toward(zoom_speed, egui::Vec2::ZERO);
                }
            }
            if i.key_pressed(egui::Key::Minus) {
                for transform in self.activation.transforms_mut() {
                    transform.zoom_toward(1.0 / zoom_speed, egui::Vec2::ZERO);
                }
            }
        });
    }

    /// Renders the bottom status bar with controls hint and a settings button.
    pub fn show_status_bar(&mut self, ctx: &egui::Context) {
        let wheel = match self.settings.zoom_modifier.short_label() {
            "" => "Scroll".to_string(),
            modifier => format!("{modifier}+Scroll"),
        };

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!(
                    "Click: activate figure | {wheel}: zoom | Drag: pan | 0: reset | Esc: done"
                ));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Settings").clicked() {
                        self.settings_open = !self.settings_open;
                    }
                    ui.label(&self.document.title);
                });
            });
        });
    }

    /// Renders the central panel with the scrolling document.
    pub fn show_central_panel(&mut self, ctx: &egui::Context) {
        // An active figure under the cursor claims the wheel for zooming,
        // so document scrolling must yield. Uses last frame's viewports.
        let wheel_claimed = self.wheel_claimed_by_figure(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .enable_scrolling(!wheel_claimed)
                .show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        let width =
                            (ui.available_width() - 2.0 * DOCUMENT_MARGIN).min(DOCUMENT_MAX_WIDTH);
                        ui.set_max_width(width);
                        ui.add_space(DOCUMENT_MARGIN);
                        self.show_blocks(ui);
                        ui.add_space(DOCUMENT_MARGIN);
                    });
                });
        });
    }

    fn show_blocks(&mut self, ui: &mut egui::Ui) {
        let blocks = self.document.blocks.clone();
        for (block_idx, block) in blocks.iter().enumerate() {
            match block {
                Block::Heading(text) => {
                    ui.add_space(10.0);
                    ui.heading(text);
                    ui.add_space(4.0);
                }
                Block::Paragraph(text) => {
                    ui.add_space(4.0);
                    ui.label(text);
                    ui.add_space(4.0);
                }
                Block::Figure(figure) => {
                    ui.add_space(8.0);
                    self.show_figure(ui, block_idx, figure);
                    ui.add_space(8.0);
                }
            }
        }
    }

    /// Whether an active figure under the cursor should receive wheel input.
    fn wheel_claimed_by_figure(&self, ctx: &egui::Context) -> bool {
        let (hover_pos, modifiers) = ctx.input(|i| (i.pointer.hover_pos(), i.modifiers));
        let Some(pos) = hover_pos else {
            return false;
        };
        if !self.settings.zoom_modifier.is_satisfied(&modifiers) {
            return false;
        }
        self.figure_rects
            .iter()
            .any(|(id, rect)| self.activation.is_active(*id) && rect.contains(pos))
    }

    /// Renders one figure viewport and handles its interaction.
    fn show_figure(&mut self, ui: &mut egui::Ui, figure_id: usize, figure: &Figure) {
        let height = figure
            .height
            .unwrap_or(DEFAULT_FIGURE_HEIGHT)
            .clamp(FIGURE_HEIGHT_MIN, FIGURE_HEIGHT_MAX);
        let size = egui::vec2(ui.available_width(), height);
        let (viewport, response) = ui.allocate_exact_size(size, egui::Sense::click_and_drag());
        self.figure_rects.insert(figure_id, viewport);

        // Activation toggle; a drag never toggles.
        if response.clicked() {
            let now_active = self.activation.toggle(figure_id);
            log::debug!(
                "figure {figure_id} {}",
                if now_active { "activated" } else { "deactivated" }
            );
        }

        let active = self.activation.is_active(figure_id);
        if active {
            self.handle_figure_input(ui, figure_id, viewport, &response);
        }

        let content = match self.asset_cache.get(&figure.source) {
            None | Some(AssetLoadState::Loading(_)) => FigureContent::Loading,
            Some(AssetLoadState::Error(message)) => FigureContent::Error(message.clone()),
            Some(AssetLoadState::Ready(DecodedFigure::Raster(raster))) => FigureContent::Raster {
                logical: egui::vec2(raster.width as f32, raster.height as f32),
            },
            Some(AssetLoadState::Ready(DecodedFigure::Vector(vector))) => FigureContent::Vector {
                original: vector.original_viewbox(),
            },
        };

        let painter = ui
            .painter()
            .with_clip_rect(viewport.intersect(ui.clip_rect()));
        painter.rect_filled(viewport, 4.0, colors::FIGURE_BACKDROP);

        let transform = self
            .activation
            .transform(figure_id)
            .copied()
            .unwrap_or_default();

        match content {
            FigureContent::Loading => {
                ui.put(viewport, egui::Spinner::new().size(24.0));
            }
            FigureContent::Error(message) => {
                painter.text(
                    viewport.center(),
                    egui::Align2::CENTER_CENTER,
                    message,
                    egui::FontId::proportional(14.0),
                    ui.visuals().error_fg_color,
                );
            }
            FigureContent::Raster { logical } => {
                self.draw_raster_figure(&painter, &figure.source, viewport, logical, &transform);
            }
            FigureContent::Vector { original } => {
                self.draw_vector_figure(ui, &painter, figure_id, figure, viewport, original, &transform);
            }
        }

        let border = if active && self.settings.show_frame {
            egui::Stroke::new(2.0, colors::ACTIVE_FRAME)
        } else {
            egui::Stroke::new(1.0, colors::FIGURE_BORDER)
        };
        painter.rect_stroke(viewport, 4.0, border, egui::StrokeKind::Inside);

        if active {
            let ctx = ui.ctx().clone();
            self.show_figure_controls(&ctx, figure_id, figure, viewport);
        }

        if let Some(caption) = &figure.caption {
            ui.add_space(2.0);
            ui.label(
                egui::RichText::new(caption)
                    .italics()
                    .color(colors::CAPTION_TEXT),
            );
        }
    }

    /// Wheel zoom and drag pan for an active figure.
    fn handle_figure_input(
        &mut self,
        ui: &egui::Ui,
        figure_id: usize,
        viewport: egui::Rect,
        response: &egui::Response,
    ) {
        let pan_speed = self.settings.pan_speed;
        let zoom_speed = self.settings.zoom_speed;
        let modifier = self.settings.zoom_modifier;

        let Some(transform) = self.activation.transform_mut(figure_id) else {
            return;
        };

        transform.dragging = response.dragged();
        if response.dragged() {
            transform.pan(response.drag_delta(), pan_speed);
        }

        let (hover_pos, scroll_delta, modifiers) = ui.input(|i| {
            (
                i.pointer.hover_pos(),
                i.raw_scroll_delta.y,
                i.modifiers,
            )
        });

        if scroll_delta != 0.0
            && modifier.is_satisfied(&modifiers)
            && let Some(hover) = hover_pos
            && viewport.contains(hover)
        {
            let factor = if scroll_delta > 0.0 {
                zoom_speed
            } else {
                1.0 / zoom_speed
            };
            transform.zoom_toward(factor, hover - viewport.center());
        }
    }

    /// Draws a raster figure: the fitted image scaled and offset by the
    /// transform, clipped to the viewport.
    fn draw_raster_figure(
        &self,
        painter: &egui::Painter,
        source: &str,
        viewport: egui::Rect,
        logical: egui::Vec2,
        transform: &FigureTransform,
    ) {
        let Some(texture) = self.raster_textures.get(source) else {
            return;
        };

        let display_rect = transform.display_rect(viewport, logical);
        painter.image(
            texture.id(),
            display_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
    }

    /// Draws a vector figure: the current viewBox fills the fixed base frame.
    ///
    /// A fresh rasterization is requested whenever the displayed viewBox has
    /// drifted from the rendered one; the stale texture is reprojected in the
    /// meantime.
    #[allow(clippy::too_many_arguments)]
    fn draw_vector_figure(
        &mut self,
        ui: &mut egui::Ui,
        painter: &egui::Painter,
        figure_id: usize,
        figure: &Figure,
        viewport: egui::Rect,
        original: ViewBox,
        transform: &FigureTransform,
    ) {
        let logical = egui::vec2(original.w, original.h);
        let frame = transform::base_frame(viewport, logical);
        let current = transform.current_viewbox(original, viewport.size());

        let pixels_per_point = ui.ctx().pixels_per_point();
        let target_px = [
            (frame.width() * pixels_per_point).round().max(1.0) as u32,
            (frame.height() * pixels_per_point).round().max(1.0) as u32,
        ];

        let stale = match self.vector_textures.get(&figure_id) {
            None => true,
            Some(rendered) => {
                rendered.px != target_px
                    || !rendered.viewbox.approx_eq(&current, VECTOR_RERASTER_EPSILON)
            }
        };
        if stale {
            self.request_vector_raster(ui.ctx(), figure_id, &figure.source, current, target_px);
        }

        match self.vector_textures.get(&figure_id) {
            Some(rendered) => {
                if let Some((screen, uv)) = transform::project_onto(rendered.viewbox, current, frame)
                {
                    painter.image(rendered.handle.id(), screen, uv, egui::Color32::WHITE);
                }
            }
            None => {
                ui.put(viewport, egui::Spinner::new().size(24.0));
            }
        }
    }
}

//! Floating control panel anchored to the active figure's viewport.

use crate::FigviewApp;
use crate::host;
use eframe::egui;
use figview::Figure;

const PANEL_WIDTH: f32 = 230.0;
const PANEL_HEIGHT: f32 = 36.0;
const PANEL_MARGIN: f32 = 8.0;

impl FigviewApp {
    /// Renders the reset / pan-speed / edit controls for one active figure.
    pub fn show_figure_controls(
        &mut self,
        ctx: &egui::Context,
        figure_id: usize,
        figure: &Figure,
        viewport: egui::Rect,
    ) {
        let anchor = egui::pos2(
            viewport.right() - PANEL_WIDTH - PANEL_MARGIN,
            viewport.bottom() - PANEL_HEIGHT - PANEL_MARGIN,
        );

        egui::Area::new(egui::Id::new("figure_controls").with(figure_id))
            .fixed_pos(anchor)
            .interactable(true)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style())
                    .fill(ui.style().visuals.window_fill.gamma_multiply(0.95))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            if ui
                                .button("Reset")
                                .on_hover_text("Restore original view (0)")
                                .clicked()
                                && let Some(transform) = self.activation.transform_mut(figure_id)
                            {
                                transform.reset();
                            }

                            let slider = ui.add(
                                egui::Slider::new(&mut self.settings.pan_speed, 0.2..=3.0)
                                    .show_value(false),
                            );
                            let slider = slider.on_hover_text("Pan speed");
                            if slider.drag_stopped() {
                                self.save_settings();
                            }

                            if ui
                                .button("Edit")
                                .on_hover_text("Open in external editor")
                                .clicked()
                            {
                                let location =
                                    host::locate(self.document_dir.as_deref(), &figure.source);
                                if let Err(err) = host::open_in_editor(&location) {
                                    self.toast_error(err.to_string());
                                }
                            }
                        });
                    });
            });
    }
}

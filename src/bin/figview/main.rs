#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod activation;
mod assets;
mod colors;
mod constants;
mod controls;
mod host;
mod settings;
mod transform;
mod ui;
mod watcher;

use activation::Activation;
use assets::{AssetLoadState, DEMO_DOCUMENT, DecodedFigure, ImageLoadError, RasterImage};
use clap::Parser;
use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use figview::{Document, ImageKind};
use host::FigureLocation;
use settings::Settings;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use transform::ViewBox;
use watcher::EditWatcher;

/// Result of one off-thread viewBox rasterization.
type RasterizedViewBox = (ViewBox, [u32; 2], Result<RasterImage, ImageLoadError>);

/// A vector figure's texture together with the viewBox it was rendered for.
struct RenderedVector {
    handle: TextureHandle,
    viewbox: ViewBox,
    px: [u32; 2],
}

/// Main application state for the figview document viewer.
pub struct FigviewApp {
    document: Document,
    /// Directory of the opened document; `None` for the embedded demo
    document_dir: Option<PathBuf>,
    settings: Settings,
    settings_open: bool,
    /// Which figures are in zoom/pan mode, with their transforms
    activation: Activation,
    /// Decoded figure sources, keyed by source string
    asset_cache: HashMap<String, AssetLoadState>,
    /// Full-resolution textures for raster figures, keyed by source
    raster_textures: HashMap<String, TextureHandle>,
    /// Per-figure vector rasterizations (figures sharing a source may show
    /// different viewBoxes)
    vector_textures: HashMap<usize, RenderedVector>,
    /// In-flight viewBox rasterizations
    pending_rasters: HashMap<usize, mpsc::Receiver<RasterizedViewBox>>,
    /// Figure viewports from the previous frame, for wheel routing
    figure_rects: HashMap<usize, egui::Rect>,
    toasts: Toasts,
    watcher: Option<EditWatcher>,
}

impl FigviewApp {
    fn new(cc: &eframe::CreationContext<'_>, document_path: Option<PathBuf>) -> Self {
        let mut toasts = Toasts::new()
            .anchor(egui::Align2::RIGHT_TOP, (-10.0, 10.0))
            .direction(egui::Direction::TopDown);

        let (document, document_dir) = match &document_path {
            Some(path) => match assets::load_document_file(path) {
                Ok(document) => (document, document_dir_of(path)),
                Err(err) => {
                    toasts.add(error_toast(err.to_string(), 10.0));
                    (empty_document(), None)
                }
            },
            None => match assets::load_embedded_document(DEMO_DOCUMENT) {
                Ok(document) => (document, None),
                Err(err) => {
                    toasts.add(error_toast(err.to_string(), 10.0));
                    (empty_document(), None)
                }
            },
        };

        let watcher = document_dir
            .as_deref()
            .and_then(|dir| EditWatcher::new(cc.egui_ctx.clone(), dir));

        let mut app = Self {
            document,
            document_dir,
            settings: Settings::load(),
            settings_open: false,
            activation: Activation::default(),
            asset_cache: HashMap::new(),
            raster_textures: HashMap::new(),
            vector_textures: HashMap::new(),
            pending_rasters: HashMap::new(),
            figure_rects: HashMap::new(),
            toasts,
            watcher,
        };

        // Preload every figure in background threads
        let sources: Vec<String> = app
            .document
            .figures()
            .map(|(_, figure)| figure.source.clone())
            .collect();
        for source in sources {
            app.spawn_figure_load(&cc.egui_ctx, &source);
        }

        app
    }

    /// Starts decoding a figure source in a background thread.
    fn spawn_figure_load(&mut self, ctx: &egui::Context, source: &str) {
        if self.asset_cache.contains_key(source) {
            return;
        }

        let location = host::locate(self.document_dir.as_deref(), source);
        let kind = ImageKind::from_source(source);
        let (tx, rx) = mpsc::channel();
        let ctx = ctx.clone();

        thread::spawn(move || {
            let result = assets::load_figure(&location, kind);
            let _ = tx.send(result);
            ctx.request_repaint();
        });

        self.asset_cache
            .insert(source.to_string(), AssetLoadState::Loading(rx));
    }

    /// Polls loading figures and creates textures for decoded rasters.
    fn poll_assets(&mut self, ctx: &egui::Context) {
        let mut updates: Vec<(String, AssetLoadState)> = Vec::new();
        let mut errors: Vec<String> = Vec::new();

        for (source, state) in &mut self.asset_cache {
            if let AssetLoadState::Loading(rx) = state {
                match rx.try_recv() {
                    Ok(Ok(decoded)) => {
                        updates.push((source.clone(), AssetLoadState::Ready(decoded)));
                    }
                    Ok(Err(err)) => {
                        let message = err.to_string();
                        errors.push(message.clone());
                        updates.push((source.clone(), AssetLoadState::Error(message)));
                    }
                    Err(mpsc::TryRecvError::Disconnected) => {
                        let message = format!("{source}: decode thread disconnected");
                        errors.push(message.clone());
                        updates.push((source.clone(), AssetLoadState::Error(message)));
                    }
                    Err(mpsc::TryRecvError::Empty) => {}
                }
            }
        }

        for (source, state) in updates {
            self.asset_cache.insert(source, state);
        }
        for message in errors {
            self.toast_error(message);
        }

        // Create textures for decoded raster figures
        let ready: Vec<String> = self
            .asset_cache
            .iter()
            .filter(|(source, state)| {
                matches!(state, AssetLoadState::Ready(DecodedFigure::Raster(_)))
                    && !self.raster_textures.contains_key(*source)
            })
            .map(|(source, _)| source.clone())
            .collect();

        for source in ready {
            if let Some(AssetLoadState::Ready(DecodedFigure::Raster(raster))) =
                self.asset_cache.get(&source)
            {
                let size = [raster.width as usize, raster.height as usize];
                let image = if raster.premultiplied {
                    ColorImage::from_rgba_premultiplied(size, &raster.pixels)
                } else {
                    ColorImage::from_rgba_unmultiplied(size, &raster.pixels)
                };
                let texture = ctx.load_texture(&source, image, TextureOptions::LINEAR);
                self.raster_textures.insert(source, texture);
            }
        }
    }

    /// Starts rasterizing the given viewBox of a vector figure, unless a
    /// rasterization for this figure is already in flight.
    fn request_vector_raster(
        &mut self,
        ctx: &egui::Context,
        figure_id: usize,
        source: &str,
        viewbox: ViewBox,
        px: [u32; 2],
    ) {
        if self.pending_rasters.contains_key(&figure_id) {
            return;
        }
        let Some(AssetLoadState::Ready(DecodedFigure::Vector(vector))) =
            self.asset_cache.get(source)
        else {
            return;
        };

        let data = vector.data.clone();
        let label = source.to_string();
        let (tx, rx) = mpsc::channel();
        let ctx = ctx.clone();

        thread::spawn(move || {
            let result = assets::rasterize_viewbox(&data, &label, viewbox, px[0], px[1]);
            let _ = tx.send((viewbox, px, result));
            ctx.request_repaint();
        });

        self.pending_rasters.insert(figure_id, rx);
    }

    /// Collects finished viewBox rasterizations into textures.
    fn poll_vector_rasters(&mut self, ctx: &egui::Context) {
        let mut finished: Vec<(usize, Option<RasterizedViewBox>)> = Vec::new();

        for (figure_id, rx) in &self.pending_rasters {
            match rx.try_recv() {
                Ok(result) => finished.push((*figure_id, Some(result))),
                Err(mpsc::TryRecvError::Empty) => {}
                Err(mpsc::TryRecvError::Disconnected) => finished.push((*figure_id, None)),
            }
        }

        let mut errors: Vec<String> = Vec::new();
        for (figure_id, result) in finished {
            self.pending_rasters.remove(&figure_id);
            let Some((viewbox, px, result)) = result else {
                continue;
            };
            match result {
                Ok(raster) => {
                    let image = ColorImage::from_rgba_premultiplied(
                        [raster.width as usize, raster.height as usize],
                        &raster.pixels,
                    );
                    let handle =
                        ctx.load_texture(format!("figure-{figure_id}"), image, TextureOptions::LINEAR);
                    self.vector_textures.insert(
                        figure_id,
                        RenderedVector {
                            handle,
                            viewbox,
                            px,
                        },
                    );
                }
                Err(err) => errors.push(err.to_string()),
            }
        }

        for message in errors {
            self.toast_error(message);
        }
    }

    /// Reloads figures whose files were changed by an external editor.
    fn poll_edit_watcher(&mut self, ctx: &egui::Context) {
        let Some(watcher) = &mut self.watcher else {
            return;
        };
        let changed = watcher.poll();
        if changed.is_empty() {
            return;
        }
        let changed: Vec<PathBuf> = changed
            .into_iter()
            .map(|path| path.canonicalize().unwrap_or(path))
            .collect();

        let mut reload: Vec<(usize, String)> = Vec::new();
        for (figure_id, figure) in self.document.figures() {
            if let FigureLocation::File(path) =
                host::locate(self.document_dir.as_deref(), &figure.source)
            {
                let resolved = path.canonicalize().unwrap_or(path);
                if changed.contains(&resolved) {
                    reload.push((figure_id, figure.source.clone()));
                }
            }
        }

        for (figure_id, source) in reload {
            log::info!("Reloading '{source}' after external edit");
            self.asset_cache.remove(&source);
            self.raster_textures.remove(&source);
            self.vector_textures.remove(&figure_id);
            self.pending_rasters.remove(&figure_id);
            self.spawn_figure_load(ctx, &source);
        }
    }

    pub(crate) fn save_settings(&mut self) {
        if let Err(err) = self.settings.save() {
            log::error!("Failed to save settings: {err}");
            self.toast_error(err.to_string());
        }
    }

    pub(crate) fn toast_error(&mut self, message: String) {
        self.toasts.add(error_toast(message, 8.0));
    }
}

impl eframe::App for FigviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_assets(ctx);
        self.poll_vector_rasters(ctx);
        self.poll_edit_watcher(ctx);
        self.handle_keyboard_input(ctx);

        self.show_status_bar(ctx);
        self.show_central_panel(ctx);

        let mut settings_open = self.settings_open;
        if self.settings.show_window(ctx, &mut settings_open) {
            self.save_settings();
        }
        self.settings_open = settings_open;

        self.toasts.show(ctx);
    }
}

fn empty_document() -> Document {
    Document {
        title: "figview".to_string(),
        blocks: Vec::new(),
    }
}

fn document_dir_of(path: &Path) -> Option<PathBuf> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Some(parent.to_path_buf()),
        _ => Some(PathBuf::from(".")),
    }
}

fn error_toast(message: String, seconds: f64) -> Toast {
    Toast {
        kind: ToastKind::Error,
        text: message.into(),
        options: ToastOptions::default()
            .duration_in_seconds(seconds)
            .show_icon(true),
        ..Default::default()
    }
}

#[derive(Parser)]
#[command(version, about = "Document viewer with per-figure zoom and pan")]
struct Args {
    /// RON document to open; shows the built-in demo when omitted
    document: Option<PathBuf>,
}

fn main() -> eframe::Result {
    env_logger::init();
    let args = Args::parse();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1100.0, 760.0]),
        ..Default::default()
    };

    eframe::run_native(
        "figview",
        options,
        Box::new(move |cc| Ok(Box::new(FigviewApp::new(cc, args.document)))),
    )
}

//! Asset embedding, document loading, and image decoding.
//!
//! Decoding runs on background threads; results come back through channels
//! polled each frame (see `AssetLoadState`).

use crate::host::FigureLocation;
use crate::transform::ViewBox;
use figview::Document;
use resvg::{tiny_skia, usvg};
use rust_embed::RustEmbed;
use std::fs;
use std::path::Path;
use std::sync::{Arc, OnceLock, mpsc};
use thiserror::Error;

/// Embeds the built-in demo document and its figures.
/// In debug mode, assets are loaded from the filesystem for faster iteration.
#[derive(RustEmbed)]
#[folder = "assets/"]
pub struct Assets;

/// Name of the built-in demo document inside the embedded assets.
pub const DEMO_DOCUMENT: &str = "demo.ron";

/// Largest edge of a vector rasterization, in pixels.
const MAX_RASTER_EDGE: u32 = 8192;

/// Errors that can occur when loading a document.
#[derive(Error, Debug)]
pub enum DocumentLoadError {
    #[error("'{0}' not found in embedded assets")]
    EmbeddedNotFound(String),
    #[error("failed to read document '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid UTF-8 in document: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("failed to parse document: {0}")]
    Parse(#[from] ron::de::SpannedError),
}

/// Errors that can occur when loading and decoding a figure image.
#[derive(Error, Debug)]
pub enum ImageLoadError {
    #[error("asset not found: {0}")]
    AssetNotFound(String),
    #[error("failed to read image '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("failed to decode image '{path}': {source}")]
    Decode {
        path: String,
        source: image::ImageError,
    },
    #[error("failed to parse svg '{path}': {source}")]
    SvgParse {
        path: String,
        source: usvg::Error,
    },
    #[error("cannot rasterize a {width}x{height} px region")]
    BadRasterSize { width: u32, height: u32 },
}

/// Decoded pixel data ready for texture creation.
pub struct RasterImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// tiny-skia produces premultiplied alpha, the image crate does not
    pub premultiplied: bool,
}

/// A validated vector source kept as bytes for later re-rasterization.
pub struct VectorImage {
    pub data: Vec<u8>,
    pub width: f32,
    pub height: f32,
}

impl VectorImage {
    pub fn original_viewbox(&self) -> ViewBox {
        ViewBox::from_size(self.width, self.height)
    }
}

/// A decoded figure of either kind.
pub enum DecodedFigure {
    Raster(RasterImage),
    Vector(VectorImage),
}

/// State of a figure image being loaded asynchronously.
pub enum AssetLoadState {
    /// Decoding in a background thread.
    Loading(mpsc::Receiver<Result<DecodedFigure, ImageLoadError>>),
    /// Decoded and ready for texture creation.
    Ready(DecodedFigure),
    /// Loading failed; stores the message (already surfaced via toast).
    Error(String),
}

/// Loads the built-in demo document from embedded assets.
pub fn load_embedded_document(name: &str) -> Result<Document, DocumentLoadError> {
    let file =
        Assets::get(name).ok_or_else(|| DocumentLoadError::EmbeddedNotFound(name.to_string()))?;
    let contents = std::str::from_utf8(&file.data)?;
    Ok(ron::from_str(contents)?)
}

/// Loads a document from a file on disk.
pub fn load_document_file(path: &Path) -> Result<Document, DocumentLoadError> {
    let contents = fs::read_to_string(path).map_err(|source| DocumentLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(ron::from_str(&contents)?)
}

/// Parse options with system fonts loaded once, so svg text renders.
fn svg_options() -> usvg::Options<'static> {
    static FONTDB: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    let fontdb = FONTDB
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            Arc::new(db)
        })
        .clone();
    usvg::Options {
        fontdb,
        ..usvg::Options::default()
    }
}

fn read_location(location: &FigureLocation) -> Result<Vec<u8>, ImageLoadError> {
    match location {
        FigureLocation::Embedded(name) => Assets::get(name)
            .map(|file| file.data.into_owned())
            .ok_or_else(|| ImageLoadError::AssetNotFound(name.clone())),
        FigureLocation::File(path) => fs::read(path).map_err(|source| ImageLoadError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}

fn location_label(location: &FigureLocation) -> String {
    match location {
        FigureLocation::Embedded(name) => name.clone(),
        FigureLocation::File(path) => path.display().to_string(),
    }
}

/// Loads and decodes a figure image from its location.
pub fn load_figure(
    location: &FigureLocation,
    kind: Option<figview::ImageKind>,
) -> Result<DecodedFigure, ImageLoadError> {
    let label = location_label(location);
    let kind = kind.ok_or_else(|| ImageLoadError::UnsupportedFormat(label.clone()))?;
    let data = read_location(location)?;

    match kind {
        figview::ImageKind::Raster => {
            let decoded =
                image::load_from_memory(&data).map_err(|source| ImageLoadError::Decode {
                    path: label,
                    source,
                })?;
            let rgba = decoded.to_rgba8();
            let (width, height) = rgba.dimensions();
            Ok(DecodedFigure::Raster(RasterImage {
                pixels: rgba.into_raw(),
                width,
                height,
                premultiplied: false,
            }))
        }
        figview::ImageKind::Vector => {
            let tree = usvg::Tree::from_data(&data, &svg_options()).map_err(
                |source| ImageLoadError::SvgParse {
                    path: label,
                    source,
                },
            )?;
            let size = tree.size();
            Ok(DecodedFigure::Vector(VectorImage {
                data,
                width: size.width(),
                height: size.height(),
            }))
        }
    }
}

/// Rasterizes the given viewBox region of a vector source into a
/// `width`x`height` pixel image.
pub fn rasterize_viewbox(
    data: &[u8],
    label: &str,
    viewbox: ViewBox,
    width: u32,
    height: u32,
) -> Result<RasterImage, ImageLoadError> {
    let width = width.min(MAX_RASTER_EDGE);
    let height = height.min(MAX_RASTER_EDGE);

    let tree = usvg::Tree::from_data(data, &svg_options()).map_err(|source| {
        ImageLoadError::SvgParse {
            path: label.to_string(),
            source,
        }
    })?;

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or(ImageLoadError::BadRasterSize { width, height })?;

    let scale_x = width as f32 / viewbox.w;
    let scale_y = height as f32 / viewbox.h;
    let transform =
        tiny_skia::Transform::from_scale(scale_x, scale_y).pre_translate(-viewbox.x, -viewbox.y);

    resvg::render(&tree, transform, &mut pixmap.as_mut());

    Ok(RasterImage {
        pixels: pixmap.take(),
        width,
        height,
        premultiplied: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use figview::ImageKind;

    const CIRCLE_SVG: &[u8] =
        br#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 40 20"><circle cx="20" cy="10" r="8" fill="red"/></svg>"#;

    #[test]
    fn embedded_demo_document_parses() {
        let document = load_embedded_document(DEMO_DOCUMENT).expect("demo document");
        assert!(document.figures().count() >= 2);
        for (_, figure) in document.figures() {
            assert!(figure.kind().is_some(), "unknown kind: {}", figure.source);
            assert!(
                Assets::get(&figure.source).is_some(),
                "missing asset: {}",
                figure.source
            );
        }
    }

    #[test]
    fn vector_source_reports_intrinsic_size() {
        let tree = usvg::Tree::from_data(CIRCLE_SVG, &usvg::Options::default()).unwrap();
        assert_eq!(tree.size().width(), 40.0);
        assert_eq!(tree.size().height(), 20.0);
    }

    #[test]
    fn rasterize_viewbox_produces_requested_dimensions() {
        let viewbox = ViewBox::new(10.0, 0.0, 20.0, 20.0);
        let raster = rasterize_viewbox(CIRCLE_SVG, "circle.svg", viewbox, 64, 64).unwrap();
        assert_eq!(raster.width, 64);
        assert_eq!(raster.height, 64);
        assert!(raster.premultiplied);
        assert_eq!(raster.pixels.len(), 64 * 64 * 4);
        // The circle fills the center of this viewBox, so the middle is opaque.
        let center = (32 * 64 + 32) * 4;
        assert_eq!(raster.pixels[center + 3], 255);
    }

    #[test]
    fn unsupported_format_is_rejected() {
        let location = FigureLocation::Embedded("demo.ron".into());
        assert!(matches!(
            load_figure(&location, ImageKind::from_source("demo.ron")),
            Err(ImageLoadError::UnsupportedFormat(_))
        ));
    }
}

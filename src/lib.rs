use serde::{Deserialize, Serialize};
use std::path::Path;

/// A document rendered by the viewer: a title and a flat list of blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document title, shown in the status bar
    pub title: String,
    /// Content blocks in display order
    pub blocks: Vec<Block>,
}

impl Document {
    /// Returns the figures of this document together with their block indices.
    ///
    /// The block index doubles as the stable figure id for activation and
    /// texture caching.
    pub fn figures(&self) -> impl Iterator<Item = (usize, &Figure)> {
        self.blocks.iter().enumerate().filter_map(|(idx, block)| {
            if let Block::Figure(figure) = block {
                Some((idx, figure))
            } else {
                None
            }
        })
    }
}

/// A single content block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Block {
    /// Section heading
    Heading(String),
    /// Body text paragraph
    Paragraph(String),
    /// An embedded image
    Figure(Figure),
}

/// An embedded image reference within a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Figure {
    /// Image source, resolved relative to the document's directory
    pub source: String,
    /// Caption shown below the figure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Viewport height in logical pixels (falls back to the default height)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
}

impl Figure {
    /// Returns the image kind, or `None` for unsupported extensions.
    pub fn kind(&self) -> Option<ImageKind> {
        ImageKind::from_source(&self.source)
    }
}

/// Whether an image source is raster or vector content.
///
/// Raster figures zoom via a scaled display rectangle; vector figures zoom
/// by re-rasterizing the current viewBox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageKind {
    Raster,
    Vector,
}

impl ImageKind {
    /// Determines the image kind from a source path's extension.
    pub fn from_source(source: &str) -> Option<Self> {
        let extension = Path::new(source).extension()?.to_str()?;
        match extension.to_ascii_lowercase().as_str() {
            "png" | "jpg" | "jpeg" => Some(Self::Raster),
            "svg" => Some(Self::Vector),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_kind_from_extension() {
        assert_eq!(ImageKind::from_source("a/b.png"), Some(ImageKind::Raster));
        assert_eq!(ImageKind::from_source("b.JPG"), Some(ImageKind::Raster));
        assert_eq!(ImageKind::from_source("c.svg"), Some(ImageKind::Vector));
        assert_eq!(ImageKind::from_source("d.gif"), None);
        assert_eq!(ImageKind::from_source("no-extension"), None);
    }

    #[test]
    fn document_parses_from_ron() {
        let source = r#"(
            title: "Sample",
            blocks: [
                Heading("Intro"),
                Paragraph("Some text."),
                Figure((source: "figures/plot.svg", caption: Some("A plot"))),
                Figure((source: "figures/photo.png", height: Some(280.0))),
            ],
        )"#;

        let document: Document = ron::from_str(source).expect("valid document");
        assert_eq!(document.title, "Sample");
        assert_eq!(document.blocks.len(), 4);

        let figures: Vec<_> = document.figures().collect();
        assert_eq!(figures.len(), 2);
        assert_eq!(figures[0].0, 2);
        assert_eq!(figures[0].1.caption.as_deref(), Some("A plot"));
        assert_eq!(figures[1].1.height, Some(280.0));
        assert_eq!(figures[1].1.kind(), Some(ImageKind::Raster));
    }
}

//! Bridges figures to the host system: file lookup and the external editor.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Where a figure's bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FigureLocation {
    /// Bundled with the binary (the built-in demo document)
    Embedded(String),
    /// A file on disk, resolved against the document's directory
    File(PathBuf),
}

/// Resolves a figure source against the directory of the opened document.
///
/// Without a document directory the source refers to an embedded asset.
pub fn locate(document_dir: Option<&Path>, source: &str) -> FigureLocation {
    match document_dir {
        Some(dir) => {
            let path = Path::new(source);
            if path.is_absolute() {
                FigureLocation::File(path.to_path_buf())
            } else {
                FigureLocation::File(dir.join(path))
            }
        }
        None => FigureLocation::Embedded(source.to_string()),
    }
}

#[derive(Error, Debug)]
pub enum EditLaunchError {
    #[error("'{0}' is a built-in demo asset with no file on disk")]
    EmbeddedOnly(String),
    #[error("image file does not exist: {}", .0.display())]
    Missing(PathBuf),
    #[error("failed to launch an editor for '{path}': {source}")]
    Launch { path: String, source: io::Error },
}

/// Opens the figure's file in the platform default application.
pub fn open_in_editor(location: &FigureLocation) -> Result<(), EditLaunchError> {
    match location {
        FigureLocation::Embedded(source) => Err(EditLaunchError::EmbeddedOnly(source.clone())),
        FigureLocation::File(path) => {
            if !path.exists() {
                return Err(EditLaunchError::Missing(path.clone()));
            }
            log::info!("Opening {} in the external editor", path.display());
            open::that_detached(path).map_err(|source| EditLaunchError::Launch {
                path: path.display().to_string(),
                source,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_without_document_dir_are_embedded() {
        assert_eq!(
            locate(None, "figures/plot.svg"),
            FigureLocation::Embedded("figures/plot.svg".to_string())
        );
    }

    #[test]
    fn relative_sources_resolve_against_document_dir() {
        let dir = Path::new("/home/user/docs");
        assert_eq!(
            locate(Some(dir), "figures/plot.svg"),
            FigureLocation::File(PathBuf::from("/home/user/docs/figures/plot.svg"))
        );
    }

    #[test]
    fn absolute_sources_are_kept_as_is() {
        let dir = Path::new("/home/user/docs");
        assert_eq!(
            locate(Some(dir), "/tmp/photo.png"),
            FigureLocation::File(PathBuf::from("/tmp/photo.png"))
        );
    }

    #[test]
    fn embedded_sources_cannot_be_edited_externally() {
        let location = FigureLocation::Embedded("figures/plot.svg".to_string());
        assert!(matches!(
            open_in_editor(&location),
            Err(EditLaunchError::EmbeddedOnly(_))
        ));
    }
}

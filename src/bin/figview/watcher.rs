//! Watches the opened document's directory for externally edited images.
//!
//! When the user hands a figure to the external editor and saves, the write
//! shows up here and the app reloads that figure's pixels.

use eframe::egui;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            matches!(
                ext.to_ascii_lowercase().as_str(),
                "png" | "jpg" | "jpeg" | "svg"
            )
        })
}

/// Watches a document directory and reports changed image files.
pub struct EditWatcher {
    changed_rx: Receiver<PathBuf>,
    /// The watcher must be kept alive for events to fire
    _watcher: RecommendedWatcher,
}

impl EditWatcher {
    /// Starts watching `dir` recursively. Returns `None` if the directory
    /// does not exist or the watcher cannot be created.
    pub fn new(ctx: egui::Context, dir: &Path) -> Option<Self> {
        if !dir.is_dir() {
            log::warn!("Not watching {}: not a directory", dir.display());
            return None;
        }

        let (changed_tx, changed_rx) = mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                if matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                    for path in event.paths {
                        if is_image_file(&path) {
                            let _ = changed_tx.send(path);
                            ctx.request_repaint();
                        }
                    }
                }
            }
        })
        .ok()?;

        watcher.watch(dir, RecursiveMode::Recursive).ok()?;
        log::info!("Watching {} for image edits", dir.display());

        Some(Self {
            changed_rx,
            _watcher: watcher,
        })
    }

    /// Drains pending change notifications, deduplicated.
    pub fn poll(&mut self) -> Vec<PathBuf> {
        let mut changed = Vec::new();
        loop {
            match self.changed_rx.try_recv() {
                Ok(path) => {
                    if !changed.contains(&path) {
                        changed.push(path);
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::warn!("Edit watcher channel disconnected");
                    break;
                }
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_extensions_are_recognized() {
        assert!(is_image_file(Path::new("a/plot.svg")));
        assert!(is_image_file(Path::new("photo.PNG")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("no-extension")));
    }
}

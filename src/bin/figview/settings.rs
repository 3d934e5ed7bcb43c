//! Persisted viewer settings and the settings window.

use crate::constants::{DEFAULT_PAN_SPEED, DEFAULT_ZOOM_SPEED};
use eframe::egui;
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Modifier key that must be held for wheel zoom on an active figure.
///
/// With a gate configured, a plain wheel keeps scrolling the document even
/// over an active figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoomModifier {
    None,
    Ctrl,
    Shift,
    Alt,
}

impl ZoomModifier {
    pub const ALL: [ZoomModifier; 4] = [Self::None, Self::Ctrl, Self::Shift, Self::Alt];

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Ctrl => "Ctrl / Cmd",
            Self::Shift => "Shift",
            Self::Alt => "Alt",
        }
    }

    /// Compact name for key hints, empty for `None`.
    pub fn short_label(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Ctrl => "Ctrl",
            Self::Shift => "Shift",
            Self::Alt => "Alt",
        }
    }

    /// Whether the currently held modifiers satisfy this gate.
    pub fn is_satisfied(self, modifiers: &egui::Modifiers) -> bool {
        match self {
            Self::None => true,
            Self::Ctrl => modifiers.ctrl || modifiers.command,
            Self::Shift => modifiers.shift,
            Self::Alt => modifiers.alt,
        }
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("no config directory available on this platform")]
    NoConfigDir,
    #[error("failed to write settings to '{path}': {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] ron::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Modifier gate for wheel zoom
    pub zoom_modifier: ZoomModifier,
    /// Multiplier applied to drag deltas while panning
    pub pan_speed: f32,
    /// Zoom multiplier per wheel/keyboard step
    pub zoom_speed: f32,
    /// Whether active figures get a highlight frame
    pub show_frame: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            zoom_modifier: ZoomModifier::None,
            pan_speed: DEFAULT_PAN_SPEED,
            zoom_speed: DEFAULT_ZOOM_SPEED,
            show_frame: true,
        }
    }
}

impl Settings {
    fn config_path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join("figview").join("settings.ron"))
    }

    /// Loads settings from the config directory, falling back to defaults.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(contents) => match ron::from_str(&contents) {
                Ok(settings) => settings,
                Err(err) => {
                    log::warn!("Ignoring invalid settings file {}: {err}", path.display());
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Writes settings to the config directory.
    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::config_path().ok_or(SettingsError::NoConfigDir)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let contents = ron::ser::to_string_pretty(self, PrettyConfig::default())?;
        fs::write(&path, contents).map_err(|source| SettingsError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    /// Renders the settings window. Returns whether any value changed.
    pub fn show_window(&mut self, ctx: &egui::Context, open: &mut bool) -> bool {
        let mut changed = false;

        egui::Window::new("Settings")
            .open(open)
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Zoom modifier");
                    egui::ComboBox::from_id_salt("zoom_modifier")
                        .selected_text(self.zoom_modifier.label())
                        .show_ui(ui, |ui| {
                            for modifier in ZoomModifier::ALL {
                                changed |= ui
                                    .selectable_value(
                                        &mut self.zoom_modifier,
                                        modifier,
                                        modifier.label(),
                                    )
                                    .changed();
                            }
                        });
                });

                changed |= ui
                    .add(
                        egui::Slider::new(&mut self.pan_speed, 0.2..=3.0)
                            .text("Pan speed")
                            .fixed_decimals(1),
                    )
                    .changed();

                changed |= ui
                    .add(
                        egui::Slider::new(&mut self.zoom_speed, 1.05..=2.0)
                            .text("Zoom speed")
                            .fixed_decimals(2),
                    )
                    .changed();

                changed |= ui
                    .checkbox(&mut self.show_frame, "Frame active figures")
                    .changed();

                if ui.button("Restore defaults").clicked() {
                    *self = Self::default();
                    changed = true;
                }
            });

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_gate_none_always_passes() {
        let none = egui::Modifiers::default();
        assert!(ZoomModifier::None.is_satisfied(&none));
        assert!(!ZoomModifier::Ctrl.is_satisfied(&none));
        assert!(!ZoomModifier::Shift.is_satisfied(&none));
    }

    #[test]
    fn modifier_gate_accepts_command_as_ctrl() {
        let cmd = egui::Modifiers {
            command: true,
            ..Default::default()
        };
        assert!(ZoomModifier::Ctrl.is_satisfied(&cmd));
    }

    #[test]
    fn settings_round_trip_through_ron() {
        let settings = Settings {
            zoom_modifier: ZoomModifier::Alt,
            pan_speed: 1.5,
            zoom_speed: 1.3,
            show_frame: false,
        };
        let encoded = ron::to_string(&settings).unwrap();
        let decoded: Settings = ron::from_str(&encoded).unwrap();
        assert_eq!(decoded, settings);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let decoded: Settings = ron::from_str("(pan_speed: 2.0)").unwrap();
        assert_eq!(decoded.pan_speed, 2.0);
        assert_eq!(decoded.zoom_modifier, ZoomModifier::None);
        assert!(decoded.show_frame);
    }
}

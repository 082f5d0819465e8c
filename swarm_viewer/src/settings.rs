//! Persisted user settings.
//!
//! Stored as a flat JSON object next to the binary (or wherever `--settings`
//! points). Every field is optional on disk; anything missing takes its
//! default, and a file that cannot be read at all yields the defaults.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use swarm_engine::ModeKind;

use crate::error::Result;

pub const DEFAULT_SETTINGS_FILE: &str = "swarm_settings.json";

/// What a closed fist does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FistAction {
    #[default]
    None,
    Theme,
    Mode,
    Camera,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mode:            String,
    pub theme:           usize,
    /// `None` draws the initial count from the pool's default range.
    pub particle_count:  Option<usize>,
    pub fist_action:     FistAction,
    /// Camera-preview overlay in the corner.
    pub camera_visible:  bool,
    pub mask_visible:    bool,
    /// HUD text.
    pub display_visible: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            mode:            ModeKind::default().name().to_string(),
            theme:           0,
            particle_count:  None,
            fist_action:     FistAction::None,
            camera_visible:  false,
            mask_visible:    true,
            display_visible: true,
        }
    }
}

impl Settings {
    /// Parse and sanitise. Unknown mode names fall back to the default mode.
    pub fn from_json(text: &str) -> Result<Self> {
        let mut settings: Settings = serde_json::from_str(text)?;
        settings.sanitize();
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Like [`load`](Self::load), but a missing or corrupt file yields the
    /// defaults.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(s) => {
                debug!("loaded settings from {}", path.display());
                s
            }
            Err(crate::error::ViewerError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                debug!("no settings at {}, using defaults", path.display());
                Settings::default()
            }
            Err(e) => {
                warn!("ignoring settings at {}: {}", path.display(), e);
                Settings::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        debug!("saved settings to {}", path.display());
        Ok(())
    }

    /// Delete the settings file; a file that is already gone is fine.
    pub fn remove(path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn mode_kind(&self) -> ModeKind {
        ModeKind::from_name_or_default(&self.mode)
    }

    pub fn set_mode(&mut self, kind: ModeKind) {
        self.mode = kind.name().to_string();
    }

    fn sanitize(&mut self) {
        let kind = self.mode_kind();
        self.set_mode(kind);
        if !swarm_engine::theme::is_valid_theme(self.theme) {
            warn!("settings theme {} out of range, using 0", self.theme);
            self.theme = 0;
        }
    }
}

// SPDX-License-Identifier: GPL-3.0-only

use crate::app::frame_processor::InversionMode;
use crate::constants::{capture, scanning};
use crate::errors::{AppError, AppResult};
use crate::pipelines::photo::Viewport;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Directory name used under the platform config and pictures directories
const APP_DIR: &str = "fieldcam";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// User configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Display viewport width that captures are scaled to fit
    pub viewport_width: u32,
    /// Display viewport height that captures are scaled to fit
    pub viewport_height: u32,
    /// Polling period of the code scanner in milliseconds
    pub scan_interval_ms: u64,
    /// Code search mode (dark-on-light only by default)
    pub inversion: InversionMode,
    /// Where exported photos are written by the command line tool
    pub output_dir: Option<PathBuf>,
    /// Drive a sysfs flash LED as torch for the file-backed camera
    pub flash_led: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            viewport_width: capture::DEFAULT_VIEWPORT_WIDTH,
            viewport_height: capture::DEFAULT_VIEWPORT_HEIGHT,
            scan_interval_ms: scanning::DEFAULT_SCAN_INTERVAL.as_millis() as u64,
            inversion: InversionMode::default(),
            output_dir: None,
            flash_led: false,
        }
    }
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load the config from its default location, falling back to defaults
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                warn!("No config directory available, using defaults");
                Self::default()
            }
        }
    }

    /// Load the config from `path`, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Config not readable, using defaults");
                return Self::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Invalid config, using defaults");
                Self::default()
            }
        }
    }

    /// Write the config to its default location
    pub fn save(&self) -> AppResult<()> {
        let path = Self::default_path()
            .ok_or_else(|| AppError::Config("no config directory available".into()))?;
        self.save_to(&path)
    }

    /// Write the config to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        debug!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Viewport that captures are scaled into
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport_width, self.viewport_height)
    }

    /// Scanner polling period
    pub fn scan_interval(&self) -> Duration {
        Duration::from_millis(self.scan_interval_ms.max(1))
    }

    /// Directory for exported photos
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| {
            dirs::picture_dir()
                .or_else(dirs::home_dir)
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
        })
    }
}

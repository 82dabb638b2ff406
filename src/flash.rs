// SPDX-License-Identifier: GPL-3.0-only

//! Hardware flash LED control via Linux sysfs
//!
//! Discovers flash LEDs exposed at `/sys/class/leds/*:flash` and drives them
//! in torch mode through the `brightness` file, which is group-writable on
//! most phones, instead of the root-only strobe interface.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where the kernel exposes LED class devices
pub const SYSFS_LEDS: &str = "/sys/class/leds";

/// A flash LED device discovered via sysfs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashDevice {
    /// Sysfs path, e.g. `/sys/class/leds/white:flash`
    path: PathBuf,
    /// Maximum brightness value (from `max_brightness` file)
    max_brightness: u32,
    /// Directory basename
    name: String,
}

impl FlashDevice {
    /// Writable flash LEDs on this machine
    pub fn discover() -> Vec<FlashDevice> {
        Self::discover_in(Path::new(SYSFS_LEDS))
    }

    /// Scan `leds_dir` for `*:flash` entries we can write to
    ///
    /// Entries with an unreadable or zero `max_brightness`, or a brightness
    /// file we cannot open for writing, are skipped. The result is sorted by
    /// name so "white" comes before "yellow".
    pub fn discover_in(leds_dir: &Path) -> Vec<FlashDevice> {
        let Ok(entries) = std::fs::read_dir(leds_dir) else {
            debug!(path = %leds_dir.display(), "No LED class directory, flash discovery skipped");
            return Vec::new();
        };

        let mut devices: Vec<FlashDevice> = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                if !name.ends_with(":flash") {
                    return None;
                }
                Self::probe(entry.path(), name)
            })
            .collect();

        devices.sort_by(|a, b| a.name.cmp(&b.name));
        devices
    }

    fn probe(path: PathBuf, name: String) -> Option<FlashDevice> {
        let max_path = path.join("max_brightness");
        let max_brightness = match std::fs::read_to_string(&max_path) {
            Ok(s) => match s.trim().parse::<u32>() {
                Ok(v) if v > 0 => v,
                _ => {
                    warn!(path = %max_path.display(), "Invalid max_brightness value");
                    return None;
                }
            },
            Err(e) => {
                warn!(path = %max_path.display(), error = %e, "Cannot read max_brightness");
                return None;
            }
        };

        let brightness_path = path.join("brightness");
        if let Err(e) = std::fs::OpenOptions::new()
            .write(true)
            .open(&brightness_path)
        {
            warn!(
                path = %brightness_path.display(),
                error = %e,
                "Flash LED found but not writable"
            );
            return None;
        }

        info!(name = %name, max_brightness, "Discovered flash LED");
        Some(FlashDevice {
            path,
            max_brightness,
            name,
        })
    }

    /// Get the device name (e.g. "white:flash")
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_brightness(&self) -> u32 {
        self.max_brightness
    }

    /// Set raw brightness value (0 = off, max_brightness = full)
    pub fn set_brightness(&self, value: u32) -> io::Result<()> {
        let clamped = value.min(self.max_brightness);
        std::fs::write(self.path.join("brightness"), clamped.to_string())
    }

    /// Turn off the LED
    pub fn off(&self) -> io::Result<()> {
        self.set_brightness(0)
    }

    /// Turn on at a fraction of max brightness (0.0 = off, 1.0 = full)
    pub fn torch(&self, intensity: f32) -> io::Result<()> {
        let clamped = intensity.clamp(0.0, 1.0);
        let value = (clamped * self.max_brightness as f32).round() as u32;
        self.set_brightness(value)
    }
}

/// Turn off every device, logging failures
pub fn all_off(devices: &[FlashDevice]) {
    for dev in devices {
        if let Err(e) = dev.off() {
            warn!(device = %dev.name, error = %e, "Failed to turn off flash LED");
        }
    }
}

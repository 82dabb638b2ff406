// SPDX-License-Identifier: GPL-3.0-only

//! Image file loading for the virtual camera

use crate::backends::camera::types::{BackendError, BackendResult, CameraFrame};
use crate::constants::file_formats;
use std::path::Path;
use tracing::info;

/// Load an image file as an RGBA frame at its native resolution
pub fn load_image_as_frame(path: &Path) -> BackendResult<CameraFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if !file_formats::is_image_extension(&extension) {
        return Err(BackendError::Other(format!(
            "Unsupported file format: {}",
            extension
        )));
    }

    info!(path = %path.display(), "Loading image file");

    let img = image::open(path).map_err(|e| {
        BackendError::Other(format!("Failed to load image '{}': {}", path.display(), e))
    })?;

    let frame = CameraFrame::from_rgba_image(&img.to_rgba8());
    info!(width = frame.width, height = frame.height, "Image loaded successfully");
    Ok(frame)
}

// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants
//!
//! All lengths are in buffer space (backing-store pixels), not display pixels.

use image::Rgba;
use std::time::Duration;

/// Annotation drawing parameters
pub mod annotation {
    use super::Rgba;

    /// Eraser brush radius; strokes are twice this wide
    pub const ERASER_RADIUS: f32 = 26.0;

    /// Stroke width for circle, rectangle and arrow tools
    pub const STROKE_WIDTH: f32 = 3.0;

    /// Length of each arrowhead stroke
    pub const ARROW_HEAD_LENGTH: f32 = 22.0;

    /// Angle between the shaft and each arrowhead stroke (30°)
    pub const ARROW_HEAD_ANGLE: f32 = std::f32::consts::FRAC_PI_6;

    /// Minimum radius per axis when drawing an ellipse
    pub const MIN_ELLIPSE_RADIUS: f32 = 1.0;

    /// Stroke color for all shape tools (opaque red)
    pub const STROKE_COLOR: Rgba<u8> = Rgba([239, 68, 68, 255]);
}

/// Crop tool parameters
pub mod crop {
    /// Crops narrower or shorter than this are treated as accidental taps
    pub const MIN_CROP_SIZE: f32 = 10.0;
}

/// Export encoding parameters
pub mod export {
    /// JPEG quality for exported photos (0-100)
    pub const JPEG_QUALITY: u8 = 90;
}

/// Capture defaults
pub mod capture {
    /// Default display viewport width
    pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;

    /// Default display viewport height
    pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 720;
}

/// Code scanning timing
pub mod scanning {
    use super::Duration;

    /// Default polling period, roughly one display refresh
    pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_millis(16);
}

/// Supported file formats for library import and the file-backed camera
pub mod file_formats {
    /// Supported image file extensions
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

    /// Check if a file extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! QR code detection task
//!
//! This module implements QR code detection using the rqrr crate.
//! Frames are converted to luminance and searched for finder patterns;
//! the first grid that decodes cleanly wins.

use crate::app::frame_processor::types::{DecodeResult, FrameRegion, InversionMode};
use image::{GrayImage, RgbaImage};
use tracing::{debug, trace};

/// Something that can find and decode a code in a still frame
///
/// A miss (`None`) is the normal outcome while no code is in view.
pub trait CodeReader: Send {
    fn decode(&self, frame: &RgbaImage) -> Option<DecodeResult>;
}

/// QR code detector
pub struct QrDetector {
    inversion: InversionMode,
}

impl Default for QrDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl QrDetector {
    /// Create a detector that only searches dark-on-light codes
    pub fn new() -> Self {
        Self {
            inversion: InversionMode::DontInvert,
        }
    }

    /// Create a detector with a specific inversion mode
    pub fn with_inversion(inversion: InversionMode) -> Self {
        Self { inversion }
    }

    pub fn inversion(&self) -> InversionMode {
        self.inversion
    }
}

impl CodeReader for QrDetector {
    fn decode(&self, frame: &RgbaImage) -> Option<DecodeResult> {
        let start = std::time::Instant::now();
        let mut luma = image::imageops::grayscale(frame);

        let mut result = decode_luma(&luma);
        if result.is_none() && self.inversion == InversionMode::AttemptBoth {
            image::imageops::invert(&mut luma);
            result = decode_luma(&luma);
        }

        trace!(
            width = frame.width(),
            height = frame.height(),
            found = result.is_some(),
            detection_ms = start.elapsed().as_millis(),
            "QR detection pass complete"
        );
        result
    }
}

/// Search a luminance image for the first decodable grid
fn decode_luma(luma: &GrayImage) -> Option<DecodeResult> {
    let width = luma.width() as usize;
    let height = luma.height() as usize;
    if width == 0 || height == 0 {
        return None;
    }

    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(width, height, |x, y| {
        luma.get_pixel(x as u32, y as u32).0[0]
    });

    for grid in prepared.detect_grids() {
        let content = match grid.decode() {
            Ok((_, content)) => content,
            Err(e) => {
                debug!(error = ?e, "Failed to decode QR grid");
                continue;
            }
        };

        let xs = grid.bounds.iter().map(|p| p.x.max(0) as u32);
        let ys = grid.bounds.iter().map(|p| p.y.max(0) as u32);
        let (min_x, max_x) = (xs.clone().min().unwrap_or(0), xs.max().unwrap_or(0));
        let (min_y, max_y) = (ys.clone().min().unwrap_or(0), ys.max().unwrap_or(0));
        let region = FrameRegion::from_pixels(
            min_x,
            min_y,
            max_x - min_x,
            max_y - min_y,
            width as u32,
            height as u32,
        );

        debug!(content = %content, "Detected QR code");
        return Some(DecodeResult::new(content).with_region(region));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use qrcode::{Color, QrCode};

    const MODULE_PX: u32 = 6;
    const QUIET_ZONE: u32 = 4;

    /// Render `content` as a QR code, dark modules on light unless `inverted`
    fn qr_frame(content: &str, inverted: bool) -> RgbaImage {
        let code = QrCode::new(content.as_bytes()).expect("encode QR");
        let modules = code.width() as u32;
        let colors = code.to_colors();
        let side = (modules + 2 * QUIET_ZONE) * MODULE_PX;

        RgbaImage::from_fn(side, side, |x, y| {
            let (mx, my) = (x / MODULE_PX, y / MODULE_PX);
            let inside = (QUIET_ZONE..QUIET_ZONE + modules).contains(&mx)
                && (QUIET_ZONE..QUIET_ZONE + modules).contains(&my);
            let dark = inside
                && colors[((my - QUIET_ZONE) * modules + (mx - QUIET_ZONE)) as usize]
                    == Color::Dark;
            let v = if dark != inverted { 0 } else { 255 };
            Rgba([v, v, v, 255])
        })
    }

    #[test]
    fn test_decodes_dark_on_light() {
        let frame = qr_frame("asset:42", false);
        let result = QrDetector::new().decode(&frame).expect("code in frame");

        assert_eq!(result.content, "asset:42");
        let region = result.region.expect("bounds");
        // The code sits inside the quiet zone
        let margin = (QUIET_ZONE * MODULE_PX) as f32 / frame.width() as f32;
        assert!(region.x >= margin * 0.5 && region.y >= margin * 0.5, "{region:?}");
        assert!(region.width > 0.5 && region.height > 0.5, "{region:?}");
    }

    #[test]
    fn test_inverted_code_needs_attempt_both() {
        let frame = qr_frame("asset:42", true);

        assert!(QrDetector::new().decode(&frame).is_none());
        let found = QrDetector::with_inversion(InversionMode::AttemptBoth).decode(&frame);
        assert_eq!(found.map(|r| r.content), Some("asset:42".to_string()));
    }

    #[test]
    fn test_attempt_both_keeps_plain_hits() {
        let frame = qr_frame("area/7", false);
        let found = QrDetector::with_inversion(InversionMode::AttemptBoth).decode(&frame);
        assert_eq!(found.map(|r| r.content), Some("area/7".to_string()));
    }

    #[test]
    fn test_blank_frame_is_a_miss() {
        let frame = RgbaImage::from_pixel(64, 48, Rgba([255, 255, 255, 255]));
        assert!(QrDetector::new().decode(&frame).is_none());
    }

    #[test]
    fn test_empty_frame_is_a_miss() {
        let frame = RgbaImage::new(0, 0);
        assert!(
            QrDetector::with_inversion(InversionMode::AttemptBoth)
                .decode(&frame)
                .is_none()
        );
    }

    #[test]
    fn test_default_does_not_invert() {
        assert_eq!(QrDetector::default().inversion(), InversionMode::DontInvert);
    }
}

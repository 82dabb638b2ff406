// SPDX-License-Identifier: GPL-3.0-only

//! Core types for code scanning results

use serde::{Deserialize, Serialize};

/// A rectangular region within a frame
///
/// Coordinates are normalized (0.0 to 1.0) relative to the frame dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRegion {
    /// Left edge (0.0 = left of frame, 1.0 = right of frame)
    pub x: f32,
    /// Top edge (0.0 = top of frame, 1.0 = bottom of frame)
    pub y: f32,
    /// Width as fraction of frame width
    pub width: f32,
    /// Height as fraction of frame height
    pub height: f32,
}

impl FrameRegion {
    /// Create a frame region from pixel coordinates
    pub fn from_pixels(
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        let fw = frame_width.max(1) as f32;
        let fh = frame_height.max(1) as f32;
        Self {
            x: x as f32 / fw,
            y: y as f32 / fh,
            width: width as f32 / fw,
            height: height as f32 / fh,
        }
    }
}

/// A decoded code payload
///
/// The text carries no schema; interpreting it (record link, asset id, ...)
/// is up to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeResult {
    /// Raw decoded text
    pub content: String,
    /// Where the code was found, when the reader reports it
    pub region: Option<FrameRegion>,
}

impl DecodeResult {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            region: None,
        }
    }

    pub fn with_region(mut self, region: FrameRegion) -> Self {
        self.region = Some(region);
        self
    }
}

/// Which luminance polarity the code search accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InversionMode {
    /// Dark modules on a light background only
    #[default]
    DontInvert,
    /// Also retry each frame with inverted luminance (light-on-dark codes)
    AttemptBoth,
}

// SPDX-License-Identifier: GPL-3.0-only

//! Still-frame sampling from a live stream
//!
//! Used by both the capture path and the code scanner. A stream that has not
//! buffered a frame yet is not an error: the caller just tries again on its
//! next tick. A disconnected device is.

use super::format_converters::frame_to_rgba;
use crate::backends::camera::MediaStream;
use crate::errors::CameraError;
use image::RgbaImage;
use tracing::{trace, warn};

/// Off-screen RGBA raster holding the most recent sample
///
/// Always sized to the native resolution of the last sampled frame.
#[derive(Debug, Clone, Default)]
pub struct FrameBuffer {
    image: RgbaImage,
}

impl FrameBuffer {
    /// Empty 0×0 buffer
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

/// Result of a sampling attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// The buffer now holds the current frame
    Sampled,
    /// No decodable frame yet; retry on the next tick
    NotReady,
}

/// Copy the stream's current frame into `buffer` at native resolution
///
/// Fails with [`CameraError::DeviceLost`] once the device is disconnected.
pub fn sample_into(
    source: &mut dyn MediaStream,
    buffer: &mut FrameBuffer,
) -> Result<SampleOutcome, CameraError> {
    let Some(frame) = source.current_frame()? else {
        trace!("No frame buffered yet");
        return Ok(SampleOutcome::NotReady);
    };

    let Some(rgba) = frame_to_rgba(&frame) else {
        warn!(
            width = frame.width,
            height = frame.height,
            format = ?frame.format,
            len = frame.data.len(),
            "Frame data does not match its geometry"
        );
        return Ok(SampleOutcome::NotReady);
    };

    match RgbaImage::from_raw(frame.width, frame.height, rgba) {
        Some(image) => {
            buffer.image = image;
            trace!(width = frame.width, height = frame.height, "Frame sampled");
            Ok(SampleOutcome::Sampled)
        }
        None => Ok(SampleOutcome::NotReady),
    }
}

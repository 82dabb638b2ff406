// SPDX-License-Identifier: GPL-3.0-only
//! Pixel format conversion to tightly packed RGBA
//!
//! Conversions are per pixel only: no scaling, no filtering. Row padding
//! (`stride > width * bytes_per_pixel`) is skipped.

use crate::backends::camera::types::{CameraFrame, PixelFormat};

/// Convert a frame to tightly packed RGBA
///
/// Returns `None` if the frame data is shorter than its declared geometry.
pub fn frame_to_rgba(frame: &CameraFrame) -> Option<Vec<u8>> {
    let width = frame.width as usize;
    let height = frame.height as usize;
    let stride = frame.stride as usize;
    let row_bytes = width * frame.format.bytes_per_pixel() as usize;

    if stride < row_bytes {
        return None;
    }
    if height > 0 && frame.data.len() < stride * (height - 1) + row_bytes {
        return None;
    }

    let mut rgba = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        let row = &frame.data[y * stride..y * stride + row_bytes];
        match frame.format {
            PixelFormat::RGBA => rgba.extend_from_slice(row),
            PixelFormat::BGRA => {
                for px in row.chunks_exact(4) {
                    rgba.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
                }
            }
            PixelFormat::RGB24 => {
                for px in row.chunks_exact(3) {
                    rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
                }
            }
            PixelFormat::Gray8 => {
                for &v in row {
                    rgba.extend_from_slice(&[v, v, v, 255]);
                }
            }
        }
    }

    Some(rgba)
}

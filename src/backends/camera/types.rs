// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use image::RgbaImage;
use std::sync::Arc;
use std::time::Instant;

/// Pixel format for camera frames
///
/// The frame sampler converts every supported format to RGBA without
/// resampling, so consumers only ever see RGBA buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// RGBA - 32-bit with alpha (4 bytes per pixel)
    RGBA,
    /// BGRA - 32-bit with alpha (B G R A byte order)
    BGRA,
    /// RGB24 - 24-bit RGB (3 bytes per pixel, no alpha)
    RGB24,
    /// Gray8 - 8-bit grayscale (single channel)
    Gray8,
}

impl PixelFormat {
    /// Bytes per pixel
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            Self::RGBA | Self::BGRA => 4,
            Self::RGB24 => 3,
            Self::Gray8 => 1,
        }
    }
}

/// A single frame from the camera at its native resolution
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// Pixel data, `stride` bytes per row
    pub data: Arc<[u8]>,
    /// Pixel format of the data
    pub format: PixelFormat,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
    /// Timestamp when frame was captured
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Wrap an RGBA image as a tightly packed frame
    pub fn from_rgba_image(image: &RgbaImage) -> Self {
        let width = image.width();
        Self {
            width,
            height: image.height(),
            data: Arc::from(image.as_raw().as_slice()),
            format: PixelFormat::RGBA,
            stride: width * 4,
            captured_at: Instant::now(),
        }
    }
}

/// What the device can do beyond streaming frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamCapabilities {
    /// Whether the stream exposes a controllable torch (flash LED)
    pub torch: bool,
}

/// Device permission lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    /// No request made, or the stream has been released
    #[default]
    Idle,
    /// Waiting on the user or the platform
    Requesting,
    /// A live stream is held
    Granted,
    /// Refused, or no usable device
    Denied,
}

impl std::fmt::Display for PermissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionState::Idle => write!(f, "idle"),
            PermissionState::Requesting => write!(f, "requesting"),
            PermissionState::Granted => write!(f, "granted"),
            PermissionState::Denied => write!(f, "denied"),
        }
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for backend operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The user or platform refused access
    PermissionDenied,
    /// Camera device not found
    DeviceNotFound(String),
    /// Backend is not available on this system
    NotAvailable(String),
    /// Device went away while streaming
    Disconnected(String),
    /// Capability not offered by the device
    Unsupported(String),
    /// General I/O error
    IoError(String),
    /// Other errors
    Other(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::PermissionDenied => write!(f, "Permission denied"),
            BackendError::DeviceNotFound(msg) => write!(f, "Device not found: {}", msg),
            BackendError::NotAvailable(msg) => write!(f, "Backend not available: {}", msg),
            BackendError::Disconnected(msg) => write!(f, "Device disconnected: {}", msg),
            BackendError::Unsupported(msg) => write!(f, "Not supported: {}", msg),
            BackendError::IoError(msg) => write!(f, "I/O error: {}", msg),
            BackendError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::IoError(err.to_string())
    }
}

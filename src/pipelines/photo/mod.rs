// SPDX-License-Identifier: GPL-3.0-only

//! Photo capture and annotation pipeline
//!
//! ```text
//! DeviceSession → CaptureEngine → EditSession → export
//!                   (scale to     (annotate,     (flatten,
//!                    viewport)     crop)          JPEG)
//! ```
//!
//! The photo and annotation layers live in a [`LayerStack`] that only the
//! capture step and the annotation engine mutate, both from the caller's
//! thread.

pub mod annotate;
pub mod capture;
pub mod encoding;
pub mod export;
pub mod geometry;
pub mod layers;
pub mod raster;

pub use annotate::{AnnotationEngine, AnnotationTool};
pub use capture::{CaptureEngine, EditSession, Viewport};
pub use encoding::{EncodedImage, EncodingFormat, PhotoEncoder};
pub use geometry::{CropRect, CropSelection, Point, Size};
pub use layers::{AnnotationSnapshot, LayerStack};

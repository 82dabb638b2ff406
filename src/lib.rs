// SPDX-License-Identifier: GPL-3.0-only

//! Fieldcam - photo capture, annotation and code scanning for record keeping
//!
//! A capture surface takes one still from a live camera, lets the user mark it
//! up with shapes, an eraser and a crop, and hands back a single flattened
//! JPEG. A scanner surface reads one QR code from the live stream instead.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Capture and scanner surfaces, code decoding, edit scripts
//! - [`backends`]: Camera backend abstraction, device session, file-backed camera
//! - [`media`]: Frame sampling and pixel format conversion
//! - [`pipelines`]: Photo capture, annotation layers and export
//! - [`config`]: User configuration handling
//! - [`flash`]: sysfs flash LEDs used as a torch
//!
//! # Example
//!
//! ```no_run
//! use fieldcam::app::{CaptureSurface, CollectedOutput};
//! use fieldcam::backends::virtual_camera::VirtualCamera;
//! use fieldcam::pipelines::photo::Viewport;
//! use std::sync::Arc;
//!
//! # async fn demo() -> fieldcam::errors::AppResult<()> {
//! let camera = Arc::new(VirtualCamera::from_files(&["desk.jpg"])?);
//! let mut surface = CaptureSurface::new(camera, Viewport::new(1280, 720), CollectedOutput::new());
//! surface.open().await;
//! while !surface.capture()? {}
//! surface.use_photo()?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod flash;
pub mod media;
pub mod pipelines;

// Re-export commonly used types
pub use app::{CapturePayload, CaptureSink, CaptureSurface, QrScanner};
pub use config::Config;
pub use errors::{AppError, AppResult};

// SPDX-License-Identifier: GPL-3.0-only

//! Host-facing capture surfaces
//!
//! A host embeds either a [`CaptureSurface`] (photo capture with
//! annotation) or a [`QrScanner`] (scan one code and close) and receives
//! results through a [`CaptureSink`].
//!
//! # Modules
//!
//! - `frame_processor`: code decoding and the polling scan loop
//! - `surface`: capture, edit and export state machine
//! - `qr_scanner`: scan-only surface
//! - `script`: replayable annotation gestures

pub mod frame_processor;
pub mod qr_scanner;
pub mod script;
pub mod surface;

pub use qr_scanner::QrScanner;
pub use script::{EditScript, EditStep};
pub use surface::{CaptureSurface, SurfacePhase};

use crate::pipelines::photo::EncodedImage;

/// What a surface hands back to its host
#[derive(Debug, Clone, PartialEq)]
pub enum CapturePayload {
    /// Exported photo, or a library file forwarded unchanged
    Image(EncodedImage),
    /// Raw text of a decoded code
    Text(String),
}

/// Receives the output of a capture surface
pub trait CaptureSink {
    /// Called at most once per surface, right before it closes
    fn on_capture(&mut self, payload: CapturePayload);

    /// Called exactly once when the surface closes, whatever the reason
    fn on_close(&mut self);
}

/// Sink that keeps everything it is given
#[derive(Debug, Default)]
pub struct CollectedOutput {
    pub payloads: Vec<CapturePayload>,
    pub closes: usize,
}

impl CollectedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// The single payload, if exactly one arrived
    pub fn payload(&self) -> Option<&CapturePayload> {
        match self.payloads.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

impl CaptureSink for CollectedOutput {
    fn on_capture(&mut self, payload: CapturePayload) {
        self.payloads.push(payload);
    }

    fn on_close(&mut self) {
        self.closes += 1;
    }
}

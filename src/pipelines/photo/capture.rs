// SPDX-License-Identifier: GPL-3.0-only

//! Still capture from a live device session
//!
//! Capturing freezes one frame at native resolution, scales it down to fit
//! the display viewport and hands back an [`EditSession`] holding the two
//! layers. The device is released as part of a successful capture.

use super::annotate::{AnnotationEngine, AnnotationTool};
use super::encoding::EncodedImage;
use super::export;
use super::geometry::{Point, Size, display_to_buffer};
use super::layers::LayerStack;
use crate::backends::camera::DeviceSession;
use crate::errors::{CameraError, PhotoError};
use crate::media::{FrameBuffer, SampleOutcome};
use image::RgbaImage;
use image::imageops::{self, FilterType};
use tracing::{debug, info};

/// Area the captured still is fitted into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Scale that fits a frame inside the viewport, capped at 1
    pub fn display_scale(&self, frame_width: u32, frame_height: u32) -> f64 {
        if frame_width == 0 || frame_height == 0 {
            return 1.0;
        }
        let sx = self.width as f64 / frame_width as f64;
        let sy = self.height as f64 / frame_height as f64;
        sx.min(sy).min(1.0)
    }

    /// Layer size for a frame of the given native size
    ///
    /// Each side is at least one pixel so a tiny viewport still yields a
    /// drawable layer.
    pub fn scaled_size(&self, frame_width: u32, frame_height: u32) -> (u32, u32) {
        let scale = self.display_scale(frame_width, frame_height);
        let w = (frame_width as f64 * scale).round().max(1.0) as u32;
        let h = (frame_height as f64 * scale).round().max(1.0) as u32;
        (w, h)
    }
}

/// Freezes frames from a session into editable layers
pub struct CaptureEngine {
    viewport: Viewport,
    buffer: FrameBuffer,
}

impl CaptureEngine {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            buffer: FrameBuffer::new(),
        }
    }

    /// Capture the current frame
    ///
    /// Returns `Ok(None)` while the stream has no frame yet; the session stays
    /// live so the caller can try again. On success or device loss the
    /// session is released.
    pub fn capture(
        &mut self,
        session: &mut DeviceSession,
    ) -> Result<Option<EditSession>, CameraError> {
        match session.sample_into(&mut self.buffer) {
            Ok(SampleOutcome::NotReady) => {
                debug!("Capture requested before first frame");
                return Ok(None);
            }
            Ok(SampleOutcome::Sampled) => {}
            Err(e) => {
                session.release();
                return Err(e);
            }
        }

        let (frame_w, frame_h) = (self.buffer.width(), self.buffer.height());
        let photo = fit_to_viewport(self.buffer.image(), self.viewport);
        info!(
            frame_width = frame_w,
            frame_height = frame_h,
            width = photo.width(),
            height = photo.height(),
            "Photo captured"
        );

        session.release();
        Ok(Some(EditSession::new(LayerStack::from_photo(photo))))
    }
}

/// Scale `frame` down to fit `viewport`, never up
fn fit_to_viewport(frame: &RgbaImage, viewport: Viewport) -> RgbaImage {
    let (w, h) = viewport.scaled_size(frame.width(), frame.height());
    if (w, h) == frame.dimensions() {
        frame.clone()
    } else {
        imageops::resize(frame, w, h, FilterType::Triangle)
    }
}

/// Captured photo under edit
///
/// Pointer positions are given in display space together with the size the
/// layers are currently shown at. The display-to-buffer ratio is recomputed
/// on every event because crop changes the buffer size mid-session.
#[derive(Debug)]
pub struct EditSession {
    layers: LayerStack,
    engine: AnnotationEngine,
}

impl EditSession {
    pub fn new(layers: LayerStack) -> Self {
        Self {
            layers,
            engine: AnnotationEngine::new(),
        }
    }

    /// Re-enter editing from an existing encoded image
    ///
    /// The image is shown at its own size; no viewport scaling is applied.
    pub fn from_encoded(bytes: &[u8]) -> Result<Self, PhotoError> {
        let photo = image::load_from_memory(bytes)
            .map_err(|e| PhotoError::ImportFailed(e.to_string()))?
            .to_rgba8();
        info!(
            width = photo.width(),
            height = photo.height(),
            "Editing existing image"
        );
        Ok(Self::new(LayerStack::from_photo(photo)))
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    pub fn engine(&self) -> &AnnotationEngine {
        &self.engine
    }

    pub fn active_tool(&self) -> Option<AnnotationTool> {
        self.engine.active_tool()
    }

    /// Select `tool`, or deselect it if already active
    pub fn select_tool(&mut self, tool: AnnotationTool) -> Option<AnnotationTool> {
        self.engine.select_tool(tool)
    }

    pub fn pointer_down(&mut self, at: Point, display: Size) {
        let at = self.to_buffer(at, display);
        self.engine.pointer_down(&mut self.layers, at);
    }

    pub fn pointer_move(&mut self, at: Point, display: Size) {
        let at = self.to_buffer(at, display);
        self.engine.pointer_move(&mut self.layers, at);
    }

    pub fn pointer_up(&mut self) {
        self.engine.pointer_up();
    }

    /// Crop to the current selection; `false` if there was nothing to apply
    pub fn apply_crop(&mut self) -> bool {
        self.engine.apply_crop(&mut self.layers)
    }

    /// Drop every annotation and tool state, keeping the photo
    pub fn clear(&mut self) {
        self.layers.clear_annotation();
        self.engine.reset();
    }

    /// Flatten and encode for hand-off
    pub fn export(&self) -> Result<EncodedImage, PhotoError> {
        export::flatten_and_encode(&self.layers)
    }

    fn to_buffer(&self, at: Point, display: Size) -> Point {
        display_to_buffer(at, display, Size::from_pixels(self.layers.size()))
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! Photo capture surface
//!
//! ```text
//!  Idle ──open()──▶ Requesting ──▶ Live ──capture()──▶ Editing ──use_photo()──▶ Closed
//!                        │          ▲                     │
//!                        ▼          └─────retake()────────┘
//!                     Denied ──retry()──▶ Requesting
//! ```
//!
//! Library import is reachable from `Live` and `Denied`; `close()` is
//! reachable from everywhere. Leaving `Live` for any reason releases the
//! device, and the sink's `on_close` fires exactly once.

use super::{CapturePayload, CaptureSink};
use crate::backends::camera::{CameraBackend, DeviceSession, PermissionState};
use crate::errors::{AppError, AppResult, CameraError, PhotoError};
use crate::pipelines::photo::{CaptureEngine, EditSession, EncodedImage, Viewport, export};
use std::path::Path;
use std::sync::Arc;
use tracing::{Instrument, Span, debug, info, info_span, warn};
use uuid::Uuid;

/// Where the surface is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfacePhase {
    #[default]
    Idle,
    /// Waiting on the permission prompt
    Requesting,
    /// Showing the live preview
    Live,
    /// Access refused; only retry, import or close are possible
    Denied,
    /// A still is frozen and can be annotated
    Editing,
    Closed,
}

/// Live preview, capture, annotation and export for one record
pub struct CaptureSurface<S: CaptureSink> {
    id: Uuid,
    span: Span,
    session: DeviceSession,
    engine: CaptureEngine,
    editor: Option<EditSession>,
    sink: S,
    phase: SurfacePhase,
}

impl<S: CaptureSink> CaptureSurface<S> {
    pub fn new(backend: Arc<dyn CameraBackend>, viewport: Viewport, sink: S) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            span: info_span!("capture_surface", id = %id),
            session: DeviceSession::new(backend),
            engine: CaptureEngine::new(viewport),
            editor: None,
            sink,
            phase: SurfacePhase::Idle,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> SurfacePhase {
        self.phase
    }

    pub fn session(&self) -> &DeviceSession {
        &self.session
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Ask for the camera and enter the live preview
    ///
    /// Ignored unless the surface is idle or denied.
    pub async fn open(&mut self) -> SurfacePhase {
        if !matches!(self.phase, SurfacePhase::Idle | SurfacePhase::Denied) {
            debug!(phase = ?self.phase, "Open ignored");
            return self.phase;
        }
        let span = self.span.clone();
        self.enter_preview().instrument(span).await
    }

    /// Re-run the permission flow from scratch after a denial
    pub async fn retry(&mut self) -> SurfacePhase {
        if self.phase != SurfacePhase::Denied {
            return self.phase;
        }
        info!(parent: &self.span, "Retrying camera access");
        self.open().await
    }

    async fn enter_preview(&mut self) -> SurfacePhase {
        self.phase = SurfacePhase::Requesting;
        self.phase = match self.session.request_access().await {
            PermissionState::Granted => SurfacePhase::Live,
            _ => SurfacePhase::Denied,
        };
        info!(phase = ?self.phase, "Preview state");
        self.phase
    }

    /// Flip the torch; a no-op when unsupported or not live
    pub fn toggle_torch(&mut self) {
        if self.phase == SurfacePhase::Live {
            self.session.toggle_torch();
        }
    }

    /// Freeze the current frame for editing
    ///
    /// Returns `Ok(false)` if the preview has no frame yet. Losing the device
    /// releases it and moves to `Denied`, where retry and import remain.
    pub fn capture(&mut self) -> AppResult<bool> {
        let _enter = self.span.enter();
        if self.phase != SurfacePhase::Live {
            return Err(CameraError::NotGranted.into());
        }

        match self.engine.capture(&mut self.session) {
            Ok(Some(editor)) => {
                self.editor = Some(editor);
                self.phase = SurfacePhase::Editing;
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(e) => {
                warn!(error = %e, "Capture failed");
                self.session.release();
                self.phase = SurfacePhase::Denied;
                Err(e.into())
            }
        }
    }

    /// The photo under edit
    pub fn editor(&self) -> AppResult<&EditSession> {
        self.editor.as_ref().ok_or(AppError::Photo(PhotoError::NotEditing))
    }

    /// Mutable access to the photo under edit
    ///
    /// Annotation is only reachable through this, so it cannot happen outside
    /// the editing phase.
    pub fn editor_mut(&mut self) -> AppResult<&mut EditSession> {
        self.editor.as_mut().ok_or(AppError::Photo(PhotoError::NotEditing))
    }

    /// Throw away the still and its annotations and go back to the preview
    pub async fn retake(&mut self) -> AppResult<SurfacePhase> {
        if self.phase != SurfacePhase::Editing {
            return Err(PhotoError::NotEditing.into());
        }
        self.editor = None;
        info!(parent: &self.span, "Retake");
        let span = self.span.clone();
        Ok(self.enter_preview().instrument(span).await)
    }

    /// Export the edited photo to the sink and close
    pub fn use_photo(&mut self) -> AppResult<()> {
        let _enter = self.span.enter();
        let encoded = self.editor()?.export()?;
        info!(
            width = encoded.width,
            height = encoded.height,
            size = encoded.data.len(),
            "Photo exported"
        );
        drop(_enter);
        self.deliver(encoded);
        Ok(())
    }

    /// Forward an existing image unchanged and close
    ///
    /// Available from the live preview and from the denied screen. A file
    /// that is not an image is rejected without leaving the current phase.
    pub fn import_from_library(&mut self, bytes: Vec<u8>) -> AppResult<()> {
        if !matches!(self.phase, SurfacePhase::Live | SurfacePhase::Denied) {
            return Err(AppError::Other(format!(
                "library import not available while {:?}",
                self.phase
            )));
        }
        let payload = {
            let _enter = self.span.enter();
            export::passthrough(bytes)?
        };
        self.deliver(payload);
        Ok(())
    }

    /// [`import_from_library`](Self::import_from_library) reading from disk
    pub async fn import_file(&mut self, path: &Path) -> AppResult<()> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PhotoError::ImportFailed(format!("{}: {}", path.display(), e)))?;
        self.import_from_library(bytes)
    }

    /// Start editing an existing image instead of capturing
    ///
    /// The device is not touched; a live stream, if any, is released.
    pub fn open_with_image(&mut self, bytes: &[u8]) -> AppResult<()> {
        if matches!(self.phase, SurfacePhase::Closed | SurfacePhase::Editing) {
            return Err(AppError::Other(format!(
                "cannot load an image while {:?}",
                self.phase
            )));
        }
        let _enter = self.span.enter();
        let editor = EditSession::from_encoded(bytes)?;
        self.session.release();
        self.editor = Some(editor);
        self.phase = SurfacePhase::Editing;
        Ok(())
    }

    /// Dismiss the surface
    ///
    /// Safe in every phase and idempotent: the device is released, layers are
    /// dropped, and the sink hears `on_close` only the first time.
    pub fn close(&mut self) {
        let _enter = self.span.enter();
        self.session.release();
        self.editor = None;
        if self.phase == SurfacePhase::Closed {
            return;
        }
        self.phase = SurfacePhase::Closed;
        info!("Capture surface closed");
        self.sink.on_close();
    }

    fn deliver(&mut self, image: EncodedImage) {
        self.session.release();
        self.sink.on_capture(CapturePayload::Image(image));
        self.close();
    }
}

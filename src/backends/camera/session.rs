// SPDX-License-Identifier: GPL-3.0-only

//! Device session management
//!
//! A [`DeviceSession`] owns at most one live stream at a time. The stream sits
//! inside a [`StreamGuard`] whose `Drop` stops it, so every exit path
//! (explicit close, retake, decode success, capture success, or the session
//! simply being dropped during teardown) releases the device.

use super::{CameraBackend, MediaStream, PermissionState};
use crate::errors::CameraError;
use crate::media::{FrameBuffer, SampleOutcome, sample_into};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Owns a live stream and stops it when dropped
pub struct StreamGuard {
    stream: Box<dyn MediaStream>,
}

impl StreamGuard {
    fn new(stream: Box<dyn MediaStream>) -> Self {
        Self { stream }
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.stream.stop();
        debug!("Camera stream stopped");
    }
}

/// Camera permission and stream lifecycle
///
/// Invariant: `stream.is_some()` iff `state == Granted`.
pub struct DeviceSession {
    backend: Arc<dyn CameraBackend>,
    state: PermissionState,
    torch_supported: bool,
    torch_enabled: bool,
    stream: Option<StreamGuard>,
}

impl DeviceSession {
    /// Create an idle session for `backend`
    pub fn new(backend: Arc<dyn CameraBackend>) -> Self {
        Self {
            backend,
            state: PermissionState::Idle,
            torch_supported: false,
            torch_enabled: false,
            stream: None,
        }
    }

    pub fn permission_state(&self) -> PermissionState {
        self.state
    }

    pub fn is_granted(&self) -> bool {
        self.state == PermissionState::Granted
    }

    pub fn torch_supported(&self) -> bool {
        self.torch_supported
    }

    pub fn torch_enabled(&self) -> bool {
        self.torch_enabled
    }

    /// Request access to the camera
    ///
    /// Any stream still held is released first so two handles never coexist.
    /// Every acquisition failure lands in `Denied`.
    pub async fn request_access(&mut self) -> PermissionState {
        self.release();
        self.state = PermissionState::Requesting;
        info!(backend = self.backend.name(), "Requesting camera access");

        match self.backend.acquire().await {
            Ok(stream) => {
                let capabilities = stream.capabilities();
                self.torch_supported = capabilities.torch;
                self.torch_enabled = false;
                self.stream = Some(StreamGuard::new(stream));
                self.state = PermissionState::Granted;
                info!(torch = capabilities.torch, "Camera access granted");
            }
            Err(e) => {
                warn!(error = %e, "Camera access denied");
                self.state = PermissionState::Denied;
            }
        }

        self.state
    }

    /// Flip the torch
    ///
    /// Ignored without a stream or torch support. State only changes when the
    /// device accepts the request; rejections are logged and swallowed.
    pub fn toggle_torch(&mut self) {
        if !self.torch_supported {
            return;
        }
        let Some(guard) = self.stream.as_mut() else {
            return;
        };

        let target = !self.torch_enabled;
        match guard.stream.set_torch(target) {
            Ok(()) => {
                self.torch_enabled = target;
                debug!(enabled = target, "Torch toggled");
            }
            Err(e) => {
                warn!(error = %e, "Torch toggle rejected");
            }
        }
    }

    /// Copy the current frame into `buffer`
    ///
    /// Fails with `NotGranted` without a stream and `DeviceLost` once the
    /// device is gone. The stream is kept either way; releasing is up to the
    /// caller.
    pub fn sample_into(&mut self, buffer: &mut FrameBuffer) -> Result<SampleOutcome, CameraError> {
        match self.stream.as_mut() {
            Some(guard) => sample_into(guard.stream.as_mut(), buffer),
            None => Err(CameraError::NotGranted),
        }
    }

    /// Stop the stream and drop the handle
    ///
    /// Returns whether a stream was actually released; a second call is a no-op.
    pub fn release(&mut self) -> bool {
        let Some(guard) = self.stream.take() else {
            return false;
        };
        drop(guard);

        self.torch_enabled = false;
        self.torch_supported = false;
        if self.state == PermissionState::Granted {
            self.state = PermissionState::Idle;
        }
        info!("Camera released");
        true
    }
}

impl std::fmt::Debug for DeviceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceSession")
            .field("backend", &self.backend.name())
            .field("state", &self.state)
            .field("torch_supported", &self.torch_supported)
            .field("torch_enabled", &self.torch_enabled)
            .field("streaming", &self.stream.is_some())
            .finish()
    }
}

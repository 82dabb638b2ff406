// SPDX-License-Identifier: GPL-3.0-only

//! Code scanning loop
//!
//! The scanner is a cooperative state machine: each [`CodeScanner::tick`]
//! samples one frame and makes one decode attempt. A driver calls `tick` once
//! per display refresh until it reports a result or the loop is cancelled
//! through a [`ScanHandle`]. Cancellation is checked before every tick.
//!
//! ```text
//!   inactive ──start()──▶ scanning ──found──▶ inactive
//!       ▲                    │
//!       └──────stop()────────┘
//! ```

use super::tasks::{CodeReader, QrDetector};
use super::types::DecodeResult;
use crate::backends::camera::DeviceSession;
use crate::errors::CameraError;
use crate::media::{FrameBuffer, SampleOutcome};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, trace, warn};

/// Cancellation handle for a running scan loop
///
/// Cloneable and cheap; cancelling is permanent for the scan it was issued by.
#[derive(Debug, Clone, Default)]
pub struct ScanHandle {
    stop_signal: Arc<AtomicBool>,
}

impl ScanHandle {
    fn new() -> Self {
        Self::default()
    }

    /// Request the loop to stop before its next tick
    pub fn cancel(&self) {
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.stop_signal.load(Ordering::SeqCst)
    }
}

/// Externally observable scanner state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    #[default]
    Inactive,
    Scanning,
}

/// Outcome of one loop iteration
#[derive(Debug, Clone, PartialEq)]
pub enum ScanTick {
    /// Not scanning (never started, stopped, cancelled or already found)
    Stopped,
    /// The stream has no frame yet
    NotReady,
    /// A frame was searched and held no code
    Miss,
    /// A code was decoded; the scanner is now inactive for good
    Found(DecodeResult),
}

/// Polling code scanner
pub struct CodeScanner<R: CodeReader = QrDetector> {
    reader: R,
    state: ScanState,
    handle: ScanHandle,
    buffer: FrameBuffer,
}

impl CodeScanner<QrDetector> {
    /// Scanner using the default QR detector
    pub fn qr() -> Self {
        Self::new(QrDetector::new())
    }
}

impl<R: CodeReader> CodeScanner<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            state: ScanState::Inactive,
            handle: ScanHandle::new(),
            buffer: FrameBuffer::new(),
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn is_scanning(&self) -> bool {
        self.state == ScanState::Scanning
    }

    /// Begin scanning and return the handle that cancels this scan
    pub fn start(&mut self) -> ScanHandle {
        self.handle = ScanHandle::new();
        self.state = ScanState::Scanning;
        info!("Code scanning started");
        self.handle.clone()
    }

    /// Handle for the current scan
    pub fn handle(&self) -> ScanHandle {
        self.handle.clone()
    }

    /// Cancel any pending tick; safe to call repeatedly
    pub fn stop(&mut self) {
        self.handle.cancel();
        if self.state == ScanState::Scanning {
            debug!("Code scanning stopped");
        }
        self.state = ScanState::Inactive;
    }

    /// Run one iteration of the loop
    ///
    /// On success the device is released before the result is returned, and
    /// every later tick reports [`ScanTick::Stopped`]. Losing the stream while
    /// scanning is the only error; the scan stops and the device is released.
    pub fn tick(&mut self, session: &mut DeviceSession) -> Result<ScanTick, CameraError> {
        if self.state != ScanState::Scanning || self.handle.is_cancelled() {
            self.state = ScanState::Inactive;
            return Ok(ScanTick::Stopped);
        }

        match session.sample_into(&mut self.buffer) {
            Ok(SampleOutcome::Sampled) => {}
            Ok(SampleOutcome::NotReady) => return Ok(ScanTick::NotReady),
            Err(e) => {
                self.stop();
                session.release();
                warn!(error = %e, "Stream lost while scanning");
                return Err(e);
            }
        }

        match self.reader.decode(self.buffer.image()) {
            Some(result) => {
                self.stop();
                session.release();
                info!(content = %result.content, "Code decoded");
                Ok(ScanTick::Found(result))
            }
            None => {
                trace!("No code in frame");
                Ok(ScanTick::Miss)
            }
        }
    }
}

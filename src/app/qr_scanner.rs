// SPDX-License-Identifier: GPL-3.0-only

//! Scan-only surface
//!
//! Opens the camera, polls for a code once per display refresh and closes as
//! soon as one is decoded. The decoded text goes to the sink unchanged; what
//! it means is up to the host.

use super::frame_processor::{
    CodeReader, CodeScanner, DecodeResult, InversionMode, QrDetector, ScanHandle, ScanTick,
};
use super::{CapturePayload, CaptureSink};
use crate::backends::camera::{CameraBackend, DeviceSession, PermissionState};
use crate::constants::scanning::DEFAULT_SCAN_INTERVAL;
use crate::errors::AppResult;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Live preview that emits the first decoded code and closes
pub struct QrScanner<S: CaptureSink, R: CodeReader = QrDetector> {
    session: DeviceSession,
    scanner: CodeScanner<R>,
    sink: S,
    interval: Duration,
    closed: bool,
}

impl<S: CaptureSink> QrScanner<S, QrDetector> {
    /// Scanner using the QR detector in the given search mode
    pub fn new(backend: Arc<dyn CameraBackend>, inversion: InversionMode, sink: S) -> Self {
        Self::with_reader(backend, QrDetector::with_inversion(inversion), sink)
    }
}

impl<S: CaptureSink, R: CodeReader> QrScanner<S, R> {
    pub fn with_reader(backend: Arc<dyn CameraBackend>, reader: R, sink: S) -> Self {
        Self {
            session: DeviceSession::new(backend),
            scanner: CodeScanner::new(reader),
            sink,
            interval: DEFAULT_SCAN_INTERVAL,
            closed: false,
        }
    }

    /// Time between decode attempts
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
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

    pub fn is_scanning(&self) -> bool {
        self.scanner.is_scanning()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Handle that cancels the running scan from elsewhere
    pub fn handle(&self) -> ScanHandle {
        self.scanner.handle()
    }

    /// Request the camera and start scanning if granted
    ///
    /// Calling it again after a denial re-runs the permission flow.
    pub async fn open(&mut self) -> PermissionState {
        if self.closed {
            return self.session.permission_state();
        }
        if self.scanner.is_scanning() {
            self.scanner.stop();
        }
        let state = self.session.request_access().await;
        if state == PermissionState::Granted {
            self.scanner.start();
        }
        state
    }

    /// One cooperative step of the loop
    ///
    /// A decoded code is sent to the sink and the surface closes. A cancelled
    /// scan also closes. Device loss closes and is returned as an error.
    pub fn tick(&mut self) -> AppResult<ScanTick> {
        if self.closed {
            return Ok(ScanTick::Stopped);
        }

        match self.scanner.tick(&mut self.session) {
            Ok(ScanTick::Found(result)) => {
                self.sink.on_capture(CapturePayload::Text(result.content.clone()));
                self.close();
                Ok(ScanTick::Found(result))
            }
            Ok(ScanTick::Stopped) => {
                if self.scanner.handle().is_cancelled() {
                    self.close();
                }
                Ok(ScanTick::Stopped)
            }
            Ok(tick) => Ok(tick),
            Err(e) => {
                warn!(error = %e, "Scanning stopped by device error");
                self.close();
                Err(e.into())
            }
        }
    }

    /// Drive [`tick`](Self::tick) on a timer until a code is found or the
    /// scan ends
    ///
    /// Late ticks are delayed rather than bunched up, so a slow decode never
    /// causes a burst of back-to-back attempts.
    pub async fn run(&mut self) -> AppResult<Option<DecodeResult>> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match self.tick()? {
                ScanTick::Found(result) => return Ok(Some(result)),
                ScanTick::Stopped => return Ok(None),
                ScanTick::NotReady | ScanTick::Miss => {}
            }
        }
    }

    /// Stop scanning, release the camera and tell the sink; idempotent
    pub fn close(&mut self) {
        self.scanner.stop();
        self.session.release();
        if self.closed {
            return;
        }
        self.closed = true;
        info!("QR scanner closed");
        self.sink.on_close();
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! File-backed camera
//!
//! Serves still images as a live stream. Used by the command line tool to run
//! the capture and scanning pipelines on existing pictures, and by the tests
//! as a scriptable device. The permission outcome, prompt latency, torch
//! behavior and number of polls before the first frame is "buffered" are all
//! configurable. The device can be unplugged mid-stream, and every
//! acquisition and release is counted.

pub mod file_source;

pub use file_source::load_image_as_frame;

use crate::backends::camera::{
    BackendError, BackendResult, CameraBackend, CameraFrame, MediaStream, StreamCapabilities,
};
use crate::flash::{self, FlashDevice};
use futures::future::BoxFuture;
use image::RgbaImage;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// Torch behavior of the virtual device
#[derive(Debug, Clone, Default)]
pub enum TorchSupport {
    /// No torch capability
    #[default]
    Unsupported,
    /// Torch is reported and every toggle succeeds
    Virtual,
    /// Torch is reported but the device rejects every toggle
    Rejecting,
    /// Real sysfs flash LEDs act as the torch
    Flash(Vec<FlashDevice>),
}

/// Stream lifecycle counters shared with every stream the camera hands out
#[derive(Debug, Default)]
pub struct StreamStats {
    acquisitions: AtomicUsize,
    releases: AtomicUsize,
}

impl StreamStats {
    /// Streams handed out so far
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    /// Streams stopped so far
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    /// Streams currently live
    pub fn active(&self) -> usize {
        self.acquisitions() - self.releases()
    }
}

/// Camera backend serving a fixed sequence of frames
pub struct VirtualCamera {
    frames: Arc<[CameraFrame]>,
    grant_access: AtomicBool,
    connected: Arc<AtomicBool>,
    warmup_polls: usize,
    prompt_delay: Option<Duration>,
    torch: TorchSupport,
    stats: Arc<StreamStats>,
}

impl VirtualCamera {
    /// Camera cycling through `frames`; an empty list behaves like no device
    pub fn new(frames: Vec<CameraFrame>) -> Self {
        Self {
            frames: Arc::from(frames),
            grant_access: AtomicBool::new(true),
            connected: Arc::new(AtomicBool::new(true)),
            warmup_polls: 0,
            prompt_delay: None,
            torch: TorchSupport::default(),
            stats: Arc::new(StreamStats::default()),
        }
    }

    /// Camera cycling through in-memory images
    pub fn from_images(images: Vec<RgbaImage>) -> Self {
        Self::new(images.iter().map(CameraFrame::from_rgba_image).collect())
    }

    /// Camera cycling through image files
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> BackendResult<Self> {
        let frames = paths
            .iter()
            .map(|p| load_image_as_frame(p.as_ref()))
            .collect::<BackendResult<Vec<_>>>()?;
        info!(count = frames.len(), "Virtual camera loaded frames");
        Ok(Self::new(frames))
    }

    /// Refuse every access request until [`set_access_granted`](Self::set_access_granted)
    pub fn denying_access(self) -> Self {
        self.grant_access.store(false, Ordering::SeqCst);
        self
    }

    /// Report no frame for the first `polls` reads of each stream
    pub fn with_warmup(mut self, polls: usize) -> Self {
        self.warmup_polls = polls;
        self
    }

    /// Wait this long before answering an access request
    pub fn with_prompt_delay(mut self, delay: Duration) -> Self {
        self.prompt_delay = Some(delay);
        self
    }

    pub fn with_torch(mut self, torch: TorchSupport) -> Self {
        self.torch = torch;
        self
    }

    /// Change the answer to future access requests
    pub fn set_access_granted(&self, granted: bool) {
        self.grant_access.store(granted, Ordering::SeqCst);
    }

    /// Disconnect the device; live streams fail and new requests find nothing
    pub fn unplug(&self) {
        self.connected.store(false, Ordering::SeqCst);
        info!("Virtual camera unplugged");
    }

    pub fn stats(&self) -> Arc<StreamStats> {
        Arc::clone(&self.stats)
    }
}

impl CameraBackend for VirtualCamera {
    fn name(&self) -> &str {
        "virtual"
    }

    fn acquire(&self) -> BoxFuture<'_, BackendResult<Box<dyn MediaStream>>> {
        Box::pin(async move {
            if let Some(delay) = self.prompt_delay {
                tokio::time::sleep(delay).await;
            }

            if !self.grant_access.load(Ordering::SeqCst) {
                return Err(BackendError::PermissionDenied);
            }
            if self.frames.is_empty() || !self.connected.load(Ordering::SeqCst) {
                return Err(BackendError::DeviceNotFound("virtual camera has no frames".into()));
            }

            self.stats.acquisitions.fetch_add(1, Ordering::SeqCst);
            debug!(frames = self.frames.len(), "Virtual stream opened");

            let stream: Box<dyn MediaStream> = Box::new(VirtualStream {
                frames: Arc::clone(&self.frames),
                next: 0,
                warmup_remaining: self.warmup_polls,
                connected: Arc::clone(&self.connected),
                torch: self.torch.clone(),
                stats: Arc::clone(&self.stats),
                stopped: false,
            });
            Ok(stream)
        })
    }
}

/// Live stream handed out by [`VirtualCamera`]
struct VirtualStream {
    frames: Arc<[CameraFrame]>,
    next: usize,
    warmup_remaining: usize,
    connected: Arc<AtomicBool>,
    torch: TorchSupport,
    stats: Arc<StreamStats>,
    stopped: bool,
}

impl VirtualStream {
    fn check_live(&self) -> BackendResult<()> {
        if self.stopped {
            return Err(BackendError::Disconnected("stream stopped".into()));
        }
        if !self.connected.load(Ordering::SeqCst) {
            return Err(BackendError::Disconnected("virtual camera unplugged".into()));
        }
        Ok(())
    }
}

impl MediaStream for VirtualStream {
    fn capabilities(&self) -> StreamCapabilities {
        let torch = match &self.torch {
            TorchSupport::Unsupported => false,
            TorchSupport::Virtual | TorchSupport::Rejecting => true,
            TorchSupport::Flash(devices) => !devices.is_empty(),
        };
        StreamCapabilities { torch }
    }

    fn current_frame(&mut self) -> BackendResult<Option<CameraFrame>> {
        self.check_live()?;
        if self.warmup_remaining > 0 {
            self.warmup_remaining -= 1;
            return Ok(None);
        }

        let frame = self.frames.get(self.next % self.frames.len()).cloned();
        self.next += 1;
        Ok(frame)
    }

    fn set_torch(&mut self, enabled: bool) -> BackendResult<()> {
        self.check_live()?;
        match &self.torch {
            TorchSupport::Unsupported => Err(BackendError::Unsupported("torch".into())),
            TorchSupport::Virtual => Ok(()),
            TorchSupport::Rejecting => Err(BackendError::Other("torch request rejected".into())),
            TorchSupport::Flash(devices) => {
                for dev in devices {
                    if enabled {
                        dev.torch(1.0)?;
                    } else {
                        dev.off()?;
                    }
                }
                Ok(())
            }
        }
    }

    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;

        if let TorchSupport::Flash(devices) = &self.torch {
            flash::all_off(devices);
        }

        self.stats.releases.fetch_add(1, Ordering::SeqCst);
        debug!("Virtual stream stopped");
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend abstraction
//!
//! ```text
//! ┌─────────────────────┐
//! │  Capture / Scanner  │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │    DeviceSession    │  ← Permission state, torch, guaranteed release
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ CameraBackend Trait │  ← acquire() is the only suspension point
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │  MediaStream Trait  │  ← Frames, torch, stop
//! └─────────────────────┘
//! ```

pub mod session;
pub mod types;

pub use session::DeviceSession;
pub use types::*;

use futures::future::BoxFuture;

/// A source of camera streams
///
/// Acquisition may wait arbitrarily long on a permission prompt. Any failure,
/// whether refusal or a missing device, is reported through `BackendError`
/// and treated uniformly as a denial by [`DeviceSession`].
pub trait CameraBackend: Send + Sync {
    /// Human-readable backend name for logging
    fn name(&self) -> &str;

    /// Open a live stream on the device
    fn acquire(&self) -> BoxFuture<'_, BackendResult<Box<dyn MediaStream>>>;
}

/// A live, exclusively owned camera stream
pub trait MediaStream: Send {
    /// Capabilities reported by the device for this stream
    fn capabilities(&self) -> StreamCapabilities;

    /// The current frame, or `None` while the stream has not buffered one yet
    ///
    /// A device that went away reports [`BackendError::Disconnected`].
    fn current_frame(&mut self) -> BackendResult<Option<CameraFrame>>;

    /// Switch the torch on or off
    fn set_torch(&mut self, enabled: bool) -> BackendResult<()>;

    /// Stop all tracks; further frames are not delivered
    fn stop(&mut self);
}

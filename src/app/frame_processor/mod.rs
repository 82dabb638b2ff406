// SPDX-License-Identifier: GPL-3.0-only

//! Frame processor module for code scanning
//!
//! This module samples camera frames on a polling loop and runs them through
//! a code reader until the first successful decode.

pub mod scanner;
pub mod tasks;
pub mod types;

pub use scanner::{CodeScanner, ScanHandle, ScanState, ScanTick};
pub use tasks::{CodeReader, QrDetector, qr_detector};
pub use types::{DecodeResult, FrameRegion, InversionMode};

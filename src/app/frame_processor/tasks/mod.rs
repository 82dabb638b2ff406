// SPDX-License-Identifier: GPL-3.0-only

//! Frame processing tasks
//!
//! This module contains the reader abstraction and implementations for
//! frame analysis tasks.

pub mod qr_detector;

pub use qr_detector::{CodeReader, QrDetector};

// SPDX-License-Identifier: GPL-3.0-only

//! Frame sampling and pixel format conversion
//!
//! # Modules
//!
//! - [`format_converters`]: stride-aware conversion of camera pixel formats to RGBA
//! - [`sampler`]: point-in-time copies of the live stream into an off-screen buffer

pub mod format_converters;
pub mod sampler;

pub use sampler::{FrameBuffer, SampleOutcome, sample_into};

// SPDX-License-Identifier: GPL-3.0-only

//! Processing pipelines
//!
//! - [`photo`]: still capture, layered annotation and JPEG export

pub mod photo;

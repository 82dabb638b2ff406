// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstraction layer for camera access
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │          Capture / Scanner surfaces          │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                   │
//! │  ┌──────────────────┐  ┌─────────────────┐  │
//! │  │  Device session  │  │ Virtual camera  │  │
//! │  │   (camera/)      │  │ (image files)   │  │
//! │  └──────────────────┘  └─────────────────┘  │
//! └─────────────────────────────────────────────┘
//! ```

pub mod camera;
pub mod virtual_camera;

// SPDX-License-Identifier: GPL-3.0-only

//! Hand-off of finished images
//!
//! An edited photo is flattened and JPEG-encoded. A library file is
//! forwarded as-is after checking that it is an image.

use super::encoding::{EncodedImage, PhotoEncoder};
use super::layers::LayerStack;
use crate::errors::PhotoError;
use std::path::Path;
use tracing::info;

/// Merge the layers (photo below, annotation above) and encode
pub fn flatten_and_encode(layers: &LayerStack) -> Result<EncodedImage, PhotoError> {
    let merged = layers.composite();
    PhotoEncoder::new().encode(&merged)
}

/// Forward encoded bytes unchanged
pub fn passthrough(bytes: Vec<u8>) -> Result<EncodedImage, PhotoError> {
    let payload = EncodedImage::from_encoded(bytes)?;
    info!(
        format = payload.format.extension(),
        width = payload.width,
        height = payload.height,
        "Forwarding library image"
    );
    Ok(payload)
}

/// Read an image file from the library and forward it unchanged
pub async fn passthrough_file(path: &Path) -> Result<EncodedImage, PhotoError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| PhotoError::ImportFailed(format!("{}: {}", path.display(), e)))?;
    passthrough(bytes)
}

// SPDX-License-Identifier: GPL-3.0-only

//! Photo and annotation raster layers
//!
//! The two layers always share one size. Every operation that changes the
//! size replaces both layers inside one `&mut self` call, so nothing can
//! observe them at different sizes.

use super::geometry::CropRect;
use image::{RgbaImage, imageops};
use tracing::{debug, info};

/// Saved annotation pixels, restored before each live shape preview
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationSnapshot(RgbaImage);

/// Photo layer below, annotation layer above
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStack {
    photo: RgbaImage,
    annotation: RgbaImage,
}

impl LayerStack {
    /// Stack with `photo` underneath a blank annotation layer
    pub fn from_photo(photo: RgbaImage) -> Self {
        let annotation = RgbaImage::new(photo.width(), photo.height());
        Self { photo, annotation }
    }

    pub fn size(&self) -> (u32, u32) {
        self.photo.dimensions()
    }

    pub fn photo(&self) -> &RgbaImage {
        &self.photo
    }

    pub fn annotation(&self) -> &RgbaImage {
        &self.annotation
    }

    /// Drawing access to the annotation layer
    pub(crate) fn annotation_mut(&mut self) -> &mut RgbaImage {
        &mut self.annotation
    }

    pub fn snapshot(&self) -> AnnotationSnapshot {
        AnnotationSnapshot(self.annotation.clone())
    }

    /// Put back annotation pixels saved by [`snapshot`](Self::snapshot)
    ///
    /// A snapshot from before a resize no longer fits and is ignored.
    pub fn restore(&mut self, snapshot: &AnnotationSnapshot) {
        if snapshot.0.dimensions() == self.annotation.dimensions() {
            self.annotation.copy_from_slice(&snapshot.0);
        } else {
            debug!("Discarding snapshot from a different layer size");
        }
    }

    /// Remove every mark from the annotation layer
    pub fn clear_annotation(&mut self) {
        self.annotation.fill(0);
    }

    /// Cut both layers down to `rect`
    ///
    /// Each layer is drawn into a fresh transparent buffer of the crop size,
    /// offset by the negative crop origin, then both buffers replace the
    /// layers together.
    pub fn crop(&mut self, rect: CropRect) {
        let extract = |layer: &RgbaImage| {
            let mut out = RgbaImage::new(rect.width, rect.height);
            imageops::replace(&mut out, layer, -rect.x, -rect.y);
            out
        };
        let photo = extract(&self.photo);
        let annotation = extract(&self.annotation);

        self.photo = photo;
        self.annotation = annotation;
        info!(
            x = rect.x,
            y = rect.y,
            width = rect.width,
            height = rect.height,
            "Layers cropped"
        );
    }

    /// Flatten into one bitmap: photo first, annotation on top
    pub fn composite(&self) -> RgbaImage {
        let mut merged = self.photo.clone();
        imageops::overlay(&mut merged, &self.annotation, 0, 0);
        merged
    }
}

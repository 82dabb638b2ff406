// SPDX-License-Identifier: GPL-3.0-only

//! Photo encoding
//!
//! Exported photos are always JPEG at a fixed quality. Library imports keep
//! whatever format the file already has, so [`EncodingFormat`] also covers
//! the formats accepted there.

use crate::constants::export::JPEG_QUALITY;
use crate::errors::PhotoError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use std::io::Cursor;
use tracing::{debug, info};

/// Formats an encoded payload can be in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingFormat {
    /// JPEG format (lossy compression)
    Jpeg,
    /// PNG format (lossless compression)
    Png,
    Gif,
    Bmp,
    WebP,
}

impl EncodingFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            EncodingFormat::Jpeg => "jpg",
            EncodingFormat::Png => "png",
            EncodingFormat::Gif => "gif",
            EncodingFormat::Bmp => "bmp",
            EncodingFormat::WebP => "webp",
        }
    }

    /// MIME type of the payload
    pub fn mime_type(&self) -> &'static str {
        match self {
            EncodingFormat::Jpeg => "image/jpeg",
            EncodingFormat::Png => "image/png",
            EncodingFormat::Gif => "image/gif",
            EncodingFormat::Bmp => "image/bmp",
            EncodingFormat::WebP => "image/webp",
        }
    }

    fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(EncodingFormat::Jpeg),
            ImageFormat::Png => Some(EncodingFormat::Png),
            ImageFormat::Gif => Some(EncodingFormat::Gif),
            ImageFormat::Bmp => Some(EncodingFormat::Bmp),
            ImageFormat::WebP => Some(EncodingFormat::WebP),
            _ => None,
        }
    }
}

/// Encoded image data ready to hand over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub format: EncodingFormat,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    /// Wrap existing encoded bytes without re-encoding
    ///
    /// The bytes must be a supported image; only the header is read.
    pub fn from_encoded(data: Vec<u8>) -> Result<Self, PhotoError> {
        let reader = ImageReader::new(Cursor::new(&data))
            .with_guessed_format()
            .map_err(|e| PhotoError::ImportFailed(e.to_string()))?;

        let format = reader
            .format()
            .and_then(EncodingFormat::from_image_format)
            .ok_or_else(|| PhotoError::ImportFailed("unrecognized image format".into()))?;

        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| PhotoError::ImportFailed(e.to_string()))?;

        Ok(Self {
            data,
            format,
            width,
            height,
        })
    }

    /// Decode back to RGBA pixels
    pub fn decode(&self) -> Result<RgbaImage, PhotoError> {
        let img = image::load_from_memory(&self.data)?;
        Ok(img.to_rgba8())
    }
}

/// JPEG photo encoder
pub struct PhotoEncoder {
    quality: u8,
}

impl Default for PhotoEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PhotoEncoder {
    /// Encoder at the export quality
    pub fn new() -> Self {
        Self {
            quality: JPEG_QUALITY,
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode a flattened bitmap
    ///
    /// JPEG has no alpha channel; transparent pixels are written as their
    /// color channels.
    pub fn encode(&self, image: &RgbaImage) -> Result<EncodedImage, PhotoError> {
        info!(
            width = image.width(),
            height = image.height(),
            quality = self.quality,
            "Encoding photo"
        );

        let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
        let mut data = Vec::new();
        JpegEncoder::new_with_quality(&mut data, self.quality).encode_image(&rgb)?;

        debug!(size = data.len(), "Encoding complete");

        Ok(EncodedImage {
            data,
            format: EncodingFormat::Jpeg,
            width: image.width(),
            height: image.height(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_jpeg_encode_dimensions() {
        let img = RgbaImage::from_pixel(33, 17, Rgba([200, 100, 50, 255]));
        let encoded = PhotoEncoder::new().encode(&img).expect("encode");

        assert_eq!(encoded.format, EncodingFormat::Jpeg);
        assert_eq!(&encoded.data[..2], &[0xFF, 0xD8]);
        let decoded = encoded.decode().expect("decode");
        assert_eq!(decoded.dimensions(), (33, 17));
    }

    #[test]
    fn test_default_quality() {
        assert_eq!(PhotoEncoder::default().quality(), 90);
    }

    #[test]
    fn test_from_encoded_keeps_bytes() {
        let img = RgbaImage::from_pixel(5, 4, Rgba([1, 2, 3, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode");

        let payload = EncodedImage::from_encoded(bytes.clone()).expect("payload");
        assert_eq!(payload.data, bytes);
        assert_eq!(payload.format, EncodingFormat::Png);
        assert_eq!((payload.width, payload.height), (5, 4));
        assert_eq!(payload.format.mime_type(), "image/png");
    }

    #[test]
    fn test_from_encoded_rejects_garbage() {
        let err = EncodedImage::from_encoded(b"not an image".to_vec()).unwrap_err();
        assert!(matches!(err, PhotoError::ImportFailed(_)));
    }
}

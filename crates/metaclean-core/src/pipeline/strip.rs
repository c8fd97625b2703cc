//! Metadata removal by decoding and re-encoding pixel data.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ColorType, DynamicImage, ImageFormat};
use std::io::Cursor;

use crate::config::StrippingConfig;
use crate::error::StripError;

/// Removes embedded metadata from an encoded image.
///
/// Implementations must be pure with respect to the filesystem: bytes in,
/// bytes out.
pub trait MetadataStripper: Send + Sync {
    /// Return `data` re-encoded without metadata, or fail if the content is
    /// unsupported or corrupt.
    fn strip(&self, data: &[u8]) -> Result<Vec<u8>, StripError>;
}

/// Formats the stripper can write back.
const REENCODABLE: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Tiff,
    ImageFormat::WebP,
];

/// [`MetadataStripper`] backed by the `image` crate.
///
/// The encoders only write pixel data, so EXIF, XMP, ICC profiles and text
/// chunks are all dropped. The output keeps the input's format, which is
/// detected from content rather than the file extension.
pub struct ImageStripper {
    config: StrippingConfig,
}

impl ImageStripper {
    pub fn new(config: StrippingConfig) -> Self {
        Self { config }
    }

    fn encode(&self, image: DynamicImage, format: ImageFormat) -> Result<Vec<u8>, StripError> {
        let mut out = Cursor::new(Vec::new());
        let written = match format {
            ImageFormat::Jpeg => {
                let image = match image.color() {
                    ColorType::L8 | ColorType::L16 | ColorType::La8 | ColorType::La16 => {
                        DynamicImage::ImageLuma8(image.to_luma8())
                    }
                    _ => DynamicImage::ImageRgb8(image.to_rgb8()),
                };
                let encoder = JpegEncoder::new_with_quality(&mut out, self.config.jpeg_quality);
                image.write_with_encoder(encoder)
            }
            ImageFormat::WebP => {
                // The pure-Rust WebP encoder is lossless and 8-bit RGB(A) only
                let image = if image.color().has_alpha() {
                    DynamicImage::ImageRgba8(image.to_rgba8())
                } else {
                    DynamicImage::ImageRgb8(image.to_rgb8())
                };
                image.write_with_encoder(WebPEncoder::new_lossless(&mut out))
            }
            ImageFormat::Tiff => {
                let image = match image.color() {
                    ColorType::La8 => DynamicImage::ImageRgba8(image.to_rgba8()),
                    ColorType::La16 => DynamicImage::ImageRgba16(image.to_rgba16()),
                    _ => image,
                };
                image.write_to(&mut out, format)
            }
            _ => image.write_to(&mut out, format),
        };
        written.map_err(StripError::Encode)?;

        Ok(out.into_inner())
    }
}

impl Default for ImageStripper {
    fn default() -> Self {
        Self::new(StrippingConfig::default())
    }
}

impl MetadataStripper for ImageStripper {
    fn strip(&self, data: &[u8]) -> Result<Vec<u8>, StripError> {
        let reader = image::ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| StripError::Decode(image::ImageError::IoError(e)))?;

        let format = reader
            .format()
            .ok_or_else(|| StripError::UnsupportedFormat("unrecognized content".to_string()))?;
        if !REENCODABLE.contains(&format) {
            return Err(StripError::UnsupportedFormat(format_to_string(format)));
        }

        let image = reader.decode().map_err(StripError::Decode)?;
        self.encode(image, format)
    }
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        ImageFormat::Ico => "ico".to_string(),
        ImageFormat::Pnm => "pnm".to_string(),
        ImageFormat::Avif => "avif".to_string(),
        _ => "unknown".to_string(),
    }
}

//! Size-bounded base64 encoding with lossy JPEG fallback.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tracing::{debug, info};

use crate::error::EncodingError;
use crate::models::config::ImageConfig;

use super::{ImagePreparer, PreparedImage};

/// Prepares images by passing them through or re-encoding to JPEG.
pub struct JpegImagePreparer {
    /// Ceiling on the base64 text length.
    max_encoded_bytes: usize,
    /// First quality tried.
    initial_quality: u8,
    /// Quality decrement per attempt.
    quality_step: u8,
    /// Lowest quality tried.
    min_quality: u8,
}

impl JpegImagePreparer {
    /// Create a preparer with default settings (5 MiB, quality 95 down to 20).
    pub fn new() -> Self {
        Self::from_config(&ImageConfig::default())
    }

    pub fn from_config(config: &ImageConfig) -> Self {
        Self {
            max_encoded_bytes: config.max_encoded_bytes,
            initial_quality: config.initial_quality.clamp(1, 100),
            quality_step: config.quality_step.max(1),
            min_quality: config.min_quality.clamp(1, 100),
        }
    }

    /// Set the base64 size ceiling.
    pub fn with_max_encoded_bytes(mut self, max: usize) -> Self {
        self.max_encoded_bytes = max;
        self
    }

    fn compress(&self, image: &DynamicImage) -> Result<PreparedImage, EncodingError> {
        let rgb = flatten_on_white(image);
        let mut quality = self.initial_quality;

        loop {
            let mut buffer = Vec::new();
            JpegEncoder::new_with_quality(&mut buffer, quality).encode_image(&rgb)?;

            let data = STANDARD.encode(&buffer);
            debug!("JPEG quality {} -> {} base64 bytes", quality, data.len());

            if data.len() <= self.max_encoded_bytes {
                return Ok(PreparedImage {
                    media_type: "image/jpeg".to_string(),
                    data,
                });
            }

            match quality.checked_sub(self.quality_step) {
                Some(next) if next >= self.min_quality => quality = next,
                _ => {
                    return Err(EncodingError::ExceedsLimit {
                        limit: self.max_encoded_bytes,
                        quality,
                    });
                }
            }
        }
    }
}

impl Default for JpegImagePreparer {
    fn default() -> Self {
        Self::new()
    }
}

impl ImagePreparer for JpegImagePreparer {
    fn prepare(&self, image: &[u8]) -> Result<PreparedImage, EncodingError> {
        let passthrough = image::guess_format(image).ok().and_then(model_media_type);

        if let Some(media_type) = passthrough {
            let data = STANDARD.encode(image);
            if data.len() <= self.max_encoded_bytes {
                return Ok(PreparedImage {
                    media_type: media_type.to_string(),
                    data,
                });
            }
            info!(
                "Compressing image: {} base64 bytes exceeds {}",
                data.len(),
                self.max_encoded_bytes
            );
        }

        let decoded = image::load_from_memory(image)?;
        self.compress(&decoded)
    }
}

/// MIME type for formats the model accepts as-is.
fn model_media_type(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

/// Convert to RGB, compositing any alpha channel over white.
pub fn flatten_on_white(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut out = RgbImage::new(width, height);

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let alpha = pixel[3] as u16;
        let blend = |c: u8| ((c as u16 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        out.put_pixel(x, y, Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])]));
    }

    out
}

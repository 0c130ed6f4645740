//! Image preparation for embedding in slides.

use crate::Result;
use image::{ImageFormat, ImageReader};
use std::io::Cursor;

/// An image ready to be stored under `ppt/media/`.
#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    pub bytes: Vec<u8>,
    pub format: PictureFormat,
    pub width_px: u32,
    pub height_px: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PictureFormat {
    Png,
    Jpeg,
    Gif,
}

impl PictureFormat {
    pub fn extension(self) -> &'static str {
        match self {
            PictureFormat::Png => "png",
            PictureFormat::Jpeg => "jpeg",
            PictureFormat::Gif => "gif",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            PictureFormat::Png => "image/png",
            PictureFormat::Jpeg => "image/jpeg",
            PictureFormat::Gif => "image/gif",
        }
    }

    fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(PictureFormat::Png),
            ImageFormat::Jpeg => Some(PictureFormat::Jpeg),
            ImageFormat::Gif => Some(PictureFormat::Gif),
            _ => None,
        }
    }

    pub const ALL: [PictureFormat; 3] =
        [PictureFormat::Png, PictureFormat::Jpeg, PictureFormat::Gif];
}

impl Picture {
    /// Validate downloaded bytes and normalise them to a format every
    /// presentation viewer understands.
    ///
    /// PNG, JPEG and GIF are kept byte-for-byte; anything else the `image`
    /// crate can decode (WebP, BMP, ...) is re-encoded as PNG.
    pub fn prepare(bytes: &[u8]) -> Result<Self> {
        let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
        let native = reader.format().and_then(PictureFormat::from_image_format);

        match native {
            Some(format) => {
                let (width_px, height_px) = reader.into_dimensions()?;
                Ok(Self {
                    bytes: bytes.to_vec(),
                    format,
                    width_px,
                    height_px,
                })
            }
            None => {
                let decoded = reader.decode()?;
                let mut png = Vec::new();
                decoded.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
                tracing::debug!(
                    "Re-encoded {}x{} image as PNG",
                    decoded.width(),
                    decoded.height()
                );
                Ok(Self {
                    bytes: png,
                    format: PictureFormat::Png,
                    width_px: decoded.width(),
                    height_px: decoded.height(),
                })
            }
        }
    }

    /// Height / width; 1.0 for degenerate images.
    pub fn aspect_ratio(&self) -> f64 {
        if self.width_px == 0 || self.height_px == 0 {
            return 1.0;
        }
        self.height_px as f64 / self.width_px as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
        bytes
    }

    #[test]
    fn test_png_kept_as_is() {
        let bytes = encode(ImageFormat::Png, 40, 30);
        let picture = Picture::prepare(&bytes).unwrap();
        assert_eq!(picture.format, PictureFormat::Png);
        assert_eq!(picture.bytes, bytes);
        assert_eq!((picture.width_px, picture.height_px), (40, 30));
        assert!((picture.aspect_ratio() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_jpeg_detected() {
        let bytes = encode(ImageFormat::Jpeg, 20, 10);
        let picture = Picture::prepare(&bytes).unwrap();
        assert_eq!(picture.format, PictureFormat::Jpeg);
        assert_eq!(picture.format.extension(), "jpeg");
    }

    #[test]
    fn test_bmp_reencoded_to_png() {
        let bytes = encode(ImageFormat::Bmp, 8, 8);
        let picture = Picture::prepare(&bytes).unwrap();
        assert_eq!(picture.format, PictureFormat::Png);
        assert_eq!(&picture.bytes[..4], &[0x89, 0x50, 0x4E, 0x47]);
        assert_eq!(picture.width_px, 8);
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(Picture::prepare(b"<html>not an image</html>").is_err());
        assert!(Picture::prepare(&[]).is_err());
    }
}

//! Decoded source image type

use image::{DynamicImage, Rgba, RgbaImage};

use crate::analysis::common::error::{AnalysisError, Result};

/// A decoded photo, owned by the caller for the length of one analysis.
///
/// Pixels are addressed as packed `0xAARRGGBB` values, the layout the
/// packer masks and shifts channels out of.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    buffer: RgbaImage,
}

impl RawImage {
    /// Builds an image from row-major packed ARGB values.
    pub fn from_argb(width: u32, height: u32, pixels: &[u32]) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(AnalysisError::InvalidImageError(format!(
                "zero dimension: {}x{}",
                width, height
            )));
        }
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(AnalysisError::InvalidImageError(format!(
                "{}x{} image needs {} pixels, got {}",
                width,
                height,
                expected,
                pixels.len()
            )));
        }

        let mut buffer = RgbaImage::new(width, height);
        for (dst, &argb) in buffer.pixels_mut().zip(pixels) {
            *dst = argb_to_rgba(argb);
        }
        Ok(Self { buffer })
    }

    /// A `width x height` image where every pixel is `argb`.
    pub fn solid(width: u32, height: u32, argb: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(AnalysisError::InvalidImageError(format!(
                "zero dimension: {}x{}",
                width, height
            )));
        }
        Ok(Self {
            buffer: RgbaImage::from_pixel(width, height, argb_to_rgba(argb)),
        })
    }

    pub fn from_dynamic(image: DynamicImage) -> Result<Self> {
        Self::from_rgba(image.into_rgba8())
    }

    pub fn from_rgba(buffer: RgbaImage) -> Result<Self> {
        if buffer.width() == 0 || buffer.height() == 0 {
            return Err(AnalysisError::InvalidImageError(format!(
                "zero dimension: {}x{}",
                buffer.width(),
                buffer.height()
            )));
        }
        Ok(Self { buffer })
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Packed `0xAARRGGBB` color of pixel `(x, y)`.
    ///
    /// Panics if `(x, y)` is out of bounds, like `image::ImageBuffer::get_pixel`.
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        let Rgba([r, g, b, a]) = *self.buffer.get_pixel(x, y);
        (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.buffer
    }
}

fn argb_to_rgba(argb: u32) -> Rgba<u8> {
    Rgba([
        (argb >> 16 & 0xFF) as u8,
        (argb >> 8 & 0xFF) as u8,
        (argb & 0xFF) as u8,
        (argb >> 24 & 0xFF) as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_round_trips_packed_argb() {
        let pixels = [0xFF_FF_80_00, 0x80_01_02_03];
        let image = RawImage::from_argb(2, 1, &pixels).unwrap();
        assert_eq!(image.pixel(0, 0), 0xFF_FF_80_00);
        assert_eq!(image.pixel(1, 0), 0x80_01_02_03);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(matches!(
            RawImage::from_argb(0, 10, &[]),
            Err(AnalysisError::InvalidImageError(_))
        ));
        assert!(matches!(
            RawImage::solid(10, 0, 0xFFFF_FFFF),
            Err(AnalysisError::InvalidImageError(_))
        ));
        assert!(matches!(
            RawImage::from_rgba(RgbaImage::new(0, 0)),
            Err(AnalysisError::InvalidImageError(_))
        ));
    }

    #[test]
    fn pixel_count_must_match_dimensions() {
        let result = RawImage::from_argb(2, 2, &[0; 3]);
        assert!(matches!(result, Err(AnalysisError::InvalidImageError(_))));
    }
}

use image::{Rgba, RgbaImage, imageops};
use tracing::debug;

use crate::analysis::common::error::{AnalysisError, Result};
use crate::analysis::letterbox::types::{ContentRect, PaddedImage, ResampleFilter};
use crate::analysis::source::RawImage;

/// Scales a source to fit a `target x target` square and pads the slack
/// with an opaque fill color.
#[derive(Debug, Clone)]
pub struct LetterboxResizer {
    target: u32,
    fill: [u8; 3],
    filter: ResampleFilter,
}

impl LetterboxResizer {
    pub fn new(target: u32, fill: [u8; 3], filter: ResampleFilter) -> Result<Self> {
        if target == 0 {
            return Err(AnalysisError::ConfigError("letterbox target must be > 0".to_string()));
        }
        Ok(Self { target, fill, filter })
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    /// Size of the scaled content for a `width x height` source: each side is
    /// `round(side * scale)` clamped to `[1, target]`.
    pub fn scaled_size(&self, width: u32, height: u32) -> (u32, u32) {
        let target = self.target as f64;
        let scale = (target / width as f64).min(target / height as f64);
        let fit = |side: u32| ((side as f64 * scale).round() as u32).clamp(1, self.target);
        (fit(width), fit(height))
    }

    /// Scales `source` into the square canvas and pads the remainder.
    ///
    /// The aspect ratio is preserved and the content is centered; any odd
    /// leftover pixel of padding goes to the right or bottom band.
    ///
    /// # Arguments
    ///
    /// * `source` - Decoded leaf photo of any non-zero size
    ///
    /// # Returns
    ///
    /// * `Ok(PaddedImage)` - Opaque `target x target` image plus its content rectangle
    /// * `Err(AnalysisError::InvalidImageError)` - Source has a zero dimension
    ///
    /// # Examples
    ///
    /// ```
    /// use roya_detect_rs::analysis::{LetterboxResizer, RawImage, ResampleFilter};
    ///
    /// let resizer = LetterboxResizer::new(224, [0, 0, 0], ResampleFilter::Bilinear).unwrap();
    /// let leaf = RawImage::solid(100, 50, 0xFFFF_FFFF).unwrap();
    /// let padded = resizer.resize(&leaf).unwrap();
    ///
    /// assert_eq!(padded.size(), 224);
    /// assert_eq!(padded.content().y, 56);
    /// assert_eq!(padded.image().pixel(0, 0), 0xFF00_0000);
    /// assert_eq!(padded.image().pixel(112, 112), 0xFFFF_FFFF);
    /// ```
    pub fn resize(&self, source: &RawImage) -> Result<PaddedImage> {
        let (width, height) = (source.width(), source.height());
        if width == 0 || height == 0 {
            return Err(AnalysisError::InvalidImageError(format!(
                "zero dimension: {}x{}",
                width, height
            )));
        }

        let (scaled_width, scaled_height) = self.scaled_size(width, height);
        let offset_x = (self.target - scaled_width) / 2;
        let offset_y = (self.target - scaled_height) / 2;

        debug!(
            "Letterbox {}x{} -> {}x{} at ({}, {}) in {}x{}",
            width, height, scaled_width, scaled_height, offset_x, offset_y, self.target, self.target
        );

        let [r, g, b] = self.fill;
        let mut canvas = RgbaImage::from_pixel(self.target, self.target, Rgba([r, g, b, 255]));

        let scaled = if (scaled_width, scaled_height) == (width, height) {
            source.as_rgba().clone()
        } else {
            imageops::resize(source.as_rgba(), scaled_width, scaled_height, self.filter.into())
        };

        for (x, y, src) in scaled.enumerate_pixels() {
            let dst = canvas.get_pixel_mut(x + offset_x, y + offset_y);
            *dst = blend_over(*src, *dst);
        }

        let content = ContentRect {
            x: offset_x,
            y: offset_y,
            width: scaled_width,
            height: scaled_height,
        };
        Ok(PaddedImage::new(RawImage::from_rgba(canvas)?, content))
    }
}

/// Source-over onto an opaque background. Opaque pixels copy verbatim.
fn blend_over(src: Rgba<u8>, background: Rgba<u8>) -> Rgba<u8> {
    let alpha = src[3] as u32;
    match alpha {
        255 => src,
        0 => background,
        _ => {
            let mix =
                |s: u8, b: u8| ((s as u32 * alpha + b as u32 * (255 - alpha) + 127) / 255) as u8;
            Rgba([
                mix(src[0], background[0]),
                mix(src[1], background[1]),
                mix(src[2], background[2]),
                255,
            ])
        }
    }
}

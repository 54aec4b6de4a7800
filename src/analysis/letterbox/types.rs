//! Letterbox output types

use image::imageops::FilterType;

use crate::analysis::source::RawImage;

/// Interpolation used when scaling the source into the letterbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResampleFilter {
    Nearest,
    /// Triangle filter
    #[default]
    Bilinear,
    Lanczos3,
}

impl From<ResampleFilter> for FilterType {
    fn from(filter: ResampleFilter) -> Self {
        match filter {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Bilinear => FilterType::Triangle,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Where the scaled source landed inside the square canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A `target x target` image: scaled source content centered on the fill color.
#[derive(Debug, Clone)]
pub struct PaddedImage {
    image: RawImage,
    content: ContentRect,
}

impl PaddedImage {
    pub(crate) fn new(image: RawImage, content: ContentRect) -> Self {
        Self { image, content }
    }

    pub fn image(&self) -> &RawImage {
        &self.image
    }

    pub fn into_image(self) -> RawImage {
        self.image
    }

    pub fn size(&self) -> u32 {
        self.image.width()
    }

    pub fn content(&self) -> ContentRect {
        self.content
    }

    /// Padding as `(left, right, top, bottom)`.
    pub fn padding(&self) -> (u32, u32, u32, u32) {
        let c = self.content;
        let size = self.size();
        (c.x, size - c.x - c.width, c.y, size - c.y - c.height)
    }
}

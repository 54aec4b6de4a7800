use tracing::debug;

use crate::analysis::common::error::{AnalysisError, Result};
use crate::analysis::source::RawImage;
use crate::analysis::tensor::types::PackedTensor;

#[derive(Debug, Clone, Copy)]
pub struct TensorPacker {
    target: u32,
}

impl TensorPacker {
    pub fn new(target: u32) -> Self {
        Self { target }
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    /// Packs a `target x target` image into raw RGB bytes. Alpha is dropped
    /// and channel values stay in `0..=255`.
    ///
    /// # Arguments
    ///
    /// * `image` - Letterboxed image, row-major from the top-left pixel
    ///
    /// # Returns
    ///
    /// * `Ok(PackedTensor)` - Exactly `target * target * 3` bytes in R, G, B order
    /// * `Err(AnalysisError::DimensionMismatchError)` - Image is not `target x target`
    ///
    /// # Examples
    ///
    /// ```
    /// use roya_detect_rs::analysis::{RawImage, TensorPacker};
    ///
    /// let image = RawImage::solid(2, 2, 0x80FF_8000).unwrap();
    /// let tensor = TensorPacker::new(2).pack(&image).unwrap();
    ///
    /// assert_eq!(tensor.len(), 12);
    /// assert_eq!(&tensor.as_bytes()[..3], &[0xFF, 0x80, 0x00]);
    /// ```
    pub fn pack(&self, image: &RawImage) -> Result<PackedTensor> {
        if image.width() != self.target || image.height() != self.target {
            return Err(AnalysisError::DimensionMismatchError {
                expected: self.target,
                width: image.width(),
                height: image.height(),
            });
        }

        let mut bytes = Vec::with_capacity(PackedTensor::expected_len(self.target));
        for y in 0..self.target {
            for x in 0..self.target {
                let argb = image.pixel(x, y);
                bytes.push((argb >> 16 & 0xFF) as u8);
                bytes.push((argb >> 8 & 0xFF) as u8);
                bytes.push((argb & 0xFF) as u8);
            }
        }

        debug!("Packed {}x{} image into {} bytes", self.target, self.target, bytes.len());
        Ok(PackedTensor::new(self.target, bytes))
    }
}

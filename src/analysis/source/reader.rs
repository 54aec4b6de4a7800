use crate::analysis::common::error::Result;
use crate::analysis::source::types::RawImage;

/// Decodes an encoded image file into a [`RawImage`].
pub trait ImageSourceReader {
    /// # Arguments
    ///
    /// * `data` - Complete file contents
    ///
    /// # Returns
    ///
    /// * `Ok(RawImage)` - Decoded pixels, converted to RGBA8
    /// * `Err(AnalysisError::InvalidImageError)` - Unknown format, corrupt data, or zero size
    fn read_image(&self, data: &[u8]) -> Result<RawImage>;
}

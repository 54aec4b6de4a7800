use tracing::debug;

use crate::analysis::common::error::{AnalysisError, Result};
use crate::analysis::source::reader::ImageSourceReader;
use crate::analysis::source::types::RawImage;

/// Decodes ordinary photo formats (JPEG, PNG, BMP, WebP, TIFF) with the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardImageReader;

impl ImageSourceReader for StandardImageReader {
    fn read_image(&self, data: &[u8]) -> Result<RawImage> {
        debug!("Decoding image, {} bytes", data.len());

        let decoded = image::load_from_memory(data)
            .map_err(|e| AnalysisError::InvalidImageError(e.to_string()))?;

        debug!("Decoded image: {}x{} ({:?})", decoded.width(), decoded.height(), decoded.color());

        RawImage::from_dynamic(decoded)
    }
}

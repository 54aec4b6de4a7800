use std::io::{Cursor, Write};

use tiff::encoder::{TiffEncoder, colortype};
use tracing::debug;

use crate::analysis::common::error::{AnalysisError, Result};
use crate::analysis::dump::writer::PaddedImageWriter;
use crate::analysis::letterbox::PaddedImage;

/// Uncompressed RGB8 TIFF, the same bytes the packer sees.
#[derive(Debug, Default, Clone, Copy)]
pub struct TiffImageWriter;

impl PaddedImageWriter for TiffImageWriter {
    fn write_image(&self, image: &PaddedImage, output: &mut dyn Write) -> Result<()> {
        let raw = image.image();
        debug!("Encoding TIFF dump: {}x{}", raw.width(), raw.height());

        let rgb: Vec<u8> = raw
            .as_rgba()
            .pixels()
            .flat_map(|p| [p[0], p[1], p[2]])
            .collect();

        let mut buffer = Vec::new();
        let mut encoder = TiffEncoder::new(Cursor::new(&mut buffer))
            .map_err(|e| AnalysisError::OutputWriteError(e.to_string()))?;
        encoder
            .write_image::<colortype::RGB8>(raw.width(), raw.height(), &rgb)
            .map_err(|e| AnalysisError::OutputWriteError(e.to_string()))?;

        output.write_all(&buffer)?;

        debug!("TIFF dump complete, {} bytes", buffer.len());
        Ok(())
    }
}

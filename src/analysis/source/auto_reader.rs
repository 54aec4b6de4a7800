use tracing::debug;

use crate::analysis::common::error::Result;
use crate::analysis::source::rawloader_reader::RawLoaderReader;
use crate::analysis::source::reader::ImageSourceReader;
use crate::analysis::source::standard_reader::StandardImageReader;
use crate::analysis::source::types::RawImage;

/// Picks a decoder from the file's magic bytes: anything the `image` crate
/// recognises goes through [`StandardImageReader`], the rest is tried as a
/// camera RAW file.
#[derive(Debug, Default)]
pub struct AutoDetectReader {
    standard: StandardImageReader,
    raw: RawLoaderReader,
}

impl ImageSourceReader for AutoDetectReader {
    fn read_image(&self, data: &[u8]) -> Result<RawImage> {
        match image::guess_format(data) {
            Ok(format) => {
                debug!("Detected {:?} image", format);
                self.standard.read_image(data)
            }
            Err(_) => {
                debug!("No standard image signature, trying camera RAW decoder");
                self.raw.read_image(data)
            }
        }
    }
}

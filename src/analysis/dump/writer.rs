use std::io::Write;

use crate::analysis::common::error::Result;
use crate::analysis::letterbox::PaddedImage;

pub trait PaddedImageWriter {
    fn write_image(&self, image: &PaddedImage, output: &mut dyn Write) -> Result<()>;
}

//! Debug dump module
//!
//! Writes the letterboxed image to disk so the exact classifier input can be
//! inspected.

mod tiff_writer;
mod writer;

pub use tiff_writer::TiffImageWriter;
pub use writer::PaddedImageWriter;

//! Tensor packing module
//!
//! Flattens a letterboxed image into the raw `uint8` RGB buffer the
//! classifier consumes: row-major, three bytes per pixel, no header,
//! no normalisation.

mod packer;
pub mod types;

pub use packer::TensorPacker;
pub use types::PackedTensor;

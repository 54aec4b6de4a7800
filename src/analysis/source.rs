//! Source image module
//!
//! Decoded leaf photos and the readers that produce them from file bytes.

mod auto_reader;
mod rawloader_reader;
mod reader;
mod standard_reader;
pub mod types;

pub use auto_reader::AutoDetectReader;
pub use rawloader_reader::RawLoaderReader;
pub use reader::ImageSourceReader;
pub use standard_reader::StandardImageReader;
pub use types::RawImage;

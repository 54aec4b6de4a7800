//! Letterbox module
//!
//! Aspect-preserving resize onto a square canvas filled with a solid color.

mod resizer;
pub mod types;

pub use resizer::LetterboxResizer;
pub use types::{ContentRect, PaddedImage, ResampleFilter};

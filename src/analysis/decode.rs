//! Inference result decoding module
//!
//! Turns the classifier's raw output into per-class scores and picks the
//! winning severity level.

mod decoder;
pub mod types;

pub use decoder::{argmax, decode, decode_output};
pub use types::{AnalysisResult, Severity};

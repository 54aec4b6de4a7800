//! Model execution module
//!
//! The classifier is an external collaborator. [`ModelLoader`] acquires the
//! weights for one analysis and hands back a [`ModelSession`]; dropping the
//! session releases them, whichever way the analysis exits.

#[cfg(feature = "onnx")]
mod onnx_runner;
mod runner;
pub mod types;

#[cfg(feature = "onnx")]
pub use onnx_runner::{OnnxModelLoader, OnnxSession};
pub use runner::{ModelLoader, ModelSession};
pub use types::{ElementType, ModelInfo, ModelOutput, OutputVector, TensorSpec};

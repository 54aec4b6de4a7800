//! Leaf rust analysis pipeline
//!
//! Source photo -> letterbox -> packed `uint8` RGB tensor -> classifier ->
//! decoded class scores -> severity. Stages live in their own modules and
//! [`RoyaAnalysisPipeline`] runs them in order, failing fast.

pub mod common;
pub mod config;
pub mod decode;
pub mod dump;
pub mod letterbox;
pub mod model;
pub mod pipeline;
pub mod source;
pub mod tensor;
pub mod timing;

#[cfg(test)]
mod tests;

pub use common::{AnalysisError, Result};

pub use config::{AnalysisConfig, AnalysisConfigBuilder};

pub use source::{
    AutoDetectReader, ImageSourceReader, RawImage, RawLoaderReader, StandardImageReader,
};

pub use letterbox::{ContentRect, LetterboxResizer, PaddedImage, ResampleFilter};

pub use tensor::{PackedTensor, TensorPacker};

pub use model::{
    ElementType, ModelInfo, ModelLoader, ModelOutput, ModelSession, OutputVector, TensorSpec,
};
#[cfg(feature = "onnx")]
pub use model::{OnnxModelLoader, OnnxSession};

pub use decode::{AnalysisResult, Severity, argmax, decode, decode_output};

pub use dump::{PaddedImageWriter, TiffImageWriter};

pub use pipeline::RoyaAnalysisPipeline;

pub use timing::{PipelineTimings, StepTiming, Timer};

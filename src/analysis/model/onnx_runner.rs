//! ONNX Runtime backend for the rust classifier.
//!
//! The model takes a `uint8 [1, size, size, 3]` NHWC tensor and emits one
//! `[1, classes]` score vector, either quantized `uint8` or `float32`.

use std::path::{Path, PathBuf};

use ort::session::Session;
use ort::tensor::TensorElementType;
use ort::value::{TensorRef, ValueType};
use tracing::debug;

use crate::analysis::common::error::{AnalysisError, Result};
use crate::analysis::model::runner::{ModelLoader, ModelSession};
use crate::analysis::model::types::{ElementType, ModelInfo, ModelOutput, TensorSpec};
use crate::analysis::tensor::PackedTensor;

/// Loads the model file afresh for every analysis.
#[derive(Debug, Clone)]
pub struct OnnxModelLoader {
    path: PathBuf,
    intra_threads: usize,
}

impl OnnxModelLoader {
    pub fn new(path: impl Into<PathBuf>, intra_threads: usize) -> Self {
        Self {
            path: path.into(),
            intra_threads: intra_threads.max(1),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub struct OnnxSession {
    session: Session,
}

impl ModelLoader for OnnxModelLoader {
    type Session = OnnxSession;

    fn load(&self) -> Result<OnnxSession> {
        if !self.path.exists() {
            return Err(AnalysisError::ModelExecutionError(format!(
                "model file not found: {}",
                self.path.display()
            )));
        }

        debug!("Loading ONNX model {}", self.path.display());
        let session = Session::builder()
            .map_err(|e: ort::Error| AnalysisError::ModelExecutionError(e.to_string()))?
            .with_intra_threads(self.intra_threads)
            .map_err(|e: ort::Error| AnalysisError::ModelExecutionError(e.to_string()))?
            .commit_from_file(&self.path)
            .map_err(|e: ort::Error| {
                AnalysisError::ModelExecutionError(format!("ONNX load failed: {e}"))
            })?;

        Ok(OnnxSession { session })
    }
}

impl ModelSession for OnnxSession {
    fn describe(&self) -> ModelInfo {
        ModelInfo {
            inputs: self
                .session
                .inputs
                .iter()
                .filter_map(|input| tensor_spec(&input.name, &input.input_type))
                .collect(),
            outputs: self
                .session
                .outputs
                .iter()
                .filter_map(|output| tensor_spec(&output.name, &output.output_type))
                .collect(),
        }
    }

    fn run(&mut self, tensor: &PackedTensor) -> Result<ModelOutput> {
        let input = ndarray::Array4::from_shape_vec(tensor.shape(), tensor.as_bytes().to_vec())
            .map_err(|e| AnalysisError::ModelExecutionError(e.to_string()))?;
        let input = TensorRef::from_array_view(&input)
            .map_err(|e| AnalysisError::ModelExecutionError(e.to_string()))?;

        let outputs = self
            .session
            .run(ort::inputs![input])
            .map_err(|e| {
                AnalysisError::ModelExecutionError(format!("ONNX inference failed: {e}"))
            })?;

        let value = &outputs[0];
        let element_type = match value.dtype() {
            ValueType::Tensor { ty, .. } => element_type(*ty).ok_or_else(|| {
                let msg = format!("unrecognised output element type {ty:?}");
                AnalysisError::ModelExecutionError(msg)
            })?,
            other => {
                return Err(AnalysisError::ModelExecutionError(format!(
                    "output is not a tensor: {other:?}"
                )));
            }
        };

        let (shape, data) = match element_type {
            ElementType::UInt8 => {
                let (shape, data) = value
                    .try_extract_tensor::<u8>()
                    .map_err(|e| AnalysisError::ModelExecutionError(e.to_string()))?;
                (shape.iter().copied().collect(), data.to_vec())
            }
            ElementType::Float32 => {
                let (shape, data) = value
                    .try_extract_tensor::<f32>()
                    .map_err(|e| AnalysisError::ModelExecutionError(e.to_string()))?;
                (
                    shape.iter().copied().collect(),
                    data.iter().flat_map(|v| v.to_ne_bytes()).collect(),
                )
            }
            // Left for the decoder to reject with the element type named.
            other => (Vec::new(), vec![0u8; other.size().unwrap_or(0)]),
        };

        Ok(ModelOutput { element_type, shape, data })
    }
}

fn tensor_spec(name: &str, value_type: &ValueType) -> Option<TensorSpec> {
    match value_type {
        ValueType::Tensor { ty, shape, .. } => Some(TensorSpec {
            name: name.to_string(),
            element_type: element_type(*ty)?,
            shape: shape.iter().copied().collect(),
        }),
        _ => None,
    }
}

fn element_type(ty: TensorElementType) -> Option<ElementType> {
    Some(match ty {
        TensorElementType::Uint8 => ElementType::UInt8,
        TensorElementType::Int8 => ElementType::Int8,
        TensorElementType::Uint16 => ElementType::UInt16,
        TensorElementType::Int16 => ElementType::Int16,
        TensorElementType::Int32 => ElementType::Int32,
        TensorElementType::Int64 => ElementType::Int64,
        TensorElementType::Float16 => ElementType::Float16,
        TensorElementType::Float32 => ElementType::Float32,
        TensorElementType::Float64 => ElementType::Float64,
        TensorElementType::Bool => ElementType::Bool,
        TensorElementType::String => ElementType::String,
        _ => return None,
    })
}

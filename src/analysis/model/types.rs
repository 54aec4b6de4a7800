//! Model input/output types

use std::fmt;

use crate::analysis::common::error::{AnalysisError, Result};

/// Element type a model runtime reports for a tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    UInt8,
    Int8,
    UInt16,
    Int16,
    Int32,
    Int64,
    Float16,
    Float32,
    Float64,
    Bool,
    String,
}

impl ElementType {
    /// Bytes per element; `None` for variable-width strings.
    pub fn size(self) -> Option<usize> {
        match self {
            ElementType::UInt8 | ElementType::Int8 | ElementType::Bool => Some(1),
            ElementType::UInt16 | ElementType::Int16 | ElementType::Float16 => Some(2),
            ElementType::Int32 | ElementType::Float32 => Some(4),
            ElementType::Int64 | ElementType::Float64 => Some(8),
            ElementType::String => None,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::UInt8 => "uint8",
            ElementType::Int8 => "int8",
            ElementType::UInt16 => "uint16",
            ElementType::Int16 => "int16",
            ElementType::Int32 => "int32",
            ElementType::Int64 => "int64",
            ElementType::Float16 => "float16",
            ElementType::Float32 => "float32",
            ElementType::Float64 => "float64",
            ElementType::Bool => "bool",
            ElementType::String => "string",
        };
        f.write_str(name)
    }
}

/// Declared name, element type and shape of a model input or output.
/// Dynamic dimensions are negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorSpec {
    pub name: String,
    pub element_type: ElementType,
    pub shape: Vec<i64>,
}

impl TensorSpec {
    /// Last dimension of the shape when it is static, i.e. the class count
    /// of a `[batch, classes]` classifier output.
    pub fn class_count(&self) -> Option<usize> {
        match self.shape.last() {
            Some(&d) if d > 0 && self.shape.len() >= 2 => Some(d as usize),
            _ => None,
        }
    }
}

impl fmt::Display for TensorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} {}", self.name, self.shape, self.element_type)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelInfo {
    pub inputs: Vec<TensorSpec>,
    pub outputs: Vec<TensorSpec>,
}

/// Raw first output of a model run: native-endian element bytes plus the
/// element type the runtime declared.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    pub element_type: ElementType,
    pub shape: Vec<i64>,
    pub data: Vec<u8>,
}

impl ModelOutput {
    pub fn from_u8(values: Vec<u8>) -> Self {
        Self {
            element_type: ElementType::UInt8,
            shape: vec![1, values.len() as i64],
            data: values,
        }
    }

    pub fn from_f32(values: &[f32]) -> Self {
        Self {
            element_type: ElementType::Float32,
            shape: vec![1, values.len() as i64],
            data: values.iter().flat_map(|v| v.to_ne_bytes()).collect(),
        }
    }
}

/// Model output resolved to one of the element types the decoder understands.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputVector {
    UInt8(Vec<u8>),
    Float32(Vec<f32>),
}

impl OutputVector {
    pub fn element_type(&self) -> ElementType {
        match self {
            OutputVector::UInt8(_) => ElementType::UInt8,
            OutputVector::Float32(_) => ElementType::Float32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            OutputVector::UInt8(v) => v.len(),
            OutputVector::Float32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TryFrom<ModelOutput> for OutputVector {
    type Error = AnalysisError;

    fn try_from(output: ModelOutput) -> Result<Self> {
        match output.element_type {
            ElementType::UInt8 => Ok(OutputVector::UInt8(output.data)),
            ElementType::Float32 => {
                if output.data.len() % 4 != 0 {
                    return Err(AnalysisError::ModelExecutionError(format!(
                        "float32 output has {} bytes, not a multiple of 4",
                        output.data.len()
                    )));
                }
                Ok(OutputVector::Float32(
                    output
                        .data
                        .chunks_exact(4)
                        .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
                        .collect(),
                ))
            }
            other => Err(AnalysisError::UnsupportedOutputTypeError(other)),
        }
    }
}

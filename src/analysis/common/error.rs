use thiserror::Error;

use crate::analysis::model::ElementType;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid source image: {0}")]
    InvalidImageError(String),

    #[error("Image is {width}x{height}, expected {expected}x{expected}")]
    DimensionMismatchError {
        expected: u32,
        width: u32,
        height: u32,
    },

    #[error("Unsupported model output type: {0}")]
    UnsupportedOutputTypeError(ElementType),

    #[error("Model execution failed: {0}")]
    ModelExecutionError(String),

    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

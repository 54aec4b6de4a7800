//! Analysis result types

use std::fmt;

use crate::analysis::common::error::{AnalysisError, Result};
use crate::analysis::decode::decoder::argmax;

/// Rust severity classes, in the classifier's output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Healthy,
    Mild,
    Moderate,
    Severe,
    VerySevere,
    Unknown(usize),
}

impl Severity {
    pub fn from_level(level: usize) -> Self {
        match level {
            0 => Severity::Healthy,
            1 => Severity::Mild,
            2 => Severity::Moderate,
            3 => Severity::Severe,
            4 => Severity::VerySevere,
            other => Severity::Unknown(other),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Severity::Healthy => "Healthy leaf",
            Severity::Mild => "Mild rust symptoms",
            Severity::Moderate => "Moderate rust",
            Severity::Severe => "Severe rust",
            Severity::VerySevere => "Very severe rust",
            Severity::Unknown(_) => "Unknown level",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// Winning class index.
    pub severity_level: usize,
    /// Score of the winning class, `predictions[severity_level]`.
    pub confidence: f32,
    /// One score per class, in model output order.
    pub predictions: Vec<f32>,
}

impl AnalysisResult {
    /// Picks the winning class from decoded scores.
    ///
    /// The highest score wins, NaN counting above every number, and ties go
    /// to the lowest index.
    ///
    /// # Errors
    ///
    /// Returns `ModelExecutionError` when `predictions` is empty.
    pub fn from_predictions(predictions: Vec<f32>) -> Result<Self> {
        let severity_level = argmax(&predictions).ok_or_else(|| {
            AnalysisError::ModelExecutionError("model returned no class scores".to_string())
        })?;
        Ok(Self {
            severity_level,
            confidence: predictions[severity_level],
            predictions,
        })
    }

    pub fn severity(&self) -> Severity {
        Severity::from_level(self.severity_level)
    }

    pub fn rust_detected(&self) -> bool {
        self.severity_level > 0
    }
}

impl fmt::Display for AnalysisResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rust_detected() {
            writeln!(f, "Rust detected")?;
            writeln!(f, "Severity level: {}", self.severity_level)?;
            writeln!(f, "{}", self.severity().description())?;
        } else {
            writeln!(f, "No rust detected")?;
        }
        write!(f, "Confidence: {:.1}%", self.confidence * 100.0)
    }
}

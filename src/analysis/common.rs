//! Common utilities module
//!
//! Shared error taxonomy for every stage of the analysis pipeline.

pub mod error;

pub use error::{AnalysisError, Result};

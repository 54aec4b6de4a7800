//! Coffee leaf rust ("roya") detection from leaf photographs.
//!
//! The [`analysis`] module turns a decoded photo into a severity estimate:
//! letterbox to the model input size, pack to a raw RGB byte tensor, run
//! the classifier, and decode its output into per-class scores.

pub mod analysis;
pub mod logger;

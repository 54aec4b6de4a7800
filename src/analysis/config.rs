//! Analysis configuration types

use std::path::PathBuf;

use crate::analysis::common::error::{AnalysisError, Result};
use crate::analysis::letterbox::ResampleFilter;

/// Side of the square classifier input
pub const DEFAULT_TARGET_SIZE: u32 = 224;
/// Severity classes the classifier emits when the model does not declare it
pub const DEFAULT_NUM_CLASSES: usize = 5;

/// Configuration for a leaf analysis
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Side length of the letterboxed image and the packed tensor
    pub target_size: u32,
    /// Letterbox padding color, RGB
    pub fill_color: [u8; 3],
    /// Interpolation used while scaling the source
    pub filter: ResampleFilter,
    /// Expected class count when the model output shape is dynamic
    pub num_classes: usize,
    /// Threads handed to the model runtime
    pub intra_threads: usize,
    /// When set, the padded image is written here as TIFF before packing
    pub dump_padded: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            target_size: DEFAULT_TARGET_SIZE,
            fill_color: [255, 255, 255],
            filter: ResampleFilter::Bilinear,
            num_classes: DEFAULT_NUM_CLASSES,
            intra_threads: 4,
            dump_padded: None,
        }
    }
}

impl AnalysisConfig {
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }
}

/// Builder for AnalysisConfig
#[derive(Default)]
pub struct AnalysisConfigBuilder {
    target_size: Option<u32>,
    fill_color: Option<[u8; 3]>,
    filter: Option<ResampleFilter>,
    num_classes: Option<usize>,
    intra_threads: Option<usize>,
    dump_padded: Option<Option<PathBuf>>,
}

impl AnalysisConfigBuilder {
    pub fn target_size(mut self, size: u32) -> Self {
        self.target_size = Some(size);
        self
    }

    pub fn fill_color(mut self, rgb: [u8; 3]) -> Self {
        self.fill_color = Some(rgb);
        self
    }

    pub fn filter(mut self, filter: ResampleFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn num_classes(mut self, classes: usize) -> Self {
        self.num_classes = Some(classes);
        self
    }

    pub fn intra_threads(mut self, threads: usize) -> Self {
        self.intra_threads = Some(threads);
        self
    }

    pub fn dump_padded(mut self, path: Option<PathBuf>) -> Self {
        self.dump_padded = Some(path);
        self
    }

    pub fn build(self) -> Result<AnalysisConfig> {
        let default = AnalysisConfig::default();
        let config = AnalysisConfig {
            target_size: self.target_size.unwrap_or(default.target_size),
            fill_color: self.fill_color.unwrap_or(default.fill_color),
            filter: self.filter.unwrap_or(default.filter),
            num_classes: self.num_classes.unwrap_or(default.num_classes),
            intra_threads: self.intra_threads.unwrap_or(default.intra_threads),
            dump_padded: self.dump_padded.unwrap_or(default.dump_padded),
        };

        if config.target_size == 0 {
            return Err(AnalysisError::ConfigError("target_size must be > 0".to_string()));
        }
        if config.num_classes == 0 {
            return Err(AnalysisError::ConfigError("num_classes must be > 0".to_string()));
        }
        Ok(config)
    }
}

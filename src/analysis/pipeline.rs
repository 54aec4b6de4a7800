use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::analysis::{
    common::error::{AnalysisError, Result},
    config::AnalysisConfig,
    decode::{AnalysisResult, decode_output},
    dump::{PaddedImageWriter, TiffImageWriter},
    letterbox::{LetterboxResizer, PaddedImage},
    model::{ModelInfo, ModelLoader, ModelSession},
    source::{AutoDetectReader, ImageSourceReader, RawImage},
    tensor::{PackedTensor, TensorPacker},
    timing::{PipelineTimings, Timer},
};

/// Letterbox, pack, classify, decode. Each call is independent: it loads its
/// own model session and allocates its own buffers.
pub struct RoyaAnalysisPipeline<L: ModelLoader, R: ImageSourceReader = AutoDetectReader> {
    loader: L,
    reader: R,
    config: AnalysisConfig,
}

impl<L: ModelLoader> RoyaAnalysisPipeline<L, AutoDetectReader> {
    pub fn new(loader: L, config: AnalysisConfig) -> Self {
        Self {
            loader,
            reader: AutoDetectReader::default(),
            config,
        }
    }
}

#[cfg(feature = "onnx")]
impl RoyaAnalysisPipeline<crate::analysis::model::OnnxModelLoader, AutoDetectReader> {
    pub fn from_model_file<P: AsRef<Path>>(model_path: P, config: AnalysisConfig) -> Self {
        let loader = crate::analysis::model::OnnxModelLoader::new(
            model_path.as_ref(),
            config.intra_threads,
        );
        Self::new(loader, config)
    }
}

impl<L: ModelLoader, R: ImageSourceReader> RoyaAnalysisPipeline<L, R> {
    pub fn with_custom(loader: L, reader: R, config: AnalysisConfig) -> Self {
        Self {
            loader,
            reader,
            config,
        }
    }

    pub fn letterbox(&self, source: &RawImage) -> Result<PaddedImage> {
        LetterboxResizer::new(self.config.target_size, self.config.fill_color, self.config.filter)?
            .resize(source)
    }

    pub fn pack(&self, padded: &PaddedImage) -> Result<PackedTensor> {
        TensorPacker::new(self.config.target_size).pack(padded.image())
    }

    /// Runs one full analysis: letterbox, pack, inference, decode, argmax.
    ///
    /// A model session is loaded for this call only and released before
    /// returning, on success and on every error path.
    ///
    /// # Arguments
    ///
    /// * `source` - Decoded leaf photo
    ///
    /// # Returns
    ///
    /// * `Ok(AnalysisResult)` - Severity level, its confidence, and all class scores
    /// * `Err(AnalysisError)` - The first failing stage's error, unchanged
    #[instrument(skip(self, source), fields(width = source.width(), height = source.height()))]
    pub fn analyze(&self, source: &RawImage) -> Result<AnalysisResult> {
        let (result, _) = self.analyze_with_timings(source)?;
        Ok(result)
    }

    pub fn analyze_with_timings(
        &self,
        source: &RawImage,
    ) -> Result<(AnalysisResult, PipelineTimings)> {
        let mut timings = PipelineTimings::new();
        info!("Starting leaf analysis");

        let timer = Timer::start("letterbox");
        let padded = {
            let _span = tracing::info_span!("letterbox", size = self.config.target_size).entered();
            self.letterbox(source)?
        };
        timings.record(timer);

        if let Some(path) = &self.config.dump_padded {
            let _span = tracing::info_span!("dump_padded").entered();
            self.dump_padded(&padded, path)?;
        }

        let timer = Timer::start("pack");
        let tensor = {
            let _span = tracing::info_span!("pack").entered();
            self.pack(&padded)?
        };
        timings.record(timer);

        // The session lives only for this block, so the weights are released
        // before decoding on success and on every early return.
        let (output, expected_classes) = {
            let timer = Timer::start("load_model");
            let mut session = {
                let _span = tracing::info_span!("load_model").entered();
                self.loader.load()?
            };
            timings.record(timer);

            let info = session.describe();
            for spec in &info.inputs {
                debug!("Model input: {}", spec);
            }
            for spec in &info.outputs {
                debug!("Model output: {}", spec);
            }
            let expected_classes = info
                .outputs
                .first()
                .and_then(|spec| spec.class_count())
                .unwrap_or(self.config.num_classes);

            let timer = Timer::start("inference");
            let output = {
                let _span = tracing::info_span!("inference", tensor_len = tensor.len()).entered();
                session.run(&tensor)?
            };
            timings.record(timer);
            (output, expected_classes)
        };

        let timer = Timer::start("decode");
        let result = {
            let _span =
                tracing::info_span!("decode", element_type = %output.element_type).entered();
            let predictions = decode_output(output)?;
            debug!("Decoded predictions: {:?}", predictions);
            if predictions.len() != expected_classes {
                warn!(
                    "Model produced {} scores, expected {} classes",
                    predictions.len(),
                    expected_classes
                );
            }
            AnalysisResult::from_predictions(predictions)?
        };
        timings.record(timer);

        info!(
            severity_level = result.severity_level,
            confidence = result.confidence,
            "Analysis complete in {:.3}ms",
            timings.total_duration().as_secs_f64() * 1000.0
        );
        Ok((result, timings))
    }

    #[instrument(skip(self, data), fields(input_size = data.len()))]
    pub fn analyze_bytes(&self, data: &[u8]) -> Result<AnalysisResult> {
        let source = {
            let _span = tracing::info_span!("decode_source").entered();
            self.reader.read_image(data)?
        };
        debug!("Source image: {}x{}", source.width(), source.height());
        self.analyze(&source)
    }

    /// Reads and decodes an image file, then [`analyze`](Self::analyze)s it.
    ///
    /// # Errors
    ///
    /// * `InputReadError` - The file cannot be read
    /// * `InvalidImageError` - The bytes are not a decodable image
    /// * Anything [`analyze`](Self::analyze) returns
    #[instrument(skip(self, input_path))]
    pub fn analyze_file<P: AsRef<Path>>(&self, input_path: P) -> Result<AnalysisResult> {
        let input_path = input_path.as_ref();
        info!(input = %input_path.display(), "Analyzing file");

        let data = {
            let _span = tracing::info_span!("read_input_file").entered();
            std::fs::read(input_path).map_err(|e| {
                AnalysisError::InputReadError(format!("{}: {}", input_path.display(), e))
            })?
        };

        self.analyze_bytes(&data)
    }

    /// Loads the model once and reports its declared inputs and outputs.
    pub fn describe_model(&self) -> Result<ModelInfo> {
        let session = self.loader.load()?;
        let info = session.describe();
        info!(
            inputs = info.inputs.len(),
            outputs = info.outputs.len(),
            "Model diagnostics"
        );
        Ok(info)
    }

    fn dump_padded(&self, padded: &PaddedImage, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| output_write_error(path, e))?;
        write_dump(padded, path, file)?;
        debug!("Padded image written to {}", path.display());
        Ok(())
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: AnalysisConfig) {
        self.config = config;
    }
}

impl<L, R> RoyaAnalysisPipeline<L, R>
where
    L: ModelLoader + Send + Sync + 'static,
    R: ImageSourceReader + Send + Sync + 'static,
{
    /// Runs [`analyze`](Self::analyze) on the blocking thread pool. Dropping the
    /// returned future abandons the result; the analysis itself runs to completion.
    pub async fn analyze_in_background(
        self: Arc<Self>,
        source: RawImage,
    ) -> Result<AnalysisResult> {
        tokio::task::spawn_blocking(move || self.analyze(&source))
            .await
            .map_err(|e| AnalysisError::ModelExecutionError(format!("analysis task failed: {e}")))?
    }
}

/// Writes the padded image as TIFF through a buffer. Any IO failure, including
/// the final flush, is reported as an `OutputWriteError` naming `path`.
pub(crate) fn write_dump<W: Write>(
    padded: &PaddedImage,
    path: &Path,
    output: W,
) -> Result<()> {
    let mut writer = BufWriter::new(output);
    TiffImageWriter
        .write_image(padded, &mut writer)
        .map_err(|e| match e {
            AnalysisError::IoError(io) => output_write_error(path, io),
            other => other,
        })?;
    writer.flush().map_err(|e| output_write_error(path, e))
}

fn output_write_error(path: &Path, e: std::io::Error) -> AnalysisError {
    AnalysisError::OutputWriteError(format!("{}: {}", path.display(), e))
}

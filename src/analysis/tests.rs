use std::io::{self, Cursor, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use image::{ImageFormat, Rgb, RgbImage};

use crate::analysis::{
    AnalysisConfig, AnalysisError, ElementType, ImageSourceReader, ModelInfo, ModelLoader,
    ModelOutput, ModelSession, PackedTensor, RawImage, Result, RoyaAnalysisPipeline, TensorSpec,
};
use crate::analysis::pipeline::write_dump;

#[derive(Default)]
struct Counters {
    loads: AtomicUsize,
    runs: AtomicUsize,
    releases: AtomicUsize,
    tensors: Mutex<Vec<Vec<u8>>>,
}

struct MockLoader {
    fail_load: bool,
    fail_run: bool,
    output: ModelOutput,
    counters: Arc<Counters>,
}

impl MockLoader {
    fn returning(output: ModelOutput) -> Self {
        Self {
            fail_load: false,
            fail_run: false,
            output,
            counters: Arc::new(Counters::default()),
        }
    }
}

struct MockSession {
    fail_run: bool,
    output: ModelOutput,
    counters: Arc<Counters>,
}

impl ModelLoader for MockLoader {
    type Session = MockSession;

    fn load(&self) -> Result<MockSession> {
        if self.fail_load {
            return Err(AnalysisError::ModelExecutionError("Mock model asset missing".to_string()));
        }
        self.counters.loads.fetch_add(1, Ordering::SeqCst);
        Ok(MockSession {
            fail_run: self.fail_run,
            output: self.output.clone(),
            counters: self.counters.clone(),
        })
    }
}

impl ModelSession for MockSession {
    fn describe(&self) -> ModelInfo {
        ModelInfo {
            inputs: vec![TensorSpec {
                name: "image".to_string(),
                element_type: ElementType::UInt8,
                shape: vec![1, 224, 224, 3],
            }],
            outputs: vec![TensorSpec {
                name: "scores".to_string(),
                element_type: self.output.element_type,
                shape: vec![1, 5],
            }],
        }
    }

    fn run(&mut self, tensor: &PackedTensor) -> Result<ModelOutput> {
        self.counters.runs.fetch_add(1, Ordering::SeqCst);
        self.counters.tensors.lock().unwrap().push(tensor.as_bytes().to_vec());
        if self.fail_run {
            return Err(AnalysisError::ModelExecutionError("Mock native failure".to_string()));
        }
        Ok(self.output.clone())
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        self.counters.releases.fetch_add(1, Ordering::SeqCst);
    }
}

struct MockReader {
    should_fail: bool,
}

impl ImageSourceReader for MockReader {
    fn read_image(&self, _data: &[u8]) -> Result<RawImage> {
        if self.should_fail {
            return Err(AnalysisError::InvalidImageError("Mock decode error".to_string()));
        }
        RawImage::solid(100, 50, 0xFF_FF_FF_FF)
    }
}

fn white_source() -> RawImage {
    RawImage::solid(100, 50, 0xFF_FF_FF_FF).unwrap()
}

fn quantized_scores() -> ModelOutput {
    ModelOutput::from_u8(vec![10, 200, 30, 0, 5])
}

#[test]
fn test_end_to_end_white_leaf() {
    let loader = MockLoader::returning(quantized_scores());
    let counters = loader.counters.clone();
    let pipeline = RoyaAnalysisPipeline::new(loader, AnalysisConfig::default());

    let padded = pipeline.letterbox(&white_source()).unwrap();
    assert_eq!(padded.size(), 224);
    assert_eq!((padded.content().width, padded.content().height), (224, 112));
    assert_eq!(padded.padding(), (0, 0, 56, 56));

    let result = pipeline.analyze(&white_source()).unwrap();
    assert_eq!(result.severity_level, 1);
    assert!((result.confidence - 200.0 / 255.0).abs() < 1e-6);
    assert_eq!(result.predictions.len(), 5);

    let tensors = counters.tensors.lock().unwrap();
    assert_eq!(tensors.len(), 1);
    assert_eq!(tensors[0].len(), 150_528);
    assert!(tensors[0].iter().all(|&b| b == 255));
}

#[test]
fn test_content_rows_are_packed_between_padding_bands() {
    let source = RawImage::solid(100, 50, 0xFF_00_64_00).unwrap();
    let loader = MockLoader::returning(quantized_scores());
    let counters = loader.counters.clone();
    let pipeline = RoyaAnalysisPipeline::new(loader, AnalysisConfig::default());

    pipeline.analyze(&source).unwrap();

    let tensors = counters.tensors.lock().unwrap();
    let row = |y: usize| &tensors[0][y * 224 * 3..(y + 1) * 224 * 3];
    assert!(row(55).iter().all(|&b| b == 255));
    assert!(row(56).chunks(3).all(|px| px == [0, 100, 0]));
    assert!(row(167).chunks(3).all(|px| px == [0, 100, 0]));
    assert!(row(168).iter().all(|&b| b == 255));
}

#[test]
fn test_float_output_passes_through() {
    let loader = MockLoader::returning(ModelOutput::from_f32(&[0.05, 0.1, 0.15, 0.6, 0.1]));
    let pipeline = RoyaAnalysisPipeline::new(loader, AnalysisConfig::default());

    let result = pipeline.analyze(&white_source()).unwrap();
    assert_eq!(result.severity_level, 3);
    assert_eq!(result.confidence, 0.6);
    assert_eq!(result.predictions, vec![0.05, 0.1, 0.15, 0.6, 0.1]);
}

#[test]
fn test_tied_scores_pick_lowest_level() {
    let loader = MockLoader::returning(ModelOutput::from_f32(&[0.5, 0.5, 0.2]));
    let pipeline = RoyaAnalysisPipeline::new(loader, AnalysisConfig::default());

    let result = pipeline.analyze(&white_source()).unwrap();
    assert_eq!(result.severity_level, 0);
    assert!(!result.rust_detected());
}

#[test]
fn test_unsupported_output_type_fails_and_releases_session() {
    let loader = MockLoader::returning(ModelOutput {
        element_type: ElementType::Int16,
        shape: vec![1, 5],
        data: vec![0; 10],
    });
    let counters = loader.counters.clone();
    let pipeline = RoyaAnalysisPipeline::new(loader, AnalysisConfig::default());

    let result = pipeline.analyze(&white_source());

    assert!(matches!(
        result,
        Err(AnalysisError::UnsupportedOutputTypeError(ElementType::Int16))
    ));
    assert_eq!(counters.releases.load(Ordering::SeqCst), 1);
}

#[test]
fn test_model_load_failure() {
    let mut loader = MockLoader::returning(quantized_scores());
    loader.fail_load = true;
    let counters = loader.counters.clone();
    let pipeline = RoyaAnalysisPipeline::new(loader, AnalysisConfig::default());

    let result = pipeline.analyze(&white_source());

    assert!(matches!(result, Err(AnalysisError::ModelExecutionError(_))));
    assert_eq!(counters.runs.load(Ordering::SeqCst), 0);
}

#[test]
fn test_model_run_failure_releases_session() {
    let mut loader = MockLoader::returning(quantized_scores());
    loader.fail_run = true;
    let counters = loader.counters.clone();
    let pipeline = RoyaAnalysisPipeline::new(loader, AnalysisConfig::default());

    let result = pipeline.analyze(&white_source());

    assert!(matches!(result, Err(AnalysisError::ModelExecutionError(_))));
    assert_eq!(counters.loads.load(Ordering::SeqCst), 1);
    assert_eq!(counters.releases.load(Ordering::SeqCst), 1);
}

#[test]
fn test_each_analysis_gets_its_own_session() {
    let loader = MockLoader::returning(quantized_scores());
    let counters = loader.counters.clone();
    let pipeline = RoyaAnalysisPipeline::new(loader, AnalysisConfig::default());

    pipeline.analyze(&white_source()).unwrap();
    pipeline.analyze(&white_source()).unwrap();

    assert_eq!(counters.loads.load(Ordering::SeqCst), 2);
    assert_eq!(counters.releases.load(Ordering::SeqCst), 2);
}

#[test]
fn test_empty_output_is_an_execution_error() {
    let loader = MockLoader::returning(ModelOutput::from_u8(Vec::new()));
    let pipeline = RoyaAnalysisPipeline::new(loader, AnalysisConfig::default());

    let result = pipeline.analyze(&white_source());
    assert!(matches!(result, Err(AnalysisError::ModelExecutionError(_))));
}

#[test]
fn test_class_count_mismatch_still_decodes() {
    let loader = MockLoader::returning(ModelOutput::from_u8(vec![1, 2, 250]));
    let pipeline = RoyaAnalysisPipeline::new(loader, AnalysisConfig::default());

    let result = pipeline.analyze(&white_source()).unwrap();
    assert_eq!(result.severity_level, 2);
    assert_eq!(result.predictions.len(), 3);
}

#[test]
fn test_reader_failure_skips_model() {
    let loader = MockLoader::returning(quantized_scores());
    let counters = loader.counters.clone();
    let pipeline = RoyaAnalysisPipeline::with_custom(
        loader,
        MockReader { should_fail: true },
        AnalysisConfig::default(),
    );

    let result = pipeline.analyze_bytes(b"fake photo");

    assert!(matches!(result, Err(AnalysisError::InvalidImageError(_))));
    assert_eq!(counters.loads.load(Ordering::SeqCst), 0);
}

#[test]
fn test_custom_reader_success() {
    let loader = MockLoader::returning(quantized_scores());
    let pipeline = RoyaAnalysisPipeline::with_custom(
        loader,
        MockReader { should_fail: false },
        AnalysisConfig::default(),
    );

    let result = pipeline.analyze_bytes(b"fake photo").unwrap();
    assert_eq!(result.severity_level, 1);
}

#[test]
fn test_analyze_png_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("leaf.png");
    let mut png = Vec::new();
    RgbImage::from_pixel(64, 48, Rgb([40, 120, 30]))
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();
    std::fs::write(&path, &png).unwrap();

    let loader = MockLoader::returning(ModelOutput::from_f32(&[0.9, 0.05, 0.05, 0.0, 0.0]));
    let pipeline = RoyaAnalysisPipeline::new(loader, AnalysisConfig::default());

    let result = pipeline.analyze_file(&path).unwrap();
    assert_eq!(result.severity_level, 0);
    assert_eq!(result.confidence, 0.9);
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = RoyaAnalysisPipeline::new(
        MockLoader::returning(quantized_scores()),
        AnalysisConfig::default(),
    );

    let result = pipeline.analyze_file(dir.path().join("missing.jpg"));
    assert!(matches!(result, Err(AnalysisError::InputReadError(_))));
}

#[test]
fn test_padded_image_dump() {
    let dir = tempfile::tempdir().unwrap();
    let dump = dir.path().join("padded.tiff");
    let config = AnalysisConfig::builder()
        .dump_padded(Some(dump.clone()))
        .build()
        .unwrap();
    let pipeline = RoyaAnalysisPipeline::new(MockLoader::returning(quantized_scores()), config);

    pipeline.analyze(&RawImage::solid(100, 50, 0xFF_00_00_FF).unwrap()).unwrap();

    let written = image::open(&dump).unwrap().to_rgb8();
    assert_eq!(written.dimensions(), (224, 224));
    assert_eq!(written.get_pixel(100, 10).0, [255, 255, 255]);
    assert_eq!(written.get_pixel(100, 100).0, [0, 0, 255]);
}

#[test]
fn test_unwritable_dump_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let config = AnalysisConfig::builder()
        .dump_padded(Some(dir.path().join("no_such_dir").join("padded.tiff")))
        .build()
        .unwrap();
    let loader = MockLoader::returning(quantized_scores());
    let counters = loader.counters.clone();
    let pipeline = RoyaAnalysisPipeline::new(loader, config);

    let result = pipeline.analyze(&white_source());

    assert!(matches!(result, Err(AnalysisError::OutputWriteError(_))));
    assert_eq!(counters.loads.load(Ordering::SeqCst), 0);
}

#[test]
fn test_timings_cover_every_stage() {
    let pipeline = RoyaAnalysisPipeline::new(
        MockLoader::returning(quantized_scores()),
        AnalysisConfig::default(),
    );

    let (_, timings) = pipeline.analyze_with_timings(&white_source()).unwrap();

    let names: Vec<&str> = timings.steps().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["letterbox", "pack", "load_model", "inference", "decode"]);
}

#[test]
fn test_smaller_target_size() {
    let config = AnalysisConfig::builder().target_size(32).build().unwrap();
    let loader = MockLoader::returning(quantized_scores());
    let counters = loader.counters.clone();
    let pipeline = RoyaAnalysisPipeline::new(loader, config);

    pipeline.analyze(&white_source()).unwrap();

    assert_eq!(counters.tensors.lock().unwrap()[0].len(), 32 * 32 * 3);
}

#[test]
fn test_describe_model() {
    let loader = MockLoader::returning(quantized_scores());
    let counters = loader.counters.clone();
    let pipeline = RoyaAnalysisPipeline::new(loader, AnalysisConfig::default());

    let info = pipeline.describe_model().unwrap();

    assert_eq!(info.inputs[0].shape, vec![1, 224, 224, 3]);
    assert_eq!(info.outputs[0].class_count(), Some(5));
    assert_eq!(counters.releases.load(Ordering::SeqCst), 1);
    assert_eq!(counters.runs.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_analyze_in_background() {
    let loader = MockLoader::returning(ModelOutput::from_u8(vec![0, 0, 0, 0, 255]));
    let pipeline = Arc::new(RoyaAnalysisPipeline::new(loader, AnalysisConfig::default()));

    let result = pipeline.clone().analyze_in_background(white_source()).await.unwrap();

    assert_eq!(result.severity_level, 4);
    assert_eq!(result.confidence, 1.0);
}

#[tokio::test]
async fn test_background_failure_is_propagated() {
    let mut loader = MockLoader::returning(quantized_scores());
    loader.fail_run = true;
    let pipeline = Arc::new(RoyaAnalysisPipeline::new(loader, AnalysisConfig::default()));

    let result = pipeline.analyze_in_background(white_source()).await;

    assert!(matches!(result, Err(AnalysisError::ModelExecutionError(_))));
}

struct BrokenSink {
    fail_write: bool,
    fail_flush: bool,
}

impl Write for BrokenSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_write {
            return Err(io::Error::other("disk full"));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.fail_flush {
            return Err(io::Error::other("flush rejected"));
        }
        Ok(())
    }
}

fn padded_white_leaf() -> crate::analysis::PaddedImage {
    RoyaAnalysisPipeline::new(MockLoader::returning(quantized_scores()), AnalysisConfig::default())
        .letterbox(&white_source())
        .unwrap()
}

#[test]
fn test_dump_flush_failure_is_an_output_write_error() {
    let path = Path::new("padded.tiff");
    let sink = BrokenSink { fail_write: false, fail_flush: true };

    match write_dump(&padded_white_leaf(), path, sink) {
        Err(AnalysisError::OutputWriteError(message)) => {
            assert!(message.starts_with("padded.tiff: "), "{}", message);
            assert!(message.contains("flush rejected"), "{}", message);
        }
        other => panic!("expected output write error, got {:?}", other),
    }
}

#[test]
fn test_dump_write_failure_is_an_output_write_error() {
    let path = Path::new("padded.tiff");
    let sink = BrokenSink { fail_write: true, fail_flush: false };

    match write_dump(&padded_white_leaf(), path, sink) {
        Err(AnalysisError::OutputWriteError(message)) => {
            assert!(message.contains("disk full"), "{}", message);
        }
        other => panic!("expected output write error, got {:?}", other),
    }
}

#[test]
fn test_dump_to_healthy_sink() {
    let sink = BrokenSink { fail_write: false, fail_flush: false };
    assert!(write_dump(&padded_white_leaf(), Path::new("padded.tiff"), sink).is_ok());
}

use std::path::PathBuf;

use roya_detect_rs::analysis::{
    AnalysisConfig, AutoDetectReader, ImageSourceReader, LetterboxResizer, TensorPacker,
};
use roya_detect_rs::logger;

use tracing::{error, info, warn};

const USAGE: &str = "usage: roya_detect <image> [model.onnx] [--dump <padded.tiff>] [--describe]";

struct Args {
    image: PathBuf,
    model: Option<PathBuf>,
    dump: Option<PathBuf>,
    describe: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut positional = Vec::new();
    let mut dump = None;
    let mut describe = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dump" => {
                dump = Some(PathBuf::from(args.next().ok_or("--dump needs a path")?));
            }
            "--describe" => describe = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            other if other.starts_with("--") => {
                return Err(format!("unknown flag {other}\n{USAGE}"));
            }
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    let mut positional = positional.into_iter();
    let image = positional.next().ok_or_else(|| USAGE.to_string())?;
    let model = positional.next();
    if positional.next().is_some() {
        return Err(USAGE.to_string());
    }

    Ok(Args { image, model, dump, describe })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(2);
        }
    };

    info!("Starting roya_detect...");

    let config = AnalysisConfig::builder()
        .dump_padded(args.dump.clone())
        .build()?;

    info!("Target size: {}x{}", config.target_size, config.target_size);
    info!("Resample filter: {:?}", config.filter);

    match &args.model {
        Some(model) => run_analysis(&args, model, config),
        None => {
            warn!("No model given, running preprocessing only");
            run_preprocessing(&args, config)
        }
    }
}

#[cfg(feature = "onnx")]
fn run_analysis(
    args: &Args,
    model: &std::path::Path,
    config: AnalysisConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    use roya_detect_rs::analysis::RoyaAnalysisPipeline;

    let pipeline = RoyaAnalysisPipeline::from_model_file(model, config);

    if args.describe {
        let model_info = pipeline.describe_model()?;
        for spec in &model_info.inputs {
            println!("input  {}", spec);
        }
        for spec in &model_info.outputs {
            println!("output {}", spec);
        }
    }

    let data = std::fs::read(&args.image)?;
    let source = AutoDetectReader::default().read_image(&data)?;

    match pipeline.analyze_with_timings(&source) {
        Ok((result, timings)) => {
            println!("{}", result);
            println!("Scores: {:?}", result.predictions);
            println!("\n{}", timings.summary());
            Ok(())
        }
        Err(e) => {
            error!("Analysis failed: {}", e);
            Err(e.into())
        }
    }
}

#[cfg(not(feature = "onnx"))]
fn run_analysis(
    args: &Args,
    model: &std::path::Path,
    config: AnalysisConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    error!(
        "Cannot load {}: built without the `onnx` feature",
        model.display()
    );
    run_preprocessing(args, config)
}

fn run_preprocessing(
    args: &Args,
    config: AnalysisConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    if args.describe {
        warn!("--describe needs a model, ignoring");
    }

    let data = std::fs::read(&args.image)?;
    let source = AutoDetectReader::default().read_image(&data)?;
    info!("Source image: {}x{}", source.width(), source.height());

    let padded = LetterboxResizer::new(config.target_size, config.fill_color, config.filter)?
        .resize(&source)?;
    let content = padded.content();
    info!(
        "Letterboxed content {}x{} at ({}, {})",
        content.width, content.height, content.x, content.y
    );

    if let Some(path) = &config.dump_padded {
        use roya_detect_rs::analysis::{PaddedImageWriter, TiffImageWriter};
        let mut file = std::fs::File::create(path)?;
        TiffImageWriter.write_image(&padded, &mut file)?;
        info!("Padded image written to {}", path.display());
    }

    let tensor = TensorPacker::new(config.target_size).pack(padded.image())?;
    println!("Packed tensor: {:?}, {} bytes", tensor.shape(), tensor.len());
    Ok(())
}

use std::path::PathBuf;
use std::process::ExitCode;
use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vehicle_detect::common::{InferenceDevice, ModelVersion};
use vehicle_detect::data::RunConfig;
use vehicle_detect::{init_detector, pipeline};

#[derive(Parser)]
#[command(name = "vehicle_detect")]
#[command(about = "Detect vehicles in a folder of images and save annotated copies")]
struct Cli {
    /// Directory holding bin/best.onnx, test_images/ and output_images/
    /// (defaults to the directory of this executable)
    #[arg(long, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// ONNX weights file
    #[arg(long, value_name = "FILE")]
    weights: Option<PathBuf>,

    /// Directory of input images
    #[arg(long, value_name = "DIR")]
    input: Option<PathBuf>,

    /// Directory for annotated images
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Confidence threshold (overrides YOLO_CONF)
    #[arg(long)]
    conf: Option<f32>,

    /// IoU threshold for non-maximum suppression
    #[arg(long)]
    iou: Option<f32>,

    /// Execution provider: cpu, cuda[:id] or tensorrt[:id]
    #[arg(long, default_value = "cpu")]
    device: String,

    /// Output layout of the exported model: yolov5 ... yolov11
    #[arg(long, default_value = "yolov5")]
    model_version: String,

    /// Square model input size used when the model's input is dynamic
    #[arg(long, value_name = "PX")]
    input_size: Option<u32>,

    /// onnxruntime shared library to load
    #[arg(long, value_name = "FILE")]
    ort_lib: Option<PathBuf>,

    /// Class names, one per line (defaults to the names stored in the model)
    #[arg(long, value_name = "FILE")]
    labels: Option<PathBuf>,

    /// TrueType font used for the labels
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,
}

fn exe_dir() -> anyhow::Result<PathBuf> {
    let exe = std::env::current_exe().context("Cannot locate the running executable")?;
    Ok(exe.parent().map(PathBuf::from).unwrap_or_default())
}

fn build_config(args: Cli) -> anyhow::Result<RunConfig> {
    let base_dir = match args.base_dir {
        Some(dir) => dir,
        None => exe_dir()?,
    };
    let mut config = RunConfig::from_env(&base_dir)?;

    if let Some(weights) = args.weights {
        config = config.with_weights_path(weights);
    }
    if let Some(input) = args.input {
        config = config.with_input_dir(input);
    }
    if let Some(output) = args.output {
        config = config.with_output_dir(output);
    }
    if let Some(conf) = args.conf {
        config = config.with_conf_threshold(conf);
    }
    if let Some(font) = args.font {
        config = config.with_font_path(font);
    }

    let model = &mut config.model;
    model.inference_device = InferenceDevice::parse(&args.device).with_context(|| {
        format!("Unknown device {:?}, expected one of {:?}", args.device, InferenceDevice::all_inference_devices())
    })?;
    model.model_version = ModelVersion::parse(&args.model_version)
        .with_context(|| format!("Unknown model version {:?}", args.model_version))?;
    if let Some(iou) = args.iou {
        model.iou_threshold = iou;
    }
    if let Some(size) = args.input_size {
        model.width = size;
        model.height = size;
    }
    model.ort_lib_path = args.ort_lib;
    model.labels_path = args.labels;

    Ok(config)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    let result = build_config(args)
        .and_then(|config| pipeline::run(&config, init_detector));

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

//! The batch run: discover images, detect, annotate, save.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use anyhow::Context;
use image::{DynamicImage, ImageReader};
use crate::annotation::{annotate, LabelStyle};
use crate::common::ModelConfig;
use crate::data::{RunConfig, TimeCalc};
use crate::Detector;

/// Extensions picked up from the input directory. Matching is case-sensitive.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

pub const OUTPUT_PREFIX: &str = "output_";

/// What happened to a single input image.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageOutcome {
    /// Saved with the listed labels drawn (possibly none, when every
    /// detection was outside the allowed classes).
    Annotated { output: PathBuf, labels: Vec<String> },
    /// The model reported nothing; the image was saved unchanged.
    NoDetections { output: PathBuf },
    /// Decoding, inference or writing failed; nothing was saved.
    Skipped,
}

#[derive(Debug, Default, Clone)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
    pub outputs: Vec<PathBuf>,
    pub inference_time: TimeCalc,
}

impl BatchSummary {
    fn record(&mut self, outcome: &ImageOutcome) {
        match outcome {
            ImageOutcome::Annotated { output, .. } | ImageOutcome::NoDetections { output } => {
                self.processed += 1;
                self.outputs.push(output.clone());
            }
            ImageOutcome::Skipped => self.skipped += 1,
        }
    }
}

/// Image files directly inside `dir`, in lexicographic path order.
///
/// Hidden files and anything that is not a regular file are ignored.
pub fn discover_images(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Input directory not found: {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() && !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name() else {
            continue;
        };
        if name.as_encoded_bytes().starts_with(b".") {
            continue;
        }
        if has_image_extension(&path) {
            paths.push(path);
        }
    }

    paths.sort();
    paths.dedup();
    Ok(paths)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext))
}

/// `output_dir/output_<basename of input>`.
pub fn output_path_for(input: &Path, output_dir: &Path) -> Option<PathBuf> {
    let mut name = OsString::from(OUTPUT_PREFIX);
    name.push(input.file_name()?);
    Some(output_dir.join(name))
}

fn decode_image(path: &Path) -> anyhow::Result<DynamicImage> {
    Ok(ImageReader::open(path)?.with_guessed_format()?.decode()?)
}

fn save_image(image: &DynamicImage, output: &Path) -> bool {
    match image.save(output) {
        Ok(_) => true,
        Err(err) => {
            log::error!("Failed to write {}: {}", output.display(), err);
            false
        }
    }
}

/// Runs one image through decode, detect, annotate and save. Every failure
/// is logged and reported as [`ImageOutcome::Skipped`]; none is propagated.
pub fn process_image<D: Detector + ?Sized>(
    detector: &mut D,
    path: &Path,
    output_dir: &Path,
    style: &LabelStyle,
    inference_time: &mut TimeCalc,
) -> ImageOutcome {
    let Some(output) = output_path_for(path, output_dir) else {
        log::warn!("Failed to read image: {}", path.display());
        return ImageOutcome::Skipped;
    };

    let mut image = match decode_image(path) {
        Ok(image) => image,
        Err(err) => {
            log::warn!("Failed to read image: {} ({})", path.display(), err);
            return ImageOutcome::Skipped;
        }
    };

    let t_infer = Instant::now();
    let y = match detector.detect(&image) {
        Ok(y) => y,
        Err(err) => {
            log::error!("Inference failed for {}: {:#}", path.display(), err);
            return ImageOutcome::Skipped;
        }
    };
    inference_time.push(t_infer.elapsed());

    let detections = match y.detections() {
        Some(detections) if !detections.is_empty() => detections,
        _ => {
            if !save_image(&image, &output) {
                return ImageOutcome::Skipped;
            }
            println!("Saved (no detections): {}", output.display());
            return ImageOutcome::NoDetections { output };
        }
    };

    let labels = annotate(&mut image, detections, style);
    log::debug!("{}: {} detection(s), {} drawn", path.display(), detections.len(), labels.len());

    if !save_image(&image, &output) {
        return ImageOutcome::Skipped;
    }
    println!("Saved: {}", output.display());
    ImageOutcome::Annotated { output, labels }
}

/// Processes `images` one after another in the given order.
pub fn run_batch<D: Detector + ?Sized>(
    detector: &mut D,
    images: &[PathBuf],
    output_dir: &Path,
    style: &LabelStyle,
) -> BatchSummary {
    let mut summary = BatchSummary::default();
    for path in images {
        let outcome = process_image(detector, path, output_dir, style, &mut summary.inference_time);
        summary.record(&outcome);
    }
    summary
}

/// The whole program: validates the layout, loads the detector with
/// `load_detector`, then processes every discovered image.
///
/// Errors returned from here are fatal. Per-image problems never are.
pub fn run<D, F>(config: &RunConfig, load_detector: F) -> anyhow::Result<BatchSummary>
where
    D: Detector,
    F: FnOnce(&ModelConfig) -> anyhow::Result<D>,
{
    let weights_path = &config.model.weights_path;
    if !weights_path.exists() {
        anyhow::bail!("Weights not found at {}", weights_path.display());
    }
    if !config.input_dir.is_dir() {
        anyhow::bail!("Input directory not found: {}", config.input_dir.display());
    }
    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create output directory {}", config.output_dir.display()))?;

    let mut detector = load_detector(&config.model).context("Failed to load detection model")?;

    let images = discover_images(&config.input_dir)?;
    if images.is_empty() {
        let patterns: Vec<String> = IMAGE_EXTENSIONS.iter().map(|e| format!("*.{e}")).collect();
        println!("No images found in {}. Supported: {}", config.input_dir.display(), patterns.join(", "));
        return Ok(BatchSummary::default());
    }

    println!(
        "Found {} image(s). Running detection (conf>={}) ...",
        images.len(),
        config.conf_threshold()
    );

    let style = LabelStyle::load(config.font_path.as_deref());
    let summary = run_batch(&mut detector, &images, &config.output_dir, &style);

    if summary.inference_time.n() > 0 {
        log::info!("Average inference time: {:.2?}", summary.inference_time.avg());
    }
    println!(
        "Done! Processed {} image(s). Outputs in: {}",
        summary.processed,
        config.output_dir.display()
    );
    Ok(summary)
}

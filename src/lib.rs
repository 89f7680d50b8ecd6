mod utils;
mod detectors;
pub mod annotation;
pub mod common;
pub mod data;
pub mod detection_runners;
pub mod pipeline;

use anyhow::Context;
use image::DynamicImage;
use crate::common::ModelConfig;
use crate::data::ConfigOrt;
use crate::detection_runners::inference_process::InferenceProcess;
use crate::detection_runners::OrtYOLO;

pub use detectors::Detector;

/// Loads the detector described by `model_details` and runs one warm-up
/// inference on a blank image.
pub fn init_detector(model_details: &ModelConfig) -> anyhow::Result<OrtYOLO> {
    let mut ort_options = ConfigOrt::from_model_config(model_details);
    if let Some(labels_path) = &model_details.labels_path {
        let names = utils::file_to_vec(labels_path)
            .with_context(|| format!("Failed to read labels file {}", labels_path.display()))?;
        ort_options = ort_options.with_names(names);
    }

    log::info!("Initializing ORT session with ({}) execution provider", model_details.inference_device);
    log::debug!("Model configuration:\n{}", model_details);
    let mut yolo = OrtYOLO::new(ort_options)?;
    let blank = DynamicImage::new_rgb8(yolo.width(), yolo.height());
    yolo.run(&[blank])
        .context("Warm-up inference failed")?;
    Ok(yolo)
}

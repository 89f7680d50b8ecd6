use std::slice;
use image::DynamicImage;
use crate::data::Y;
use crate::detection_runners::inference_process::InferenceProcess;
use crate::detection_runners::OrtYOLO;

/// Anything that turns one decoded image into detections.
///
/// The batch pipeline only depends on this trait, so the ONNX model can be
/// swapped for a fake in tests.
pub trait Detector {
    fn detect(&mut self, image: &DynamicImage) -> anyhow::Result<Y>;
}

impl Detector for OrtYOLO {
    fn detect(&mut self, image: &DynamicImage) -> anyhow::Result<Y> {
        let mut ys = self.forward(slice::from_ref(image))?;
        Ok(ys.pop().unwrap_or_default())
    }
}

impl<D: Detector + ?Sized> Detector for Box<D> {
    fn detect(&mut self, image: &DynamicImage) -> anyhow::Result<Y> {
        (**self).detect(image)
    }
}

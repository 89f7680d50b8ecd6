#![allow(dead_code)]

use std::path::Path;
use image::{DynamicImage, Rgb, RgbImage};
use vehicle_detect::common::{DetBox, Detection};
use vehicle_detect::data::Y;
use vehicle_detect::Detector;

/// Stands in for the ONNX model: returns the same canned detections for
/// every image, dropping those below its threshold like the real model does.
pub struct FakeDetector {
    pub conf_threshold: f32,
    pub detections: Vec<Detection>,
    pub fail: bool,
    pub calls: usize,
}

impl FakeDetector {
    pub fn new(conf_threshold: f32, detections: Vec<Detection>) -> Self {
        Self {
            conf_threshold,
            detections,
            fail: false,
            calls: 0,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(0.3, vec![])
        }
    }
}

impl Detector for FakeDetector {
    fn detect(&mut self, _image: &DynamicImage) -> anyhow::Result<Y> {
        self.calls += 1;
        if self.fail {
            anyhow::bail!("fake inference failure");
        }
        let kept: Vec<Detection> = self
            .detections
            .iter()
            .filter(|d| d.confidence.map_or(true, |c| c >= self.conf_threshold))
            .cloned()
            .collect();
        if kept.is_empty() {
            return Ok(Y::default());
        }
        Ok(Y::default().with_detections(&kept))
    }
}

pub fn detection(label: &str, (x1, y1, x2, y2): (f32, f32, f32, f32), conf: f32) -> Detection {
    Detection::new(label, DetBox::new(x1, y1, x2, y2), Some(conf))
}

/// Deterministic non-uniform test picture.
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 3 % 256) as u8, (y * 5 % 256) as u8, ((x + y) % 256) as u8])
    })
}

pub fn write_image(path: &Path, image: &RgbImage) {
    image.save(path).unwrap();
}

pub fn write_garbage(path: &Path) {
    std::fs::write(path, b"definitely not an image").unwrap();
}

use serde::{Deserialize, Serialize};
use crate::common::DetBox;
use crate::detection_runners::ort_detector::nms::Nms;

/// One object reported by the detector for a single image.
#[derive(Default, Debug, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Detection {
    pub class_id: isize,
    pub label: String,
    pub bbox: DetBox,
    pub confidence: Option<f32>,
}

impl Nms for Detection {
    fn iou(&self, other: &Self) -> f32 {
        self.bbox.iou(&other.bbox)
    }

    fn confidence(&self) -> f32 {
        self.confidence.unwrap_or(0.)
    }

    fn class_id(&self) -> isize {
        self.class_id
    }
}

impl Detection {
    pub fn new(label: &str, bbox: DetBox, confidence: Option<f32>) -> Self {
        Self {
            class_id: -1,
            label: label.to_string(),
            bbox,
            confidence,
        }
    }

    pub fn with_class_id(mut self, class_id: isize) -> Self {
        self.class_id = class_id;
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    /// Text drawn next to the box: the class name, followed by the confidence
    /// with two decimals when the model reported one.
    pub fn label_text(&self) -> String {
        match self.confidence {
            Some(conf) => format!("{} {:.2}", self.label, conf),
            None => self.label.clone(),
        }
    }
}

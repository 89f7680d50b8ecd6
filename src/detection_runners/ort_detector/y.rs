use crate::common::Detection;
use crate::detection_runners::ort_detector::nms::Nms;

/// Inference result for one image.
///
/// `detections` is `None` when the model produced nothing usable for the
/// image; callers treat that the same as an empty list.
#[derive(Clone, PartialEq, Default)]
pub struct Y {
    detections: Option<Vec<Detection>>,
}

impl std::fmt::Debug for Y {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut f = f.debug_struct("Y");
        if let Some(x) = &self.detections {
            if !x.is_empty() {
                f.field("Detections", &x);
            }
        }
        f.finish()
    }
}

impl Y {
    /// Sets the `detections` field with the provided vector of detections.
    pub fn with_detections(mut self, detections: &[Detection]) -> Self {
        self.detections = Some(detections.to_vec());
        self
    }

    pub fn detections(&self) -> Option<&Vec<Detection>> {
        self.detections.as_ref()
    }

    pub fn into_detections(self) -> Vec<Detection> {
        self.detections.unwrap_or_default()
    }

    pub fn apply_nms(mut self, iou_threshold: f32) -> Self {
        if let Some(ref mut detections) = self.detections {
            Self::nms(detections, iou_threshold);
        }
        self
    }

    /// Greedy per-class non-maximum suppression, highest confidence first.
    pub fn nms<T: Nms>(boxes: &mut Vec<T>, iou_threshold: f32) {
        boxes.sort_by(|b1, b2| {
            b2.confidence()
                .partial_cmp(&b1.confidence())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let mut current_index = 0;
        for index in 0..boxes.len() {
            let mut drop = false;
            for prev_index in 0..current_index {
                if boxes[prev_index].class_id() != boxes[index].class_id() {
                    continue;
                }
                let iou = boxes[prev_index].iou(&boxes[index]);
                if iou > iou_threshold {
                    drop = true;
                    break;
                }
            }
            if !drop {
                boxes.swap(current_index, index);
                current_index += 1;
            }
        }
        boxes.truncate(current_index);
    }
}

use std::path::PathBuf;
use crate::common::inference_device::InferenceDevice;
use crate::common::model_version::ModelVersion;

pub const DEFAULT_CONF_THRESHOLD: f32 = 0.3;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.45;
pub const DEFAULT_INPUT_SIZE: u32 = 640;

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub weights_path: PathBuf,
    /// onnxruntime shared library; `ORT_DYLIB_PATH` or the system default when unset.
    pub ort_lib_path: Option<PathBuf>,
    /// One class name per line. Overrides the names embedded in the ONNX metadata.
    pub labels_path: Option<PathBuf>,
    pub inference_device: InferenceDevice,
    pub model_version: ModelVersion,
    pub conf_threshold: f32,
    pub iou_threshold: f32,
    pub width: u32,
    pub height: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            weights_path: PathBuf::new(),
            ort_lib_path: None,
            labels_path: None,
            inference_device: InferenceDevice::CPU,
            model_version: ModelVersion::YoloV5,
            conf_threshold: DEFAULT_CONF_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            width: DEFAULT_INPUT_SIZE,
            height: DEFAULT_INPUT_SIZE,
        }
    }
}

impl ModelConfig {
    pub fn new(weights_path: PathBuf, conf_threshold: f32) -> Self {
        Self {
            weights_path,
            conf_threshold,
            ..Default::default()
        }
    }
}

impl std::fmt::Display for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Weights File Path: {}\n\
        Labels Path: {}\n\
        OnnxRuntime Lib Path: {}\n\
        Inference Device: {}\n\
        Model Version: {}\n\
        Model Input Resolution: {}x{}\n\
        Detection Threshold: {}\n\
        IoU Threshold: {}",
               self.weights_path.display(),
               self.labels_path.as_ref().map(|p| p.display().to_string()).unwrap_or("<model metadata>".to_string()),
               self.ort_lib_path.as_ref().map(|p| p.display().to_string()).unwrap_or("<default>".to_string()),
               self.inference_device, self.model_version.name(),
               self.width, self.height, self.conf_threshold, self.iou_threshold)
    }
}

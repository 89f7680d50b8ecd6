//! Options for building the ONNX Runtime session.

use std::path::{Path, PathBuf};
use anyhow::Result;
use crate::common::{InferenceDevice, ModelConfig, ModelVersion, DEFAULT_INPUT_SIZE, DEFAULT_IOU_THRESHOLD};

#[derive(Debug, Clone)]
pub struct ConfigOrt {
    pub onnx_path: PathBuf,
    pub ort_lib_path: Option<PathBuf>,
    pub device: InferenceDevice,
    pub model_width: u32,
    pub model_height: u32,

    // trt related
    pub trt_engine_cache_enable: bool,
    pub trt_fp16_enable: bool,

    pub confs: Vec<f32>,
    pub iou: f32,
    pub names: Option<Vec<String>>,
    pub yolo_version: ModelVersion,
}

impl Default for ConfigOrt {
    fn default() -> Self {
        Self {
            onnx_path: PathBuf::new(),
            ort_lib_path: None,
            device: InferenceDevice::CPU,
            model_height: DEFAULT_INPUT_SIZE,
            model_width: DEFAULT_INPUT_SIZE,

            trt_engine_cache_enable: true,
            trt_fp16_enable: false,

            confs: vec![0.3f32],
            iou: DEFAULT_IOU_THRESHOLD,
            names: None,
            yolo_version: ModelVersion::YoloV5,
        }
    }
}

impl ConfigOrt {
    pub fn new() -> Self {
        Default::default()
    }

    /// Options matching a [`ModelConfig`]. Class names are not read here.
    pub fn from_model_config(config: &ModelConfig) -> Self {
        let mut options = Self::new()
            .with_model(&config.weights_path)
            .with_device(config.inference_device)
            .with_yolo_version(config.model_version)
            .with_model_width(config.width)
            .with_model_height(config.height)
            .with_confs(&[config.conf_threshold])
            .with_iou(config.iou_threshold);
        if let Some(lib) = &config.ort_lib_path {
            options = options.with_ort_lib_path(lib);
        }
        options
    }

    pub fn with_model(mut self, onnx_path: &Path) -> Self {
        self.onnx_path = onnx_path.to_path_buf();
        self
    }

    pub fn with_ort_lib_path(mut self, ort_lib_path: &Path) -> Self {
        self.ort_lib_path = Some(ort_lib_path.to_path_buf());
        self
    }

    pub fn with_model_width(mut self, n: u32) -> Self {
        self.model_width = n;
        self
    }

    pub fn with_model_height(mut self, n: u32) -> Self {
        self.model_height = n;
        self
    }

    pub fn with_device(mut self, device_type: InferenceDevice) -> Self {
        self.device = device_type;
        self
    }

    pub fn with_yolo_version(mut self, x: ModelVersion) -> Self {
        self.yolo_version = x;
        self
    }

    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.names = Some(names);
        self
    }

    pub fn with_iou(mut self, x: f32) -> Self {
        self.iou = x;
        self
    }

    pub fn with_confs(mut self, x: &[f32]) -> Self {
        self.confs = x.to_vec();
        self
    }

    /// Confidence threshold for `class_id`: per-class when given, else the first entry.
    pub fn conf_for(&self, class_id: usize) -> f32 {
        self.confs
            .get(class_id)
            .or(self.confs.first())
            .copied()
            .unwrap_or(0.)
    }

    pub fn validate(&self) -> Result<()> {
        if self.model_width == 0 || self.model_height == 0 {
            anyhow::bail!("Model input resolution must be non-zero, got {}x{}", self.model_width, self.model_height);
        }
        Ok(())
    }
}
